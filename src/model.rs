//! # LLM Client Module
//!
//! This module builds the completion model behind the content generators,
//! with built-in rate limiting to prevent API quota exhaustion.
//!
//! ## Key Components
//!
//! - `RateLimitedCompletionModel`: Waits on a per-minute quota before every completion
//! - `completer_from_config`: Builds an OpenAI or Gemini agent from `LlmConfig`
//! - `Completer` for `rig` agents: a single prompt in, text out

use std::num::NonZeroU32;

use async_trait::async_trait;
use rig::{
    agent::Agent,
    completion::{CompletionModel, Prompt},
    providers::{gemini, openai},
};

use crate::config::{LlmConfig, LlmProvider};
use crate::generate::{Completer, GenerateError};

pub mod ratelimited_completion;

pub use ratelimited_completion::{RateLimitedCompletionModel, ThrottledResponse};

const REQUESTS_PER_MINUTE: NonZeroU32 = match NonZeroU32::new(30) {
    Some(n) => n,
    None => NonZeroU32::MIN,
};

const PREAMBLE: &str = "You write web content for a static website. \
    Follow the requested output format exactly and add no commentary.";

/// Wrap `model` in the rate limiter and an agent with the content preamble
fn rate_limited_agent<M: CompletionModel>(model: M) -> Agent<RateLimitedCompletionModel<M>> {
    RateLimitedCompletionModel::per_minute(model, REQUESTS_PER_MINUTE)
        .agent()
        .preamble(PREAMBLE)
        .build()
}

/// Build the configured model as a `Completer`
pub fn completer_from_config(config: &LlmConfig) -> Box<dyn Completer> {
    match config.provider {
        LlmProvider::OpenAi => {
            let client = openai::Client::new(&config.api_key);
            Box::new(rate_limited_agent(client.completion_model(&config.model)))
        }
        LlmProvider::Gemini => {
            let client = gemini::Client::new(&config.api_key);
            Box::new(rate_limited_agent(client.completion_model(&config.model)))
        }
    }
}

#[async_trait]
impl<M> Completer for Agent<M>
where
    M: CompletionModel,
{
    async fn complete(&self, prompt: &str) -> Result<String, GenerateError> {
        let reply = self.prompt(prompt).await?;
        Ok(reply)
    }
}
