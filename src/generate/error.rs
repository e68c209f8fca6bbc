//! Error types for the generate module

use thiserror::Error;

/// Error type for content generation
#[derive(Debug, Error)]
pub enum GenerateError {
    /// The completion request failed
    #[error("LLM error: {0}")]
    Llm(String),

    /// The model answered with nothing usable
    #[error("LLM returned an empty response for {0}")]
    EmptyResponse(String),
}

impl From<rig::completion::PromptError> for GenerateError {
    fn from(err: rig::completion::PromptError) -> Self {
        GenerateError::Llm(err.to_string())
    }
}
