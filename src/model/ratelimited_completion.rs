use std::num::NonZeroU32;
use std::sync::Arc;

use governor::{DefaultDirectRateLimiter, Quota, RateLimiter};
use rig::{
    agent::AgentBuilder,
    completion::{CompletionError, CompletionModel, CompletionRequest, CompletionResponse},
};
use tracing::{Instrument, debug, debug_span, info_span};

/// Raw provider response, passed through untouched
#[derive(Debug, Clone)]
pub struct ThrottledResponse<T>(pub T);

/// Completion model gated by a requests-per-minute quota
#[derive(Clone)]
pub struct RateLimitedCompletionModel<M: CompletionModel> {
    inner: M,
    limiter: Arc<DefaultDirectRateLimiter>,
}

impl<M> RateLimitedCompletionModel<M>
where
    M: CompletionModel,
{
    pub fn per_minute(inner: M, requests: NonZeroU32) -> Self {
        Self {
            inner,
            limiter: Arc::new(RateLimiter::direct(Quota::per_minute(requests))),
        }
    }

    pub fn agent(self) -> AgentBuilder<Self> {
        AgentBuilder::new(self)
    }

    async fn wait_for_slot(&self) {
        if self.limiter.check().is_ok() {
            return;
        }
        debug!("LLM quota reached, waiting for a free slot");
        self.limiter
            .until_ready()
            .instrument(debug_span!("limiter"))
            .await;
    }
}

impl<M: CompletionModel> CompletionModel for RateLimitedCompletionModel<M> {
    type Response = ThrottledResponse<M::Response>;

    async fn completion(
        &self,
        request: CompletionRequest,
    ) -> Result<CompletionResponse<Self::Response>, CompletionError> {
        self.wait_for_slot().await;

        let response = self
            .inner
            .completion(request)
            .instrument(info_span!("completion"))
            .await?;

        Ok(CompletionResponse {
            choice: response.choice,
            raw_response: ThrottledResponse(response.raw_response),
        })
    }
}
