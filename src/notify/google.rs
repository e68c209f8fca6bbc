//! Google sitemap ping

use async_trait::async_trait;
use reqwest::Client as ReqwestClient;
use tracing::instrument;

use super::{Notifier, Outcome, http_client, send};

const GOOGLE_PING_ENDPOINT: &str = "https://www.google.com/ping";

/// Pings Google with the sitemap URL; the URL batch itself is not sent
pub struct GooglePing {
    client: ReqwestClient,
    endpoint: String,
    sitemap_url: String,
}

impl GooglePing {
    pub fn new(sitemap_url: impl Into<String>) -> Self {
        Self::with_endpoint(GOOGLE_PING_ENDPOINT, sitemap_url)
    }

    pub fn with_endpoint(endpoint: impl Into<String>, sitemap_url: impl Into<String>) -> Self {
        Self {
            client: http_client(),
            endpoint: endpoint.into(),
            sitemap_url: sitemap_url.into(),
        }
    }
}

#[async_trait]
impl Notifier for GooglePing {
    fn name(&self) -> &str {
        "google"
    }

    #[instrument(skip(self, _urls))]
    async fn notify(&self, _site_url: &str, _urls: &[String]) -> Outcome {
        let request = self
            .client
            .get(&self.endpoint)
            .query(&[("sitemap", self.sitemap_url.as_str())]);
        match send(request).await {
            Ok((200..=299, _)) => Outcome::Success,
            Ok((429, _)) => Outcome::QuotaExceeded,
            Ok((code, body)) => Outcome::Failed {
                code: Some(code),
                message: body,
            },
            Err(outcome) => outcome,
        }
    }
}
