//! Bing Webmaster URL batch submission

use async_trait::async_trait;
use reqwest::Client as ReqwestClient;
use serde::Serialize;
use tracing::instrument;

use super::{Notifier, Outcome, http_client, send};

const BING_ENDPOINT: &str = "https://ssl.bing.com/webmaster/api.svc/json/SubmitUrlBatch";

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
struct SubmitUrlBatch<'a> {
    site_url: &'a str,
    url_list: &'a [String],
}

/// Submits URL batches to the Bing Webmaster API
pub struct BingNotifier {
    client: ReqwestClient,
    endpoint: String,
    api_key: String,
}

impl BingNotifier {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self::with_endpoint(BING_ENDPOINT, api_key)
    }

    pub fn with_endpoint(endpoint: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            client: http_client(),
            endpoint: endpoint.into(),
            api_key: api_key.into(),
        }
    }
}

/// Bing answers an exhausted daily quota with a 400 whose message names the quota
fn classify(status: u16, body: String) -> Outcome {
    match status {
        200..=299 => Outcome::Success,
        429 => Outcome::QuotaExceeded,
        400 if body.to_ascii_lowercase().contains("quota") => Outcome::QuotaExceeded,
        code => Outcome::Failed {
            code: Some(code),
            message: body,
        },
    }
}

#[async_trait]
impl Notifier for BingNotifier {
    fn name(&self) -> &str {
        "bing"
    }

    #[instrument(skip(self, urls), fields(count = urls.len()))]
    async fn notify(&self, site_url: &str, urls: &[String]) -> Outcome {
        let request = self
            .client
            .post(&self.endpoint)
            .query(&[("apikey", self.api_key.as_str())])
            .json(&SubmitUrlBatch {
                site_url,
                url_list: urls,
            });
        match send(request).await {
            Ok((status, body)) => classify(status, body),
            Err(outcome) => outcome,
        }
    }
}
