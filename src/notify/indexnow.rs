//! IndexNow URL submission

use async_trait::async_trait;
use reqwest::Client as ReqwestClient;
use serde::Serialize;
use tracing::instrument;

use super::{Notifier, Outcome, http_client, send};

const INDEXNOW_ENDPOINT: &str = "https://api.indexnow.org/IndexNow";

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
struct Submission<'a> {
    host: &'a str,
    key: &'a str,
    key_location: &'a str,
    url_list: &'a [String],
}

/// Submits URL lists through the IndexNow protocol
pub struct IndexNowNotifier {
    client: ReqwestClient,
    endpoint: String,
    host: String,
    key: String,
    key_location: String,
}

impl IndexNowNotifier {
    pub fn new(
        host: impl Into<String>,
        key: impl Into<String>,
        key_location: impl Into<String>,
    ) -> Self {
        Self {
            client: http_client(),
            endpoint: INDEXNOW_ENDPOINT.to_string(),
            host: host.into(),
            key: key.into(),
            key_location: key_location.into(),
        }
    }

    /// Point the notifier at another IndexNow-compatible endpoint
    pub fn endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }
}

#[async_trait]
impl Notifier for IndexNowNotifier {
    fn name(&self) -> &str {
        "indexnow"
    }

    #[instrument(skip(self, urls), fields(count = urls.len()))]
    async fn notify(&self, _site_url: &str, urls: &[String]) -> Outcome {
        let request = self
            .client
            .post(&self.endpoint)
            .header("Content-Type", "application/json; charset=utf-8")
            .json(&Submission {
                host: &self.host,
                key: &self.key,
                key_location: &self.key_location,
                url_list: urls,
            });
        match send(request).await {
            // 202 means the key is still being validated
            Ok((200 | 202, _)) => Outcome::Success,
            Ok((429, _)) => Outcome::QuotaExceeded,
            Ok((code, body)) => Outcome::Failed {
                code: Some(code),
                message: body,
            },
            Err(outcome) => outcome,
        }
    }
}
