//! # Recrawl Notifier Module
//!
//! Tells search engines that URLs changed. Every notifier is best-effort: it
//! reports an `Outcome` and never returns an error, so a refused submission
//! cannot undo or interrupt publishing.
//!
//! ## Key Components
//!
//! - `Notifier`: Capability trait for one submission endpoint
//! - `Outcome`: Success, quota exceeded, or failure with status and message
//! - `BingNotifier`: Bing Webmaster `SubmitUrlBatch`
//! - `GooglePing`: Sitemap ping by GET
//! - `IndexNowNotifier`: IndexNow JSON submission
//! - `notify_all`: Runs each notifier in turn and logs the outcome

mod bing;
mod google;
mod indexnow;

pub use bing::BingNotifier;
pub use google::GooglePing;
pub use indexnow::IndexNowNotifier;

use async_trait::async_trait;
use reqwest::{Client as ReqwestClient, RequestBuilder};
use serde::Serialize;
use std::time::Duration;
use tracing::{error, info, warn};

use crate::config::SiteConfig;

/// Default timeout for submission requests in seconds
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Result of one submission
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Outcome {
    Success,
    QuotaExceeded,
    Failed {
        /// HTTP status, absent when the request never completed
        code: Option<u16>,
        message: String,
    },
}

/// A thing that can submit a URL batch to a search engine
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Name used in logs and reports
    fn name(&self) -> &str;

    /// Submit `urls` belonging to `site_url`
    async fn notify(&self, site_url: &str, urls: &[String]) -> Outcome;
}

/// Build the notifiers enabled by the configuration
pub fn notifiers_from_config(config: &SiteConfig) -> Vec<Box<dyn Notifier>> {
    let mut notifiers: Vec<Box<dyn Notifier>> = Vec::new();
    if let Some(key) = &config.bing_api_key {
        notifiers.push(Box::new(BingNotifier::new(key)));
    }
    if config.google_ping {
        notifiers.push(Box::new(GooglePing::new(config.sitemap_url())));
    }
    if let Some(indexnow) = &config.indexnow {
        let key_location = indexnow
            .key_location
            .clone()
            .unwrap_or_else(|| config.url_for(&format!("{}.txt", indexnow.key)));
        notifiers.push(Box::new(IndexNowNotifier::new(
            config.host(),
            &indexnow.key,
            key_location,
        )));
    }
    notifiers
}

/// Outcome of one notifier in a run
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notification {
    pub endpoint: String,

    #[serde(flatten)]
    pub outcome: Outcome,
}

/// Run every notifier once and collect named outcomes
///
/// A failing notifier does not stop the ones after it.
pub async fn notify_all(
    notifiers: &[Box<dyn Notifier>],
    site_url: &str,
    urls: &[String],
) -> Vec<Notification> {
    let mut outcomes = Vec::with_capacity(notifiers.len());
    for notifier in notifiers {
        let outcome = notifier.notify(site_url, urls).await;
        match &outcome {
            Outcome::Success => info!("Submitted {} URLs to {}", urls.len(), notifier.name()),
            Outcome::QuotaExceeded => warn!("{} quota exceeded, submission skipped", notifier.name()),
            Outcome::Failed { code, message } => error!(
                "{} submission failed: {} {}",
                notifier.name(),
                code.map(|c| c.to_string()).unwrap_or_else(|| "-".to_string()),
                message
            ),
        }
        outcomes.push(Notification {
            endpoint: notifier.name().to_string(),
            outcome,
        });
    }
    outcomes
}

fn http_client() -> ReqwestClient {
    ReqwestClient::builder()
        .timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
        .build()
        .unwrap_or_default()
}

/// Send a request and return its status and body, or a transport failure outcome
async fn send(request: RequestBuilder) -> Result<(u16, String), Outcome> {
    let response = request.send().await.map_err(|e| Outcome::Failed {
        code: None,
        message: e.to_string(),
    })?;
    let status = response.status().as_u16();
    let body = response.text().await.unwrap_or_default();
    Ok((status, body))
}
