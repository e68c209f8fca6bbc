//! # Publisher Module
//!
//! Writes produced documents back to the repository and fires the deployment
//! webhook once everything is committed.
//!
//! ## Key Components
//!
//! - `upsert`: Create-or-update against any `SourceControl`
//! - `UpsertAction`: Which branch of the upsert was taken
//! - `DeployHook`: Best-effort POST to a build hook
//!
//! The read and the write are two separate calls, so a concurrent writer can
//! still make the write fail with a conflict. Runs are expected to be
//! scheduled one at a time; a conflict ends the run without retrying.

use reqwest::Client as ReqwestClient;
use serde::Serialize;
use std::time::Duration;
use tracing::{info, instrument, warn};

use crate::source::{RemoteFile, SourceControl, SourceError};

/// Which write an upsert performed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum UpsertAction {
    Created,
    Updated,
}

/// Create `path` with `content`, or update it against the hash read just before
///
/// # Arguments
///
/// * `store` - The repository
/// * `path` - Repository-relative path
/// * `content` - New file content
/// * `message` - Commit message
///
/// # Returns
///
/// The action taken, or the first error from the remote
#[instrument(skip(store, content))]
pub async fn upsert(
    store: &dyn SourceControl,
    path: &str,
    content: &str,
    message: &str,
) -> Result<UpsertAction, SourceError> {
    match store.read(path).await? {
        RemoteFile::Found { sha, .. } => {
            store.update(path, content, message, &sha).await?;
            info!("Updated {}", path);
            Ok(UpsertAction::Updated)
        }
        RemoteFile::NotFound => {
            store.create(path, content, message).await?;
            info!("Created {}", path);
            Ok(UpsertAction::Created)
        }
    }
}

/// Deployment webhook, e.g. a Netlify build hook
#[derive(Clone)]
pub struct DeployHook {
    client: ReqwestClient,
    url: String,
}

impl DeployHook {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            client: ReqwestClient::builder()
                .timeout(Duration::from_secs(30))
                .build()
                .unwrap_or_default(),
            url: url.into(),
        }
    }

    /// Trigger a deployment, returning whether the hook accepted it
    ///
    /// Failures are logged and never interrupt the run.
    #[instrument(skip(self))]
    pub async fn trigger(&self) -> bool {
        match self.client.post(&self.url).send().await {
            Ok(response) if response.status().is_success() => {
                info!("Deployment triggered");
                true
            }
            Ok(response) => {
                warn!("Deploy hook returned {}", response.status());
                false
            }
            Err(e) => {
                warn!("Deploy hook failed: {}", e);
                false
            }
        }
    }
}
