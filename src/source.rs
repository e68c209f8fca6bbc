//! # Source-Control Module
//!
//! This module abstracts the repository that stores the site. The pipeline
//! only needs three capabilities: read a file with its content hash, create a
//! file, and update a file given the hash it was read at.
//!
//! ## Key Components
//!
//! - `SourceControl`: Capability trait injected into the pipeline
//! - `RemoteFile`: Explicit found/not-found result of a read
//! - `GitHubClient`: Implementation against the GitHub contents API
//! - `SourceError`: Conflicts, auth failures and API errors

mod error;
mod github;
#[cfg(test)]
pub(crate) mod memory;

pub use error::SourceError;
pub use github::GitHubClient;

use async_trait::async_trait;

/// Result of reading a repository path
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemoteFile {
    /// The file exists; `sha` must accompany any update
    Found { content: String, sha: String },
    /// Nothing at this path on the configured branch
    NotFound,
}

/// A thing that can read and write repository paths on one branch
#[async_trait]
pub trait SourceControl: Send + Sync {
    /// Read the file at `path`
    async fn read(&self, path: &str) -> Result<RemoteFile, SourceError>;

    /// Create a file that does not exist yet
    async fn create(&self, path: &str, content: &str, message: &str) -> Result<(), SourceError>;

    /// Replace a file, failing with `SourceError::Conflict` if `sha` is stale
    async fn update(
        &self,
        path: &str,
        content: &str,
        message: &str,
        sha: &str,
    ) -> Result<(), SourceError>;
}
