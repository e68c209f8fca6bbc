//! Error types for the sitemeta crate

use thiserror::Error;

use crate::config::ConfigError;
use crate::generate::GenerateError;
use crate::sitemap::SitemapError;
use crate::source::SourceError;

/// Result type for sitemeta operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for sitemeta operations
#[derive(Debug, Error)]
pub enum Error {
    /// Required configuration is missing or malformed
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Source-control read or write failed
    #[error(transparent)]
    Source(#[from] SourceError),

    /// Content generation failed
    #[error(transparent)]
    Generate(#[from] GenerateError),

    /// Sitemap serialization failed
    #[error(transparent)]
    Sitemap(#[from] SitemapError),

    /// The page to edit does not exist on the branch
    #[error("page not found: {0}")]
    PageNotFound(String),

    /// HTTP client error
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Reading the edit plan from disk failed
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Other errors
    #[error("{0}")]
    Other(String),
}
