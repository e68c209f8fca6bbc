//! Error types for the source module

use thiserror::Error;

/// Error type for source-control operations
#[derive(Debug, Error)]
pub enum SourceError {
    /// HTTP client error
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The remote file changed between read and write, or already exists on create
    #[error("Conflict writing {path}: {message}")]
    Conflict {
        /// Repository path
        path: String,
        /// Message returned by the remote
        message: String,
    },

    /// Authentication error
    #[error("Authentication error: {0}")]
    Auth(String),

    /// API returned an error response
    #[error("API error: {status_code} - {message}")]
    Api {
        /// HTTP status code
        status_code: u16,
        /// Error message
        message: String,
    },

    /// Unexpected response format
    #[error("Unexpected response format: {0}")]
    UnexpectedResponse(String),

    /// File content could not be decoded as UTF-8 text
    #[error("Decode error: {0}")]
    Decode(String),

    /// URL parsing error
    #[error("URL parsing error: {0}")]
    UrlParse(#[from] url::ParseError),
}
