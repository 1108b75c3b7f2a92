//! Source error types.

use thiserror::Error;

/// Result type for source operations.
pub type SourceResult<T> = Result<T, SourceError>;

/// Errors that can occur while fetching an item.
#[derive(Debug, Error)]
pub enum SourceError {
    /// HTTP request failed.
    #[error("Request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),

    /// The server answered with a non-success status.
    #[error("HTTP {status} from {url}")]
    Http { status: u16, url: String },

    /// The service reported an error in the response body.
    #[error("API error ({code}): {message}")]
    Api { code: i64, message: String },

    /// Invalid response body.
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The portal URL cannot have item paths appended to it.
    #[error("Unsupported portal URL: {0}")]
    UnsupportedPortal(String),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// Missing credentials.
    #[error("Missing credentials: {0}")]
    MissingCredentials(String),

    /// Item not available from this source.
    #[error("Item not found: {0}")]
    NotFound(String),
}

impl SourceError {
    /// Create an invalid response error.
    pub fn invalid_response(message: impl Into<String>) -> Self {
        Self::InvalidResponse(message.into())
    }

    /// Create an unsupported portal URL error.
    pub fn unsupported_portal(url: impl Into<String>) -> Self {
        Self::UnsupportedPortal(url.into())
    }

    /// Create a missing credentials error.
    pub fn missing_credentials(what: impl Into<String>) -> Self {
        Self::MissingCredentials(what.into())
    }
}
