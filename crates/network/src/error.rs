//! Error types for network operations

use thiserror::Error;

/// Result type for network operations
pub type NetworkResult<T> = Result<T, NetworkError>;

/// Errors that can occur while talking to the generator
#[derive(Debug, Error)]
pub enum NetworkError {
    /// Transport failure, timeout or undecodable body
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The generator answered with a non-success status
    #[error("Generator returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    /// The generator answered but produced no story text
    #[error("Generator returned no story")]
    EmptyStory,

    /// Endpoint is not an http(s) URL
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// Retry policy could not be built
    #[error("Resilience error: {0}")]
    Resilience(#[from] storysnaps_resilience::ResilienceError),
}

impl NetworkError {
    /// Returns true if another attempt may succeed
    ///
    /// Server errors and transport failures are retried; client errors and
    /// malformed responses are not.
    pub fn is_retryable(&self) -> bool {
        match self {
            NetworkError::Http(e) => e.is_timeout() || e.is_connect() || e.is_request(),
            NetworkError::Status { .. } => self.is_server_error(),
            _ => false,
        }
    }

    /// Returns true if the error is a client error (4xx)
    pub fn is_client_error(&self) -> bool {
        match self {
            NetworkError::Status { status, .. } => (400..500).contains(status),
            NetworkError::Http(e) => e.status().is_some_and(|s| s.is_client_error()),
            _ => false,
        }
    }

    /// Returns true if the error is a server error (5xx)
    pub fn is_server_error(&self) -> bool {
        match self {
            NetworkError::Status { status, .. } => (500..600).contains(status),
            NetworkError::Http(e) => e.status().is_some_and(|s| s.is_server_error()),
            _ => false,
        }
    }
}
