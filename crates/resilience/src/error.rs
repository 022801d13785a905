//! Error types for resilience operations

use thiserror::Error;

/// Result type for resilience operations
pub type ResilienceResult<T> = Result<T, ResilienceError>;

/// Errors that can occur in resilience operations
#[derive(Debug, Error, PartialEq)]
pub enum ResilienceError {
    /// Policy parameters are unusable
    #[error("Invalid retry policy: {0}")]
    InvalidPolicy(String),
}
