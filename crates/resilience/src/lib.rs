//! Resilience patterns for calls to remote services
//!
//! Retry with exponential backoff, driven by the tokio timer. The caller
//! decides which errors are worth another attempt.
//!
//! # Example
//!
//! ```rust
//! use storysnaps_resilience::RetryPolicy;
//! use std::time::Duration;
//!
//! let policy = RetryPolicy::new(3)
//!     .with_initial_delay(Duration::from_millis(100));
//! assert_eq!(policy.max_attempts(), 3);
//! ```

mod error;
mod retry;

pub use error::{ResilienceError, ResilienceResult};
pub use retry::{retry_async, RetryPolicy};
