//! StorySnaps domain types and error taxonomy
//!
//! Shared by the storage, library and CLI crates. Nothing in here touches
//! the filesystem.

pub mod error;
pub mod types;

// Re-export commonly used types
pub use error::{ErrorSeverity, RecoveryAction, StoreError, StoreResult};
pub use types::{DeleteOutcome, Page, Story, StoryId, StoryState, Validator, DEFAULT_TITLE};
