//! Common types and utilities shared across domain models

use crate::types::StoryId;
use serde::{Deserialize, Serialize};

/// Trait for types that can validate themselves
pub trait Validator {
    /// Validates the instance and returns errors if invalid
    fn validate(&self) -> Result<(), Vec<String>>;

    /// Returns true if the instance is valid
    fn is_valid(&self) -> bool {
        self.validate().is_ok()
    }
}

/// Result of a delete request
///
/// An absent id is reported here rather than as an error, so callers can
/// tell "nothing to delete" apart from a storage failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteOutcome {
    pub success: bool,
    pub message: String,
}

impl DeleteOutcome {
    /// Outcome for a story that was removed from the catalog
    pub fn deleted(id: &StoryId) -> Self {
        Self {
            success: true,
            message: format!("Story {} deleted", id),
        }
    }

    /// Outcome for an id that is not in the catalog
    pub fn not_found(id: &StoryId) -> Self {
        Self {
            success: false,
            message: format!("Story {} not found", id),
        }
    }
}
