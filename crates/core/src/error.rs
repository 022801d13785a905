//! Error types and recovery strategies for the story store
//!
//! Every storage failure falls into one of a small set of categories:
//! - **StorageUnavailable**: the app-private directory cannot be created or accessed
//! - **WriteError**: a blob or catalog write failed (disk full, permission denied)
//! - **CorruptCatalog**: the catalog document exists but cannot be parsed
//! - **NotFound**: a referenced story id is absent
//!
//! Each error carries a severity and a recovery action so the UI layer can
//! decide what to offer the user. The core itself never retries.

use std::fmt;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Recovery actions the UI layer can offer when an operation fails
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecoveryAction {
    /// Offer the user a retry of the same operation
    Retry,
    /// Reload the catalog and re-render; the request referenced stale state
    RefreshCatalog,
    /// Restore the catalog from a preserved copy
    RestoreBackup,
    /// No automatic recovery - user intervention required
    UserIntervention,
}

impl fmt::Display for RecoveryAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Retry => write!(f, "Retry"),
            Self::RefreshCatalog => write!(f, "Refreshing catalog"),
            Self::RestoreBackup => write!(f, "Restoring from backup"),
            Self::UserIntervention => write!(f, "User intervention required"),
        }
    }
}

/// Error severity classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    /// The operation can simply be attempted again
    Recoverable,
    /// The request was rejected but the store is intact
    Degraded,
    /// The store cannot be written until the user acts
    Fatal,
}

impl fmt::Display for ErrorSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Recoverable => write!(f, "Recoverable"),
            Self::Degraded => write!(f, "Degraded"),
            Self::Fatal => write!(f, "Fatal"),
        }
    }
}

/// Errors raised by the blob store, catalog store and story service
#[derive(Error, Debug)]
pub enum StoreError {
    /// Storage directory could not be created or accessed
    #[error("Storage unavailable at {path}: {source}")]
    StorageUnavailable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Blob or catalog write failed
    #[error("Failed to write {path}: {source}")]
    WriteError {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Blob or catalog read failed for a reason other than absence
    #[error("Failed to read {path}: {source}")]
    ReadError {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Catalog document exists but could not be parsed
    #[error("Catalog at {path} is corrupt: {reason}")]
    CorruptCatalog { path: PathBuf, reason: String },

    /// Referenced story id is not in the catalog
    #[error("Story not found: {id}")]
    NotFound { id: String },

    /// Image payload could not be decoded
    #[error("Invalid image payload: {reason}")]
    InvalidPayload { reason: String },

    /// Blob name would escape the managed directory
    #[error("Invalid blob name: '{name}'")]
    InvalidBlobName { name: String },

    /// Catalog could not be serialized
    #[error("Failed to serialize catalog: {0}")]
    Serialize(#[from] serde_json::Error),
}

impl StoreError {
    /// Returns the severity level of this error
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            Self::WriteError { .. } | Self::ReadError { .. } => ErrorSeverity::Recoverable,

            Self::NotFound { .. }
            | Self::InvalidPayload { .. }
            | Self::InvalidBlobName { .. } => ErrorSeverity::Degraded,

            Self::StorageUnavailable { .. }
            | Self::CorruptCatalog { .. }
            | Self::Serialize(_) => ErrorSeverity::Fatal,
        }
    }

    /// Returns the recommended recovery action for this error
    pub fn recovery_action(&self) -> RecoveryAction {
        match self {
            Self::WriteError { .. } | Self::ReadError { .. } => RecoveryAction::Retry,
            Self::NotFound { .. } => RecoveryAction::RefreshCatalog,
            Self::CorruptCatalog { .. } => RecoveryAction::RestoreBackup,
            _ => RecoveryAction::UserIntervention,
        }
    }

    /// Returns a user-friendly error message suitable for display in the UI
    pub fn user_message(&self) -> String {
        match self {
            Self::StorageUnavailable { .. } => {
                "Cannot access storage. Please check the app's storage permissions.".to_string()
            }
            Self::WriteError { .. } => {
                "Could not save your story. Please free up some space and try again.".to_string()
            }
            Self::ReadError { .. } => "Could not read your stories. Please try again.".to_string(),
            Self::CorruptCatalog { .. } => {
                "Your story list is damaged. A copy has been kept for recovery.".to_string()
            }
            Self::NotFound { .. } => {
                "This story no longer exists. The list will be refreshed.".to_string()
            }
            Self::InvalidPayload { .. } => "The photo could not be read.".to_string(),
            Self::InvalidBlobName { .. } | Self::Serialize(_) => {
                "An unexpected error occurred. Please try again.".to_string()
            }
        }
    }

    /// Returns true if this is the typed "story absent" failure
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Helper to create a NotFound error for a story id
    pub fn not_found(id: impl fmt::Display) -> Self {
        Self::NotFound { id: id.to_string() }
    }
}

/// Convenience type alias for Results using StoreError
pub type StoreResult<T> = std::result::Result<T, StoreError>;
