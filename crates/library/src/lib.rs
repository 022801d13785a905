//! StorySnaps Story Library
//!
//! High-level layer the screens talk to. Composes the catalog store, the
//! blob store and an owned change notifier into the story operations:
//! create, add page, rename, finish, delete and list.
//!
//! Every mutation follows the same shape: take the catalog lock, load,
//! modify, save, release, then notify. The notification fires even when
//! the operation fails so observers always re-render from disk.

pub mod ids;
pub mod notifier;
pub mod service;

pub use ids::next_story_id;
pub use notifier::{ChangeNotifier, EventKind, StoryEvent, Subscription, SubscriptionId};
pub use service::StoryService;

// Domain types callers need alongside the service
pub use storysnaps_core::{DeleteOutcome, Page, StoreError, StoreResult, Story, StoryId};
pub use storysnaps_storage::StorageLayout;
