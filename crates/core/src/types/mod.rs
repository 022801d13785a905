//! Domain types for StorySnaps
//!
//! - `story`: Story, Page and the story lifecycle state
//! - `common`: Shared traits and small result types

mod common;
mod story;

pub use common::{DeleteOutcome, Validator};
pub use story::{Page, Story, StoryId, StoryState, DEFAULT_TITLE};
