//! Story id allocation
//!
//! New ids are the smallest positive integer not currently used by any
//! story. Ids of deleted stories are therefore reused.

use std::collections::HashSet;
use storysnaps_core::{Story, StoryId};

/// Returns the id the next created story should receive
///
/// Non-numeric ids in a hand-edited catalog are skipped by the search but
/// can never collide: every allocated id is a canonical decimal string.
pub fn next_story_id(stories: &[Story]) -> StoryId {
    let used: HashSet<u64> = stories.iter().filter_map(|s| s.id.as_number()).collect();

    let mut candidate = 1;
    while used.contains(&candidate) {
        candidate += 1;
    }
    StoryId::from_number(candidate)
}
