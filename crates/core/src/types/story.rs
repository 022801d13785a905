//! Story and page domain models

use crate::types::Validator;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Title given to every freshly created story
pub const DEFAULT_TITLE: &str = "New Story";

const MAX_TITLE_LEN: usize = 200;

/// Identifier of a story inside the catalog
///
/// Serialized as a bare JSON string. Ids handed out by the service are
/// decimal numbers, but a hand-edited catalog may contain anything.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StoryId(String);

impl StoryId {
    /// Wraps an arbitrary id string
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Creates the id for a numeric slot
    pub fn from_number(n: u64) -> Self {
        Self(n.to_string())
    }

    /// Returns the numeric value if this id is a positive decimal integer
    pub fn as_number(&self) -> Option<u64> {
        let digits_only = !self.0.is_empty() && self.0.bytes().all(|b| b.is_ascii_digit());
        if !digits_only || self.0.starts_with('0') {
            return None;
        }
        self.0.parse::<u64>().ok()
    }

    /// Returns the id as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for StoryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(&self.0)
    }
}

impl From<&str> for StoryId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for StoryId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// One page of a story: caption text plus a reference to its image blob
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page {
    pub text: String,
    pub image_path: String,
}

impl Page {
    pub fn new(text: impl Into<String>, image_path: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            image_path: image_path.into(),
        }
    }
}

/// Lifecycle state of a story, derived from its data
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoryState {
    /// No pages yet
    Empty,
    /// At least one page and not finished
    InProgress,
    /// Marked finished; terminal by convention
    Finished,
}

impl fmt::Display for StoryState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => write!(f, "Empty"),
            Self::InProgress => write!(f, "In progress"),
            Self::Finished => write!(f, "Finished"),
        }
    }
}

/// An illustrated story as stored in the catalog
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Story {
    pub id: StoryId,
    pub title: String,
    pub is_finished: bool,
    #[serde(default)]
    pub pages: Vec<Page>,
}

impl Story {
    /// Creates an empty, unfinished story with the default title
    pub fn new(id: StoryId) -> Self {
        Self {
            id,
            title: DEFAULT_TITLE.to_string(),
            is_finished: false,
            pages: Vec::new(),
        }
    }

    /// Returns the lifecycle state of this story
    pub fn state(&self) -> StoryState {
        if self.is_finished {
            StoryState::Finished
        } else if self.pages.is_empty() {
            StoryState::Empty
        } else {
            StoryState::InProgress
        }
    }

    /// 1-based position the next appended page will occupy
    pub fn next_page_ordinal(&self) -> usize {
        self.pages.len() + 1
    }

    /// Returns the most recently appended page
    pub fn last_page(&self) -> Option<&Page> {
        self.pages.last()
    }

    /// All page texts in reading order, separated by a blank line
    ///
    /// This is what the generation service receives as `previous_stories`.
    pub fn transcript(&self) -> String {
        self.pages
            .iter()
            .map(|p| p.text.trim())
            .filter(|t| !t.is_empty())
            .collect::<Vec<_>>()
            .join("\n\n")
    }

    /// Returns true if any page references the given image path
    pub fn references(&self, image_path: &str) -> bool {
        self.pages.iter().any(|p| p.image_path == image_path)
    }
}

impl Validator for Story {
    fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();

        if self.id.as_str().trim().is_empty() {
            errors.push("Story id cannot be empty".to_string());
        }

        if self.title.chars().count() > MAX_TITLE_LEN {
            errors.push(format!("Title cannot exceed {} characters", MAX_TITLE_LEN));
        }

        for (index, page) in self.pages.iter().enumerate() {
            if page.image_path.trim().is_empty() {
                errors.push(format!("Page {} has no image path", index + 1));
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn story_with_pages(n: usize) -> Story {
        let mut story = Story::new(StoryId::from_number(1));
        for i in 1..=n {
            story.pages.push(Page::new(
                format!("Page {} text", i),
                format!("/data/SS_Images/1_page{}.jpg", i),
            ));
        }
        story
    }

    #[test]
    fn test_new_story_defaults() {
        let story = Story::new(StoryId::from_number(1));
        assert_eq!(story.id.as_str(), "1");
        assert_eq!(story.title, "New Story");
        assert!(!story.is_finished);
        assert!(story.pages.is_empty());
    }

    #[test]
    fn test_story_id_numeric() {
        assert_eq!(StoryId::from_number(42).as_number(), Some(42));
        assert_eq!(StoryId::new("abc").as_number(), None);
        assert_eq!(StoryId::new("0").as_number(), None);
        assert_eq!(StoryId::new("007").as_number(), None);
        assert_eq!(StoryId::new("+5").as_number(), None);
        assert_eq!(StoryId::new("").as_number(), None);
    }

    #[test]
    fn test_state_transitions() {
        let mut story = story_with_pages(0);
        assert_eq!(story.state(), StoryState::Empty);

        story = story_with_pages(2);
        assert_eq!(story.state(), StoryState::InProgress);

        story.is_finished = true;
        assert_eq!(story.state(), StoryState::Finished);
    }

    #[test]
    fn test_finished_without_pages_is_finished() {
        let mut story = story_with_pages(0);
        story.is_finished = true;
        assert_eq!(story.state(), StoryState::Finished);
    }

    #[test]
    fn test_next_page_ordinal() {
        assert_eq!(story_with_pages(0).next_page_ordinal(), 1);
        assert_eq!(story_with_pages(3).next_page_ordinal(), 4);
    }

    #[test]
    fn test_transcript_joins_pages() {
        let story = story_with_pages(2);
        assert_eq!(story.transcript(), "Page 1 text\n\nPage 2 text");
        assert_eq!(story_with_pages(0).transcript(), "");
    }

    #[test]
    fn test_json_shape_matches_catalog_format() {
        let story = story_with_pages(1);
        let json = serde_json::to_value(&story).unwrap();

        assert_eq!(json["id"], "1");
        assert_eq!(json["title"], "New Story");
        assert_eq!(json["isFinished"], false);
        assert_eq!(json["pages"][0]["text"], "Page 1 text");
        assert_eq!(json["pages"][0]["imagePath"], "/data/SS_Images/1_page1.jpg");
    }

    #[test]
    fn test_deserialize_tolerates_extra_page_fields() {
        let raw = r#"{"id":"2","title":"T","isFinished":true,
            "pages":[{"pageNum":1,"text":"a","imagePath":"p.jpg"}]}"#;
        let story: Story = serde_json::from_str(raw).unwrap();
        assert_eq!(story.pages.len(), 1);
        assert!(story.references("p.jpg"));
    }

    #[test]
    fn test_story_validation() {
        let mut story = story_with_pages(1);
        assert!(story.is_valid());

        story.title = "x".repeat(201);
        story.pages[0].image_path = String::new();
        let errors = story.validate().unwrap_err();
        assert_eq!(errors.len(), 2);
    }
}
