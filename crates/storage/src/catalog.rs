//! Catalog document persistence
//!
//! The catalog is a single JSON array of stories at a fixed path. Every
//! mutation reloads the full document, changes it in memory and writes the
//! full document back. There is no locking or versioning at this layer:
//! two overlapping load/save sequences lose the first writer's update.
//! The story service serializes access; this type does not.

use crate::atomic::write_atomic;
use std::collections::HashSet;
use std::io;
use std::path::{Path, PathBuf};
use storysnaps_core::{StoreError, StoreResult, Story};

/// Result of a load that is allowed to recover from a corrupt document
#[derive(Debug, Clone, PartialEq)]
pub struct CatalogLoad {
    /// Stories read from disk, or empty after recovery
    pub stories: Vec<Story>,
    /// Where the corrupt document was preserved, if recovery happened
    pub quarantined: Option<PathBuf>,
}

impl CatalogLoad {
    /// Returns true if the document was corrupt and has been set aside
    pub fn recovered(&self) -> bool {
        self.quarantined.is_some()
    }
}

/// Reads and writes the catalog document
#[derive(Debug, Clone)]
pub struct CatalogStore {
    path: PathBuf,
}

impl CatalogStore {
    /// Creates a catalog store for the document at `path`
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Returns the document path
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns true if the document exists on disk
    pub async fn exists(&self) -> StoreResult<bool> {
        tokio::fs::try_exists(&self.path)
            .await
            .map_err(|source| StoreError::ReadError {
                path: self.path.clone(),
                source,
            })
    }

    /// Loads every story in catalog order
    ///
    /// An absent document is the first-run state and loads as empty.
    /// A document that is empty or fails to parse is `CorruptCatalog`.
    pub async fn load(&self) -> StoreResult<Vec<Story>> {
        let contents = match tokio::fs::read_to_string(&self.path).await {
            Ok(contents) => contents,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                log::debug!(
                    "Catalog not found at {}, starting empty",
                    self.path.display()
                );
                return Ok(Vec::new());
            }
            Err(e) if e.kind() == io::ErrorKind::InvalidData => {
                return Err(self.corrupt(format!("document is not valid UTF-8: {}", e)));
            }
            Err(source) => {
                return Err(StoreError::ReadError {
                    path: self.path.clone(),
                    source,
                })
            }
        };

        // An empty file is damage, not a valid empty catalog
        if contents.trim().is_empty() {
            return Err(self.corrupt("document is empty or contains only whitespace"));
        }

        let stories: Vec<Story> =
            serde_json::from_str(&contents).map_err(|e| self.corrupt(e.to_string()))?;

        warn_on_duplicate_ids(&stories);
        Ok(stories)
    }

    /// Loads the catalog, setting a corrupt document aside instead of failing
    ///
    /// The corrupt document is copied next to the original as
    /// `{file}.corrupt-{timestamp}` before an empty catalog is returned, so a
    /// later save can never destroy it unseen. Other errors still propagate.
    pub async fn load_or_recover(&self) -> StoreResult<CatalogLoad> {
        match self.load().await {
            Ok(stories) => Ok(CatalogLoad {
                stories,
                quarantined: None,
            }),
            Err(StoreError::CorruptCatalog { reason, .. }) => {
                let quarantined = self.quarantine().await?;
                log::warn!(
                    "Catalog at {} is corrupt ({}); preserved as {} and starting empty",
                    self.path.display(),
                    reason,
                    quarantined.display()
                );
                Ok(CatalogLoad {
                    stories: Vec::new(),
                    quarantined: Some(quarantined),
                })
            }
            Err(e) => Err(e),
        }
    }

    /// Serializes the full catalog and replaces the document atomically
    pub async fn save(&self, stories: &[Story]) -> StoreResult<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await.map_err(|source| {
                    StoreError::StorageUnavailable {
                        path: parent.to_path_buf(),
                        source,
                    }
                })?;
            }
        }

        let json = serde_json::to_vec(stories)?;

        write_atomic(&self.path, &json)
            .await
            .map_err(|source| StoreError::WriteError {
                path: self.path.clone(),
                source,
            })?;

        log::debug!(
            "Catalog saved to {} ({} stories)",
            self.path.display(),
            stories.len()
        );
        Ok(())
    }

    /// Copies the current document to a timestamped sibling
    async fn quarantine(&self) -> StoreResult<PathBuf> {
        let timestamp = chrono::Local::now().format("%Y%m%d_%H%M%S_%3f");
        let file_name = self
            .path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "catalog".to_string());
        let target = self
            .path
            .with_file_name(format!("{}.corrupt-{}", file_name, timestamp));

        tokio::fs::copy(&self.path, &target)
            .await
            .map_err(|source| StoreError::WriteError {
                path: target.clone(),
                source,
            })?;

        Ok(target)
    }

    fn corrupt(&self, reason: impl Into<String>) -> StoreError {
        StoreError::CorruptCatalog {
            path: self.path.clone(),
            reason: reason.into(),
        }
    }
}

fn warn_on_duplicate_ids(stories: &[Story]) {
    let mut seen = HashSet::with_capacity(stories.len());
    for story in stories {
        if !seen.insert(&story.id) {
            log::warn!("Catalog contains duplicate story id {}", story.id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use storysnaps_core::{Page, StoryId};
    use tempfile::TempDir;

    fn setup_store() -> (TempDir, CatalogStore) {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let store = CatalogStore::new(temp_dir.path().join("stories.json"));
        (temp_dir, store)
    }

    fn sample_story(n: u64) -> Story {
        let mut story = Story::new(StoryId::from_number(n));
        story
            .pages
            .push(Page::new("Once upon a time...", format!("/img/{}_page1.jpg", n)));
        story
    }

    #[tokio::test]
    async fn test_load_nonexistent_returns_empty() {
        let (_temp_dir, store) = setup_store();
        assert!(store.load().await.unwrap().is_empty());
        assert!(!store.exists().await.unwrap());
    }

    #[tokio::test]
    async fn test_save_and_load_roundtrip() {
        let (_temp_dir, store) = setup_store();
        let stories = vec![sample_story(1), Story::new(StoryId::from_number(2))];

        store.save(&stories).await.unwrap();
        assert_eq!(store.load().await.unwrap(), stories);
    }

    #[tokio::test]
    async fn test_save_creates_parent_directory() {
        let temp_dir = TempDir::new().unwrap();
        let store = CatalogStore::new(temp_dir.path().join("nested").join("stories.json"));

        store.save(&[sample_story(1)]).await.unwrap();
        assert!(store.exists().await.unwrap());
    }

    #[tokio::test]
    async fn test_document_is_json_array() {
        let (_temp_dir, store) = setup_store();
        store.save(&[sample_story(1)]).await.unwrap();

        let raw = std::fs::read_to_string(store.path()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert!(value.is_array());
        assert_eq!(value[0]["isFinished"], false);
    }

    #[tokio::test]
    async fn test_invalid_json_is_corrupt() {
        let (_temp_dir, store) = setup_store();
        std::fs::write(store.path(), "{ not json").unwrap();

        let result = store.load().await;
        assert!(matches!(result, Err(StoreError::CorruptCatalog { .. })));
    }

    #[tokio::test]
    async fn test_empty_file_is_corrupt() {
        let (_temp_dir, store) = setup_store();
        std::fs::write(store.path(), "   \n").unwrap();

        let result = store.load().await;
        assert!(matches!(result, Err(StoreError::CorruptCatalog { .. })));
    }

    #[tokio::test]
    async fn test_load_or_recover_preserves_corrupt_document() {
        let (temp_dir, store) = setup_store();
        std::fs::write(store.path(), "[{\"id\": broken").unwrap();

        let loaded = store.load_or_recover().await.unwrap();
        assert!(loaded.recovered());
        assert!(loaded.stories.is_empty());

        let quarantined = loaded.quarantined.unwrap();
        assert!(quarantined.starts_with(temp_dir.path()));
        assert_eq!(
            std::fs::read_to_string(&quarantined).unwrap(),
            "[{\"id\": broken"
        );
    }

    #[tokio::test]
    async fn test_load_or_recover_passes_through_healthy_catalog() {
        let (_temp_dir, store) = setup_store();
        store.save(&[sample_story(4)]).await.unwrap();

        let loaded = store.load_or_recover().await.unwrap();
        assert!(!loaded.recovered());
        assert_eq!(loaded.stories.len(), 1);
    }
}
