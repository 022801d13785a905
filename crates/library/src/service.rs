//! Story service
//!
//! Every mutating operation runs load-modify-save under the catalog lock,
//! then publishes a change notification once the lock is released. The
//! notification is published whether or not the operation succeeded.

use crate::ids::next_story_id;
use crate::notifier::{ChangeNotifier, StoryEvent};
use log::{debug, info, warn};
use std::collections::HashSet;
use std::sync::Arc;
use storysnaps_core::{DeleteOutcome, Page, StoreError, StoreResult, Story, StoryId, Validator};
use storysnaps_storage::{page_blob_name, BlobStore, CatalogStore, StorageLayout};
use tokio::sync::Mutex;

/// High-level story management
pub struct StoryService {
    catalog: CatalogStore,
    blobs: BlobStore,
    notifier: Arc<ChangeNotifier>,
    // Held from before load until after save
    write_lock: Mutex<()>,
}

impl StoryService {
    /// Creates a service over existing stores with a fresh notifier
    pub fn new(catalog: CatalogStore, blobs: BlobStore) -> Self {
        Self {
            catalog,
            blobs,
            notifier: Arc::new(ChangeNotifier::new()),
            write_lock: Mutex::new(()),
        }
    }

    /// Replaces the notifier, e.g. to share one between services
    pub fn with_notifier(mut self, notifier: Arc<ChangeNotifier>) -> Self {
        self.notifier = notifier;
        self
    }

    /// Opens the service for a storage layout, creating the image directory
    pub async fn open(layout: &StorageLayout) -> StoreResult<Self> {
        info!("Opening story store at {}", layout.root().display());
        let service = Self::new(layout.catalog_store(), layout.blob_store());
        service.blobs.ensure_ready().await?;
        Ok(service)
    }

    pub fn notifier(&self) -> &Arc<ChangeNotifier> {
        &self.notifier
    }

    pub fn catalog(&self) -> &CatalogStore {
        &self.catalog
    }

    pub fn blobs(&self) -> &BlobStore {
        &self.blobs
    }

    /// Creates an empty story with a fresh id
    ///
    /// A corrupt catalog is preserved aside and replaced by one holding only
    /// the new story.
    pub async fn create_story(&self) -> StoreResult<Story> {
        let result = self.create_story_locked().await;
        self.notify(&result, |_| StoryEvent::CatalogChanged);
        result
    }

    async fn create_story_locked(&self) -> StoreResult<Story> {
        let _guard = self.write_lock.lock().await;

        let loaded = self.catalog.load_or_recover().await?;
        let mut stories = loaded.stories;

        let story = Story::new(next_story_id(&stories));
        stories.push(story.clone());
        self.catalog.save(&stories).await?;

        info!("Created story {}", story.id);
        Ok(story)
    }

    /// Stores the page image and appends a page to the story
    ///
    /// If the catalog write fails after the image was stored, the image is
    /// left behind as an orphan; see [`StoryService::prune_orphaned_blobs`].
    pub async fn add_page(
        &self,
        story_id: &StoryId,
        text: &str,
        image_base64: &str,
    ) -> StoreResult<Story> {
        let result = self.add_page_locked(story_id, text, image_base64).await;
        self.notify(&result, |_| StoryEvent::CatalogChanged);
        result
    }

    async fn add_page_locked(
        &self,
        story_id: &StoryId,
        text: &str,
        image_base64: &str,
    ) -> StoreResult<Story> {
        let _guard = self.write_lock.lock().await;

        let mut stories = self.catalog.load().await?;
        let index = position_of(&stories, story_id)?;

        if stories[index].is_finished {
            warn!("Adding a page to finished story {}", story_id);
        }

        let name = page_blob_name(story_id, stories[index].next_page_ordinal());
        self.blobs.ensure_ready().await?;
        let image_path = self.blobs.write_blob(&name, image_base64).await?;

        stories[index].pages.push(Page::new(text, image_path));
        let updated = stories[index].clone();

        if let Err(e) = self.catalog.save(&stories).await {
            warn!(
                "Catalog write failed after storing {}; the image is orphaned",
                name
            );
            return Err(e);
        }

        info!(
            "Added page {} to story {}",
            updated.pages.len(),
            updated.id
        );
        Ok(updated)
    }

    /// Replaces a story's title
    pub async fn rename_story(&self, story_id: &StoryId, title: &str) -> StoreResult<Story> {
        let title = title.to_string();
        let result = self
            .update_story(story_id, move |story| story.title = title)
            .await;
        self.notify(&result, |story| StoryEvent::StoryChanged(story.clone()));
        result
    }

    /// Marks a story finished
    pub async fn finish_story(&self, story_id: &StoryId) -> StoreResult<Story> {
        let result = self
            .update_story(story_id, |story| story.is_finished = true)
            .await;
        self.notify(&result, |story| StoryEvent::StoryChanged(story.clone()));
        result
    }

    async fn update_story<F>(&self, story_id: &StoryId, apply: F) -> StoreResult<Story>
    where
        F: FnOnce(&mut Story),
    {
        let _guard = self.write_lock.lock().await;

        let mut stories = self.catalog.load().await?;
        let index = position_of(&stories, story_id)?;

        let mut updated = stories[index].clone();
        apply(&mut updated);
        if let Err(errors) = updated.validate() {
            return Err(StoreError::InvalidPayload {
                reason: errors.join("; "),
            });
        }

        stories[index] = updated.clone();
        self.catalog.save(&stories).await?;

        info!("Updated story {}", story_id);
        Ok(updated)
    }

    /// Removes a story from the catalog
    ///
    /// An absent id is reported in the outcome, not as an error, and leaves
    /// the document untouched. Page images are not deleted.
    pub async fn delete_story(&self, story_id: &StoryId) -> StoreResult<DeleteOutcome> {
        let result = self.delete_story_locked(story_id).await;
        self.notify(&result, |_| StoryEvent::CatalogChanged);
        result
    }

    async fn delete_story_locked(&self, story_id: &StoryId) -> StoreResult<DeleteOutcome> {
        let _guard = self.write_lock.lock().await;

        let mut stories = self.catalog.load().await?;
        let Some(index) = stories.iter().position(|s| &s.id == story_id) else {
            debug!("Delete requested for missing story {}", story_id);
            return Ok(DeleteOutcome::not_found(story_id));
        };

        stories.remove(index);
        self.catalog.save(&stories).await?;

        info!("Deleted story {}", story_id);
        Ok(DeleteOutcome::deleted(story_id))
    }

    /// Returns every story in catalog order
    ///
    /// A corrupt catalog is reported as `CorruptCatalog`, never hidden.
    pub async fn list_stories(&self) -> StoreResult<Vec<Story>> {
        self.catalog.load().await
    }

    /// Returns one story
    pub async fn get_story(&self, story_id: &StoryId) -> StoreResult<Story> {
        let stories = self.catalog.load().await?;
        let index = position_of(&stories, story_id)?;
        Ok(stories[index].clone())
    }

    /// Deletes stored images that no page references, returning their names
    ///
    /// The catalog is held locked for the whole pass so a concurrent
    /// `add_page` cannot have its fresh image removed.
    pub async fn prune_orphaned_blobs(&self) -> StoreResult<Vec<String>> {
        let _guard = self.write_lock.lock().await;

        let stories = self.catalog.load().await?;
        let referenced: HashSet<String> = stories
            .iter()
            .flat_map(|s| s.pages.iter())
            .filter_map(|p| self.blobs.name_of(&p.image_path))
            .collect();

        let mut removed = Vec::new();
        for name in self.blobs.list_blobs().await? {
            if referenced.contains(&name) {
                continue;
            }
            if self.blobs.remove_blob(&name).await? {
                removed.push(name);
            }
        }

        if !removed.is_empty() {
            info!("Pruned {} orphaned images", removed.len());
        }
        Ok(removed)
    }

    fn notify<T>(&self, result: &StoreResult<T>, on_success: impl FnOnce(&T) -> StoryEvent) {
        let event = match result {
            Ok(value) => on_success(value),
            Err(e) => {
                warn!("Story operation failed: {}", e);
                StoryEvent::CatalogChanged
            }
        };
        self.notifier.publish(&event);
    }
}

impl std::fmt::Debug for StoryService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StoryService")
            .field("catalog", &self.catalog)
            .field("blobs", &self.blobs)
            .field("notifier", &self.notifier)
            .finish()
    }
}

fn position_of(stories: &[Story], story_id: &StoryId) -> StoreResult<usize> {
    stories
        .iter()
        .position(|s| &s.id == story_id)
        .ok_or_else(|| StoreError::not_found(story_id))
}
