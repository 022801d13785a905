//! Overlapping mutations must not lose updates

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use std::collections::HashSet;
use std::sync::Arc;
use storysnaps_library::{StorageLayout, StoryService};
use tempfile::TempDir;

async fn setup_service() -> (TempDir, Arc<StoryService>) {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let layout = StorageLayout::new(temp_dir.path());
    let service = StoryService::open(&layout).await.expect("open service");
    (temp_dir, Arc::new(service))
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_creates_keep_every_story() {
    let (_temp_dir, service) = setup_service().await;

    let handles: Vec<_> = (0..25)
        .map(|_| {
            let service = Arc::clone(&service);
            tokio::spawn(async move { service.create_story().await })
        })
        .collect();

    let mut ids = HashSet::new();
    for handle in handles {
        let story = handle.await.expect("task panicked").expect("create failed");
        assert!(ids.insert(story.id));
    }

    let stories = service.list_stories().await.unwrap();
    assert_eq!(stories.len(), 25);
    let stored: HashSet<_> = stories.into_iter().map(|s| s.id).collect();
    assert_eq!(stored, ids);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_add_page_keeps_every_page() {
    let (_temp_dir, service) = setup_service().await;
    let story = service.create_story().await.unwrap();

    let handles: Vec<_> = (0..12)
        .map(|i| {
            let service = Arc::clone(&service);
            let id = story.id.clone();
            tokio::spawn(async move {
                let image = STANDARD.encode(format!("image {i}"));
                service.add_page(&id, &format!("page {i}"), &image).await
            })
        })
        .collect();

    for handle in handles {
        handle.await.expect("task panicked").expect("add_page failed");
    }

    let stored = service.get_story(&story.id).await.unwrap();
    assert_eq!(stored.pages.len(), 12);

    // Each page got its own image file and each file holds that page's bytes
    let paths: HashSet<_> = stored.pages.iter().map(|p| p.image_path.clone()).collect();
    assert_eq!(paths.len(), 12);
    for page in &stored.pages {
        let i = page.text.trim_start_matches("page ");
        let bytes = tokio::fs::read(&page.image_path).await.unwrap();
        assert_eq!(bytes, format!("image {i}").into_bytes());
    }
    assert_eq!(service.blobs().list_blobs().await.unwrap().len(), 12);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_mixed_operations_interleave_safely() {
    let (_temp_dir, service) = setup_service().await;
    let first = service.create_story().await.unwrap();

    let mut handles = Vec::new();
    for i in 0..8 {
        let service = Arc::clone(&service);
        let id = first.id.clone();
        handles.push(tokio::spawn(async move {
            if i % 2 == 0 {
                service.create_story().await.map(|_| ())
            } else {
                service
                    .add_page(&id, "page", &STANDARD.encode(b"img"))
                    .await
                    .map(|_| ())
            }
        }));
    }
    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    let stories = service.list_stories().await.unwrap();
    assert_eq!(stories.len(), 5);
    let first = stories.iter().find(|s| s.id == first.id).unwrap();
    assert_eq!(first.pages.len(), 4);
}
