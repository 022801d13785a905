//! On-disk layout of the app-private data directory

use crate::{BlobStore, CatalogStore};
use std::path::{Path, PathBuf};

/// Default catalog document name
pub const DEFAULT_CATALOG_FILE: &str = "stories.json";

/// Default image directory name
pub const DEFAULT_IMAGES_DIR: &str = "SS_Images";

/// Resolves where the catalog and the image blobs live
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageLayout {
    root: PathBuf,
    catalog_file: String,
    images_dir: String,
}

impl StorageLayout {
    /// Creates the default layout under `root`
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            catalog_file: DEFAULT_CATALOG_FILE.to_string(),
            images_dir: DEFAULT_IMAGES_DIR.to_string(),
        }
    }

    /// Overrides the catalog document name
    pub fn with_catalog_file(mut self, name: impl Into<String>) -> Self {
        self.catalog_file = name.into();
        self
    }

    /// Overrides the image directory name
    pub fn with_images_dir(mut self, name: impl Into<String>) -> Self {
        self.images_dir = name.into();
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn catalog_path(&self) -> PathBuf {
        self.root.join(&self.catalog_file)
    }

    pub fn images_dir(&self) -> PathBuf {
        self.root.join(&self.images_dir)
    }

    pub fn catalog_store(&self) -> CatalogStore {
        CatalogStore::new(self.catalog_path())
    }

    pub fn blob_store(&self) -> BlobStore {
        BlobStore::new(self.images_dir())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_layout() {
        let layout = StorageLayout::new("/data/app");
        assert_eq!(layout.catalog_path(), PathBuf::from("/data/app/stories.json"));
        assert_eq!(layout.images_dir(), PathBuf::from("/data/app/SS_Images"));
    }

    #[test]
    fn test_custom_names() {
        let layout = StorageLayout::new("/data")
            .with_catalog_file("catalog.json")
            .with_images_dir("images");
        assert_eq!(layout.catalog_store().path(), Path::new("/data/catalog.json"));
        assert_eq!(layout.blob_store().dir(), Path::new("/data/images"));
    }
}
