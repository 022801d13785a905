//! Image blob storage
//!
//! One file per page, addressed by a caller-supplied name inside a single
//! managed directory. Payloads arrive base64-encoded (straight from the
//! camera) and are decoded before they hit the disk.

use crate::atomic::{is_temp_name, write_atomic};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use std::io;
use std::path::{Path, PathBuf};
use storysnaps_core::{StoreError, StoreResult, StoryId};

/// File name for the page that will sit at `ordinal` (1-based) once appended
pub fn page_blob_name(story_id: &StoryId, ordinal: usize) -> String {
    format!("{}_page{}.jpg", story_id, ordinal)
}

/// Stores page images as individual files under one directory
#[derive(Debug, Clone)]
pub struct BlobStore {
    dir: PathBuf,
}

impl BlobStore {
    /// Creates a blob store rooted at `dir`
    ///
    /// Nothing is touched on disk until [`BlobStore::ensure_ready`] or a write.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Returns the managed directory
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Creates the managed directory and any missing parents
    ///
    /// Idempotent. Fails with `StorageUnavailable` if the directory cannot be
    /// created or the path is occupied by something that is not a directory.
    pub async fn ensure_ready(&self) -> StoreResult<()> {
        let unavailable = |source: io::Error| StoreError::StorageUnavailable {
            path: self.dir.clone(),
            source,
        };

        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(unavailable)?;

        let metadata = tokio::fs::metadata(&self.dir).await.map_err(unavailable)?;
        if !metadata.is_dir() {
            return Err(unavailable(io::Error::new(
                io::ErrorKind::Other,
                "blob path exists but is not a directory",
            )));
        }

        Ok(())
    }

    /// Resolves the full path for a blob name
    pub fn path_for(&self, name: &str) -> StoreResult<PathBuf> {
        validate_name(name)?;
        Ok(self.dir.join(name))
    }

    /// Maps an image path from the catalog back to a blob name
    ///
    /// Only the file name is compared. The same directory can be spelled
    /// many ways (symlinks, `..`, relative roots), so a catalog written
    /// under one spelling must still claim its blobs under another.
    pub fn name_of(&self, image_path: &str) -> Option<String> {
        let name = Path::new(image_path).file_name()?.to_str()?;
        validate_name(name).ok()?;
        Some(name.to_string())
    }

    /// Decodes a base64 payload and writes it under `name`
    ///
    /// Overwrites silently if `name` already exists. Returns the full path
    /// to store in the catalog. Invalid base64 is rejected before any write.
    pub async fn write_blob(&self, name: &str, base64_payload: &str) -> StoreResult<String> {
        let bytes = STANDARD
            .decode(base64_payload.trim())
            .map_err(|e| StoreError::InvalidPayload {
                reason: e.to_string(),
            })?;

        self.write_bytes(name, &bytes).await
    }

    /// Writes raw bytes under `name`, returning the full path
    pub async fn write_bytes(&self, name: &str, bytes: &[u8]) -> StoreResult<String> {
        let path = self.path_for(name)?;

        write_atomic(&path, bytes)
            .await
            .map_err(|source| StoreError::WriteError {
                path: path.clone(),
                source,
            })?;

        log::debug!("Blob written: {} ({} bytes)", path.display(), bytes.len());
        Ok(path.to_string_lossy().into_owned())
    }

    /// Returns true if a blob named `name` exists
    pub async fn exists(&self, name: &str) -> StoreResult<bool> {
        let path = self.path_for(name)?;
        tokio::fs::try_exists(&path)
            .await
            .map_err(|source| StoreError::ReadError { path, source })
    }

    /// Reads the decoded bytes of a blob
    pub async fn read_blob(&self, name: &str) -> StoreResult<Vec<u8>> {
        let path = self.path_for(name)?;
        tokio::fs::read(&path)
            .await
            .map_err(|source| StoreError::ReadError { path, source })
    }

    /// Lists blob names in the managed directory, sorted
    ///
    /// In-flight temporary files are skipped. A missing directory lists as
    /// empty.
    pub async fn list_blobs(&self) -> StoreResult<Vec<String>> {
        let read_error = |source: io::Error| StoreError::ReadError {
            path: self.dir.clone(),
            source,
        };

        let mut entries = match tokio::fs::read_dir(&self.dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(read_error(e)),
        };

        let mut names = Vec::new();
        while let Some(entry) = entries.next_entry().await.map_err(read_error)? {
            let file_type = entry.file_type().await.map_err(read_error)?;
            if !file_type.is_file() {
                continue;
            }
            if let Some(name) = entry.file_name().to_str() {
                if !is_temp_name(name) {
                    names.push(name.to_string());
                }
            }
        }

        names.sort();
        Ok(names)
    }

    /// Deletes a blob. Returns `true` if it existed.
    pub async fn remove_blob(&self, name: &str) -> StoreResult<bool> {
        let path = self.path_for(name)?;
        match tokio::fs::remove_file(&path).await {
            Ok(()) => {
                log::debug!("Blob removed: {}", path.display());
                Ok(true)
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(source) => Err(StoreError::WriteError { path, source }),
        }
    }
}

/// Rejects names that would leave the managed directory or collide with
/// temporary files
fn validate_name(name: &str) -> StoreResult<()> {
    let invalid = name.is_empty()
        || name.starts_with('.')
        || name.contains('/')
        || name.contains('\\')
        || name.contains('\0');

    if invalid {
        Err(StoreError::InvalidBlobName {
            name: name.to_string(),
        })
    } else {
        Ok(())
    }
}
