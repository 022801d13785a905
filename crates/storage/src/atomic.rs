//! Temp-file-and-rename writes shared by both stores

use std::io;
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;
use uuid::Uuid;

/// Returns true for the hidden temporary names produced by [`write_atomic`]
pub(crate) fn is_temp_name(name: &str) -> bool {
    name.starts_with('.') && name.ends_with(".tmp")
}

fn temp_path_for(target: &Path) -> io::Result<PathBuf> {
    let dir = target.parent().ok_or_else(|| {
        io::Error::new(io::ErrorKind::InvalidInput, "target path has no parent directory")
    })?;
    let file_name = target
        .file_name()
        .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "target path has no file name"))?;

    Ok(dir.join(format!(
        ".{}.{}.tmp",
        file_name.to_string_lossy(),
        Uuid::new_v4().simple()
    )))
}

/// Writes `bytes` to a temporary sibling of `target` and renames it into place
///
/// The temporary file is removed if any step fails, so the only visible
/// outcomes are the old content or the complete new content.
pub(crate) async fn write_atomic(target: &Path, bytes: &[u8]) -> io::Result<()> {
    let temp_path = temp_path_for(target)?;

    let result = async {
        let mut file = tokio::fs::File::create(&temp_path).await?;
        file.write_all(bytes).await?;
        file.flush().await?;
        file.sync_all().await?;
        drop(file);
        tokio::fs::rename(&temp_path, target).await
    }
    .await;

    if result.is_err() {
        if let Err(e) = tokio::fs::remove_file(&temp_path).await {
            if e.kind() != io::ErrorKind::NotFound {
                log::warn!(
                    "Failed to remove temporary file {}: {}",
                    temp_path.display(),
                    e
                );
            }
        }
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_write_atomic_creates_file() {
        let dir = TempDir::new().unwrap();
        let target = dir.path().join("out.bin");

        write_atomic(&target, b"hello").await.unwrap();
        assert_eq!(tokio::fs::read(&target).await.unwrap(), b"hello");
    }

    #[tokio::test]
    async fn test_write_atomic_overwrites() {
        let dir = TempDir::new().unwrap();
        let target = dir.path().join("out.bin");

        write_atomic(&target, b"first").await.unwrap();
        write_atomic(&target, b"second").await.unwrap();
        assert_eq!(tokio::fs::read(&target).await.unwrap(), b"second");
    }

    #[tokio::test]
    async fn test_write_atomic_leaves_no_temp_files() {
        let dir = TempDir::new().unwrap();
        let target = dir.path().join("out.bin");
        write_atomic(&target, b"data").await.unwrap();

        let names: Vec<String> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["out.bin".to_string()]);
    }

    #[tokio::test]
    async fn test_write_atomic_missing_directory_fails_cleanly() {
        let dir = TempDir::new().unwrap();
        let target = dir.path().join("missing").join("out.bin");

        assert!(write_atomic(&target, b"data").await.is_err());
        assert!(!target.exists());
    }

    #[test]
    fn test_temp_name_detection() {
        assert!(is_temp_name(".1_page1.jpg.abc.tmp"));
        assert!(!is_temp_name("1_page1.jpg"));
    }
}
