//! Story store location settings

use crate::validation::{ConfigSection, ValidationError, Validator};
use crate::{ConfigError, ConfigResult, APP_NAME};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Where the catalog document and page images are kept
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct StorageConfig {
    /// Root directory; `None` means the platform data directory
    pub data_dir: Option<PathBuf>,

    /// Catalog document name inside the root
    pub catalog_file: String,

    /// Image directory name inside the root
    pub images_dir: String,
}

impl StorageConfig {
    /// Returns the configured root, falling back to the platform data dir
    ///
    /// - Linux: `~/.local/share/storysnaps/`
    /// - macOS: `~/Library/Application Support/storysnaps/`
    /// - Windows: `%APPDATA%\storysnaps\data\`
    pub fn resolve_data_dir(&self) -> ConfigResult<PathBuf> {
        if let Some(dir) = &self.data_dir {
            return Ok(dir.clone());
        }

        ProjectDirs::from("", "", APP_NAME)
            .map(|dirs| dirs.data_dir().to_path_buf())
            .ok_or_else(|| ConfigError::PathResolutionError {
                reason: "Could not determine user data directory".to_string(),
            })
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: None,
            catalog_file: "stories.json".to_string(),
            images_dir: "SS_Images".to_string(),
        }
    }
}

impl ConfigSection for StorageConfig {
    fn validate(&self) -> Result<(), Vec<ValidationError>> {
        let mut results = vec![
            Validator::file_name(&self.catalog_file, "storage.catalog_file"),
            Validator::file_name(&self.images_dir, "storage.images_dir"),
        ];

        if self.catalog_file == self.images_dir {
            results.push(Err(ValidationError::with_value(
                "storage.images_dir",
                "must differ from storage.catalog_file",
                &self.images_dir,
            )));
        }

        if let Some(dir) = &self.data_dir {
            if dir.as_os_str().is_empty() {
                results.push(Err(ValidationError::new(
                    "storage.data_dir",
                    "must not be empty when set",
                )));
            }
        }

        Validator::collect_errors(results)
    }

    fn merge(&mut self, other: Self) {
        if other.data_dir.is_some() {
            self.data_dir = other.data_dir;
        }
        self.catalog_file = other.catalog_file;
        self.images_dir = other.images_dir;
    }

    fn section_name(&self) -> &'static str {
        "storage"
    }
}
