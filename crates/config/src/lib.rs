//! StorySnaps Configuration System
//!
//! Settings for where the story store lives on disk, how loudly the app
//! logs and how the remote story generator is reached. Each section
//! implements `ConfigSection` and validates itself.
//!
//! - Missing files load as defaults
//! - Empty or unparsable files are errors, never silently replaced
//! - Writes go through a temporary file and an atomic rename
//!
//! # Example
//!
//! ```rust,no_run
//! use storysnaps_config::{Config, ConfigManager};
//!
//! let manager = ConfigManager::new().expect("Failed to initialize config");
//! let config = manager.load().unwrap_or_else(|e| {
//!     eprintln!("Config error: {}, using defaults", e);
//!     Config::default()
//! });
//!
//! println!("Generator: {}", config.generator.endpoint);
//! ```

mod error;
mod manager;
mod persistence;
mod validation;

// Config sections
pub mod app_config;
mod generator_config;
mod storage_config;

pub use error::{ConfigError, ConfigResult, ValidationError};
pub use manager::{ConfigManager, ENV_DATA_DIR, ENV_GENERATOR_ENDPOINT, ENV_LOG_LEVEL};
pub use validation::{ConfigSection, Validator};

pub use app_config::{AppConfig, LogLevel};
pub use generator_config::GeneratorConfig;
pub use storage_config::StorageConfig;

use serde::{Deserialize, Serialize};

/// Current config file format version
pub const CONFIG_VERSION: u32 = 1;

/// Application name used for platform directories
pub const APP_NAME: &str = "storysnaps";

/// Root configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Config file format version
    pub version: u32,

    /// Application-level settings
    pub app: AppConfig,

    /// Where the catalog and page images are stored
    pub storage: StorageConfig,

    /// Remote story generation service
    pub generator: GeneratorConfig,
}

impl Config {
    /// Creates a new config with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Validates the entire configuration
    ///
    /// Returns all validation errors found across all sections.
    pub fn validate(&self) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();

        if let Err(mut e) = self.app.validate() {
            errors.append(&mut e);
        }

        if let Err(mut e) = self.storage.validate() {
            errors.append(&mut e);
        }

        if let Err(mut e) = self.generator.validate() {
            errors.append(&mut e);
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// Merges this config with another, preferring values from `other`
    ///
    /// Override chain: defaults < file < env vars < CLI args
    pub fn merge(&mut self, other: Config) {
        self.app.merge(other.app);
        self.storage.merge(other.storage);
        self.generator.merge(other.generator);
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: CONFIG_VERSION,
            app: AppConfig::default(),
            storage: StorageConfig::default(),
            generator: GeneratorConfig::default(),
        }
    }
}
