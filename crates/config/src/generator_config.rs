//! Remote story generator settings

use crate::validation::{ConfigSection, ValidationError, Validator};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// How the remote caption generator is reached
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct GeneratorConfig {
    /// Full URL of the generation endpoint
    pub endpoint: String,

    /// Per-request timeout in seconds
    pub timeout_secs: u64,

    /// Attempts per generation, including the first
    pub max_attempts: usize,
}

impl GeneratorConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            endpoint: "http://127.0.0.1:5000/generate".to_string(),
            timeout_secs: 30,
            max_attempts: 3,
        }
    }
}

impl ConfigSection for GeneratorConfig {
    fn validate(&self) -> Result<(), Vec<ValidationError>> {
        let results = vec![
            Validator::http_url(&self.endpoint, "generator.endpoint"),
            Validator::in_range(self.timeout_secs, 1, 300, "generator.timeout_secs"),
            Validator::in_range(self.max_attempts, 1, 10, "generator.max_attempts"),
        ];

        Validator::collect_errors(results)
    }

    fn merge(&mut self, other: Self) {
        self.endpoint = other.endpoint;
        self.timeout_secs = other.timeout_secs;
        self.max_attempts = other.max_attempts;
    }

    fn section_name(&self) -> &'static str {
        "generator"
    }
}
