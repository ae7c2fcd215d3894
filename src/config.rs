//! Runtime configuration.
//!
//! Configuration is plain YAML so hosts can ship it next to their other
//! settings:
//!
//! ```yaml
//! filter_options_deadline_ms: 5000
//! search_deadline_ms: 10000
//! log_level: debug
//! ```
//!
//! Every key is optional. Setting `search_deadline_ms` to `null` lets search
//! branches run without a deadline.

use camino::Utf8Path;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_FILTER_OPTIONS_DEADLINE_MS: u64 = 5_000;
pub const DEFAULT_SEARCH_DEADLINE_MS: u64 = 10_000;

/// Errors that can occur when loading configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("Invalid config: {0}")]
    Invalid(String),
}

/// Settings shared by the search, filter and favorite components.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HubConfig {
    /// Group deadline for the three filter option loads
    pub filter_options_deadline_ms: u64,
    /// Per-branch deadline for search fan-outs, `None` to wait indefinitely
    pub search_deadline_ms: Option<u64>,
    /// Default `tracing` filter directive when `RUST_LOG` is unset
    pub log_level: String,
}

impl Default for HubConfig {
    fn default() -> Self {
        HubConfig {
            filter_options_deadline_ms: DEFAULT_FILTER_OPTIONS_DEADLINE_MS,
            search_deadline_ms: Some(DEFAULT_SEARCH_DEADLINE_MS),
            log_level: "info".to_string(),
        }
    }
}

impl HubConfig {
    /// Parses configuration from YAML text.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Parse` for malformed YAML or unknown keys, and
    /// `ConfigError::Invalid` if a deadline is zero.
    pub fn from_yaml_str(yaml: &str) -> Result<Self, ConfigError> {
        let config: HubConfig = if yaml.trim().is_empty() {
            HubConfig::default()
        } else {
            serde_yaml::from_str(yaml)?
        };
        config.validate()?;
        Ok(config)
    }

    /// Reads and parses a YAML configuration file.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Io` if the file cannot be read, otherwise the
    /// same errors as [`HubConfig::from_yaml_str`].
    pub fn from_path(path: &Utf8Path) -> Result<Self, ConfigError> {
        let yaml = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&yaml)
    }

    pub fn filter_options_deadline(&self) -> Duration {
        Duration::from_millis(self.filter_options_deadline_ms)
    }

    pub fn search_deadline(&self) -> Option<Duration> {
        self.search_deadline_ms.map(Duration::from_millis)
    }

    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        if self.filter_options_deadline_ms == 0 {
            return Err(ConfigError::Invalid(
                "filter_options_deadline_ms must be positive".to_string(),
            ));
        }
        if self.search_deadline_ms == Some(0) {
            return Err(ConfigError::Invalid(
                "search_deadline_ms must be positive or null".to_string(),
            ));
        }
        Ok(())
    }
}
