//! Application configuration.
//!
//! A single JSON file naming the storage connection to browse:
//!
//! ```json
//! {
//!   "storage": {
//!     "name": "survey",
//!     "storage_type": "gcs",
//!     "params": { "type": "gcs", "bucket": "survey.appspot.com" }
//!   },
//!   "log_filter": "image_search=debug"
//! }
//! ```

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::services::storage::StorageConfig;

/// Log filter used when neither `RUST_LOG` nor the config sets one.
pub const DEFAULT_LOG_FILTER: &str = "image_search=info";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Connection to browse.
    pub storage: StorageConfig,
    /// `tracing` filter directives.
    #[serde(default)]
    pub log_filter: Option<String>,
}

impl AppConfig {
    /// Load the config from its default location.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    /// Load the config from `path`.
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config: AppConfig = serde_json::from_str(&contents)
            .with_context(|| format!("Invalid config file {}", path.display()))?;

        config
            .storage
            .validate()
            .map_err(|e| anyhow::anyhow!("Invalid storage config in {}: {}", path.display(), e))?;
        Ok(config)
    }

    /// `~/.image-search/config.json`
    pub fn config_path() -> Result<PathBuf> {
        let home =
            dirs::home_dir().ok_or_else(|| anyhow::anyhow!("Could not find home directory"))?;
        Ok(home.join(".image-search").join("config.json"))
    }

    pub fn log_filter(&self) -> &str {
        self.log_filter.as_deref().unwrap_or(DEFAULT_LOG_FILTER)
    }
}
