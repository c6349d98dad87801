//! # Configuration data
//!
//! ## Responsibilities
//!
//! - Define configuration data structures
//! - Provide TOML → DTO mapping, with defaults for missing keys
//!
//! ## Prohibited
//!
//! - No I/O (the loader in the binary crate reads the file)
//! - No validation (wiring rejects unusable values such as an empty owner)

mod defaults;

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::repository::RepositoryCoordinates;
use crate::sync::FreshnessSource;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub github: GitHubConfig,
    pub sync: SyncConfig,
    pub upload: UploadConfig,
    pub storage: StorageConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GitHubConfig {
    pub owner: String,
    pub repo: String,
    pub branch: String,
    pub api_base_url: String,
    pub web_base_url: String,
    pub user_agent: String,
    pub request_timeout_secs: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    pub interval_secs: u64,
    pub freshness: FreshnessSource,
    /// Pause between consecutive folder listings.
    pub courtesy_delay_ms: u64,
    pub cache_ttl_secs: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UploadConfig {
    /// Total attempts per file, first try included.
    pub max_attempts: u32,
    pub retry_base_delay_ms: u64,
    /// Pause between two uploaded files.
    pub rate_limit_delay_ms: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// JSON file holding the freshness marker and the credential.
    pub state_path: PathBuf,
    /// Where the merged project map is written after each change.
    pub snapshot_path: Option<PathBuf>,
    pub log_dir: Option<PathBuf>,
}

impl AppConfig {
    /// Parse a TOML document; missing sections and keys take their defaults.
    pub fn from_toml_str(content: &str) -> anyhow::Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Defaults with every path rooted in `data_dir`.
    pub fn with_system_defaults(data_dir: &Path) -> Self {
        let mut config = Self::default();
        config.storage = StorageConfig::rooted_at(data_dir);
        config
    }

    pub fn coordinates(&self) -> RepositoryCoordinates {
        RepositoryCoordinates {
            owner: self.github.owner.clone(),
            repo: self.github.repo.clone(),
            branch: self.github.branch.clone(),
            web_base_url: self.github.web_base_url.clone(),
        }
    }
}

impl StorageConfig {
    pub fn rooted_at(data_dir: &Path) -> Self {
        Self {
            state_path: data_dir.join("state.json"),
            snapshot_path: Some(data_dir.join("projects.json")),
            log_dir: Some(data_dir.join("logs")),
        }
    }
}

impl GitHubConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

impl SyncConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }

    pub fn courtesy_delay(&self) -> Duration {
        Duration::from_millis(self.courtesy_delay_ms)
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }
}

impl UploadConfig {
    pub fn retry_base_delay(&self) -> Duration {
        Duration::from_millis(self.retry_base_delay_ms)
    }

    pub fn rate_limit_delay(&self) -> Duration {
        Duration::from_millis(self.rate_limit_delay_ms)
    }
}
