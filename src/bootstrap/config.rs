//! # Configuration Loader
//!
//! Reads the TOML config into [`AppConfig`] and applies command-line
//! overrides. Field defaults live with the DTO in `cs-core`; this module only
//! decides where files go when the config does not say.

use std::path::{Path, PathBuf};

use anyhow::Context;
use cs_core::config::{AppConfig, StorageConfig};
use cs_core::SecretString;

const APP_DIR_NAME: &str = "coursework-sync";
const CONFIG_FILE_NAME: &str = "config.toml";
const TOKEN_ENV: &str = "GITHUB_TOKEN";

/// Values given on the command line; they win over the file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigOverrides {
    pub owner: Option<String>,
    pub repo: Option<String>,
}

/// Platform data directory, e.g. `~/.local/share/coursework-sync`.
pub fn default_data_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR_NAME)
}

/// Platform config location, e.g. `~/.config/coursework-sync/config.toml`.
pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR_NAME)
        .join(CONFIG_FILE_NAME)
}

/// Load configuration from a TOML file.
///
/// A missing file yields the defaults with every path under `data_dir`.
/// Relative storage paths in the file are resolved against `data_dir`.
///
/// # Errors
///
/// Returns error if the file exists but cannot be read or is not valid TOML
/// for [`AppConfig`].
pub fn load_config(config_path: &Path, data_dir: &Path) -> anyhow::Result<AppConfig> {
    let content = match std::fs::read_to_string(config_path) {
        Ok(content) => content,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            return Ok(AppConfig::with_system_defaults(data_dir));
        }
        Err(err) => {
            return Err(err).with_context(|| {
                format!("Failed to read config file: {}", config_path.display())
            })
        }
    };

    let mut config = AppConfig::from_toml_str(&content)
        .with_context(|| format!("Failed to parse config file: {}", config_path.display()))?;

    if config.storage == StorageConfig::default() {
        config.storage = StorageConfig::rooted_at(data_dir);
    } else {
        let storage = &mut config.storage;
        storage.state_path = rooted(data_dir, &storage.state_path);
        storage.snapshot_path = storage.snapshot_path.as_deref().map(|p| rooted(data_dir, p));
        storage.log_dir = storage.log_dir.as_deref().map(|p| rooted(data_dir, p));
    }

    Ok(config)
}

pub fn apply_overrides(config: &mut AppConfig, overrides: &ConfigOverrides) {
    if let Some(owner) = &overrides.owner {
        config.github.owner = owner.clone();
    }
    if let Some(repo) = &overrides.repo {
        config.github.repo = repo.clone();
    }
}

/// Credential supplied through `GITHUB_TOKEN`, if set and not blank.
pub fn credential_from_env() -> Option<SecretString> {
    credential_from(std::env::var(TOKEN_ENV).ok())
}

fn credential_from(value: Option<String>) -> Option<SecretString> {
    value
        .map(|value| SecretString::from(value.as_str()))
        .filter(|secret| !secret.is_blank())
}

fn rooted(base: &Path, path: &Path) -> PathBuf {
    if path.is_relative() {
        base.join(path)
    } else {
        path.to_path_buf()
    }
}
