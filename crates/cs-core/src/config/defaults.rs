use std::path::PathBuf;

use super::*;

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            github: GitHubConfig::default(),
            sync: SyncConfig::default(),
            upload: UploadConfig::default(),
            storage: StorageConfig::default(),
        }
    }
}

impl Default for GitHubConfig {
    fn default() -> Self {
        Self {
            owner: String::new(),
            repo: String::new(),
            branch: "main".to_string(),
            api_base_url: "https://api.github.com".to_string(),
            web_base_url: "https://github.com".to_string(),
            user_agent: concat!("coursework-sync/", env!("CARGO_PKG_VERSION")).to_string(),
            request_timeout_secs: 30,
        }
    }
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            interval_secs: 30,
            freshness: FreshnessSource::PushedAt,
            courtesy_delay_ms: 100,
            cache_ttl_secs: 300,
        }
    }
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            retry_base_delay_ms: 1_000,
            rate_limit_delay_ms: 1_000,
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            state_path: PathBuf::from("state.json"),
            snapshot_path: None,
            log_dir: None,
        }
    }
}
