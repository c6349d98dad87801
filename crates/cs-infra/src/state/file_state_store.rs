use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use async_trait::async_trait;
use tokio::fs;
use tokio::sync::Mutex;
use tracing::debug;

use cs_core::ports::{StateStoreError, StateStorePort};

use crate::fs::atomic_write;

type StateMap = BTreeMap<String, String>;

/// Durable key-value state kept in one flat JSON object file.
///
/// Every write rewrites the whole file through a temp file and a rename.
/// Writes from this process are serialized; other processes are not
/// coordinated with.
pub struct FileStateStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl FileStateStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read_map(&self) -> Result<StateMap, StateStoreError> {
        let content = match fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(StateMap::new()),
            Err(err) => {
                return Err(StateStoreError::Io(format!(
                    "read state failed: {}: {err}",
                    self.path.display()
                )))
            }
        };

        if content.trim().is_empty() {
            return Ok(StateMap::new());
        }

        serde_json::from_str(&content).map_err(|err| {
            StateStoreError::Corrupt(format!("{}: {err}", self.path.display()))
        })
    }

    async fn write_map(&self, map: &StateMap) -> Result<(), StateStoreError> {
        let result: Result<()> = async {
            let content = serde_json::to_string_pretty(map).context("serialize state failed")?;
            atomic_write(&self.path, &content).await
        }
        .await;

        result.map_err(|err| StateStoreError::Io(format!("{err:#}")))
    }
}

#[async_trait]
impl StateStorePort for FileStateStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StateStoreError> {
        Ok(self.read_map().await?.remove(key))
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StateStoreError> {
        let _guard = self.write_lock.lock().await;
        let mut map = self.read_map().await?;
        map.insert(key.to_string(), value.to_string());
        self.write_map(&map).await?;
        debug!(key, path = %self.path.display(), "State value saved");
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), StateStoreError> {
        let _guard = self.write_lock.lock().await;
        let mut map = self.read_map().await?;
        if map.remove(key).is_none() {
            return Ok(());
        }
        self.write_map(&map).await?;
        debug!(key, path = %self.path.display(), "State value removed");
        Ok(())
    }
}
