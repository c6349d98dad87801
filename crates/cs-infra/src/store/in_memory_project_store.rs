use async_trait::async_trait;
use tokio::sync::RwLock;

use cs_core::ports::ProjectStorePort;
use cs_core::ProjectMap;

/// The single owned project map. Merges are serialized by the lock; the
/// last merge wins for a day present in both.
#[derive(Default)]
pub struct InMemoryProjectStore {
    projects: RwLock<ProjectMap>,
}

impl InMemoryProjectStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from a previously saved snapshot.
    pub fn with_snapshot(snapshot: ProjectMap) -> Self {
        Self {
            projects: RwLock::new(snapshot),
        }
    }
}

#[async_trait]
impl ProjectStorePort for InMemoryProjectStore {
    async fn snapshot(&self) -> ProjectMap {
        self.projects.read().await.clone()
    }

    async fn merge(&self, partial: ProjectMap) -> ProjectMap {
        let mut projects = self.projects.write().await;
        projects.merge(partial);
        projects.clone()
    }
}
