use async_trait::async_trait;

use crate::project::ProjectMap;

/// The single owned project map every scheduler funnels its results into.
#[async_trait]
pub trait ProjectStorePort: Send + Sync {
    async fn snapshot(&self) -> ProjectMap;

    /// Shallow merge (new days win, stale days stay); returns the merged copy.
    async fn merge(&self, partial: ProjectMap) -> ProjectMap;
}
