use anyhow::Result;
use async_trait::async_trait;

use crate::project::{ProjectCounts, ProjectMap};

/// Receives the merged project map after every detected change.
#[async_trait]
pub trait PresentationSinkPort: Send + Sync {
    async fn projects_updated(&self, snapshot: &ProjectMap, counts: ProjectCounts) -> Result<()>;
}
