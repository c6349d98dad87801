use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::fs;
use tracing::info;

use cs_core::ports::PresentationSinkPort;
use cs_core::{ProjectCounts, ProjectMap};

use crate::fs::atomic_write;

/// On-disk form of the merged project map.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SnapshotDocument {
    updated_at: DateTime<Utc>,
    counts: ProjectCounts,
    projects: ProjectMap,
}

/// Logs every update and, when a path is configured, writes the merged map
/// there as pretty JSON for a static page or another process to pick up.
pub struct JsonSnapshotSink {
    path: Option<PathBuf>,
}

impl JsonSnapshotSink {
    pub fn new(path: Option<PathBuf>) -> Self {
        Self { path }
    }

    /// Projects from a snapshot written by a previous run, if any.
    pub async fn load(path: &Path) -> Result<Option<ProjectMap>> {
        let content = match fs::read_to_string(path).await {
            Ok(content) => content,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(err) => {
                return Err(err)
                    .with_context(|| format!("read snapshot failed: {}", path.display()))
            }
        };

        let document: SnapshotDocument = serde_json::from_str(&content)
            .with_context(|| format!("parse snapshot failed: {}", path.display()))?;
        Ok(Some(document.projects))
    }
}

#[async_trait]
impl PresentationSinkPort for JsonSnapshotSink {
    async fn projects_updated(&self, snapshot: &ProjectMap, counts: ProjectCounts) -> Result<()> {
        info!(
            class_work = counts.class_work,
            home_work = counts.home_work,
            days = counts.days,
            total = counts.total(),
            "Projects updated"
        );

        let Some(path) = &self.path else {
            return Ok(());
        };

        let document = SnapshotDocument {
            updated_at: Utc::now(),
            counts,
            projects: snapshot.clone(),
        };
        let content =
            serde_json::to_string_pretty(&document).context("serialize snapshot failed")?;
        atomic_write(path, &content).await?;
        info!(path = %path.display(), "Snapshot written");
        Ok(())
    }
}
