//! Use case: latest project map, served from a short-lived cache.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info_span, warn, Instrument};

use cs_core::ports::ClockPort;
use cs_core::{ProjectMap, SkipReason};

use super::sync_projects::{lock_state, SharedSyncState};
use super::walk_repository::RepositoryWalker;

#[derive(Debug, thiserror::Error)]
pub enum FetchProjectsError {
    #[error("repository root could not be listed and nothing is cached: {0}")]
    Unavailable(SkipReason),
}

pub struct FetchLatestProjects {
    walker: Arc<RepositoryWalker>,
    clock: Arc<dyn ClockPort>,
    state: SharedSyncState,
    ttl: Duration,
}

impl FetchLatestProjects {
    pub fn new(
        walker: Arc<RepositoryWalker>,
        clock: Arc<dyn ClockPort>,
        state: SharedSyncState,
        ttl: Duration,
    ) -> Self {
        Self {
            walker,
            clock,
            state,
            ttl,
        }
    }

    /// Cached map while younger than the TTL; otherwise a fresh walk that
    /// refreshes the cache. A failed walk falls back to a stale cache.
    pub async fn execute(&self) -> Result<ProjectMap, FetchProjectsError> {
        let span = info_span!("usecase.fetch_latest_projects.execute");

        async {
            let now = self.clock.now_ms();
            let ttl_ms = i64::try_from(self.ttl.as_millis()).unwrap_or(i64::MAX);

            let cached = lock_state(&self.state).fresh_cache(now, ttl_ms).cloned();
            if let Some(map) = cached {
                debug!("Serving cached project map");
                return Ok(map);
            }

            match self.walker.walk().await {
                Ok(mut report) => {
                    if let Some(previous) = lock_state(&self.state).cached_result.as_ref() {
                        report.restore_incomplete(previous);
                    }
                    lock_state(&self.state).store_cache(report.projects.clone(), self.clock.now_ms());
                    Ok(report.projects)
                }
                Err(reason) => {
                    let stale = lock_state(&self.state).cached_result.clone();
                    match stale {
                        Some(map) => {
                            warn!(reason = %reason, "Walk failed, serving stale project map");
                            Ok(map)
                        }
                        None => Err(FetchProjectsError::Unavailable(reason)),
                    }
                }
            }
        }
        .instrument(span)
        .await
    }
}
