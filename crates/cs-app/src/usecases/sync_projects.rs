//! Use case: one sync pass.
//!
//! 1. Read the freshness marker (one metadata request).
//! 2. Same marker as the last completed pass: stop, no listing requests.
//! 3. Otherwise walk the tree, merge the result into the project store,
//!    persist the marker and notify the presentation sink.
//!
//! The pass is non-reentrant: a second call while one is in flight returns
//! [`SyncOutcome::AlreadySyncing`] and does nothing.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::{debug, info, info_span, warn, Instrument};

use cs_core::ports::{
    ClockPort, GitHubApiError, PresentationSinkPort, ProjectStorePort, RepositoryReaderPort,
    StateStoreError, StateStorePort, LAST_KNOWN_MARKER_KEY,
};
use cs_core::{FreshnessSource, ProjectCounts, SkipReason, SyncState};

use super::walk_repository::RepositoryWalker;

/// Sync bookkeeping shared by the sync pass, the cached fetch and the
/// scheduler.
pub type SharedSyncState = Arc<Mutex<SyncState>>;

pub(crate) fn lock_state(state: &Mutex<SyncState>) -> MutexGuard<'_, SyncState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncOutcome {
    /// Another pass holds the lock.
    AlreadySyncing,
    UpToDate { marker: String },
    Updated {
        marker: String,
        counts: ProjectCounts,
        /// Inner folders that could not be listed during the walk.
        skipped: usize,
    },
}

#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    #[error("freshness check failed: {0}")]
    Freshness(#[source] GitHubApiError),

    #[error("repository reported no freshness marker")]
    NoMarker,

    #[error("repository root could not be listed: {0}")]
    RootSkipped(SkipReason),

    #[error(transparent)]
    State(#[from] StateStoreError),
}

/// Leaves `Syncing` when dropped, so a cancelled pass cannot keep the lock.
struct InFlight<'a> {
    state: &'a Mutex<SyncState>,
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        lock_state(self.state).finish();
    }
}

pub struct SyncProjects {
    reader: Arc<dyn RepositoryReaderPort>,
    walker: Arc<RepositoryWalker>,
    store: Arc<dyn ProjectStorePort>,
    state_store: Arc<dyn StateStorePort>,
    sink: Arc<dyn PresentationSinkPort>,
    clock: Arc<dyn ClockPort>,
    freshness: FreshnessSource,
    state: SharedSyncState,
}

impl SyncProjects {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        reader: Arc<dyn RepositoryReaderPort>,
        walker: Arc<RepositoryWalker>,
        store: Arc<dyn ProjectStorePort>,
        state_store: Arc<dyn StateStorePort>,
        sink: Arc<dyn PresentationSinkPort>,
        clock: Arc<dyn ClockPort>,
        freshness: FreshnessSource,
        state: SharedSyncState,
    ) -> Self {
        Self {
            reader,
            walker,
            store,
            state_store,
            sink,
            clock,
            freshness,
            state,
        }
    }

    pub fn state(&self) -> SharedSyncState {
        self.state.clone()
    }

    pub fn is_syncing(&self) -> bool {
        lock_state(&self.state).is_syncing()
    }

    /// Run one pass. `force` clears the stored marker first, so the pass
    /// always walks the tree.
    pub async fn execute(&self, force: bool) -> Result<SyncOutcome, SyncError> {
        let span = info_span!("usecase.sync_projects.execute", force, freshness = ?self.freshness);

        async {
            let acquired = lock_state(&self.state).try_begin();
            if !acquired {
                debug!("Sync already in flight, ignoring request");
                return Ok(SyncOutcome::AlreadySyncing);
            }
            let _in_flight = InFlight { state: &self.state };

            self.run(force).await
        }
        .instrument(span)
        .await
    }

    async fn run(&self, force: bool) -> Result<SyncOutcome, SyncError> {
        if force {
            self.state_store.remove(LAST_KNOWN_MARKER_KEY).await?;
            lock_state(&self.state).last_known_marker = None;
            info!("Forced sync, stored marker cleared");
        }

        let marker = self.current_marker().await?;

        let remembered = lock_state(&self.state).last_known_marker.clone();
        let known = match remembered {
            Some(marker) => Some(marker),
            None => self.state_store.get(LAST_KNOWN_MARKER_KEY).await?,
        };

        if known.as_deref() == Some(marker.as_str()) {
            lock_state(&self.state).last_known_marker = Some(marker.clone());
            debug!(marker = %marker, "Repository unchanged");
            return Ok(SyncOutcome::UpToDate { marker });
        }

        info!(previous = ?known, current = %marker, "Repository changed, walking tree");
        let mut report = self.walker.walk().await.map_err(SyncError::RootSkipped)?;
        if !report.incomplete.is_empty() {
            report.restore_incomplete(&self.store.snapshot().await);
        }

        let snapshot = self.store.merge(report.projects.clone()).await;
        let counts = snapshot.counts();

        // A partial walk keeps the old marker so the next tick walks again.
        if report.skipped.is_empty() {
            self.state_store.set(LAST_KNOWN_MARKER_KEY, &marker).await?;
            lock_state(&self.state).last_known_marker = Some(marker.clone());
        } else {
            warn!(
                skipped = report.skipped.len(),
                "Walk was partial, marker not advanced"
            );
        }
        lock_state(&self.state).store_cache(report.projects, self.clock.now_ms());

        if let Err(err) = self.sink.projects_updated(&snapshot, counts).await {
            warn!(error = %err, "Presentation sink failed");
        }

        info!(
            class_work = counts.class_work,
            home_work = counts.home_work,
            days = counts.days,
            "Project map updated"
        );
        Ok(SyncOutcome::Updated {
            marker,
            counts,
            skipped: report.skipped.len(),
        })
    }

    async fn current_marker(&self) -> Result<String, SyncError> {
        match self.freshness {
            FreshnessSource::PushedAt => self
                .reader
                .repository_metadata()
                .await
                .map_err(SyncError::Freshness)?
                .pushed_at
                .ok_or(SyncError::NoMarker),
            FreshnessSource::LatestCommit => self
                .reader
                .latest_commit()
                .await
                .map_err(SyncError::Freshness)?
                .map(|commit| commit.sha)
                .ok_or(SyncError::NoMarker),
        }
    }
}
