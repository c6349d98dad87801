use serde::{Deserialize, Serialize};

use crate::project::ProjectMap;

/// Polling scheduler phase.
///
/// Design principle: a pure state type with transition validation only.
/// Timers, retries and I/O live in the application layer (cs-app).
///
/// ```text
/// Idle ──(tick | trigger | force)──→ Syncing ──(done, ok or failed)──→ Idle
///                                       │
///                                       └── begin while Syncing: refused
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SchedulerPhase {
    #[default]
    Idle,
    Syncing,
}

impl SchedulerPhase {
    pub fn is_syncing(self) -> bool {
        self == Self::Syncing
    }

    /// Enter `Syncing`; `None` if a sync is already in flight.
    pub fn begin(self) -> Option<Self> {
        match self {
            Self::Idle => Some(Self::Syncing),
            Self::Syncing => None,
        }
    }

    /// Leave `Syncing`, whatever the outcome.
    pub fn finish(self) -> Self {
        Self::Idle
    }
}

/// Page-lifetime sync bookkeeping.
///
/// Only `last_known_marker` is mirrored to durable storage, by the caller.
#[derive(Debug, Clone, Default)]
pub struct SyncState {
    pub phase: SchedulerPhase,
    pub last_known_marker: Option<String>,
    pub cached_result: Option<ProjectMap>,
    pub cache_timestamp_ms: Option<i64>,
}

impl SyncState {
    pub fn is_syncing(&self) -> bool {
        self.phase.is_syncing()
    }

    /// Non-reentrant lock: returns `false` and changes nothing when busy.
    pub fn try_begin(&mut self) -> bool {
        match self.phase.begin() {
            Some(next) => {
                self.phase = next;
                true
            }
            None => false,
        }
    }

    pub fn finish(&mut self) {
        self.phase = self.phase.finish();
    }

    /// Cached map if it is younger than `ttl_ms` at `now_ms`.
    pub fn fresh_cache(&self, now_ms: i64, ttl_ms: i64) -> Option<&ProjectMap> {
        let timestamp = self.cache_timestamp_ms?;
        if now_ms.saturating_sub(timestamp) < ttl_ms {
            self.cached_result.as_ref()
        } else {
            None
        }
    }

    pub fn store_cache(&mut self, map: ProjectMap, now_ms: i64) {
        self.cached_result = Some(map);
        self.cache_timestamp_ms = Some(now_ms);
    }
}
