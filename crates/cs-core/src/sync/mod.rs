//! Sync bookkeeping and freshness policy.

pub mod state;

use serde::{Deserialize, Serialize};

pub use state::{SchedulerPhase, SyncState};

/// Where the freshness marker comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FreshnessSource {
    /// Repository `pushed_at` timestamp.
    #[default]
    PushedAt,
    /// SHA of the most recent commit.
    LatestCommit,
}
