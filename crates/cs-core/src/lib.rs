//! # cs-core
//!
//! Core domain models and business rules for coursework-sync.
//!
//! This crate contains pure logic without any infrastructure dependencies:
//! the folder naming convention shared by the walker and the uploader,
//! file classification, the project map and the port traits implemented
//! by `cs-infra`.

pub mod classify;
pub mod config;
pub mod convention;
pub mod listing;
pub mod ports;
pub mod project;
pub mod repository;
pub mod security;
pub mod sync;

// Re-export commonly used types at the crate root
pub use config::AppConfig;
pub use convention::{DayKey, ProjectSlot, WorkType};
pub use listing::{ContentEntry, EntryType, SkipReason, WalkOutcome};
pub use project::{DayBucket, Download, DownloadKind, ProjectCounts, ProjectMap, ProjectRecord};
pub use repository::RepositoryCoordinates;
pub use security::SecretString;
pub use sync::{FreshnessSource, SchedulerPhase, SyncState};
