//! coursework-sync application orchestration layer
//!
//! This crate contains the use cases (tree walk, sync pass, upload, delete,
//! access validation) and the polling runtime that drives the sync pass.

pub mod runtime;
pub mod usecases;

pub use runtime::PollingScheduler;
pub use usecases::{
    DeleteFiles, FetchLatestProjects, RepositoryWalker, SyncError, SyncOutcome, SyncProjects,
    UploadProject, ValidateAccess,
};
