pub mod credentials;
pub mod delete_files;
pub mod fetch_latest_projects;
pub mod reconcile_project;
pub mod sync_projects;
pub mod upload;
pub mod validate_access;
pub mod walk_repository;

pub use credentials::{CredentialError, CredentialVault};
pub use delete_files::{DeleteError, DeleteFiles, DeleteReport, DeleteTarget};
pub use fetch_latest_projects::{FetchLatestProjects, FetchProjectsError};
pub use reconcile_project::reconcile_project;
pub use sync_projects::{SharedSyncState, SyncError, SyncOutcome, SyncProjects};
pub use upload::{
    LocalFile, ProgressCallback, UploadError, UploadPolicy, UploadProgress, UploadProject,
    UploadReport,
    UploadRequest, UploadedFile,
};
pub use validate_access::{AccessError, AccessReport, ValidateAccess};
pub use walk_repository::{ProjectFolder, RepositoryWalker, WalkReport};
