//! Repository ports - read and write access to the hosted repository.

use async_trait::async_trait;

use super::errors::GitHubApiError;
use crate::listing::ContentEntry;
use crate::repository::{
    CommitSummary, DeleteFileRequest, GitHubUser, PutFileRequest, RemoteFile, RepositoryMetadata,
    StoredFile,
};
use crate::security::SecretString;

/// Anonymous reads used by the tree walker and the scheduler.
#[async_trait]
pub trait RepositoryReaderPort: Send + Sync {
    /// Directory listing of `path` (`""` is the repository root).
    async fn list_contents(&self, path: &str) -> Result<Vec<ContentEntry>, GitHubApiError>;

    /// `GET /repos/{owner}/{repo}`; carries the `pushed_at` freshness marker.
    async fn repository_metadata(&self) -> Result<RepositoryMetadata, GitHubApiError>;

    /// Most recent commit on the default branch, `None` for an empty repository.
    async fn latest_commit(&self) -> Result<Option<CommitSummary>, GitHubApiError>;
}

/// Authenticated calls used by the upload client.
#[async_trait]
pub trait RepositoryWriterPort: Send + Sync {
    async fn current_user(&self, credential: &SecretString) -> Result<GitHubUser, GitHubApiError>;

    /// Repository metadata as seen by the credential, including `permissions`.
    async fn repository_access(
        &self,
        credential: &SecretString,
    ) -> Result<RepositoryMetadata, GitHubApiError>;

    /// Existing blob at `path`; a 404 is `Ok(None)`.
    async fn get_file(
        &self,
        path: &str,
        credential: &SecretString,
    ) -> Result<Option<RemoteFile>, GitHubApiError>;

    /// Create or update (when `request.sha` is set) the file at `path`.
    async fn put_file(
        &self,
        path: &str,
        request: &PutFileRequest,
        credential: &SecretString,
    ) -> Result<StoredFile, GitHubApiError>;

    async fn delete_file(
        &self,
        path: &str,
        request: &DeleteFileRequest,
        credential: &SecretString,
    ) -> Result<(), GitHubApiError>;
}
