//! Use case: delete files from the repository by path and blob sha.

use std::sync::Arc;

use tracing::{info, info_span, warn, Instrument};

use cs_core::ports::{GitHubApiError, RepositoryWriterPort};
use cs_core::repository::DeleteFileRequest;
use cs_core::RepositoryCoordinates;

use super::credentials::{CredentialError, CredentialVault};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeleteTarget {
    pub path: String,
    pub sha: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeleteReport {
    pub deleted: Vec<String>,
    /// `(path, reason)` of every file that could not be deleted.
    pub failed: Vec<(String, String)>,
}

#[derive(Debug, thiserror::Error)]
pub enum DeleteError {
    #[error(transparent)]
    Credential(#[from] CredentialError),

    #[error("GitHub rejected the token while deleting {path}: {source}")]
    Rejected {
        path: String,
        #[source]
        source: GitHubApiError,
    },
}

pub struct DeleteFiles {
    writer: Arc<dyn RepositoryWriterPort>,
    vault: CredentialVault,
    coordinates: RepositoryCoordinates,
}

impl DeleteFiles {
    pub fn new(
        writer: Arc<dyn RepositoryWriterPort>,
        vault: CredentialVault,
        coordinates: RepositoryCoordinates,
    ) -> Self {
        Self {
            writer,
            vault,
            coordinates,
        }
    }

    /// Delete each target in order. Individual failures are collected; a
    /// rejected credential stops the run and is discarded.
    pub async fn execute(&self, targets: &[DeleteTarget]) -> Result<DeleteReport, DeleteError> {
        let span = info_span!("usecase.delete_files.execute", files = targets.len());

        async {
            let credential = self.vault.require().await?;
            let mut report = DeleteReport::default();

            for target in targets {
                let name = target.path.rsplit('/').next().unwrap_or(&target.path);
                let request = DeleteFileRequest {
                    message: format!("Delete {name}"),
                    sha: target.sha.clone(),
                    branch: self.coordinates.branch.clone(),
                };

                match self
                    .writer
                    .delete_file(&target.path, &request, &credential)
                    .await
                {
                    Ok(()) => {
                        info!(path = %target.path, "Deleted file");
                        report.deleted.push(target.path.clone());
                    }
                    Err(err) if err.is_auth_failure() => {
                        self.vault.discard().await;
                        return Err(DeleteError::Rejected {
                            path: target.path.clone(),
                            source: err,
                        });
                    }
                    Err(err) => {
                        warn!(path = %target.path, error = %err, "Delete failed");
                        report.failed.push((target.path.clone(), err.to_string()));
                    }
                }
            }

            Ok(report)
        }
        .instrument(span)
        .await
    }
}
