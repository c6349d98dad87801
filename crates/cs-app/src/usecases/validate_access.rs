//! Use case: check that the stored credential may push to the repository.

use std::sync::Arc;

use tracing::{info, info_span, warn, Instrument};

use cs_core::ports::{GitHubApiError, RepositoryWriterPort};
use cs_core::{RepositoryCoordinates, SecretString};

use super::credentials::CredentialVault;

#[derive(Debug, thiserror::Error)]
pub enum AccessError {
    #[error(
        "Invalid GitHub token. Check that it is correct and has the \"repo\" scope ({0})"
    )]
    InvalidToken(String),

    #[error("Repository {0} not found. Check the owner and repository name")]
    RepositoryNotFound(String),

    #[error("Access to {repository} is forbidden. The token may lack the \"repo\" scope ({detail})")]
    Forbidden { repository: String, detail: String },

    #[error("The token has no push permission on {0}")]
    NoPushAccess(String),

    #[error("GitHub API request failed: {0}")]
    Api(#[source] GitHubApiError),
}

impl AccessError {
    /// Whether the credential itself was rejected.
    pub fn is_credential_rejected(&self) -> bool {
        matches!(
            self,
            AccessError::InvalidToken(_) | AccessError::Forbidden { .. }
        )
    }
}

/// Who the credential belongs to and what it may do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessReport {
    pub login: String,
    pub repository: String,
    pub private: bool,
    /// Set when the server did not report permissions.
    pub warning: Option<String>,
}

pub struct ValidateAccess {
    writer: Arc<dyn RepositoryWriterPort>,
    vault: CredentialVault,
    coordinates: RepositoryCoordinates,
}

impl ValidateAccess {
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

    /// Resolve the user, then the repository and its push permission.
    ///
    /// A rejected credential is removed from the state store, if it is the
    /// one stored there, before the error is returned.
    pub async fn execute(&self, credential: &SecretString) -> Result<AccessReport, AccessError> {
        let repository = self.coordinates.full_name();
        let span = info_span!("usecase.validate_access.execute", repository = %repository);

        async {
            let result = self.check(credential, &repository).await;
            if let Err(err) = &result {
                warn!(error = %err, "Access validation failed");
                if err.is_credential_rejected() {
                    self.vault.discard_if_stored(credential).await;
                }
            }
            result
        }
        .instrument(span)
        .await
    }

    async fn check(
        &self,
        credential: &SecretString,
        repository: &str,
    ) -> Result<AccessReport, AccessError> {
        let user = self
            .writer
            .current_user(credential)
            .await
            .map_err(|err| classify(err, repository))?;

        let metadata = self
            .writer
            .repository_access(credential)
            .await
            .map_err(|err| classify(err, repository))?;

        let warning = match metadata.permissions {
            Some(permissions) if permissions.push => None,
            Some(_) => return Err(AccessError::NoPushAccess(repository.to_string())),
            None => {
                let message = format!("Could not verify push permission on {repository}");
                warn!("{message}");
                Some(message)
            }
        };

        info!(login = %user.login, private = metadata.private, "GitHub access validated");
        Ok(AccessReport {
            login: user.login,
            repository: repository.to_string(),
            private: metadata.private,
            warning,
        })
    }
}

fn classify(err: GitHubApiError, repository: &str) -> AccessError {
    match err {
        GitHubApiError::Unauthorized(detail) => AccessError::InvalidToken(detail),
        GitHubApiError::NotFound(_) => AccessError::RepositoryNotFound(repository.to_string()),
        GitHubApiError::Forbidden(detail) => AccessError::Forbidden {
            repository: repository.to_string(),
            detail,
        },
        other => AccessError::Api(other),
    }
}
