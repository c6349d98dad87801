use thiserror::Error;

/// Failure of a call to the repository hosting API.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GitHubApiError {
    #[error("authentication failed: {0}")]
    Unauthorized(String),

    #[error("access forbidden: {0}")]
    Forbidden(String),

    #[error("API rate limit exceeded: {0}")]
    RateLimited(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("HTTP {status}: {message}")]
    Status { status: u16, message: String },

    #[error("transport error: {0}")]
    Transport(String),

    #[error("unexpected response body: {0}")]
    Decode(String),
}

impl GitHubApiError {
    pub fn status(&self) -> Option<u16> {
        match self {
            GitHubApiError::Unauthorized(_) => Some(401),
            GitHubApiError::Forbidden(_) | GitHubApiError::RateLimited(_) => Some(403),
            GitHubApiError::NotFound(_) => Some(404),
            GitHubApiError::Status { status, .. } => Some(*status),
            GitHubApiError::Transport(_) | GitHubApiError::Decode(_) => None,
        }
    }

    /// 401 and non-rate-limit 403: the credential is wrong or too weak.
    pub fn is_auth_failure(&self) -> bool {
        matches!(
            self,
            GitHubApiError::Unauthorized(_) | GitHubApiError::Forbidden(_)
        )
    }

    /// Everything except credential problems is worth another attempt.
    pub fn is_retryable(&self) -> bool {
        !self.is_auth_failure()
    }
}

#[derive(Debug, Error)]
pub enum StateStoreError {
    #[error("state store I/O failed: {0}")]
    Io(String),

    #[error("state store is corrupt: {0}")]
    Corrupt(String),
}
