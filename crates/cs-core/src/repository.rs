//! Repository coordinates and the data exchanged with the hosting API.

use serde::{Deserialize, Serialize};

/// Which repository and branch the mirror and the uploader work against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositoryCoordinates {
    pub owner: String,
    pub repo: String,
    pub branch: String,
    /// Browser base, e.g. `https://github.com`.
    pub web_base_url: String,
}

impl RepositoryCoordinates {
    pub fn full_name(&self) -> String {
        format!("{}/{}", self.owner, self.repo)
    }

    /// Browser URL of a folder on the configured branch.
    pub fn tree_url(&self, path: &str) -> String {
        format!(
            "{}/{}/{}/tree/{}/{}",
            self.web_base_url.trim_end_matches('/'),
            self.owner,
            self.repo,
            self.branch,
            path
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RepositoryPermissions {
    #[serde(default)]
    pub admin: bool,
    #[serde(default)]
    pub push: bool,
    #[serde(default)]
    pub pull: bool,
}

/// Subset of `GET /repos/{owner}/{repo}` the client relies on.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RepositoryMetadata {
    #[serde(default)]
    pub full_name: String,
    #[serde(default)]
    pub private: bool,
    #[serde(default)]
    pub pushed_at: Option<String>,
    /// Only present on authenticated requests.
    #[serde(default)]
    pub permissions: Option<RepositoryPermissions>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitSummary {
    pub sha: String,
    pub message: String,
    pub date: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct GitHubUser {
    pub login: String,
}

/// An existing blob at a content path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteFile {
    pub path: String,
    pub sha: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PutFileRequest {
    pub message: String,
    /// Base64 of the file bytes.
    pub content: String,
    pub branch: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sha: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeleteFileRequest {
    pub message: String,
    pub sha: String,
    pub branch: String,
}

/// Content descriptor returned by a successful write.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
pub struct StoredFile {
    #[serde(default)]
    pub path: String,
    #[serde(default)]
    pub sha: String,
    #[serde(default)]
    pub download_url: Option<String>,
    #[serde(default)]
    pub html_url: Option<String>,
}
