//! Use case: upload a project's files into the repository.
//!
//! Files are written one by one under the conventional folder path
//! (`CW/Day 06/cw 01 day 6`), followed by a generated README. Each write
//! is retried with a linearly growing delay, except when the server
//! rejects the credential.

pub mod readme;

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use base64::{engine::general_purpose::STANDARD, Engine as _};
use chrono::{DateTime, Utc};
use tracing::{info, info_span, warn, Instrument};

use cs_core::classify::UploadFileRole;
use cs_core::config::UploadConfig;
use cs_core::convention::encode_project_path;
use cs_core::ports::{ClockPort, GitHubApiError, RepositoryWriterPort};
use cs_core::repository::{PutFileRequest, StoredFile};
use cs_core::{ProjectSlot, RepositoryCoordinates, SecretString};

use super::credentials::{CredentialError, CredentialVault};
use super::validate_access::{AccessError, ValidateAccess};

pub use readme::{format_file_size, render_readme};

const README_NAME: &str = "README.md";

/// A file picked by the user, already read into memory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalFile {
    pub name: String,
    pub bytes: Vec<u8>,
}

impl LocalFile {
    pub fn new(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            bytes,
        }
    }

    pub async fn read(path: &Path) -> std::io::Result<Self> {
        let name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .ok_or_else(|| {
                std::io::Error::new(std::io::ErrorKind::InvalidInput, "path has no file name")
            })?;
        let bytes = tokio::fs::read(path).await?;
        Ok(Self { name, bytes })
    }
}

#[derive(Debug, Clone)]
pub struct UploadRequest {
    pub slot: ProjectSlot,
    pub files: Vec<LocalFile>,
}

/// Progress notification; `percent` is 0..=100.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadProgress {
    pub percent: u8,
    pub message: String,
}

pub type ProgressCallback = Arc<dyn Fn(UploadProgress) + Send + Sync>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedFile {
    pub name: String,
    pub path: String,
    pub size: u64,
    pub role: UploadFileRole,
    pub sha: String,
    pub download_url: Option<String>,
    pub html_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadReport {
    pub folder_path: String,
    /// Browser URL of the project folder.
    pub folder_url: String,
    pub files: Vec<UploadedFile>,
    /// `None` when the README could not be written; the files still are.
    pub readme: Option<UploadedFile>,
}

/// Retry and pacing knobs, taken from `[upload]` in the config.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UploadPolicy {
    /// Total attempts per file, first try included.
    pub max_attempts: u32,
    pub retry_base_delay: Duration,
    pub rate_limit_delay: Duration,
}

impl From<&UploadConfig> for UploadPolicy {
    fn from(config: &UploadConfig) -> Self {
        Self {
            max_attempts: config.max_attempts.max(1),
            retry_base_delay: config.retry_base_delay(),
            rate_limit_delay: config.rate_limit_delay(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum UploadError {
    #[error("no files selected")]
    NoFiles,

    #[error("day, type and project number are required (day {day}, number {number})")]
    InvalidSlot { day: u32, number: u32 },

    #[error(transparent)]
    Credential(#[from] CredentialError),

    #[error(
        "GitHub rejected the token. Check that it is correct and has the \"repo\" scope ({0})"
    )]
    Unauthorized(String),

    #[error("GitHub refused access. The token may lack the \"repo\" scope ({0})")]
    Forbidden(String),

    #[error(transparent)]
    Access(AccessError),

    #[error(
        "failed to upload {file} after {} file(s) were written [{}]: {source}",
        .uploaded.len(),
        .uploaded.join(", ")
    )]
    FileFailed {
        file: String,
        /// Paths written before the failure; they stay in the repository.
        uploaded: Vec<String>,
        #[source]
        source: GitHubApiError,
    },
}

impl From<AccessError> for UploadError {
    fn from(err: AccessError) -> Self {
        match err {
            AccessError::InvalidToken(detail) => UploadError::Unauthorized(detail),
            AccessError::Forbidden { detail, .. } => UploadError::Forbidden(detail),
            other => UploadError::Access(other),
        }
    }
}

impl UploadError {
    fn from_file_failure(file: &str, uploaded: Vec<String>, source: GitHubApiError) -> Self {
        match source {
            GitHubApiError::Unauthorized(detail) => UploadError::Unauthorized(detail),
            GitHubApiError::Forbidden(detail) => UploadError::Forbidden(detail),
            source => UploadError::FileFailed {
                file: file.to_string(),
                uploaded,
                source,
            },
        }
    }
}

pub struct UploadProject {
    writer: Arc<dyn RepositoryWriterPort>,
    access: ValidateAccess,
    vault: CredentialVault,
    clock: Arc<dyn ClockPort>,
    coordinates: RepositoryCoordinates,
    policy: UploadPolicy,
}

impl UploadProject {
    pub fn new(
        writer: Arc<dyn RepositoryWriterPort>,
        vault: CredentialVault,
        clock: Arc<dyn ClockPort>,
        coordinates: RepositoryCoordinates,
        policy: UploadPolicy,
    ) -> Self {
        let access = ValidateAccess::new(writer.clone(), vault.clone(), coordinates.clone());
        Self {
            writer,
            access,
            vault,
            clock,
            coordinates,
            policy,
        }
    }

    /// Upload every file, then the README.
    ///
    /// Stops at the first file that fails all attempts; files written before
    /// it stay in the repository and are counted in the error.
    pub async fn execute(
        &self,
        request: UploadRequest,
        progress: Option<ProgressCallback>,
    ) -> Result<UploadReport, UploadError> {
        let folder_path = encode_project_path(&request.slot);
        let span = info_span!(
            "usecase.upload_project.execute",
            folder = %folder_path,
            files = request.files.len()
        );

        async {
            let slot = request.slot;
            if slot.day == 0 || slot.number == 0 {
                return Err(UploadError::InvalidSlot {
                    day: slot.day,
                    number: slot.number,
                });
            }
            if request.files.is_empty() {
                return Err(UploadError::NoFiles);
            }

            let credential = self.vault.require().await?;
            self.access.execute(&credential).await?;

            let total = request.files.len();
            let mut uploaded = Vec::with_capacity(total);
            for (index, file) in request.files.iter().enumerate() {
                let path = format!("{folder_path}/{}", file.name);
                let message = format!("Add {} to {}", file.name, readme::project_title(&slot));

                let stored = match self
                    .upload_with_retry(&path, &file.bytes, &message, &credential)
                    .await
                {
                    Ok(stored) => stored,
                    Err(source) => {
                        if source.is_auth_failure() {
                            self.vault.discard().await;
                        }
                        return Err(UploadError::from_file_failure(
                            &file.name,
                            uploaded
                                .iter()
                                .map(|written: &UploadedFile| written.path.clone())
                                .collect(),
                            source,
                        ));
                    }
                };

                info!(file = %file.name, "Uploaded file");
                uploaded.push(uploaded_file(file.name.clone(), path, file.bytes.len() as u64, stored));
                report_progress(
                    progress.as_ref(),
                    file_progress(uploaded.len(), total),
                    format!("Uploaded {}", file.name),
                );

                if index + 1 < total {
                    tokio::time::sleep(self.policy.rate_limit_delay).await;
                }
            }

            let readme = self
                .upload_readme(&slot, &folder_path, &uploaded, &credential)
                .await;
            report_progress(progress.as_ref(), 100, "README generated and uploaded".to_string());

            let folder_url = self.coordinates.tree_url(&folder_path);
            info!(url = %folder_url, files = uploaded.len(), "Project uploaded");
            Ok(UploadReport {
                folder_path,
                folder_url,
                files: uploaded,
                readme,
            })
        }
        .instrument(span)
        .await
    }

    async fn upload_readme(
        &self,
        slot: &ProjectSlot,
        folder_path: &str,
        uploaded: &[UploadedFile],
        credential: &SecretString,
    ) -> Option<UploadedFile> {
        let content = render_readme(slot, uploaded, self.generated_at());
        let path = format!("{folder_path}/{README_NAME}");
        let message = format!("Add README for {}", readme::project_title(slot));

        match self
            .upload_with_retry(&path, content.as_bytes(), &message, credential)
            .await
        {
            Ok(stored) => Some(uploaded_file(
                README_NAME.to_string(),
                path,
                content.len() as u64,
                stored,
            )),
            Err(err) => {
                warn!(error = %err, "README upload failed; project files are kept");
                None
            }
        }
    }

    /// Attempt `n` waits `retry_base_delay * n` before attempt `n + 1`.
    async fn upload_with_retry(
        &self,
        path: &str,
        bytes: &[u8],
        message: &str,
        credential: &SecretString,
    ) -> Result<StoredFile, GitHubApiError> {
        let content = STANDARD.encode(bytes);
        let mut attempt = 1;
        loop {
            match self.put_once(path, &content, message, credential).await {
                Ok(stored) => return Ok(stored),
                Err(err) if err.is_retryable() && attempt < self.policy.max_attempts => {
                    let backoff = self.policy.retry_base_delay * attempt;
                    warn!(
                        path = %path,
                        attempt,
                        max_attempts = self.policy.max_attempts,
                        backoff_ms = backoff.as_millis() as u64,
                        error = %err,
                        "Upload attempt failed, retrying"
                    );
                    tokio::time::sleep(backoff).await;
                    attempt += 1;
                }
                Err(err) => return Err(err),
            }
        }
    }

    async fn put_once(
        &self,
        path: &str,
        content: &str,
        message: &str,
        credential: &SecretString,
    ) -> Result<StoredFile, GitHubApiError> {
        let existing = self.writer.get_file(path, credential).await?;
        let request = PutFileRequest {
            message: message.to_string(),
            content: content.to_string(),
            branch: self.coordinates.branch.clone(),
            sha: existing.map(|file| file.sha),
        };
        self.writer.put_file(path, &request, credential).await
    }

    fn generated_at(&self) -> DateTime<Utc> {
        DateTime::from_timestamp_millis(self.clock.now_ms()).unwrap_or_default()
    }
}

fn uploaded_file(name: String, path: String, size: u64, stored: StoredFile) -> UploadedFile {
    UploadedFile {
        role: UploadFileRole::from_name(&name),
        name,
        path,
        size,
        sha: stored.sha,
        download_url: stored.download_url,
        html_url: stored.html_url,
    }
}

/// Files share the first 90%; the README slot is the last tenth.
fn file_progress(uploaded: usize, total: usize) -> u8 {
    let percent = (uploaded as f64 / (total + 1) as f64 * 90.0).round();
    percent.clamp(0.0, 90.0) as u8
}

fn report_progress(callback: Option<&ProgressCallback>, percent: u8, message: String) {
    if let Some(callback) = callback {
        callback(UploadProgress { percent, message });
    }
}
