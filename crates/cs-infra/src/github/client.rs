use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION};
use reqwest::{RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::debug;

use cs_core::config::GitHubConfig;
use cs_core::ports::{GitHubApiError, RepositoryReaderPort, RepositoryWriterPort};
use cs_core::repository::{
    CommitSummary, DeleteFileRequest, GitHubUser, PutFileRequest, RemoteFile, RepositoryMetadata,
    StoredFile,
};
use cs_core::{ContentEntry, SecretString};

const GITHUB_V3_JSON: &str = "application/vnd.github.v3+json";

/// GitHub REST v3 client for one repository.
///
/// Reads are anonymous; writes carry `Authorization: token <credential>`.
pub struct GitHubClient {
    http: reqwest::Client,
    api_base_url: String,
    owner: String,
    repo: String,
    branch: String,
}

#[derive(Deserialize)]
struct ApiMessage {
    message: String,
}

#[derive(Deserialize)]
struct FileDescriptor {
    path: String,
    sha: String,
}

#[derive(Deserialize)]
struct ContentResponse {
    content: StoredFile,
}

#[derive(Deserialize)]
struct CommitItem {
    sha: String,
    commit: CommitDetail,
}

#[derive(Deserialize)]
struct CommitDetail {
    #[serde(default)]
    message: String,
    author: Option<CommitAuthor>,
}

#[derive(Deserialize)]
struct CommitAuthor {
    date: Option<String>,
}

impl GitHubClient {
    pub fn new(config: &GitHubConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static(GITHUB_V3_JSON));

        let http = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .user_agent(config.user_agent.as_str())
            .default_headers(headers)
            .build()
            .context("build GitHub HTTP client failed")?;

        Ok(Self {
            http,
            api_base_url: config.api_base_url.trim_end_matches('/').to_string(),
            owner: config.owner.clone(),
            repo: config.repo.clone(),
            branch: config.branch.clone(),
        })
    }

    fn repo_url(&self, suffix: &str) -> String {
        format!(
            "{}/repos/{}/{}{}",
            self.api_base_url,
            urlencoding::encode(&self.owner),
            urlencoding::encode(&self.repo),
            suffix
        )
    }

    fn contents_url(&self, path: &str) -> String {
        let encoded = encode_path(path);
        if encoded.is_empty() {
            self.repo_url("/contents")
        } else {
            self.repo_url(&format!("/contents/{encoded}"))
        }
    }

    fn authorized(builder: RequestBuilder, credential: &SecretString) -> RequestBuilder {
        builder.header(AUTHORIZATION, format!("token {}", credential.expose()))
    }

    async fn send(builder: RequestBuilder) -> Result<Response, GitHubApiError> {
        let response = builder.send().await.map_err(transport_error)?;
        if response.status().is_success() {
            Ok(response)
        } else {
            Err(status_error(response).await)
        }
    }

    async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, GitHubApiError> {
        response
            .json::<T>()
            .await
            .map_err(|err| GitHubApiError::Decode(err.to_string()))
    }
}

#[async_trait]
impl RepositoryReaderPort for GitHubClient {
    async fn list_contents(&self, path: &str) -> Result<Vec<ContentEntry>, GitHubApiError> {
        let url = self.contents_url(path);
        debug!(url = %url, "Listing contents");
        let response = Self::send(self.http.get(url)).await?;
        Self::decode(response).await
    }

    async fn repository_metadata(&self) -> Result<RepositoryMetadata, GitHubApiError> {
        let response = Self::send(self.http.get(self.repo_url(""))).await?;
        Self::decode(response).await
    }

    async fn latest_commit(&self) -> Result<Option<CommitSummary>, GitHubApiError> {
        let request = self
            .http
            .get(self.repo_url("/commits"))
            .query(&[("per_page", "1")]);

        let response = match Self::send(request).await {
            Ok(response) => response,
            // An empty repository answers 409 Conflict.
            Err(GitHubApiError::Status { status: 409, .. }) => return Ok(None),
            Err(err) => return Err(err),
        };

        let commits: Vec<CommitItem> = Self::decode(response).await?;
        Ok(commits.into_iter().next().map(|item| CommitSummary {
            sha: item.sha,
            message: item.commit.message,
            date: item.commit.author.and_then(|author| author.date),
        }))
    }
}

#[async_trait]
impl RepositoryWriterPort for GitHubClient {
    async fn current_user(&self, credential: &SecretString) -> Result<GitHubUser, GitHubApiError> {
        let url = format!("{}/user", self.api_base_url);
        let response = Self::send(Self::authorized(self.http.get(url), credential)).await?;
        Self::decode(response).await
    }

    async fn repository_access(
        &self,
        credential: &SecretString,
    ) -> Result<RepositoryMetadata, GitHubApiError> {
        let request = Self::authorized(self.http.get(self.repo_url("")), credential);
        let response = Self::send(request).await?;
        Self::decode(response).await
    }

    async fn get_file(
        &self,
        path: &str,
        credential: &SecretString,
    ) -> Result<Option<RemoteFile>, GitHubApiError> {
        let request = self
            .http
            .get(self.contents_url(path))
            .query(&[("ref", self.branch.as_str())]);

        match Self::send(Self::authorized(request, credential)).await {
            Ok(response) => {
                let file: FileDescriptor = Self::decode(response).await?;
                Ok(Some(RemoteFile {
                    path: file.path,
                    sha: file.sha,
                }))
            }
            Err(GitHubApiError::NotFound(_)) => Ok(None),
            Err(err) => Err(err),
        }
    }

    async fn put_file(
        &self,
        path: &str,
        request: &PutFileRequest,
        credential: &SecretString,
    ) -> Result<StoredFile, GitHubApiError> {
        let builder = self.http.put(self.contents_url(path)).json(request);
        let response = Self::send(Self::authorized(builder, credential)).await?;
        let body: ContentResponse = Self::decode(response).await?;
        Ok(body.content)
    }

    async fn delete_file(
        &self,
        path: &str,
        request: &DeleteFileRequest,
        credential: &SecretString,
    ) -> Result<(), GitHubApiError> {
        let builder = self.http.delete(self.contents_url(path)).json(request);
        Self::send(Self::authorized(builder, credential)).await?;
        Ok(())
    }
}

fn transport_error(err: reqwest::Error) -> GitHubApiError {
    if err.is_timeout() {
        GitHubApiError::Transport(format!("request timed out: {err}"))
    } else {
        GitHubApiError::Transport(err.to_string())
    }
}

async fn status_error(response: Response) -> GitHubApiError {
    let status = response.status();
    let rate_limited = response
        .headers()
        .get("x-ratelimit-remaining")
        .and_then(|value| value.to_str().ok())
        == Some("0");

    let message = match response.json::<ApiMessage>().await {
        Ok(body) => body.message,
        Err(_) => status.canonical_reason().unwrap_or("unknown status").to_string(),
    };

    match status {
        StatusCode::UNAUTHORIZED => GitHubApiError::Unauthorized(message),
        StatusCode::TOO_MANY_REQUESTS => GitHubApiError::RateLimited(message),
        StatusCode::FORBIDDEN
            if rate_limited || message.to_ascii_lowercase().contains("rate limit") =>
        {
            GitHubApiError::RateLimited(message)
        }
        StatusCode::FORBIDDEN => GitHubApiError::Forbidden(message),
        StatusCode::NOT_FOUND => GitHubApiError::NotFound(message),
        other => GitHubApiError::Status {
            status: other.as_u16(),
            message,
        },
    }
}

/// Percent-encode each segment of a repository path, keeping the slashes.
fn encode_path(path: &str) -> String {
    path.split('/')
        .filter(|segment| !segment.is_empty())
        .map(|segment| urlencoding::encode(segment).into_owned())
        .collect::<Vec<_>>()
        .join("/")
}
