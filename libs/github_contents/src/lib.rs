//! Thin client for the GitHub Contents API.
//!
//! Only the two calls needed to upsert a single file are covered: reading the
//! current revision marker of a path and writing a new revision to it.

use async_trait::async_trait;
use reqwest::{header, Client, Method, RequestBuilder, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::debug;
use url::Url;

pub const DEFAULT_API_URL: &str = "https://api.github.com";
pub const USER_AGENT: &str = "LeetPush";
pub const ACCEPT: &str = "application/vnd.github.v3+json";
pub const API_VERSION_HEADER: &str = "X-GitHub-Api-Version";
pub const API_VERSION: &str = "2022-11-28";

#[derive(Debug, thiserror::Error)]
pub enum GitHubError {
    #[error("Invalid contents URL for base {0}")]
    Url(String),

    #[error("GitHub request error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("GitHub responded with {status}: {body}")]
    Status { status: StatusCode, body: String },
}

impl GitHubError {
    /// Upstream status code, when the request got far enough to have one.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            GitHubError::Status { status, .. } => Some(*status),
            GitHubError::Transport(err) => err.status(),
            GitHubError::Url(_) => None,
        }
    }

    pub fn body(&self) -> Option<&str> {
        match self {
            GitHubError::Status { body, .. } => Some(body),
            _ => None,
        }
    }
}

/// Outcome of asking the upstream store for the current revision of a path.
#[derive(Debug)]
pub enum Lookup {
    Found(String),
    NotFound,
    Failed(GitHubError),
}

impl Lookup {
    pub fn sha(&self) -> Option<&str> {
        match self {
            Lookup::Found(sha) => Some(sha),
            _ => None,
        }
    }
}

/// Body of a `PUT /repos/{repo}/contents/{path}` request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileUpdate {
    pub message: String,
    /// Base64 encoded file content.
    pub content: String,
    /// Revision being replaced. Must be present when the file already exists.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sha: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ContentMetadata {
    sha: String,
}

/// Storage the relay writes submissions into.
#[async_trait]
pub trait ContentStore: Send + Sync {
    async fn lookup(&self, token: &str, repo: &str, path: &str) -> Lookup;

    async fn put(
        &self,
        token: &str,
        repo: &str,
        path: &str,
        update: &FileUpdate,
    ) -> Result<StatusCode, GitHubError>;
}

#[derive(Debug, Clone)]
pub struct GitHubContents {
    client: Client,
    api_url: Url,
}

impl GitHubContents {
    pub fn new(api_url: Url) -> Result<Self, GitHubError> {
        let client = Client::builder().user_agent(USER_AGENT).build()?;
        Ok(Self::with_client(client, api_url))
    }

    pub fn with_client(client: Client, api_url: Url) -> Self {
        Self { client, api_url }
    }

    fn request(&self, method: Method, url: Url, token: &str) -> RequestBuilder {
        self.client
            .request(method, url)
            .bearer_auth(token)
            .header(header::ACCEPT, ACCEPT)
            .header(API_VERSION_HEADER, API_VERSION)
            .header(header::USER_AGENT, USER_AGENT)
    }

    async fn fetch_sha(
        &self,
        token: &str,
        repo: &str,
        path: &str,
    ) -> Result<Option<String>, GitHubError> {
        let url = contents_url(&self.api_url, repo, path)?;
        let response = self.request(Method::GET, url, token).send().await?;
        let status = response.status();

        if status == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(GitHubError::Status { status, body });
        }

        let metadata: ContentMetadata = response.json().await?;
        Ok(Some(metadata.sha))
    }
}

#[async_trait]
impl ContentStore for GitHubContents {
    async fn lookup(&self, token: &str, repo: &str, path: &str) -> Lookup {
        match self.fetch_sha(token, repo, path).await {
            Ok(Some(sha)) => {
                debug!(repo, path, sha = %sha, "existing file found");
                Lookup::Found(sha)
            }
            Ok(None) => {
                debug!(repo, path, "no existing file");
                Lookup::NotFound
            }
            Err(err) => Lookup::Failed(err),
        }
    }

    async fn put(
        &self,
        token: &str,
        repo: &str,
        path: &str,
        update: &FileUpdate,
    ) -> Result<StatusCode, GitHubError> {
        let url = contents_url(&self.api_url, repo, path)?;
        let response = self
            .request(Method::PUT, url, token)
            .json(update)
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            Ok(status)
        } else {
            let body = response.text().await.unwrap_or_default();
            Err(GitHubError::Status { status, body })
        }
    }
}

/// Builds `{api_url}/repos/{repo}/contents/{path}`, one URL segment per `/`.
pub fn contents_url(api_url: &Url, repo: &str, path: &str) -> Result<Url, GitHubError> {
    let mut url = api_url.clone();
    url.path_segments_mut()
        .map_err(|_| GitHubError::Url(api_url.to_string()))?
        .pop_if_empty()
        .push("repos")
        .extend(repo.split('/'))
        .push("contents")
        .extend(path.split('/'));
    Ok(url)
}
