use async_trait::async_trait;
use reqwest::header::ACCEPT;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::{debug, instrument, warn};

use super::FetchError;
use crate::config::GitHubConfig;

const GITHUB_JSON: &str = "application/vnd.github+json";
const MAX_UPSTREAM_MESSAGE: usize = 200;

const ISSUE_FAILED: &str = "Failed to fetch issue/PR";
const COMMIT_FAILED: &str = "Failed to fetch commit";

/// Where sample text comes from.
/// Implementations must be Send + Sync so a batch can drive several calls at once.
#[async_trait]
pub trait ContentSource: Send + Sync {
    /// Title and body of an issue or pull request, joined by a blank line and trimmed.
    async fn issue_text(&self, owner: &str, repo: &str, number: u64) -> Result<String, FetchError>;

    /// Full commit message, or an empty string if GitHub returns none.
    async fn commit_message(&self, owner: &str, repo: &str, sha: &str) -> Result<String, FetchError>;
}

/// ContentSource backed by the GitHub REST API.
pub struct GitHubClient {
    http: reqwest::Client,
    api_base: String,
    token: Option<String>,
}

#[derive(Deserialize)]
struct IssueResponse {
    title: Option<String>,
    body: Option<String>,
}

#[derive(Deserialize)]
struct CommitResponse {
    commit: Option<CommitDetail>,
}

#[derive(Deserialize)]
struct CommitDetail {
    message: Option<String>,
}

#[derive(Deserialize)]
struct ErrorResponse {
    message: Option<String>,
}

impl GitHubClient {
    pub fn new(config: &GitHubConfig) -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder()
            .user_agent(config.user_agent.as_str())
            .timeout(config.timeout())
            .build()?;

        Ok(Self {
            http,
            api_base: config.api_base.trim_end_matches('/').to_string(),
            token: config.token.clone(),
        })
    }

    /// Issue one GET against `path` and decode the JSON body.
    /// Transport and status failures are translated into FetchError here.
    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        default_message: &str,
    ) -> Result<T, FetchError> {
        let url = format!("{}{}", self.api_base, path);
        let mut request = self.http.get(&url).header(ACCEPT, GITHUB_JSON);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await.map_err(|e| {
            warn!(error = %e, "GitHub request got no response");
            FetchError::Network
        })?;

        let status = response.status();
        debug!(status = status.as_u16(), "GitHub responded");
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let err = translate_status(status, &body, default_message);
            if let FetchError::Upstream { status, message } = &err {
                warn!(status, message = %message, "GitHub returned an unexpected status");
            }
            return Err(err);
        }

        response.json::<T>().await.map_err(|e| {
            warn!(error = %e, "failed to decode GitHub response");
            FetchError::Failed(default_message.to_string())
        })
    }
}

#[async_trait]
impl ContentSource for GitHubClient {
    #[instrument(skip(self))]
    async fn issue_text(&self, owner: &str, repo: &str, number: u64) -> Result<String, FetchError> {
        let path = format!("/repos/{}/{}/issues/{}", owner, repo, number);
        let issue: IssueResponse = self.get_json(&path, ISSUE_FAILED).await?;

        let title = issue.title.unwrap_or_default();
        let body = issue.body.unwrap_or_default();
        Ok(format!("{}\n\n{}", title, body).trim().to_string())
    }

    #[instrument(skip(self))]
    async fn commit_message(&self, owner: &str, repo: &str, sha: &str) -> Result<String, FetchError> {
        let path = format!("/repos/{}/{}/commits/{}", owner, repo, sha);
        let commit: CommitResponse = self.get_json(&path, COMMIT_FAILED).await?;

        Ok(commit
            .commit
            .and_then(|c| c.message)
            .unwrap_or_default())
    }
}

/// Map a non-success status (and its body, if any) to a domain error.
fn translate_status(status: StatusCode, body: &str, default_message: &str) -> FetchError {
    match status {
        StatusCode::NOT_FOUND => FetchError::NotFound,
        StatusCode::FORBIDDEN => FetchError::Forbidden,
        StatusCode::UNAUTHORIZED => FetchError::Unauthorized,
        _ => {
            let message = serde_json::from_str::<ErrorResponse>(body)
                .ok()
                .and_then(|e| e.message)
                .filter(|m| !m.is_empty())
                .map(|m| clip_message(&m))
                .unwrap_or_else(|| default_message.to_string());
            FetchError::Upstream {
                status: status.as_u16(),
                message,
            }
        }
    }
}

fn clip_message(message: &str) -> String {
    if message.chars().count() <= MAX_UPSTREAM_MESSAGE {
        return message.to_string();
    }
    let clipped: String = message.chars().take(MAX_UPSTREAM_MESSAGE).collect();
    format!("{}...", clipped)
}
