pub mod client;
pub mod types;

pub use client::{ContentSource, GitHubClient};
pub use types::{FetchResult, ParsedUrl, Reference, SampleMeta, SourceKind};

use thiserror::Error;

/// Reasons a string is rejected as a GitHub issue, PR or commit URL.
/// Each cause carries its own message so callers can show it verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UrlError {
    #[error("Invalid URL format")]
    Malformed,

    #[error("URL must be from github.com")]
    WrongHost,

    #[error("Invalid GitHub URL format")]
    TooFewSegments,

    #[error("URL must be an issue, pull request, or commit")]
    UnsupportedType,

    #[error("Issue/PR number must be a positive integer")]
    InvalidNumber,

    #[error("Commit SHA must be 7-40 hexadecimal characters")]
    InvalidSha,
}

/// Everything that can go wrong fetching a single sample.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    #[error(transparent)]
    InvalidUrl(#[from] UrlError),

    #[error("GitHub resource not found (404)")]
    NotFound,

    #[error("GitHub API rate limit exceeded or access forbidden (403)")]
    Forbidden,

    #[error("GitHub API authentication failed (401)")]
    Unauthorized,

    #[error("{message}")]
    Upstream { status: u16, message: String },

    #[error("Network error: Failed to connect to GitHub API")]
    Network,

    #[error("{0}")]
    Failed(String),
}

/// Parse a GitHub web URL into its component parts.
///
/// Expected format: https://github.com/{owner}/{repo}/{issues|pull|commit}/{id}
/// Trailing segments (e.g. `/files`), query strings and fragments are ignored.
pub fn parse_github_url(url: &str) -> Result<ParsedUrl, UrlError> {
    let parsed = reqwest::Url::parse(url).map_err(|_| UrlError::Malformed)?;

    if parsed.host_str() != Some("github.com") {
        return Err(UrlError::WrongHost);
    }

    let segments: Vec<_> = parsed
        .path_segments()
        .ok_or(UrlError::TooFewSegments)?
        .filter(|segment| !segment.is_empty())
        .collect();

    if segments.len() < 4 {
        return Err(UrlError::TooFewSegments);
    }

    let (owner, repo, kind, id) = (segments[0], segments[1], segments[2], segments[3]);

    let reference = match kind {
        "issues" => Reference::Issue(parse_positive(id)?),
        "pull" => Reference::PullRequest(parse_positive(id)?),
        "commit" => {
            if !is_commit_sha(id) {
                return Err(UrlError::InvalidSha);
            }
            Reference::Commit(id.to_string())
        }
        _ => return Err(UrlError::UnsupportedType),
    };

    Ok(ParsedUrl {
        owner: owner.to_string(),
        repo: repo.to_string(),
        reference,
    })
}

fn parse_positive(id: &str) -> Result<u64, UrlError> {
    match id.parse::<u64>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(UrlError::InvalidNumber),
    }
}

fn is_commit_sha(id: &str) -> bool {
    (7..=40).contains(&id.len()) && id.chars().all(|c| c.is_ascii_hexdigit())
}
