use serde::{Deserialize, Serialize};

/// What a GitHub URL points at. Issues and pull requests carry their number,
/// commits carry the (possibly abbreviated) SHA exactly as it appeared in the URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reference {
    Issue(u64),
    PullRequest(u64),
    Commit(String),
}

/// Represents the parsed components of a GitHub issue, PR or commit URL.
/// Extracted by parse_github_url() in github/mod.rs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedUrl {
    pub owner: String,
    pub repo: String,
    pub reference: Reference,
}

impl ParsedUrl {
    pub fn kind(&self) -> SourceKind {
        match self.reference {
            Reference::Issue(_) => SourceKind::Issue,
            Reference::PullRequest(_) => SourceKind::Pull,
            Reference::Commit(_) => SourceKind::Commit,
        }
    }

    pub fn number(&self) -> Option<u64> {
        match self.reference {
            Reference::Issue(n) | Reference::PullRequest(n) => Some(n),
            Reference::Commit(_) => None,
        }
    }

    pub fn sha(&self) -> Option<&str> {
        match &self.reference {
            Reference::Commit(sha) => Some(sha),
            _ => None,
        }
    }

    /// Stable identifier of the sample: `owner/repo@sha` for commits,
    /// `owner/repo#number` for issues and pull requests.
    pub fn sample_id(&self) -> String {
        match &self.reference {
            Reference::Commit(sha) => format!("{}/{}@{}", self.owner, self.repo, sha),
            Reference::Issue(n) | Reference::PullRequest(n) => {
                format!("{}/{}#{}", self.owner, self.repo, n)
            }
        }
    }
}

/// Kind of GitHub entity a sample was taken from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    Issue,
    Pull,
    Commit,
}

impl std::fmt::Display for SourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SourceKind::Issue => write!(f, "issue"),
            SourceKind::Pull => write!(f, "pull"),
            SourceKind::Commit => write!(f, "commit"),
        }
    }
}

/// Identifying metadata attached to every sample.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SampleMeta {
    pub owner: String,
    pub repo: String,
    pub number: Option<u64>,
    pub sha: Option<String>,
    /// Whether text_description was cut to the maximum sample length
    pub truncated: bool,
}

/// A text sample fetched from GitHub, ready for classification.
/// Immutable once built; cache hits hand out clones of the stored value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FetchResult {
    #[serde(rename = "sourceType")]
    pub source_type: SourceKind,
    pub sample_id: String,
    pub text_description: String,
    pub meta: SampleMeta,
}
