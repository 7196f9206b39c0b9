use serde::Serialize;

use crate::fetcher::BatchResult;
use crate::github::FetchResult;

/// Anything the CLI prints: one sample or a whole batch.
/// Serializes to exactly the JSON the HTTP endpoints return.
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum Report {
    Sample(FetchResult),
    Batch(BatchResult),
}

/// How a report is rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    /// Colored text on stdout, markdown when written to a file
    Human,
    Json,
}
