use futures::future::join_all;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use thiserror::Error;
use tracing::{debug, info, instrument, warn};

use super::SampleFetcher;
use crate::github::FetchResult;

#[derive(Debug, Error)]
pub enum BatchError {
    #[error("urls array is required and must not be empty")]
    EmptyInput,
}

/// Outcome for one distinct URL of a batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchEntry {
    pub url: String,
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<FetchResult>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl BatchEntry {
    fn fetched(url: &str, data: FetchResult) -> Self {
        Self {
            url: url.to_string(),
            success: true,
            data: Some(data),
            error: None,
        }
    }

    fn failed(url: &str, error: String) -> Self {
        Self {
            url: url.to_string(),
            success: false,
            data: None,
            error: Some(error),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchResult {
    pub results: Vec<BatchEntry>,
    pub success_count: usize,
    pub failure_count: usize,
    pub total_count: usize,
}

impl BatchResult {
    fn from_entries(results: Vec<BatchEntry>) -> Self {
        let success_count = results.iter().filter(|r| r.success).count();
        Self {
            success_count,
            failure_count: results.len() - success_count,
            total_count: results.len(),
            results,
        }
    }
}

impl SampleFetcher {
    /// Fetch many URLs, at most `concurrency` at a time.
    ///
    /// Duplicate URLs collapse into one entry. URLs are processed in groups in
    /// first-occurrence order with a fixed pause between groups; one URL failing
    /// never affects the others. Entries come back in first-occurrence order.
    #[instrument(skip(self, urls), fields(requested = urls.len()))]
    pub async fn fetch_batch(&self, urls: &[String]) -> Result<BatchResult, BatchError> {
        if urls.is_empty() {
            return Err(BatchError::EmptyInput);
        }

        let unique = dedup(urls);
        debug!(unique = unique.len(), group_size = self.concurrency, "starting batch");

        let mut results = Vec::with_capacity(unique.len());
        for (index, group) in unique.chunks(self.concurrency).enumerate() {
            if index > 0 {
                tokio::time::sleep(self.batch_delay).await;
            }
            debug!(group = index, size = group.len(), "fetching group");
            let entries = join_all(group.iter().map(|url| self.fetch_entry(url))).await;
            results.extend(entries);
        }

        let batch = BatchResult::from_entries(results);
        info!(
            total = batch.total_count,
            succeeded = batch.success_count,
            failed = batch.failure_count,
            "batch complete"
        );
        Ok(batch)
    }

    async fn fetch_entry(&self, url: &str) -> BatchEntry {
        match self.fetch_one(url).await {
            Ok(data) => BatchEntry::fetched(url, data),
            Err(e) => {
                warn!(url = %url, error = %e, "batch member failed");
                BatchEntry::failed(url, e.to_string())
            }
        }
    }
}

fn dedup(urls: &[String]) -> Vec<&str> {
    let mut seen = HashSet::with_capacity(urls.len());
    urls.iter()
        .map(String::as_str)
        .filter(|url| seen.insert(*url))
        .collect()
}
