pub mod batch;
pub mod cache;

pub use batch::{BatchEntry, BatchError, BatchResult};
pub use cache::SampleCache;

use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, instrument};

use crate::config::Config;
use crate::github::{self, ContentSource, FetchError, FetchResult, Reference, SampleMeta};

/// Longest text_description handed downstream, in characters.
pub const MAX_TEXT_LENGTH: usize = 12_000;

/// Turns GitHub URLs into classification samples, with caching and paced batches.
pub struct SampleFetcher {
    source: Arc<dyn ContentSource>,
    cache: SampleCache,
    concurrency: usize,
    batch_delay: Duration,
}

impl SampleFetcher {
    pub fn new(source: Arc<dyn ContentSource>, config: &Config) -> Self {
        Self {
            source,
            cache: SampleCache::new(config.cache.ttl(), config.cache.max_entries),
            concurrency: config.batch.concurrency.max(1),
            batch_delay: config.batch.delay(),
        }
    }

    /// Fetch one sample, serving it from cache when the exact URL string was
    /// fetched within the TTL. Failed fetches are never cached.
    #[instrument(skip(self))]
    pub async fn fetch_one(&self, url: &str) -> Result<FetchResult, FetchError> {
        if let Some(cached) = self.cache.get(url) {
            debug!(sample_id = %cached.sample_id, "cache hit");
            return Ok(cached);
        }
        debug!("cache miss");

        let parsed = github::parse_github_url(url)?;

        let text = match &parsed.reference {
            Reference::Commit(sha) => {
                self.source
                    .commit_message(&parsed.owner, &parsed.repo, sha)
                    .await?
            }
            Reference::Issue(number) | Reference::PullRequest(number) => {
                self.source
                    .issue_text(&parsed.owner, &parsed.repo, *number)
                    .await?
            }
        };

        let (text_description, truncated) = truncate(text, MAX_TEXT_LENGTH);
        let result = FetchResult {
            source_type: parsed.kind(),
            sample_id: parsed.sample_id(),
            text_description,
            meta: SampleMeta {
                number: parsed.number(),
                sha: parsed.sha().map(str::to_string),
                owner: parsed.owner,
                repo: parsed.repo,
                truncated,
            },
        };
        info!(sample_id = %result.sample_id, truncated, "fetched sample");

        self.cache.put(url, result.clone());
        debug!(cached = self.cache.len(), "stored sample");
        Ok(result)
    }
}

/// Hard cut to at most `max` characters. Returns whether anything was removed.
pub fn truncate(mut text: String, max: usize) -> (String, bool) {
    match text.char_indices().nth(max) {
        Some((cut, _)) => {
            text.truncate(cut);
            (text, true)
        }
        None => (text, false),
    }
}
