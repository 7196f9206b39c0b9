use lru::LruCache;
use std::num::NonZeroUsize;
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;
use tokio::time::Instant;
use tracing::debug;

use crate::github::FetchResult;

struct CacheEntry {
    expires_at: Instant,
    payload: FetchResult,
}

/// In-memory sample cache keyed by the literal URL string the caller passed in.
///
/// Entries live for a fixed TTL from the moment they were stored; a hit never
/// extends it. Every access first drops all expired entries. Once `capacity`
/// entries are held, storing a new URL evicts the least recently used one.
pub struct SampleCache {
    entries: Mutex<LruCache<String, CacheEntry>>,
    ttl: Duration,
}

impl SampleCache {
    pub fn new(ttl: Duration, capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            entries: Mutex::new(LruCache::new(capacity)),
            ttl,
        }
    }

    pub fn get(&self, url: &str) -> Option<FetchResult> {
        let now = Instant::now();
        let mut entries = self.lock();
        sweep(&mut entries, now);
        entries
            .get(url)
            .filter(|entry| entry.expires_at > now)
            .map(|entry| entry.payload.clone())
    }

    pub fn put(&self, url: &str, payload: FetchResult) {
        let now = Instant::now();
        let mut entries = self.lock();
        sweep(&mut entries, now);
        let entry = CacheEntry {
            expires_at: now + self.ttl,
            payload,
        };
        if let Some((evicted, _)) = entries.push(url.to_string(), entry) {
            if evicted != url {
                debug!(evicted = %evicted, "cache full, evicted least recently used sample");
            }
        }
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    // A poisoned lock only means another fetch panicked mid-access;
    // the map itself is still consistent.
    fn lock(&self) -> MutexGuard<'_, LruCache<String, CacheEntry>> {
        self.entries.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

fn sweep(entries: &mut LruCache<String, CacheEntry>, now: Instant) {
    let expired: Vec<String> = entries
        .iter()
        .filter(|(_, entry)| entry.expires_at < now)
        .map(|(url, _)| url.clone())
        .collect();
    for url in &expired {
        entries.pop(url);
    }
    if !expired.is_empty() {
        debug!(expired = expired.len(), remaining = entries.len(), "swept expired samples");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::github::{SampleMeta, SourceKind};

    fn sample(id: &str) -> FetchResult {
        FetchResult {
            source_type: SourceKind::Issue,
            sample_id: id.to_string(),
            text_description: format!("text for {}", id),
            meta: SampleMeta {
                owner: "o".to_string(),
                repo: "r".to_string(),
                number: Some(1),
                sha: None,
                truncated: false,
            },
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_hit_within_ttl() {
        let cache = SampleCache::new(Duration::from_secs(600), 8);
        cache.put("https://github.com/o/r/issues/1", sample("o/r#1"));

        tokio::time::advance(Duration::from_secs(599)).await;
        assert_eq!(cache.get("https://github.com/o/r/issues/1"), Some(sample("o/r#1")));
    }

    #[tokio::test(start_paused = true)]
    async fn test_expired_entries_are_swept() {
        let cache = SampleCache::new(Duration::from_secs(600), 8);
        cache.put("a", sample("a"));
        cache.put("b", sample("b"));
        assert_eq!(cache.len(), 2);

        tokio::time::advance(Duration::from_secs(601)).await;
        assert_eq!(cache.get("a"), None);
        // The lookup for "a" also removed "b"
        assert_eq!(cache.len(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_hit_does_not_extend_expiry() {
        let cache = SampleCache::new(Duration::from_secs(10), 8);
        cache.put("a", sample("a"));

        tokio::time::advance(Duration::from_secs(8)).await;
        assert!(cache.get("a").is_some());
        tokio::time::advance(Duration::from_secs(3)).await;
        assert!(cache.get("a").is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_put_overwrites_and_restarts_ttl() {
        let cache = SampleCache::new(Duration::from_secs(10), 8);
        cache.put("a", sample("first"));
        tokio::time::advance(Duration::from_secs(8)).await;
        cache.put("a", sample("second"));
        tokio::time::advance(Duration::from_secs(8)).await;
        assert_eq!(cache.get("a").map(|r| r.sample_id), Some("second".to_string()));
    }

    #[test]
    fn test_keys_are_not_normalized() {
        let cache = SampleCache::new(Duration::from_secs(600), 8);
        cache.put("https://github.com/o/r/issues/1", sample("o/r#1"));
        assert!(cache.get("https://github.com/o/r/issues/1/").is_none());
        assert!(cache.get("https://github.com/o/r/issues/1?x=1").is_none());
    }

    #[test]
    fn test_capacity_evicts_least_recently_used() {
        let cache = SampleCache::new(Duration::from_secs(600), 2);
        cache.put("a", sample("a"));
        cache.put("b", sample("b"));
        // Touch "a" so "b" becomes the eviction candidate
        assert!(cache.get("a").is_some());
        cache.put("c", sample("c"));

        assert_eq!(cache.len(), 2);
        assert!(cache.get("a").is_some());
        assert!(cache.get("b").is_none());
        assert!(cache.get("c").is_some());
    }

    #[test]
    fn test_zero_capacity_still_holds_one_entry() {
        let cache = SampleCache::new(Duration::from_secs(600), 0);
        cache.put("a", sample("a"));
        assert!(cache.get("a").is_some());
    }
}
