//! In-memory response cache for tests and single-process deployments.
//!
//! Expiry is measured on the tokio clock, so tests can drive TTLs with a
//! paused runtime.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tokio::time::Instant;

use crate::ports::{CacheError, CacheKey, CacheStats, ResponseCache};

/// A cached enrichment payload.
#[derive(Debug, Clone)]
pub struct CacheEntry {
    pub payload: serde_json::Value,
    pub written_at: Instant,
    pub ttl: Duration,
}

impl CacheEntry {
    fn is_live(&self, now: Instant) -> bool {
        now.duration_since(self.written_at) < self.ttl
    }
}

/// In-memory `ResponseCache`.
#[derive(Debug, Clone, Default)]
pub struct InMemoryResponseCache {
    entries: Arc<RwLock<HashMap<CacheKey, CacheEntry>>>,
    total_requests: Arc<AtomicU64>,
    cache_hits: Arc<AtomicU64>,
}

impl InMemoryResponseCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored entries, including expired ones not yet evicted.
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

#[async_trait]
impl ResponseCache for InMemoryResponseCache {
    async fn get(&self, key: &CacheKey) -> Result<Option<serde_json::Value>, CacheError> {
        self.total_requests.fetch_add(1, Ordering::Relaxed);
        let now = Instant::now();

        {
            let entries = self.entries.read().await;
            match entries.get(key) {
                Some(entry) if entry.is_live(now) => {
                    self.cache_hits.fetch_add(1, Ordering::Relaxed);
                    tracing::debug!(key = %key, "cache hit");
                    return Ok(Some(entry.payload.clone()));
                }
                Some(_) => {}
                None => {
                    tracing::debug!(key = %key, "cache miss");
                    return Ok(None);
                }
            }
        }

        // Expired: evict lazily.
        let mut entries = self.entries.write().await;
        if entries.get(key).is_some_and(|e| !e.is_live(now)) {
            entries.remove(key);
        }
        tracing::debug!(key = %key, "cache entry expired");
        Ok(None)
    }

    async fn set(
        &self,
        key: &CacheKey,
        payload: serde_json::Value,
        ttl: Duration,
    ) -> Result<(), CacheError> {
        let entry = CacheEntry {
            payload,
            written_at: Instant::now(),
            ttl,
        };
        self.entries.write().await.insert(key.clone(), entry);
        Ok(())
    }

    async fn stats(&self) -> CacheStats {
        CacheStats::from_counts(
            self.total_requests.load(Ordering::Relaxed),
            self.cache_hits.load(Ordering::Relaxed),
        )
    }

    async fn clear(&self) -> Result<(), CacheError> {
        self.entries.write().await.clear();
        self.total_requests.store(0, Ordering::Relaxed);
        self.cache_hits.store(0, Ordering::Relaxed);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn key(text: &str) -> CacheKey {
        CacheKey::for_enrichment("lifestyle", text)
    }

    #[tokio::test(start_paused = true)]
    async fn hit_within_ttl() {
        let cache = InMemoryResponseCache::new();
        cache
            .set(&key("swim"), json!({"summary": "ok"}), Duration::from_secs(60))
            .await
            .unwrap();

        tokio::time::advance(Duration::from_secs(59)).await;

        assert_eq!(
            cache.get(&key("swim")).await.unwrap(),
            Some(json!({"summary": "ok"}))
        );
    }

    #[tokio::test(start_paused = true)]
    async fn miss_after_expiry_and_evicts() {
        let cache = InMemoryResponseCache::new();
        cache
            .set(&key("swim"), json!(1), Duration::from_secs(60))
            .await
            .unwrap();

        tokio::time::advance(Duration::from_secs(60)).await;

        assert_eq!(cache.get(&key("swim")).await.unwrap(), None);
        assert!(cache.is_empty().await);
    }

    #[tokio::test]
    async fn miss_on_content_change() {
        let cache = InMemoryResponseCache::new();
        cache
            .set(&key("swim"), json!(1), Duration::from_secs(60))
            .await
            .unwrap();

        assert_eq!(cache.get(&key("swim daily")).await.unwrap(), None);
    }

    #[tokio::test]
    async fn stats_count_requests_and_hits() {
        let cache = InMemoryResponseCache::new();
        assert_eq!(cache.stats().await, CacheStats::default());

        cache
            .set(&key("a"), json!(1), Duration::from_secs(60))
            .await
            .unwrap();
        cache.get(&key("a")).await.unwrap();
        cache.get(&key("b")).await.unwrap();

        let stats = cache.stats().await;
        assert_eq!(stats.total_requests, 2);
        assert_eq!(stats.cache_hits, 1);
        assert_eq!(stats.hit_rate, 0.5);
    }

    #[tokio::test]
    async fn clear_removes_entries_and_resets_stats() {
        let cache = InMemoryResponseCache::new();
        cache
            .set(&key("a"), json!(1), Duration::from_secs(60))
            .await
            .unwrap();
        cache.get(&key("a")).await.unwrap();

        cache.clear().await.unwrap();

        assert!(cache.is_empty().await);
        assert_eq!(cache.stats().await.total_requests, 0);
    }
}
