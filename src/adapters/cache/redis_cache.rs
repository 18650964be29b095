//! Redis-backed response cache.
//!
//! Entries are stored as JSON strings with `SET ... EX`, so Redis handles
//! expiry. Hit statistics are kept per process.

use async_trait::async_trait;
use redis::aio::MultiplexedConnection;
use redis::AsyncCommands;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crate::ports::{CacheError, CacheKey, CacheStats, ResponseCache};

/// Namespace prepended to every key written by this adapter.
const KEY_NAMESPACE: &str = "pumpdrive:";

/// Redis `ResponseCache`.
#[derive(Clone)]
pub struct RedisResponseCache {
    conn: MultiplexedConnection,
    total_requests: Arc<AtomicU64>,
    cache_hits: Arc<AtomicU64>,
}

impl RedisResponseCache {
    pub fn new(conn: MultiplexedConnection) -> Self {
        Self {
            conn,
            total_requests: Arc::new(AtomicU64::new(0)),
            cache_hits: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Opens a multiplexed connection to `url`.
    pub async fn connect(url: &str) -> Result<Self, CacheError> {
        let client = redis::Client::open(url)
            .map_err(|e: redis::RedisError| CacheError::Unavailable(e.to_string()))?;
        let conn = client
            .get_multiplexed_tokio_connection()
            .await
            .map_err(|e: redis::RedisError| CacheError::Unavailable(e.to_string()))?;
        Ok(Self::new(conn))
    }

    fn redis_key(key: &CacheKey) -> String {
        format!("{}{}", KEY_NAMESPACE, key.as_str())
    }
}

#[async_trait]
impl ResponseCache for RedisResponseCache {
    async fn get(&self, key: &CacheKey) -> Result<Option<serde_json::Value>, CacheError> {
        self.total_requests.fetch_add(1, Ordering::Relaxed);
        let mut conn = self.conn.clone();

        let raw: Option<String> = conn
            .get(Self::redis_key(key))
            .await
            .map_err(|e: redis::RedisError| CacheError::Unavailable(e.to_string()))?;

        let Some(raw) = raw else {
            tracing::debug!(key = %key, "cache miss");
            return Ok(None);
        };

        match serde_json::from_str(&raw) {
            Ok(payload) => {
                self.cache_hits.fetch_add(1, Ordering::Relaxed);
                tracing::debug!(key = %key, "cache hit");
                Ok(Some(payload))
            }
            Err(e) => {
                tracing::warn!(key = %key, error = %e, "discarding undecodable cache entry");
                Ok(None)
            }
        }
    }

    async fn set(
        &self,
        key: &CacheKey,
        payload: serde_json::Value,
        ttl: Duration,
    ) -> Result<(), CacheError> {
        let encoded = serde_json::to_string(&payload)
            .map_err(|e| CacheError::Serialization(e.to_string()))?;
        let mut conn = self.conn.clone();

        redis::cmd("SET")
            .arg(Self::redis_key(key))
            .arg(encoded)
            .arg("EX")
            .arg(ttl.as_secs().max(1))
            .query_async::<_, ()>(&mut conn)
            .await
            .map_err(|e: redis::RedisError| CacheError::Unavailable(e.to_string()))?;

        Ok(())
    }

    async fn stats(&self) -> CacheStats {
        CacheStats::from_counts(
            self.total_requests.load(Ordering::Relaxed),
            self.cache_hits.load(Ordering::Relaxed),
        )
    }

    async fn clear(&self) -> Result<(), CacheError> {
        let mut conn = self.conn.clone();

        let keys: Vec<String> = conn
            .keys(format!("{}enrich:*", KEY_NAMESPACE))
            .await
            .map_err(|e: redis::RedisError| CacheError::Unavailable(e.to_string()))?;

        if !keys.is_empty() {
            conn.del::<_, ()>(keys)
                .await
                .map_err(|e: redis::RedisError| CacheError::Unavailable(e.to_string()))?;
        }

        self.total_requests.store(0, Ordering::Relaxed);
        self.cache_hits.store(0, Ordering::Relaxed);
        Ok(())
    }
}

impl std::fmt::Debug for RedisResponseCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedisResponseCache")
            .field("total_requests", &self.total_requests)
            .field("cache_hits", &self.cache_hits)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn keys_are_namespaced() {
        let key = CacheKey::for_enrichment("cost", "insurance");
        assert!(RedisResponseCache::redis_key(&key).starts_with("pumpdrive:enrich:cost:"));
    }

    #[tokio::test]
    #[ignore] // Requires a running Redis: cargo test -- --ignored
    async fn round_trips_against_local_redis() {
        let cache = RedisResponseCache::connect("redis://127.0.0.1/").await.unwrap();
        cache.clear().await.unwrap();

        let key = CacheKey::for_enrichment("support", "24/7 phone line");
        cache
            .set(&key, json!({"summary": "ok"}), Duration::from_secs(30))
            .await
            .unwrap();

        assert_eq!(cache.get(&key).await.unwrap(), Some(json!({"summary": "ok"})));
        assert_eq!(cache.stats().await.cache_hits, 1);
    }
}
