//! Response Cache Port - TTL-bounded memo of completion results.
//!
//! Keys are derived from the request content, so an identical category
//! answer reuses an earlier enrichment instead of spending another call.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;
use std::time::Duration;

/// Number of transcript characters that participate in the cache key.
pub const CACHE_KEY_PREFIX_CHARS: usize = 512;

/// Default lifetime of a cached entry.
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(3600);

/// Port for the enrichment cache.
///
/// Implementations count every `get` toward `total_requests` and every
/// successful lookup toward `cache_hits`.
#[async_trait]
pub trait ResponseCache: Send + Sync {
    /// Looks up a live entry.
    async fn get(&self, key: &CacheKey) -> Result<Option<serde_json::Value>, CacheError>;

    /// Stores an entry for `ttl`.
    async fn set(
        &self,
        key: &CacheKey,
        payload: serde_json::Value,
        ttl: Duration,
    ) -> Result<(), CacheError>;

    /// Returns hit statistics since creation or the last `clear`.
    async fn stats(&self) -> CacheStats;

    /// Removes every entry and resets statistics.
    async fn clear(&self) -> Result<(), CacheError>;
}

/// Content-derived cache key, rendered `enrich:{scope}:{sha256 hex}`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CacheKey(String);

impl CacheKey {
    /// Derives a key from a scope (a category id or "final") and text.
    ///
    /// Only the first [`CACHE_KEY_PREFIX_CHARS`] characters of the text
    /// participate.
    pub fn for_enrichment(scope: &str, text: &str) -> Self {
        let prefix: String = text.chars().take(CACHE_KEY_PREFIX_CHARS).collect();
        Self::digest(scope, &prefix)
    }

    /// Derives a key from the whole of `text`.
    ///
    /// For contexts assembled from several patient answers, where any
    /// difference anywhere in the text must yield a different key.
    pub fn for_full_text(scope: &str, text: &str) -> Self {
        Self::digest(scope, text)
    }

    fn digest(scope: &str, text: &str) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(scope.as_bytes());
        hasher.update([0x1f]);
        hasher.update(text.as_bytes());

        Self(format!("enrich:{}:{:x}", scope, hasher.finalize()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Cache hit statistics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct CacheStats {
    pub hit_rate: f64,
    pub total_requests: u64,
    pub cache_hits: u64,
}

impl CacheStats {
    /// Builds stats from raw counters; the hit rate is 0.0 with no requests.
    pub fn from_counts(total_requests: u64, cache_hits: u64) -> Self {
        let hit_rate = if total_requests == 0 {
            0.0
        } else {
            cache_hits as f64 / total_requests as f64
        };
        Self {
            hit_rate,
            total_requests,
            cache_hits,
        }
    }
}

/// Cache backend errors. Callers treat these as a miss or a skipped write.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CacheError {
    #[error("cache backend unavailable: {0}")]
    Unavailable(String),

    #[error("cache payload could not be encoded: {0}")]
    Serialization(String),
}
