//! Enrichment pacing, retry and caching configuration

use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;

/// Enrichment configuration
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct EnrichmentConfig {
    /// Whether to call the completion service at all
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    /// Lifetime of cached enrichment results
    #[serde(default = "default_cache_ttl")]
    pub cache_ttl_secs: u64,

    /// Minimum spacing between outbound calls
    #[serde(default = "default_min_interval")]
    pub min_interval_ms: u64,

    /// Longest wait for a request slot
    #[serde(default = "default_max_queue_wait")]
    pub max_queue_wait_secs: u64,

    /// First retry delay; doubles per attempt
    #[serde(default = "default_retry_base_delay")]
    pub retry_base_delay_ms: u64,

    /// Total attempts, including the first
    #[serde(default = "default_retry_max_attempts")]
    pub retry_max_attempts: u32,

    /// Ceiling for a single retry delay
    #[serde(default = "default_retry_max_delay")]
    pub retry_max_delay_ms: u64,

    /// Bound on waiting for the final narrative
    #[serde(default = "default_final_timeout")]
    pub final_narrative_timeout_secs: u64,
}

impl EnrichmentConfig {
    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }

    pub fn min_interval(&self) -> Duration {
        Duration::from_millis(self.min_interval_ms)
    }

    pub fn max_queue_wait(&self) -> Duration {
        Duration::from_secs(self.max_queue_wait_secs)
    }

    pub fn retry_base_delay(&self) -> Duration {
        Duration::from_millis(self.retry_base_delay_ms)
    }

    pub fn retry_max_delay(&self) -> Duration {
        Duration::from_millis(self.retry_max_delay_ms)
    }

    pub fn final_narrative_timeout(&self) -> Duration {
        Duration::from_secs(self.final_narrative_timeout_secs)
    }

    /// Validate enrichment configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.cache_ttl_secs == 0 {
            return Err(ValidationError::InvalidCacheTtl);
        }
        if self.max_queue_wait_secs == 0 {
            return Err(ValidationError::InvalidQueueWait);
        }
        if self.retry_max_attempts == 0 {
            return Err(ValidationError::InvalidRetryPolicy(
                "retry_max_attempts must be at least 1",
            ));
        }
        if self.retry_max_delay_ms < self.retry_base_delay_ms {
            return Err(ValidationError::InvalidRetryPolicy(
                "retry_max_delay_ms must not be below retry_base_delay_ms",
            ));
        }
        if self.final_narrative_timeout_secs == 0 {
            return Err(ValidationError::InvalidTimeout);
        }
        Ok(())
    }
}

impl Default for EnrichmentConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            cache_ttl_secs: default_cache_ttl(),
            min_interval_ms: default_min_interval(),
            max_queue_wait_secs: default_max_queue_wait(),
            retry_base_delay_ms: default_retry_base_delay(),
            retry_max_attempts: default_retry_max_attempts(),
            retry_max_delay_ms: default_retry_max_delay(),
            final_narrative_timeout_secs: default_final_timeout(),
        }
    }
}

fn default_enabled() -> bool {
    true
}

fn default_cache_ttl() -> u64 {
    3600
}

fn default_min_interval() -> u64 {
    12_000
}

fn default_max_queue_wait() -> u64 {
    120
}

fn default_retry_base_delay() -> u64 {
    3000
}

fn default_retry_max_attempts() -> u32 {
    5
}

fn default_retry_max_delay() -> u64 {
    60_000
}

fn default_final_timeout() -> u64 {
    45
}
