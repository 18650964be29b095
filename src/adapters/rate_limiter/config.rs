//! Request queue configuration.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Pacing for outbound enrichment calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestQueueConfig {
    /// Minimum spacing between dispatch starts.
    pub min_interval: Duration,
    /// Longest a caller may wait for its slot.
    pub max_queue_wait: Duration,
}

impl Default for RequestQueueConfig {
    fn default() -> Self {
        Self {
            min_interval: Duration::from_millis(12_000),
            max_queue_wait: Duration::from_secs(120),
        }
    }
}

impl RequestQueueConfig {
    /// No spacing and a generous wait; useful for tests.
    pub fn unthrottled() -> Self {
        Self {
            min_interval: Duration::ZERO,
            max_queue_wait: Duration::from_secs(120),
        }
    }

    pub fn with_min_interval(mut self, interval: Duration) -> Self {
        self.min_interval = interval;
        self
    }

    pub fn with_max_queue_wait(mut self, wait: Duration) -> Self {
        self.max_queue_wait = wait;
        self
    }
}
