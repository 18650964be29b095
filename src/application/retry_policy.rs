//! RetryPolicy - exponential backoff shared by outbound call sites.
//!
//! Delays run on the tokio clock, so tests can drive them with a paused
//! runtime.

use std::fmt;
use std::future::Future;
use std::time::Duration;
use tokio::time::sleep;

/// Exponential backoff with a classifier deciding which errors are retried.
///
/// Attempt `n` (1-based) that fails with a retryable error is followed by a
/// delay of `base_delay * 2^(n-1)`, raised to any wait the error itself
/// asks for, and capped at `max_delay`.
pub struct RetryPolicy<E> {
    /// Total attempts, including the first.
    pub max_attempts: u32,
    pub base_delay: Duration,
    pub max_delay: Duration,
    pub is_retryable: fn(&E) -> bool,
    /// Minimum wait requested by the error, e.g. a provider's retry-after.
    pub requested_delay: fn(&E) -> Option<Duration>,
}

impl<E> RetryPolicy<E> {
    pub fn new(
        max_attempts: u32,
        base_delay: Duration,
        max_delay: Duration,
        is_retryable: fn(&E) -> bool,
    ) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            base_delay,
            max_delay,
            is_retryable,
            requested_delay: |_| None,
        }
    }

    pub fn with_requested_delay(mut self, requested_delay: fn(&E) -> Option<Duration>) -> Self {
        self.requested_delay = requested_delay;
        self
    }

    /// Delay after failed attempt `attempt` (1-based).
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1).min(31);
        self.base_delay
            .saturating_mul(1u32 << exponent)
            .min(self.max_delay)
    }

    /// Delay after `err` ended attempt `attempt`.
    pub fn delay_after(&self, attempt: u32, err: &E) -> Duration {
        let backoff = self.delay_for(attempt);
        match (self.requested_delay)(err) {
            Some(requested) => backoff.max(requested).min(self.max_delay),
            None => backoff,
        }
    }

    /// Runs `operation` until it succeeds, fails permanently, or attempts
    /// run out. The operation receives the 1-based attempt number.
    pub async fn execute<T, F, Fut>(&self, mut operation: F) -> Result<T, E>
    where
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: fmt::Display,
    {
        let mut attempt = 1;
        loop {
            match operation(attempt).await {
                Ok(value) => return Ok(value),
                Err(err) if attempt < self.max_attempts && (self.is_retryable)(&err) => {
                    let delay = self.delay_after(attempt, &err);
                    tracing::warn!(
                        attempt,
                        max_attempts = self.max_attempts,
                        delay_ms = delay.as_millis() as u64,
                        error = %err,
                        "retrying after transient failure"
                    );
                    sleep(delay).await;
                    attempt += 1;
                }
                Err(err) => return Err(err),
            }
        }
    }
}

impl<E> Clone for RetryPolicy<E> {
    fn clone(&self) -> Self {
        Self {
            max_attempts: self.max_attempts,
            base_delay: self.base_delay,
            max_delay: self.max_delay,
            is_retryable: self.is_retryable,
            requested_delay: self.requested_delay,
        }
    }
}

impl<E> fmt::Debug for RetryPolicy<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RetryPolicy")
            .field("max_attempts", &self.max_attempts)
            .field("base_delay", &self.base_delay)
            .field("max_delay", &self.max_delay)
            .finish_non_exhaustive()
    }
}
