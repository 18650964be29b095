//! FIFO request queue that serializes and paces enrichment calls.
//!
//! At most one call is in flight. A caller gets its slot when the previous
//! permit is dropped and `min_interval` has passed since the previous
//! dispatch started. Waiting is bounded by `max_queue_wait`.
//!
//! Fairness comes from `tokio::sync::Mutex`, which hands the lock to
//! waiters in the order they asked for it. Callers in the priority lane go
//! ahead of every standard caller that has not yet dispatched, so they wait
//! at most for the call in flight and the spacing after it.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};
use tokio::time::{sleep_until, timeout_at, Instant};

use super::config::RequestQueueConfig;

/// Request queue errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RateLimitError {
    /// The caller waited longer than `max_queue_wait` for a slot.
    #[error("timed out after {waited_ms}ms waiting for a request slot")]
    QueueTimeout { waited_ms: u64 },
}

/// Which line a caller waits in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Lane {
    #[default]
    Standard,
    /// Someone is blocked on the answer.
    Priority,
}

/// Serializes outbound calls for one engine.
#[derive(Debug, Clone)]
pub struct RequestQueue {
    config: RequestQueueConfig,
    /// Start instant of the most recent dispatch.
    last_dispatch: Arc<Mutex<Option<Instant>>>,
    priority_waiting: Arc<AtomicUsize>,
}

/// Counts a priority caller for as long as it is waiting.
struct PriorityWaiter(Arc<AtomicUsize>);

impl PriorityWaiter {
    fn register(counter: &Arc<AtomicUsize>) -> Self {
        counter.fetch_add(1, Ordering::SeqCst);
        Self(Arc::clone(counter))
    }
}

impl Drop for PriorityWaiter {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

/// Exclusive right to dispatch one call. Dropping it frees the queue.
#[derive(Debug)]
pub struct QueuePermit {
    _slot: OwnedMutexGuard<Option<Instant>>,
    dispatched_at: Instant,
}

impl QueuePermit {
    pub fn dispatched_at(&self) -> Instant {
        self.dispatched_at
    }
}

impl RequestQueue {
    pub fn new(config: RequestQueueConfig) -> Self {
        Self {
            config,
            last_dispatch: Arc::new(Mutex::new(None)),
            priority_waiting: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn config(&self) -> &RequestQueueConfig {
        &self.config
    }

    /// Waits for a dispatch slot in the standard lane.
    pub async fn acquire(&self) -> Result<QueuePermit, RateLimitError> {
        self.acquire_in(Lane::Standard).await
    }

    /// Waits for a dispatch slot.
    ///
    /// # Errors
    ///
    /// `RateLimitError::QueueTimeout` if the slot would not be available
    /// within `max_queue_wait`.
    pub async fn acquire_in(&self, lane: Lane) -> Result<QueuePermit, RateLimitError> {
        let requested_at = Instant::now();
        let deadline = requested_at + self.config.max_queue_wait;
        let timed_out = || RateLimitError::QueueTimeout {
            waited_ms: Instant::now().duration_since(requested_at).as_millis() as u64,
        };
        let _waiter = (lane == Lane::Priority)
            .then(|| PriorityWaiter::register(&self.priority_waiting));

        let mut slot = loop {
            let slot = timeout_at(deadline, self.last_dispatch.clone().lock_owned())
                .await
                .map_err(|_| timed_out())?;

            if let Some(last) = *slot {
                let ready_at = last + self.config.min_interval;
                if ready_at > deadline {
                    return Err(timed_out());
                }
                sleep_until(ready_at).await;
            }

            if lane == Lane::Standard && self.priority_waiting.load(Ordering::SeqCst) > 0 {
                // Hand the slot to the priority caller and queue up again.
                drop(slot);
                tokio::task::yield_now().await;
                continue;
            }
            break slot;
        };

        let dispatched_at = Instant::now();
        *slot = Some(dispatched_at);

        tracing::debug!(
            queued_ms = dispatched_at.duration_since(requested_at).as_millis() as u64,
            ?lane,
            "request slot acquired"
        );

        Ok(QueuePermit {
            _slot: slot,
            dispatched_at,
        })
    }
}

impl Default for RequestQueue {
    fn default() -> Self {
        Self::new(RequestQueueConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn queue(interval_secs: u64, wait_secs: u64) -> RequestQueue {
        RequestQueue::new(
            RequestQueueConfig::default()
                .with_min_interval(Duration::from_secs(interval_secs))
                .with_max_queue_wait(Duration::from_secs(wait_secs)),
        )
    }

    #[tokio::test(start_paused = true)]
    async fn first_acquire_is_immediate() {
        let queue = queue(12, 120);
        let start = Instant::now();
        let permit = queue.acquire().await.unwrap();
        assert_eq!(permit.dispatched_at(), start);
    }

    #[tokio::test(start_paused = true)]
    async fn consecutive_dispatches_are_spaced() {
        let queue = queue(12, 120);

        let first = queue.acquire().await.unwrap().dispatched_at();
        let second = queue.acquire().await.unwrap().dispatched_at();
        let third = queue.acquire().await.unwrap().dispatched_at();

        assert!(second.duration_since(first) >= Duration::from_secs(12));
        assert!(third.duration_since(second) >= Duration::from_secs(12));
    }

    #[tokio::test(start_paused = true)]
    async fn concurrent_callers_are_serialized() {
        let queue = queue(5, 120);
        let mut handles = Vec::new();
        for _ in 0..3 {
            let queue = queue.clone();
            handles.push(tokio::spawn(async move {
                let permit = queue.acquire().await.unwrap();
                tokio::time::sleep(Duration::from_secs(1)).await;
                permit.dispatched_at()
            }));
        }

        let mut starts = Vec::new();
        for handle in handles {
            starts.push(handle.await.unwrap());
        }
        starts.sort();

        for pair in starts.windows(2) {
            assert!(pair[1].duration_since(pair[0]) >= Duration::from_secs(5));
        }
    }

    #[tokio::test(start_paused = true)]
    async fn waiting_is_bounded() {
        let queue = queue(0, 10);
        let _held = queue.acquire().await.unwrap();

        let err = queue.acquire().await.unwrap_err();
        assert!(matches!(err, RateLimitError::QueueTimeout { waited_ms } if waited_ms >= 10_000));
    }

    #[tokio::test(start_paused = true)]
    async fn interval_longer_than_wait_times_out() {
        let queue = queue(30, 10);
        drop(queue.acquire().await.unwrap());

        assert!(queue.acquire().await.is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn dropped_permit_frees_the_queue() {
        let queue = queue(0, 1);
        {
            let _permit = queue.acquire().await.unwrap();
            // call fails here; the permit is still dropped
        }
        assert!(queue.acquire().await.is_ok());
    }

    #[tokio::test(start_paused = true)]
    async fn priority_caller_skips_waiting_standard_callers() {
        let queue = queue(12, 300);
        let start = Instant::now();
        drop(queue.acquire().await.unwrap());

        let mut standard = Vec::new();
        for _ in 0..4 {
            let queue = queue.clone();
            standard.push(tokio::spawn(async move {
                queue.acquire().await.unwrap().dispatched_at()
            }));
        }
        tokio::time::sleep(Duration::from_millis(10)).await;

        let priority = queue.acquire_in(Lane::Priority).await.unwrap().dispatched_at();
        assert_eq!(priority.duration_since(start), Duration::from_secs(12));

        for handle in standard {
            assert!(handle.await.unwrap() > priority);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn priority_waiter_is_released_on_timeout() {
        let queue = queue(0, 1);
        let held = queue.acquire().await.unwrap();
        assert!(queue.acquire_in(Lane::Priority).await.is_err());
        drop(held);

        assert_eq!(queue.priority_waiting.load(Ordering::SeqCst), 0);
        assert!(queue.acquire().await.is_ok());
    }
}
