//! Rate limiting for outbound enrichment calls.
//!
//! ## Usage
//!
//! ```ignore
//! use pumpdrive_engine::adapters::rate_limiter::{RequestQueue, RequestQueueConfig};
//!
//! let queue = RequestQueue::new(RequestQueueConfig::default());
//! let permit = queue.acquire().await?;
//! let response = provider.complete(request).await;
//! drop(permit);
//! ```

mod config;
mod request_queue;

pub use config::RequestQueueConfig;
pub use request_queue::{Lane, QueuePermit, RateLimitError, RequestQueue};
