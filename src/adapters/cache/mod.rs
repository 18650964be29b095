//! Response cache adapters.
//!
//! ## Available Adapters
//!
//! - `InMemoryResponseCache` - Process-local, tokio-clock TTLs
//! - `RedisResponseCache` - Redis-backed with `SET EX` expiry

mod in_memory;
mod redis_cache;

pub use in_memory::{CacheEntry, InMemoryResponseCache};
pub use redis_cache::RedisResponseCache;
