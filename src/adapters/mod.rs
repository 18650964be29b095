//! Adapters - Implementations of port interfaces.
//!
//! Adapters connect the engine to external systems:
//! - `ai` - Completion providers (Anthropic, mock, offline)
//! - `cache` - Response caches (in-memory, Redis)
//! - `rate_limiter` - FIFO pacing of outbound calls
//! - `storage` - Session stores (in-memory, file)

pub mod ai;
pub mod cache;
pub mod rate_limiter;
pub mod storage;
