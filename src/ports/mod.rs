//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the domain and the outside world. Adapters implement these ports.
//!
//! - `AIProvider` - Remote completion service used for optional enrichment
//! - `ResponseCache` - TTL-bounded memo of enrichment results
//! - `SessionStore` - Whole-value persistence of the assessment session

mod ai_provider;
mod response_cache;
mod session_store;

pub use ai_provider::{
    AIError, AIProvider, CompletionRequest, CompletionResponse, FinishReason, Message,
    MessageRole, ProviderInfo, RequestMetadata, TokenUsage,
};
pub use response_cache::{
    CacheError, CacheKey, CacheStats, ResponseCache, CACHE_KEY_PREFIX_CHARS, DEFAULT_CACHE_TTL,
};
pub use session_store::{SessionStore, SessionStoreError};
