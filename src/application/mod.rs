//! Application layer - Commands, Handlers and the engine façade.
//!
//! This layer orchestrates domain operations and coordinates between ports.
//! The domain stays pure; everything that waits on I/O or time lives here.

pub mod engine;
pub mod enrichment;
pub mod errors;
pub mod handlers;
pub mod retry_policy;
pub mod session_handle;

pub use engine::{EngineBuilder, RecommendationEngine, DEFAULT_FINAL_NARRATIVE_TIMEOUT};
pub use enrichment::{AIJudgment, EnrichmentResult, Judgment, JudgmentConfig};
pub use errors::EngineError;
pub use retry_policy::RetryPolicy;
pub use session_handle::SessionHandle;
