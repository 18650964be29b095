//! Enrichment - optional completion-service commentary.
//!
//! # Components
//!
//! - `AIJudgment` - Cache, queue, retry and timeout around the provider
//! - `CategoryContext` / `FinalContext` - Prompt inputs and cache keys
//! - `EnrichmentResult` - Tagged interpretation of a raw completion
//!
//! Enrichment never influences scores or rankings; it only adds text.

mod judgment;
mod prompts;
mod response;

pub use judgment::{AIJudgment, Judgment, JudgmentConfig};
pub use prompts::{CategoryContext, CategorySummary, FinalContext, RankedSummary, FINAL_SCOPE};
pub use response::{EnrichmentData, EnrichmentResult};
