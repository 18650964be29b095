//! Recommendation Module - Final ranking, narrative and printable report.
//!
//! # Components
//!
//! - `RecommendationAggregator` - Merges category top lists into one ranking
//! - `FinalRecommendation` - Derived result assembled on demand
//! - `fallback_narrative` - Deterministic narrative from catalog data
//!
//! All functions here are pure. The completion-service narrative is
//! requested by the application layer and passed in.

mod aggregator;
mod final_recommendation;
mod narrative;
mod report;

pub use aggregator::{AggregateEntry, AggregateRanking, RecommendationAggregator};
pub use final_recommendation::{FinalRecommendation, Narrative, RankedDevice};
pub use narrative::fallback_narrative;
