//! Scoring Module - Deterministic per-category device ranking.
//!
//! # Components
//!
//! - `DeterministicScorer` - Pure weighted-match scoring of every catalog device
//! - `CategoryRanking` - Full ordered ranking for one category
//! - `CategoryScore` - The stored top-K result, with optional narrative
//!
//! # Design Philosophy
//!
//! Scoring never depends on the completion service. Narrative attachments
//! explain a score but never change it.

mod category_score;
mod scorer;

pub use category_score::{CategoryNarrative, CategoryScore, NarrativeSource};
pub use scorer::{
    CategoryRanking, DeterministicScorer, DeviceScore, MatchReason, REASON_DEVICE_THRESHOLD,
    REASON_PATIENT_THRESHOLD, TOP_K,
};
