//! Preference Module - Patient-side weights derived from category answers.
//!
//! # Components
//!
//! - `Signal` - Accumulated per-category dimension weights and priorities
//! - `PreferenceExtractor` - Rule-based extraction from free text and topics

mod extractor;
mod rules;
mod signal;

pub use extractor::{ExtractedFact, ExtractedPreferences, PreferenceExtractor};
pub use signal::{DimensionWeights, Signal};
