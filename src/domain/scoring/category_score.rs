//! CategoryScore - the stored outcome of one category submission.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{Category, ScoreId, Timestamp};
use crate::domain::preference::ExtractedFact;

use super::{CategoryRanking, DeviceScore, TOP_K};

/// Where a piece of narrative text came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NarrativeSource {
    /// Served from the response cache.
    Cache,
    /// Returned by the completion service on this request.
    Remote,
    /// Built locally from catalog data.
    Fallback,
}

impl NarrativeSource {
    /// True if the text came from the completion service (directly or cached).
    pub fn is_ai(&self) -> bool {
        matches!(self, NarrativeSource::Cache | NarrativeSource::Remote)
    }
}

/// Optional qualitative commentary attached to a category score.
///
/// Never authoritative: it explains the deterministic ranking but cannot
/// change it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryNarrative {
    pub text: String,
    #[serde(default)]
    pub strengths: Vec<String>,
    #[serde(default)]
    pub considerations: Vec<String>,
    pub source: NarrativeSource,
    pub attached_at: Timestamp,
}

/// Scored result for one category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryScore {
    pub id: ScoreId,
    pub category: Category,
    pub title: String,
    pub transcript: String,
    #[serde(default)]
    pub topics: Vec<String>,
    #[serde(default)]
    pub facts: Vec<ExtractedFact>,
    pub top_devices: Vec<DeviceScore>,
    /// True when no preference was expressed and scores are neutral.
    #[serde(default)]
    pub neutral: bool,
    pub created_at: Timestamp,
    #[serde(default)]
    pub narrative: Option<CategoryNarrative>,
}

impl CategoryScore {
    /// Builds a score from a ranking, keeping the top devices.
    pub fn from_ranking(
        ranking: &CategoryRanking,
        transcript: impl Into<String>,
        topics: Vec<String>,
        facts: Vec<ExtractedFact>,
    ) -> Self {
        Self {
            id: ScoreId::new(),
            category: ranking.category,
            title: ranking.category.title().to_string(),
            transcript: transcript.into(),
            topics,
            facts,
            top_devices: ranking.top(TOP_K),
            neutral: ranking.neutral,
            created_at: Timestamp::now(),
            narrative: None,
        }
    }

    /// The rank-1 device.
    pub fn winner(&self) -> Option<&DeviceScore> {
        self.top_devices.first()
    }

    /// Looks up a device among the kept top devices.
    pub fn device(&self, device_id: &str) -> Option<&DeviceScore> {
        self.top_devices.iter().find(|d| d.device_id == device_id)
    }

    /// Returns a copy with the narrative replaced.
    pub fn with_narrative(&self, narrative: CategoryNarrative) -> Self {
        Self {
            narrative: Some(narrative),
            ..self.clone()
        }
    }

    pub fn has_narrative(&self) -> bool {
        self.narrative.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::catalog::Catalog;
    use crate::domain::preference::Signal;
    use crate::domain::scoring::DeterministicScorer;

    fn lifestyle_score() -> CategoryScore {
        let catalog = Catalog::builtin().unwrap();
        let signal = Signal::new().with(Category::Lifestyle, "water_resistance", 1.0);
        let ranking = DeterministicScorer::score(
            Category::Lifestyle,
            signal.category(Category::Lifestyle).unwrap(),
            &catalog,
        );
        CategoryScore::from_ranking(&ranking, "I swim daily", vec![], vec![])
    }

    #[test]
    fn keeps_top_two_with_winner_first() {
        let score = lifestyle_score();
        assert_eq!(score.top_devices.len(), TOP_K);
        assert!(score.winner().unwrap().is_winner);
        assert_eq!(score.title, "Lifestyle & Activities");
        assert!(score.narrative.is_none());
    }

    #[test]
    fn with_narrative_preserves_deterministic_fields() {
        let score = lifestyle_score();
        let enriched = score.with_narrative(CategoryNarrative {
            text: "Both pumps handle water well.".to_string(),
            strengths: vec![],
            considerations: vec![],
            source: NarrativeSource::Remote,
            attached_at: Timestamp::now(),
        });

        assert_eq!(enriched.id, score.id);
        assert_eq!(enriched.top_devices, score.top_devices);
        assert!(enriched.has_narrative());
    }

    #[test]
    fn round_trips_through_json() {
        let score = lifestyle_score();
        let json = serde_json::to_value(&score).unwrap();
        assert_eq!(json["category"], "lifestyle");
        let back: CategoryScore = serde_json::from_value(json).unwrap();
        assert_eq!(back.id, score.id);
        assert_eq!(back.created_at, score.created_at);
        assert_eq!(back.top_devices.len(), score.top_devices.len());
    }

    #[test]
    fn narrative_source_reports_ai_origin() {
        assert!(NarrativeSource::Remote.is_ai());
        assert!(NarrativeSource::Cache.is_ai());
        assert!(!NarrativeSource::Fallback.is_ai());
    }
}
