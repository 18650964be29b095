//! Recommendation Aggregator - merges per-category top devices into one ranking.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::domain::catalog::Catalog;
use crate::domain::foundation::{Category, ValidationError};
use crate::domain::session::SessionState;

/// One device's standing across the answered categories.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregateEntry {
    pub device_id: String,
    pub label: String,
    /// Priority-weighted mean of the device's category scores.
    pub aggregate_score: f64,
    /// Categories where the device made the top list, canonical order.
    pub categories: Vec<Category>,
    /// 1-based overall rank.
    pub rank: usize,
}

impl AggregateEntry {
    /// Earliest category (canonical order) the device appeared in.
    pub fn first_category(&self) -> Option<Category> {
        self.categories.first().copied()
    }
}

/// Result of aggregation, best device first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregateRanking {
    pub entries: Vec<AggregateEntry>,
    pub answered_categories: Vec<Category>,
    pub missing_categories: Vec<Category>,
}

impl AggregateRanking {
    pub fn winner(&self) -> Option<&AggregateEntry> {
        self.entries.first()
    }

    pub fn runner_up(&self) -> Option<&AggregateEntry> {
        self.entries.get(1)
    }

    pub fn is_partial(&self) -> bool {
        !self.missing_categories.is_empty()
    }
}

#[derive(Default)]
struct Accumulator {
    label: String,
    weighted_sum: f64,
    priority_sum: f64,
    plain_sum: f64,
    categories: Vec<Category>,
}

/// Pure aggregation functions.
pub struct RecommendationAggregator;

impl RecommendationAggregator {
    /// Aggregates every scored category of a session.
    ///
    /// # Algorithm
    /// For each device that appeared in any category's top list:
    /// aggregate = Σ(priority[c]·score[c]) / Σ priority[c] over the
    /// categories where it appeared. With equal priorities this is the plain
    /// mean over appearances, not over all six categories.
    ///
    /// Sorted by aggregate desc, then earliest first-appearance category,
    /// then catalog order.
    ///
    /// # Errors
    ///
    /// - `NoCategoriesScored` if the session holds no scores
    pub fn aggregate(
        session: &SessionState,
        catalog: &Catalog,
    ) -> Result<AggregateRanking, ValidationError> {
        let scored = session.scored();
        if scored.is_empty() {
            return Err(ValidationError::NoCategoriesScored);
        }

        let mut accumulators: BTreeMap<String, Accumulator> = BTreeMap::new();
        for category_score in &scored {
            let priority = session.signal().priority(category_score.category).value();
            for device in &category_score.top_devices {
                let acc = accumulators.entry(device.device_id.clone()).or_default();
                if acc.label.is_empty() {
                    acc.label = device.label.clone();
                }
                acc.weighted_sum += priority * device.score;
                acc.priority_sum += priority;
                acc.plain_sum += device.score;
                acc.categories.push(category_score.category);
            }
        }

        let mut entries: Vec<AggregateEntry> = accumulators
            .into_iter()
            .map(|(device_id, acc)| {
                let aggregate_score = if acc.priority_sum > 0.0 {
                    acc.weighted_sum / acc.priority_sum
                } else {
                    acc.plain_sum / acc.categories.len() as f64
                };
                let mut categories = acc.categories;
                categories.sort();
                categories.dedup();
                AggregateEntry {
                    device_id,
                    label: acc.label,
                    aggregate_score: aggregate_score.clamp(0.0, 100.0),
                    categories,
                    rank: 0,
                }
            })
            .collect();

        entries.sort_by(|a, b| {
            b.aggregate_score
                .total_cmp(&a.aggregate_score)
                .then_with(|| a.first_category().cmp(&b.first_category()))
                .then_with(|| {
                    let pa = catalog.position(&a.device_id).unwrap_or(usize::MAX);
                    let pb = catalog.position(&b.device_id).unwrap_or(usize::MAX);
                    pa.cmp(&pb)
                })
        });
        for (i, entry) in entries.iter_mut().enumerate() {
            entry.rank = i + 1;
        }

        let answered_categories: Vec<Category> = scored.iter().map(|s| s.category).collect();
        let missing_categories = session.missing_categories();

        if !missing_categories.is_empty() {
            tracing::info!(
                answered = answered_categories.len(),
                missing = missing_categories.len(),
                "aggregating partial assessment"
            );
        }

        Ok(AggregateRanking {
            entries,
            answered_categories,
            missing_categories,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::catalog::test_support::{filled_device, minimal_schema};
    use crate::domain::foundation::{ScoreId, Timestamp, Weight};
    use crate::domain::preference::DimensionWeights;
    use crate::domain::scoring::{CategoryScore, DeviceScore};

    fn catalog() -> Catalog {
        Catalog::load(
            "test",
            minimal_schema(),
            vec![
                filled_device("a", 0.5),
                filled_device("b", 0.5),
                filled_device("c", 0.5),
            ],
        )
        .unwrap()
    }

    fn device(id: &str, score: f64, rank: usize) -> DeviceScore {
        DeviceScore {
            device_id: id.to_string(),
            label: id.to_uppercase(),
            score,
            contribution: score / 100.0,
            rank,
            is_winner: rank == 1,
            reasons: vec![],
        }
    }

    fn category_score(category: Category, top: Vec<DeviceScore>) -> CategoryScore {
        CategoryScore {
            id: ScoreId::new(),
            category,
            title: category.title().to_string(),
            transcript: String::new(),
            topics: vec![],
            facts: vec![],
            top_devices: top,
            neutral: false,
            created_at: Timestamp::now(),
            narrative: None,
        }
    }

    fn session_with(scores: Vec<CategoryScore>) -> SessionState {
        let mut session = SessionState::new();
        for score in scores {
            session.record_score(score, DimensionWeights::new()).unwrap();
        }
        session
    }

    #[test]
    fn empty_session_is_rejected() {
        let err = RecommendationAggregator::aggregate(&SessionState::new(), &catalog()).unwrap_err();
        assert_eq!(err, ValidationError::NoCategoriesScored);
    }

    #[test]
    fn mean_is_over_appearances_only() {
        let session = session_with(vec![
            category_score(Category::Cost, vec![device("a", 90.0, 1), device("b", 60.0, 2)]),
            category_score(Category::Lifestyle, vec![device("b", 80.0, 1), device("c", 70.0, 2)]),
        ]);

        let ranking = RecommendationAggregator::aggregate(&session, &catalog()).unwrap();

        let a = ranking.entries.iter().find(|e| e.device_id == "a").unwrap();
        let b = ranking.entries.iter().find(|e| e.device_id == "b").unwrap();
        assert!((a.aggregate_score - 90.0).abs() < 1e-9);
        assert!((b.aggregate_score - 70.0).abs() < 1e-9);
        assert_eq!(ranking.winner().unwrap().device_id, "a");
        assert_eq!(ranking.runner_up().unwrap().device_id, "b");
    }

    #[test]
    fn ties_prefer_earliest_category_then_catalog_order() {
        let session = session_with(vec![
            category_score(Category::Cost, vec![device("c", 80.0, 1)]),
            category_score(Category::Support, vec![device("a", 80.0, 1), device("b", 80.0, 2)]),
        ]);

        let ranking = RecommendationAggregator::aggregate(&session, &catalog()).unwrap();
        let order: Vec<_> = ranking.entries.iter().map(|e| e.device_id.as_str()).collect();
        assert_eq!(order, vec!["c", "a", "b"]);
    }

    #[test]
    fn priorities_weight_the_mean() {
        let mut session = session_with(vec![
            category_score(Category::Cost, vec![device("a", 100.0, 1)]),
            category_score(Category::Lifestyle, vec![device("a", 40.0, 1)]),
        ]);
        session.set_priority(Category::Lifestyle, Weight::new(0.5));

        let ranking = RecommendationAggregator::aggregate(&session, &catalog()).unwrap();
        // (1.0·100 + 0.5·40) / 1.5 = 80
        assert!((ranking.entries[0].aggregate_score - 80.0).abs() < 1e-9);
    }

    #[test]
    fn missing_categories_are_flagged() {
        let session = session_with(vec![
            category_score(Category::Cost, vec![device("a", 90.0, 1)]),
            category_score(Category::Algorithm, vec![device("a", 90.0, 1)]),
            category_score(Category::Complexity, vec![device("a", 90.0, 1)]),
            category_score(Category::Support, vec![device("a", 90.0, 1)]),
        ]);

        let ranking = RecommendationAggregator::aggregate(&session, &catalog()).unwrap();
        assert!(ranking.is_partial());
        assert_eq!(
            ranking.missing_categories,
            vec![Category::Lifestyle, Category::EaseToStart]
        );
        assert_eq!(ranking.answered_categories.len(), 4);
    }
}
