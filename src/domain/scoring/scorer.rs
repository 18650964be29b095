//! Deterministic Scorer - matches catalog devices against patient weights.

use serde::{Deserialize, Serialize};

use crate::domain::catalog::{Catalog, DeviceProfile, DimensionSchema};
use crate::domain::foundation::{Category, Weight};
use crate::domain::preference::DimensionWeights;

/// Number of devices kept per category.
pub const TOP_K: usize = 2;

/// Minimum patient weight for a dimension to be cited as a reason.
pub const REASON_PATIENT_THRESHOLD: f64 = 0.5;

/// Minimum device weight for a dimension to be cited as a reason.
pub const REASON_DEVICE_THRESHOLD: f64 = 0.7;

/// Why a device scored well on a dimension.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchReason {
    pub dimension: String,
    pub label: String,
    pub patient_weight: Weight,
    pub device_weight: Weight,
}

impl MatchReason {
    /// Human-readable sentence for reports.
    pub fn describe(&self) -> String {
        format!(
            "{}: matters to you ({}), strong on this device ({})",
            self.label, self.patient_weight, self.device_weight
        )
    }
}

/// One device's match score in one category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviceScore {
    pub device_id: String,
    pub label: String,
    /// Match score in [0, 100].
    pub score: f64,
    /// Raw weighted contribution Σ(p·w), used as the first tie-breaker.
    pub contribution: f64,
    /// 1-based rank within the category.
    pub rank: usize,
    pub is_winner: bool,
    pub reasons: Vec<MatchReason>,
}

/// All catalog devices for one category, best first.
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryRanking {
    pub category: Category,
    /// True when the patient expressed nothing usable and scores are neutral.
    pub neutral: bool,
    pub scores: Vec<DeviceScore>,
}

impl CategoryRanking {
    /// Returns the best `k` devices.
    pub fn top(&self, k: usize) -> Vec<DeviceScore> {
        self.scores.iter().take(k).cloned().collect()
    }

    /// Returns the rank-1 device, if the catalog is non-empty.
    pub fn winner(&self) -> Option<&DeviceScore> {
        self.scores.first()
    }
}

/// Pure scoring functions.
pub struct DeterministicScorer;

impl DeterministicScorer {
    /// Scores every catalog device for a category.
    ///
    /// # Algorithm
    /// score = 100 × Σ(p[d]·w[d]) / Σ p[d] over the dimensions the patient
    /// expressed. When nothing was expressed (or Σp = 0) the score is the
    /// neutral 100 × mean(device weights in the category).
    ///
    /// Sorted by score desc, contribution desc, then catalog order.
    ///
    /// # Edge Cases
    /// - Dimensions unknown to the schema: ignored
    /// - Empty patient weights: neutral scores, no reasons
    pub fn score(
        category: Category,
        patient: &DimensionWeights,
        catalog: &Catalog,
    ) -> CategoryRanking {
        let schema = catalog.schema();
        let expressed = Self::expressed_dimensions(category, patient, schema);
        let total_priority: f64 = expressed.iter().map(|(_, p)| p.value()).sum();
        let neutral = total_priority <= 0.0;

        let mut ranked: Vec<(usize, DeviceScore)> = catalog
            .get_all()
            .iter()
            .enumerate()
            .map(|(index, device)| {
                let score = if neutral {
                    Self::neutral_score(category, device)
                } else {
                    Self::weighted_score(category, device, &expressed, total_priority, schema)
                };
                (index, score)
            })
            .collect();

        ranked.sort_by(|(ia, a), (ib, b)| {
            b.score
                .total_cmp(&a.score)
                .then_with(|| b.contribution.total_cmp(&a.contribution))
                .then_with(|| ia.cmp(ib))
        });

        let scores = ranked
            .into_iter()
            .enumerate()
            .map(|(position, (_, mut score))| {
                score.rank = position + 1;
                score.is_winner = position == 0;
                score
            })
            .collect();

        tracing::debug!(
            category = category.id(),
            expressed = expressed.len(),
            neutral,
            "category scored"
        );

        CategoryRanking {
            category,
            neutral,
            scores,
        }
    }

    /// Patient dimensions the schema knows, in schema order.
    fn expressed_dimensions<'a>(
        category: Category,
        patient: &'a DimensionWeights,
        schema: &DimensionSchema,
    ) -> Vec<(&'a str, Weight)> {
        for key in patient.keys() {
            if !schema.contains(category, key) {
                tracing::debug!(category = category.id(), dimension = %key, "ignoring unknown dimension");
            }
        }

        schema
            .dimensions(category)
            .iter()
            .filter_map(|dim| {
                patient
                    .get_key_value(&dim.key)
                    .map(|(key, weight)| (key.as_str(), *weight))
            })
            .collect()
    }

    fn weighted_score(
        category: Category,
        device: &DeviceProfile,
        expressed: &[(&str, Weight)],
        total_priority: f64,
        schema: &DimensionSchema,
    ) -> DeviceScore {
        let mut contribution = 0.0;
        let mut reasons = Vec::new();

        for (dimension, patient_weight) in expressed {
            let device_weight = device.weight(category, dimension).unwrap_or(Weight::ZERO);
            contribution += patient_weight.value() * device_weight.value();

            if patient_weight.at_least(REASON_PATIENT_THRESHOLD)
                && device_weight.at_least(REASON_DEVICE_THRESHOLD)
            {
                reasons.push(MatchReason {
                    dimension: dimension.to_string(),
                    label: schema.label(category, dimension).to_string(),
                    patient_weight: *patient_weight,
                    device_weight,
                });
            }
        }

        DeviceScore {
            device_id: device.id.clone(),
            label: device.label.clone(),
            score: clamp_score(100.0 * contribution / total_priority),
            contribution,
            rank: 0,
            is_winner: false,
            reasons,
        }
    }

    fn neutral_score(category: Category, device: &DeviceProfile) -> DeviceScore {
        let average = device.category_average(category);
        let contribution = device
            .sections
            .get(&category)
            .map(|dims| dims.values().sum::<f64>())
            .unwrap_or(0.0);

        DeviceScore {
            device_id: device.id.clone(),
            label: device.label.clone(),
            score: clamp_score(100.0 * average),
            contribution,
            rank: 0,
            is_winner: false,
            reasons: Vec::new(),
        }
    }
}

fn clamp_score(score: f64) -> f64 {
    if score.is_nan() {
        return 0.0;
    }
    score.clamp(0.0, 100.0)
}
