//! Signal - the patient-side weight map, built incrementally per category.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::domain::foundation::{Category, Weight};

/// Dimension weights for one category.
pub type DimensionWeights = BTreeMap<String, Weight>;

/// How much the patient cares about each dimension, per category.
///
/// Categories are replaced whole when re-answered; a category the patient
/// has not answered is simply absent. Priorities default to equal (1.0).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Signal {
    #[serde(default)]
    weights: BTreeMap<Category, DimensionWeights>,
    #[serde(default)]
    priorities: BTreeMap<Category, Weight>,
}

impl Signal {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces all weights for a category.
    pub fn set_category(&mut self, category: Category, weights: DimensionWeights) {
        self.weights.insert(category, weights);
    }

    /// Sets a single dimension weight (builder style).
    pub fn with(mut self, category: Category, dimension: impl Into<String>, weight: f64) -> Self {
        self.weights
            .entry(category)
            .or_default()
            .insert(dimension.into(), Weight::new(weight));
        self
    }

    /// Returns the weights expressed for a category, if answered.
    pub fn category(&self, category: Category) -> Option<&DimensionWeights> {
        self.weights.get(&category)
    }

    /// Removes a category's weights.
    pub fn clear_category(&mut self, category: Category) {
        self.weights.remove(&category);
    }

    /// Sets the relative priority of a category.
    pub fn set_priority(&mut self, category: Category, priority: Weight) {
        self.priorities.insert(category, priority);
    }

    /// Relative priority of a category (1.0 unless set).
    pub fn priority(&self, category: Category) -> Weight {
        self.priorities.get(&category).copied().unwrap_or(Weight::ONE)
    }

    /// Returns true if no category carries any weight.
    pub fn is_empty(&self) -> bool {
        self.weights.values().all(|dims| dims.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_sets_weights() {
        let signal = Signal::new().with(Category::Cost, "upfront", 1.0);
        let cost = signal.category(Category::Cost).unwrap();
        assert_eq!(cost.get("upfront"), Some(&Weight::ONE));
        assert!(signal.category(Category::Lifestyle).is_none());
    }

    #[test]
    fn set_category_replaces_previous_answer() {
        let mut signal = Signal::new()
            .with(Category::Lifestyle, "travel", 0.9)
            .with(Category::Lifestyle, "discretion", 0.4);

        let mut replacement = DimensionWeights::new();
        replacement.insert("water_resistance".to_string(), Weight::new(0.8));
        signal.set_category(Category::Lifestyle, replacement);

        let lifestyle = signal.category(Category::Lifestyle).unwrap();
        assert_eq!(lifestyle.len(), 1);
        assert!(lifestyle.contains_key("water_resistance"));
    }

    #[test]
    fn priority_defaults_to_one() {
        let mut signal = Signal::new();
        assert_eq!(signal.priority(Category::Support), Weight::ONE);

        signal.set_priority(Category::Support, Weight::new(0.5));
        assert_eq!(signal.priority(Category::Support), Weight::new(0.5));
    }

    #[test]
    fn empty_signal_reports_empty() {
        assert!(Signal::new().is_empty());
        assert!(!Signal::new().with(Category::Cost, "upfront", 0.2).is_empty());
    }
}
