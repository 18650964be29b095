//! Device profile - one catalog entry and its per-category dimension weights.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::domain::foundation::{Category, Weight};

/// A printable technical attribute (e.g., "Reservoir: 300 units").
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TechnicalAttribute {
    pub name: String,
    pub value: String,
}

/// A device in the catalog.
///
/// Raw weights are kept as `f64` so that out-of-range data surfaces as a
/// catalog integrity error at load time rather than a parse error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviceProfile {
    pub id: String,
    pub brand: String,
    pub label: String,
    pub schema_version: u32,
    pub data_version: String,
    #[serde(default)]
    pub attributes: Vec<TechnicalAttribute>,
    pub sections: BTreeMap<Category, BTreeMap<String, f64>>,
    #[serde(default)]
    pub notes: BTreeMap<Category, String>,
    #[serde(default)]
    pub pros: Vec<String>,
    #[serde(default)]
    pub cons: Vec<String>,
    #[serde(default)]
    pub ideal_for: Option<String>,
}

impl DeviceProfile {
    /// Creates a profile with no sections (builder entry point for tests and tools).
    pub fn new(
        id: impl Into<String>,
        brand: impl Into<String>,
        label: impl Into<String>,
        schema_version: u32,
    ) -> Self {
        Self {
            id: id.into(),
            brand: brand.into(),
            label: label.into(),
            schema_version,
            data_version: String::from("unversioned"),
            attributes: Vec::new(),
            sections: BTreeMap::new(),
            notes: BTreeMap::new(),
            pros: Vec::new(),
            cons: Vec::new(),
            ideal_for: None,
        }
    }

    /// Sets a dimension weight.
    pub fn with_weight(mut self, category: Category, dimension: impl Into<String>, weight: f64) -> Self {
        self.sections
            .entry(category)
            .or_default()
            .insert(dimension.into(), weight);
        self
    }

    /// Sets the narrative note for a category.
    pub fn with_note(mut self, category: Category, note: impl Into<String>) -> Self {
        self.notes.insert(category, note.into());
        self
    }

    /// Sets the catalog-declared pros, cons and ideal-for text.
    pub fn with_summary(mut self, pros: &[&str], cons: &[&str], ideal_for: &str) -> Self {
        self.pros = pros.iter().map(|s| s.to_string()).collect();
        self.cons = cons.iter().map(|s| s.to_string()).collect();
        self.ideal_for = Some(ideal_for.to_string());
        self
    }

    /// Returns the device's weight for a dimension.
    pub fn weight(&self, category: Category, dimension: &str) -> Option<Weight> {
        self.sections
            .get(&category)
            .and_then(|dims| dims.get(dimension))
            .map(|w| Weight::new(*w))
    }

    /// Returns the mean of the device's weights in a category (0.0 if none).
    pub fn category_average(&self, category: Category) -> f64 {
        match self.sections.get(&category) {
            Some(dims) if !dims.is_empty() => dims.values().sum::<f64>() / dims.len() as f64,
            _ => 0.0,
        }
    }

    /// Returns the narrative note for a category, if any.
    pub fn note(&self, category: Category) -> Option<&str> {
        self.notes.get(&category).map(String::as_str)
    }

    /// Display name including the brand.
    pub fn display_name(&self) -> String {
        format!("{} ({})", self.label, self.brand)
    }
}
