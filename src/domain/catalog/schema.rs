//! Dimension schema - the versioned list of dimensions per category.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::domain::foundation::Category;

/// A named attribute within a category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DimensionDef {
    /// Machine key (e.g., "water_resistance").
    pub key: String,
    /// Human label used in reasons and reports.
    pub label: String,
}

impl DimensionDef {
    /// Creates a new dimension definition.
    pub fn new(key: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            label: label.into(),
        }
    }
}

/// Versioned dimension schema shared by all device profiles.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DimensionSchema {
    pub version: u32,
    pub categories: BTreeMap<Category, Vec<DimensionDef>>,
}

impl DimensionSchema {
    /// Creates an empty schema with the given version.
    pub fn new(version: u32) -> Self {
        Self {
            version,
            categories: BTreeMap::new(),
        }
    }

    /// Adds a dimension to a category (builder style).
    pub fn with_dimension(
        mut self,
        category: Category,
        key: impl Into<String>,
        label: impl Into<String>,
    ) -> Self {
        self.categories
            .entry(category)
            .or_default()
            .push(DimensionDef::new(key, label));
        self
    }

    /// Returns the dimensions defined for a category, in declaration order.
    pub fn dimensions(&self, category: Category) -> &[DimensionDef] {
        self.categories
            .get(&category)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Looks up a single dimension definition.
    pub fn dimension(&self, category: Category, key: &str) -> Option<&DimensionDef> {
        self.dimensions(category).iter().find(|d| d.key == key)
    }

    /// Returns true if the category defines the dimension.
    pub fn contains(&self, category: Category, key: &str) -> bool {
        self.dimension(category, key).is_some()
    }

    /// Returns the human label for a dimension, falling back to its key.
    pub fn label<'a>(&'a self, category: Category, key: &'a str) -> &'a str {
        self.dimension(category, key)
            .map(|d| d.label.as_str())
            .unwrap_or(key)
    }
}
