//! Category enum representing the six fixed preference categories.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::ValidationError;

/// The six preference categories, in canonical assessment order.
///
/// Derived `Ord` follows declaration order, which is the canonical order
/// used for tie-breaking during aggregation.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Cost,
    Lifestyle,
    Algorithm,
    EaseToStart,
    Complexity,
    Support,
}

impl Category {
    /// Returns all categories in canonical order.
    pub fn all() -> &'static [Category] {
        &[
            Category::Cost,
            Category::Lifestyle,
            Category::Algorithm,
            Category::EaseToStart,
            Category::Complexity,
            Category::Support,
        ]
    }

    /// Returns the 0-based index of this category in the canonical order.
    pub fn order_index(&self) -> usize {
        *self as usize
    }

    /// Stable machine identifier (matches the serde representation).
    pub fn id(&self) -> &'static str {
        match self {
            Category::Cost => "cost",
            Category::Lifestyle => "lifestyle",
            Category::Algorithm => "algorithm",
            Category::EaseToStart => "ease_to_start",
            Category::Complexity => "complexity",
            Category::Support => "support",
        }
    }

    /// Returns the display title shown to patients and in reports.
    pub fn title(&self) -> &'static str {
        match self {
            Category::Cost => "Cost & Insurance",
            Category::Lifestyle => "Lifestyle & Activities",
            Category::Algorithm => "Control Algorithm",
            Category::EaseToStart => "Getting Started",
            Category::Complexity => "Daily Complexity",
            Category::Support => "Support & Training",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.title())
    }
}

impl FromStr for Category {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace(['-', ' '], "_");
        Category::all()
            .iter()
            .copied()
            .find(|c| c.id() == normalized)
            .ok_or_else(|| {
                ValidationError::invalid_format("category", format!("unknown category '{}'", s))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_returns_6_categories_in_order() {
        let all = Category::all();
        assert_eq!(all.len(), 6);
        assert_eq!(all[0], Category::Cost);
        assert_eq!(all[5], Category::Support);
    }

    #[test]
    fn order_index_matches_all() {
        for (idx, category) in Category::all().iter().enumerate() {
            assert_eq!(category.order_index(), idx);
        }
    }

    #[test]
    fn ordering_follows_canonical_order() {
        assert!(Category::Cost < Category::Lifestyle);
        assert!(Category::Complexity < Category::Support);
    }

    #[test]
    fn parses_ids_and_loose_spellings() {
        assert_eq!("cost".parse::<Category>().unwrap(), Category::Cost);
        assert_eq!("ease-to-start".parse::<Category>().unwrap(), Category::EaseToStart);
        assert_eq!(" Support ".parse::<Category>().unwrap(), Category::Support);
        assert!("insurance".parse::<Category>().is_err());
    }

    #[test]
    fn serializes_snake_case() {
        let json = serde_json::to_string(&Category::EaseToStart).unwrap();
        assert_eq!(json, "\"ease_to_start\"");
    }

    #[test]
    fn id_matches_serde_representation() {
        for category in Category::all() {
            let json = serde_json::to_string(category).unwrap();
            assert_eq!(json, format!("\"{}\"", category.id()));
        }
    }
}
