//! Preference Extractor - turns a free-text category answer into dimension weights.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::domain::catalog::DimensionSchema;
use crate::domain::foundation::{Category, Weight};

use super::rules::{
    self, DIMINISHED_WEIGHT, DIMINISHERS, INTENSIFIED_WEIGHT, INTENSIFIERS, TOPIC_WEIGHT,
};
use super::DimensionWeights;

/// Longest evidence snippet kept on a fact.
const MAX_EVIDENCE_CHARS: usize = 160;

/// A preference the extractor found, with the text that triggered it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractedFact {
    pub dimension: String,
    pub label: String,
    pub weight: Weight,
    pub evidence: String,
}

/// Result of extracting one category answer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExtractedPreferences {
    pub weights: DimensionWeights,
    pub facts: Vec<ExtractedFact>,
}

impl ExtractedPreferences {
    pub fn is_empty(&self) -> bool {
        self.weights.is_empty()
    }
}

/// Rule-based preference extraction.
///
/// # Algorithm
/// 1. Split the transcript into clauses on `. ! ? ;`, newlines and " but ".
/// 2. A rule phrase in a clause gives its dimension the base weight (0.7).
///    An intensifier in the same clause raises it to 1.0; a diminisher
///    lowers it to 0.2 and wins over intensifiers.
/// 3. Multiple hits for a dimension keep the maximum.
/// 4. A discussed topic naming a dimension guarantees at least 0.6.
///
/// Only dimensions declared by the schema are emitted. The function is
/// pure: the same input always yields the same weights and facts.
#[derive(Debug, Clone)]
pub struct PreferenceExtractor {
    schema: DimensionSchema,
}

impl PreferenceExtractor {
    pub fn new(schema: DimensionSchema) -> Self {
        Self { schema }
    }

    /// Extracts weights and supporting facts for one category.
    ///
    /// # Edge Cases
    /// - Empty transcript and no topics: empty result
    /// - Rule for a dimension the schema lacks: ignored
    pub fn extract(
        &self,
        category: Category,
        transcript: &str,
        topics: &[String],
    ) -> ExtractedPreferences {
        let mut found: BTreeMap<String, (Weight, String)> = BTreeMap::new();

        for clause in split_clauses(transcript) {
            let normalized = normalize(clause);
            let modifier = clause_modifier(&normalized);

            for rule in rules::rules_for(category) {
                if !self.schema.contains(category, rule.dimension) {
                    continue;
                }
                if rules::find_phrase(&normalized, rule.phrases).is_none() {
                    continue;
                }
                let weight = Weight::new(modifier.unwrap_or(rules::BASE_WEIGHT));
                record(&mut found, rule.dimension, weight, clause.trim());
            }
        }

        for topic in topics {
            let normalized = normalize(topic);
            if normalized.trim().is_empty() {
                continue;
            }
            for rule in rules::rules_for(category) {
                if !self.schema.contains(category, rule.dimension) {
                    continue;
                }
                let names_dimension = normalized.replace([' ', '-'], "_") == rule.dimension
                    || rules::find_phrase(&normalized, rule.phrases).is_some();
                if names_dimension {
                    record(
                        &mut found,
                        rule.dimension,
                        Weight::new(TOPIC_WEIGHT),
                        &format!("topic: {}", topic.trim()),
                    );
                }
            }
        }

        let mut result = ExtractedPreferences::default();
        // Facts follow schema order so output is stable across rule table edits.
        for dim in self.schema.dimensions(category) {
            if let Some((weight, evidence)) = found.remove(&dim.key) {
                result.weights.insert(dim.key.clone(), weight);
                result.facts.push(ExtractedFact {
                    dimension: dim.key.clone(),
                    label: dim.label.clone(),
                    weight,
                    evidence,
                });
            }
        }

        tracing::debug!(
            category = category.id(),
            dimensions = result.weights.len(),
            "preferences extracted"
        );

        result
    }
}

/// Keeps the strongest hit per dimension; the first evidence wins ties.
fn record(found: &mut BTreeMap<String, (Weight, String)>, dimension: &str, weight: Weight, evidence: &str) {
    match found.get(dimension) {
        Some((existing, _)) if *existing >= weight => {}
        _ => {
            found.insert(dimension.to_string(), (weight, truncate(evidence)));
        }
    }
}

fn split_clauses(transcript: &str) -> impl Iterator<Item = &str> {
    transcript
        .split(|c: char| matches!(c, '.' | '!' | '?' | ';' | '\n'))
        .flat_map(|sentence| sentence.split(" but "))
        .filter(|clause| !clause.trim().is_empty())
}

fn normalize(text: &str) -> String {
    text.to_lowercase().replace(['\u{2019}', '\u{2018}'], "'")
}

/// Returns the override weight for a clause, if any modifier is present.
fn clause_modifier(clause: &str) -> Option<f64> {
    if DIMINISHERS.iter().any(|p| rules::contains_word(clause, p)) {
        Some(DIMINISHED_WEIGHT)
    } else if INTENSIFIERS.iter().any(|p| rules::contains_word(clause, p)) {
        Some(INTENSIFIED_WEIGHT)
    } else {
        None
    }
}

fn truncate(text: &str) -> String {
    if text.chars().count() <= MAX_EVIDENCE_CHARS {
        text.to_string()
    } else {
        let cut: String = text.chars().take(MAX_EVIDENCE_CHARS).collect();
        format!("{}...", cut.trim_end())
    }
}
