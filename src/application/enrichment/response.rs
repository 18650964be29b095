//! EnrichmentResult - explicit, tagged interpretation of a completion.
//!
//! Raw completion text is classified once, here. Downstream code matches on
//! the variant instead of sniffing strings.

use serde::{Deserialize, Serialize};

use crate::domain::catalog::Catalog;

/// Structured payload requested from the completion service.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct EnrichmentData {
    pub summary: String,
    #[serde(default)]
    pub strengths: Vec<String>,
    #[serde(default)]
    pub considerations: Vec<String>,
    /// Advisory only; never used for ordering.
    #[serde(default)]
    pub recommended_device_ids: Vec<String>,
}

/// Interpreted completion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EnrichmentResult {
    Structured { data: EnrichmentData },
    Freeform { text: String },
    Error { detail: String },
}

impl EnrichmentResult {
    /// Classifies raw completion text.
    ///
    /// - Code fences are stripped
    /// - Text that looks like JSON must parse, or the result is `Error`
    /// - Device ids unknown to the catalog are dropped
    /// - Anything else non-empty is `Freeform`
    pub fn parse(raw: &str, catalog: &Catalog) -> Self {
        let body = strip_fences(raw);
        if body.is_empty() {
            return Self::error("empty response");
        }

        if !(body.starts_with('{') || body.starts_with('[')) {
            return Self::Freeform {
                text: body.to_string(),
            };
        }

        match serde_json::from_str::<EnrichmentData>(body) {
            Ok(mut data) => {
                let before = data.recommended_device_ids.len();
                data.recommended_device_ids.retain(|id| catalog.contains(id));
                if data.recommended_device_ids.len() != before {
                    tracing::debug!(
                        dropped = before - data.recommended_device_ids.len(),
                        "dropped unknown device ids from enrichment"
                    );
                }
                if data.summary.trim().is_empty() {
                    return Self::error("structured response without a summary");
                }
                Self::Structured { data }
            }
            Err(e) => Self::error(format!("malformed JSON: {}", e)),
        }
    }

    pub fn error(detail: impl Into<String>) -> Self {
        Self::Error {
            detail: detail.into(),
        }
    }

    /// True for results worth showing and caching.
    pub fn is_usable(&self) -> bool {
        !matches!(self, Self::Error { .. })
    }

    pub fn summary(&self) -> Option<&str> {
        match self {
            Self::Structured { data } => Some(&data.summary),
            Self::Freeform { text } => Some(text),
            Self::Error { .. } => None,
        }
    }

    pub fn strengths(&self) -> &[String] {
        match self {
            Self::Structured { data } => &data.strengths,
            _ => &[],
        }
    }

    pub fn considerations(&self) -> &[String] {
        match self {
            Self::Structured { data } => &data.considerations,
            _ => &[],
        }
    }
}

fn strip_fences(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    // Drop the language tag line, if any.
    let rest = match rest.find('\n') {
        Some(idx) => &rest[idx + 1..],
        None => rest,
    };
    rest.trim_end().trim_end_matches("```").trim()
}
