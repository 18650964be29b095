//! SessionState aggregate - the single source of truth for one assessment.
//!
//! Persisted as one JSON value under one key. Every mutation replaces a
//! whole category slot, so a reader never sees a half-written slot.
//!
//! # Invariants
//!
//! - every category has exactly one slot
//! - a slot's status is `Scored` or `Enriched` only if it holds a score
//! - a narrative is only attached to the score it was produced for

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::domain::foundation::{
    Category, ScoreId, SessionId, StateMachine, Timestamp, ValidationError, Weight,
};
use crate::domain::preference::{DimensionWeights, Signal};
use crate::domain::scoring::{CategoryNarrative, CategoryScore};

use super::{AssessmentStatus, CategoryStatus};

/// Current persisted layout version.
pub const SESSION_SCHEMA_VERSION: u32 = 1;

/// Store key the session is persisted under.
pub const SESSION_STORE_KEY: &str = "pumpdrive.session.v1";

/// One category's slot.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CategorySlot {
    pub status: CategoryStatus,
    #[serde(default)]
    pub score: Option<CategoryScore>,
}

/// Outcome of attaching a narrative.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NarrativeAttachment {
    Attached,
    /// The slot now holds a different score; the narrative was dropped.
    Stale,
}

/// Whole-assessment state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionState {
    schema_version: u32,
    id: SessionId,
    status: AssessmentStatus,
    slots: BTreeMap<Category, CategorySlot>,
    #[serde(default)]
    signal: Signal,
    created_at: Timestamp,
    updated_at: Timestamp,
}

impl SessionState {
    /// Creates a fresh session with every category not started.
    pub fn new() -> Self {
        let now = Timestamp::now();
        Self {
            schema_version: SESSION_SCHEMA_VERSION,
            id: SessionId::new(),
            status: AssessmentStatus::Collecting,
            slots: Category::all()
                .iter()
                .map(|c| (*c, CategorySlot::default()))
                .collect(),
            signal: Signal::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Restores a persisted session.
    ///
    /// Returns `None` (and logs a warning) when the value was written by a
    /// different schema version or cannot be decoded; the caller then
    /// starts a fresh session.
    pub fn restore(value: serde_json::Value) -> Option<Self> {
        let version = value.get("schema_version").and_then(|v| v.as_u64());
        if version != Some(u64::from(SESSION_SCHEMA_VERSION)) {
            tracing::warn!(
                found = ?version,
                expected = SESSION_SCHEMA_VERSION,
                "discarding persisted session with unsupported schema version"
            );
            return None;
        }

        match serde_json::from_value::<SessionState>(value) {
            Ok(mut state) => {
                for category in Category::all() {
                    state.slots.entry(*category).or_default();
                }
                Some(state)
            }
            Err(e) => {
                tracing::warn!(error = %e, "discarding undecodable persisted session");
                None
            }
        }
    }

    /// Serializes the whole session as one JSON value.
    pub fn to_value(&self) -> Result<serde_json::Value, serde_json::Error> {
        serde_json::to_value(self)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Accessors
    // ─────────────────────────────────────────────────────────────────────────

    pub fn id(&self) -> SessionId {
        self.id
    }

    pub fn schema_version(&self) -> u32 {
        self.schema_version
    }

    pub fn status(&self) -> AssessmentStatus {
        self.status
    }

    pub fn signal(&self) -> &Signal {
        &self.signal
    }

    pub fn created_at(&self) -> &Timestamp {
        &self.created_at
    }

    pub fn updated_at(&self) -> &Timestamp {
        &self.updated_at
    }

    /// Returns the slot for a category.
    pub fn slot(&self, category: Category) -> Option<&CategorySlot> {
        self.slots.get(&category)
    }

    pub fn category_status(&self, category: Category) -> CategoryStatus {
        self.slot(category).map(|s| s.status).unwrap_or_default()
    }

    /// Returns the current score for a category.
    pub fn score(&self, category: Category) -> Option<&CategoryScore> {
        self.slot(category).and_then(|s| s.score.as_ref())
    }

    /// Scored categories in canonical order.
    pub fn scored(&self) -> Vec<&CategoryScore> {
        Category::all()
            .iter()
            .filter_map(|c| self.score(*c))
            .collect()
    }

    /// Categories with no score yet, in canonical order.
    pub fn missing_categories(&self) -> Vec<Category> {
        Category::all()
            .iter()
            .copied()
            .filter(|c| self.score(*c).is_none())
            .collect()
    }

    /// Returns true if every category has a score.
    pub fn all_scored(&self) -> bool {
        Category::all()
            .iter()
            .all(|c| self.category_status(*c).is_scored())
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Mutations
    // ─────────────────────────────────────────────────────────────────────────

    /// Marks a category as being answered.
    ///
    /// A previously scored category keeps its old score until a new one
    /// replaces it.
    pub fn begin_category(&mut self, category: Category) -> Result<(), ValidationError> {
        let current = self.category_status(category);
        if current == CategoryStatus::InProgress {
            return Ok(());
        }
        let next = current.transition_to(CategoryStatus::InProgress)?;
        let score = self.score(category).cloned();
        self.slots.insert(category, CategorySlot { status: next, score });
        self.refresh_status()?;
        self.touch();
        Ok(())
    }

    /// Stores a freshly computed score, replacing the category's slot.
    pub fn record_score(
        &mut self,
        score: CategoryScore,
        weights: DimensionWeights,
    ) -> Result<(), ValidationError> {
        let category = score.category;
        let mut status = self.category_status(category);
        if status != CategoryStatus::InProgress {
            status = status.transition_to(CategoryStatus::InProgress)?;
        }
        let status = status.transition_to(CategoryStatus::Scored)?;

        self.slots.insert(
            category,
            CategorySlot {
                status,
                score: Some(score),
            },
        );
        self.signal.set_category(category, weights);
        self.refresh_status()?;
        self.touch();
        Ok(())
    }

    /// Attaches a narrative if the slot still holds the score it was made for.
    ///
    /// The deterministic score itself is never modified.
    pub fn attach_narrative(
        &mut self,
        category: Category,
        score_id: ScoreId,
        narrative: CategoryNarrative,
    ) -> Result<NarrativeAttachment, ValidationError> {
        let slot = match self.slots.get(&category) {
            Some(slot) => slot,
            None => return Ok(NarrativeAttachment::Stale),
        };
        let current = match &slot.score {
            Some(score) if score.id == score_id => score,
            _ => return Ok(NarrativeAttachment::Stale),
        };

        let status = match slot.status {
            CategoryStatus::Enriched => CategoryStatus::Enriched,
            other => other.transition_to(CategoryStatus::Enriched)?,
        };
        let replacement = CategorySlot {
            status,
            score: Some(current.with_narrative(narrative)),
        };

        self.slots.insert(category, replacement);
        self.touch();
        Ok(NarrativeAttachment::Attached)
    }

    /// Sets how much a category counts in the overall recommendation.
    pub fn set_priority(&mut self, category: Category, priority: Weight) {
        self.signal.set_priority(category, priority);
        self.touch();
    }

    /// Records that a final report was produced. Regeneration keeps the state.
    pub fn mark_report_generated(&mut self) -> Result<(), ValidationError> {
        if self.status != AssessmentStatus::FinalReportGenerated {
            self.status = self
                .status
                .transition_to(AssessmentStatus::FinalReportGenerated)?;
            self.touch();
        }
        Ok(())
    }

    fn refresh_status(&mut self) -> Result<(), ValidationError> {
        let target = if self.all_scored() {
            AssessmentStatus::AllScored
        } else {
            AssessmentStatus::Collecting
        };
        if self.status != target {
            self.status = self.status.transition_to(target)?;
        }
        Ok(())
    }

    fn touch(&mut self) {
        self.updated_at = Timestamp::now();
    }
}

impl Default for SessionState {
    fn default() -> Self {
        Self::new()
    }
}
