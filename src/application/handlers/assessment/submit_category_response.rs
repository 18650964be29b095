//! SubmitCategoryResponseHandler - scores one category answer.

use std::sync::Arc;

use crate::application::errors::EngineError;
use crate::application::session_handle::SessionHandle;
use crate::domain::catalog::Catalog;
use crate::domain::foundation::{Category, ValidationError};
use crate::domain::preference::PreferenceExtractor;
use crate::domain::scoring::{CategoryScore, DeterministicScorer};

/// Longest transcript accepted for one category.
pub const MAX_TRANSCRIPT_CHARS: usize = 20_000;

/// Command to submit the patient's answer for a category.
#[derive(Debug, Clone)]
pub struct SubmitCategoryResponseCommand {
    pub category: Category,
    pub transcript: String,
    pub topics: Vec<String>,
}

/// Result of a successful submission.
#[derive(Debug, Clone)]
pub struct SubmitCategoryResponseResult {
    pub score: CategoryScore,
}

/// Handler for category submissions.
///
/// Extraction and scoring run before the session is touched; the session
/// only sees the finished score.
pub struct SubmitCategoryResponseHandler {
    session: Arc<SessionHandle>,
    catalog: Arc<Catalog>,
    extractor: PreferenceExtractor,
}

impl SubmitCategoryResponseHandler {
    pub fn new(session: Arc<SessionHandle>, catalog: Arc<Catalog>) -> Self {
        let extractor = PreferenceExtractor::new(catalog.schema().clone());
        Self {
            session,
            catalog,
            extractor,
        }
    }

    pub async fn handle(
        &self,
        cmd: SubmitCategoryResponseCommand,
    ) -> Result<SubmitCategoryResponseResult, EngineError> {
        // 1. Validate input
        let length = cmd.transcript.chars().count();
        if length > MAX_TRANSCRIPT_CHARS {
            return Err(ValidationError::too_long("transcript", MAX_TRANSCRIPT_CHARS, length).into());
        }
        let topics: Vec<String> = cmd
            .topics
            .iter()
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .collect();

        // 2. Extract and score
        let extracted = self
            .extractor
            .extract(cmd.category, &cmd.transcript, &topics);
        let ranking = DeterministicScorer::score(cmd.category, &extracted.weights, &self.catalog);
        let score = CategoryScore::from_ranking(&ranking, cmd.transcript, topics, extracted.facts);

        // 3. Replace the category slot
        let stored = score.clone();
        self.session
            .update(move |state| state.record_score(stored, extracted.weights))
            .await?;

        tracing::info!(
            category = %cmd.category.id(),
            winner = score.winner().map(|d| d.device_id.as_str()).unwrap_or("-"),
            neutral = score.neutral,
            facts = score.facts.len(),
            "category scored"
        );

        Ok(SubmitCategoryResponseResult { score })
    }
}
