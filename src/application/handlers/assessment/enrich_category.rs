//! EnrichCategoryHandler - attaches optional commentary to a category score.

use std::sync::Arc;

use crate::application::enrichment::{AIJudgment, CategoryContext};
use crate::application::errors::EngineError;
use crate::application::session_handle::SessionHandle;
use crate::domain::catalog::Catalog;
use crate::domain::scoring::{CategoryScore, NarrativeSource};
use crate::domain::session::NarrativeAttachment;

/// Command to enrich a score that was just recorded.
#[derive(Debug, Clone)]
pub struct EnrichCategoryCommand {
    pub score: CategoryScore,
}

/// What happened to the enrichment.
#[derive(Debug, Clone, PartialEq)]
pub struct EnrichCategoryResult {
    pub source: NarrativeSource,
    /// `None` when no narrative was produced (fallback).
    pub attachment: Option<NarrativeAttachment>,
}

pub struct EnrichCategoryHandler {
    session: Arc<SessionHandle>,
    judgment: Arc<AIJudgment>,
    catalog: Arc<Catalog>,
}

impl EnrichCategoryHandler {
    pub fn new(session: Arc<SessionHandle>, judgment: Arc<AIJudgment>, catalog: Arc<Catalog>) -> Self {
        Self {
            session,
            judgment,
            catalog,
        }
    }

    pub async fn handle(&self, cmd: EnrichCategoryCommand) -> Result<EnrichCategoryResult, EngineError> {
        let session_id = self.session.read(|s| s.id()).await;
        let category = cmd.score.category;
        let score_id = cmd.score.id;

        let ctx = CategoryContext::new(session_id, cmd.score, &self.catalog);
        let judgment = self.judgment.judge_category(&ctx).await;

        // Fallback leaves the score without commentary.
        let Some(narrative) = judgment.category_narrative() else {
            return Ok(EnrichCategoryResult {
                source: judgment.source,
                attachment: None,
            });
        };

        let attachment = self
            .session
            .update(move |state| state.attach_narrative(category, score_id, narrative))
            .await?;

        match attachment {
            NarrativeAttachment::Attached => {
                tracing::debug!(category = %category.id(), source = ?judgment.source, "narrative attached")
            }
            NarrativeAttachment::Stale => {
                tracing::debug!(category = %category.id(), "score was replaced, dropping narrative")
            }
        }

        Ok(EnrichCategoryResult {
            source: judgment.source,
            attachment: Some(attachment),
        })
    }
}
