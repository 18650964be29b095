//! GenerateRecommendationHandler - builds the final recommendation on demand.

use std::sync::Arc;
use std::time::Duration;

use tokio::time::timeout;

use crate::application::enrichment::{AIJudgment, FinalContext};
use crate::application::errors::EngineError;
use crate::application::session_handle::SessionHandle;
use crate::domain::catalog::Catalog;
use crate::domain::foundation::ValidationError;
use crate::domain::recommendation::{
    fallback_narrative, AggregateRanking, FinalRecommendation, Narrative, RankedDevice,
    RecommendationAggregator,
};
use crate::domain::session::SessionState;

/// Query for the final recommendation. Carries no input; the session holds
/// everything.
#[derive(Debug, Clone, Default)]
pub struct GenerateRecommendationCommand;

pub struct GenerateRecommendationHandler {
    session: Arc<SessionHandle>,
    judgment: Arc<AIJudgment>,
    catalog: Arc<Catalog>,
    narrative_timeout: Duration,
}

impl GenerateRecommendationHandler {
    pub fn new(
        session: Arc<SessionHandle>,
        judgment: Arc<AIJudgment>,
        catalog: Arc<Catalog>,
        narrative_timeout: Duration,
    ) -> Self {
        Self {
            session,
            judgment,
            catalog,
            narrative_timeout,
        }
    }

    pub async fn handle(
        &self,
        _cmd: GenerateRecommendationCommand,
    ) -> Result<FinalRecommendation, EngineError> {
        // 1. Rank from a consistent snapshot
        let snapshot = self.session.snapshot().await;
        let ranking = RecommendationAggregator::aggregate(&snapshot, &self.catalog)?;

        // 2. Narrative, bounded in time
        let narrative = self.narrative(&snapshot, &ranking).await?;

        // 3. Assemble and record
        let recommendation = FinalRecommendation::assemble(&ranking, &snapshot, &self.catalog, narrative)?;
        self.session
            .update(|state| state.mark_report_generated())
            .await?;

        tracing::info!(
            winner = %recommendation.winner.device_id,
            score = recommendation.winner.aggregate_score,
            partial = recommendation.is_partial(),
            narrative = ?recommendation.narrative.source,
            "final recommendation generated"
        );

        Ok(recommendation)
    }

    async fn narrative(
        &self,
        snapshot: &SessionState,
        ranking: &AggregateRanking,
    ) -> Result<Narrative, EngineError> {
        let ctx = FinalContext::new(snapshot, ranking);
        let remote = match timeout(self.narrative_timeout, self.judgment.judge_final(&ctx)).await {
            Ok(judgment) => judgment.final_narrative(),
            Err(_) => {
                tracing::warn!(
                    timeout_secs = self.narrative_timeout.as_secs(),
                    "final narrative timed out, using fallback"
                );
                None
            }
        };
        if let Some(narrative) = remote {
            return Ok(narrative);
        }

        let winner_entry = ranking.winner().ok_or(ValidationError::NoCategoriesScored)?;
        let winner = RankedDevice::from_entry(winner_entry, &self.catalog);
        let profile = self.catalog.get_by_id(&winner.device_id)?;
        let runner_up = ranking
            .runner_up()
            .map(|e| RankedDevice::from_entry(e, &self.catalog));

        Ok(fallback_narrative(&winner, profile, runner_up.as_ref()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::ai::{MockAIProvider, OfflineProvider};
    use crate::adapters::cache::InMemoryResponseCache;
    use crate::adapters::rate_limiter::{RequestQueue, RequestQueueConfig};
    use crate::adapters::storage::InMemorySessionStore;
    use crate::application::enrichment::JudgmentConfig;
    use crate::application::handlers::assessment::{
        SubmitCategoryResponseCommand, SubmitCategoryResponseHandler,
    };
    use crate::domain::foundation::Category;
    use crate::domain::scoring::NarrativeSource;
    use crate::domain::session::AssessmentStatus;
    use crate::ports::AIProvider;

    async fn setup(
        provider: Arc<dyn AIProvider>,
        narrative_timeout: Duration,
    ) -> (GenerateRecommendationHandler, SubmitCategoryResponseHandler, Arc<SessionHandle>) {
        let catalog = Arc::new(Catalog::builtin().unwrap());
        let session = Arc::new(
            SessionHandle::open(Arc::new(InMemorySessionStore::new()))
                .await
                .unwrap(),
        );
        let judgment = Arc::new(AIJudgment::new(
            provider,
            Arc::new(InMemoryResponseCache::new()),
            Arc::new(RequestQueue::new(RequestQueueConfig::unthrottled())),
            catalog.clone(),
            JudgmentConfig::default(),
        ));
        (
            GenerateRecommendationHandler::new(
                session.clone(),
                judgment,
                catalog.clone(),
                narrative_timeout,
            ),
            SubmitCategoryResponseHandler::new(session.clone(), catalog),
            session,
        )
    }

    async fn answer(submit: &SubmitCategoryResponseHandler, category: Category, transcript: &str) {
        submit
            .handle(SubmitCategoryResponseCommand {
                category,
                transcript: transcript.to_string(),
                topics: vec![],
            })
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn no_scored_categories_is_an_error() {
        let (handler, _, _) = setup(Arc::new(OfflineProvider::new()), Duration::from_secs(45)).await;
        let err = handler.handle(GenerateRecommendationCommand).await.unwrap_err();
        assert!(matches!(
            err,
            EngineError::Validation(ValidationError::NoCategoriesScored)
        ));
    }

    #[tokio::test]
    async fn offline_uses_fallback_and_marks_report() {
        let (handler, submit, session) =
            setup(Arc::new(OfflineProvider::new()), Duration::from_secs(45)).await;
        answer(&submit, Category::Lifestyle, "I travel constantly and need something waterproof").await;

        let rec = handler.handle(GenerateRecommendationCommand).await.unwrap();

        assert_eq!(rec.narrative.source, NarrativeSource::Fallback);
        assert!(rec.is_partial());
        assert!(!rec.report.is_empty());
        assert_eq!(
            session.snapshot().await.status(),
            AssessmentStatus::FinalReportGenerated
        );
    }

    #[tokio::test]
    async fn remote_narrative_is_used() {
        let provider = Arc::new(MockAIProvider::new().with_default_response(
            r#"{"summary": "A tubeless pump fits you.", "considerations": ["Pod adhesion in heat"]}"#,
        ));
        let (handler, submit, _) = setup(provider, Duration::from_secs(45)).await;
        answer(&submit, Category::Lifestyle, "I swim every day").await;

        let rec = handler.handle(GenerateRecommendationCommand).await.unwrap();

        assert_eq!(rec.narrative.source, NarrativeSource::Remote);
        assert_eq!(rec.narrative.text, "A tubeless pump fits you.");
    }

    #[tokio::test(start_paused = true)]
    async fn slow_narrative_falls_back_after_timeout() {
        let provider = Arc::new(
            MockAIProvider::new()
                .with_default_response("late")
                .with_delay(Duration::from_secs(25)),
        );
        let (handler, submit, _) = setup(provider, Duration::from_secs(10)).await;
        answer(&submit, Category::Cost, "Cost matters").await;

        let rec = handler.handle(GenerateRecommendationCommand).await.unwrap();

        assert_eq!(rec.narrative.source, NarrativeSource::Fallback);
    }
}
