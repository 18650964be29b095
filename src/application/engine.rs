//! RecommendationEngine - the public entry point of the crate.
//!
//! Wires the catalog, the live session, the enrichment gateway and the
//! assessment handlers together. Category enrichment runs in background
//! tasks; everything else completes before returning.
//!
//! # Example
//!
//! ```no_run
//! use pumpdrive_engine::application::RecommendationEngine;
//! use pumpdrive_engine::domain::foundation::Category;
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let engine = RecommendationEngine::builder().build().await?;
//! engine
//!     .submit_category_response(Category::Lifestyle, "I swim every day", vec![])
//!     .await?;
//! let recommendation = engine.get_final_recommendation().await?;
//! println!("{}", recommendation.report);
//! # Ok(())
//! # }
//! ```

use std::sync::Arc;
use std::time::Duration;

use secrecy::ExposeSecret;
use tokio::sync::Mutex;
use tokio::task::JoinSet;

use crate::adapters::ai::{AnthropicConfig, AnthropicProvider, OfflineProvider};
use crate::adapters::cache::{InMemoryResponseCache, RedisResponseCache};
use crate::adapters::rate_limiter::{RequestQueue, RequestQueueConfig};
use crate::adapters::storage::{FileSessionStore, InMemorySessionStore};
use crate::config::{AppConfig, CacheBackend, StorageBackend};
use crate::domain::catalog::Catalog;
use crate::domain::foundation::{Category, SessionId, Weight};
use crate::domain::recommendation::FinalRecommendation;
use crate::domain::scoring::CategoryScore;
use crate::domain::session::{CategoryStatus, SessionState};
use crate::ports::{AIProvider, CacheStats, ResponseCache, SessionStore};

use super::enrichment::{AIJudgment, JudgmentConfig};
use super::errors::EngineError;
use super::handlers::assessment::{
    BeginCategoryCommand, BeginCategoryHandler, ClearSessionCommand, ClearSessionHandler,
    EnrichCategoryCommand, EnrichCategoryHandler, GenerateRecommendationCommand,
    GenerateRecommendationHandler, SetCategoryPriorityCommand, SetCategoryPriorityHandler,
    SubmitCategoryResponseCommand, SubmitCategoryResponseHandler,
};
use super::session_handle::SessionHandle;

/// Default bound on the final narrative call.
pub const DEFAULT_FINAL_NARRATIVE_TIMEOUT: Duration = Duration::from_secs(45);

/// The recommendation engine.
pub struct RecommendationEngine {
    catalog: Arc<Catalog>,
    session: Arc<SessionHandle>,
    judgment: Arc<AIJudgment>,
    submit: SubmitCategoryResponseHandler,
    enrich: Arc<EnrichCategoryHandler>,
    begin: BeginCategoryHandler,
    priority: SetCategoryPriorityHandler,
    generate: GenerateRecommendationHandler,
    clear: ClearSessionHandler,
    enrichment_tasks: Mutex<JoinSet<()>>,
}

impl RecommendationEngine {
    pub fn builder() -> EngineBuilder {
        EngineBuilder::default()
    }

    /// Builds an engine from loaded configuration.
    ///
    /// # Errors
    ///
    /// - Catalog load failures
    /// - Redis connection failure when the Redis cache is selected
    /// - Session store failures while restoring the session
    pub async fn from_config(config: &AppConfig) -> Result<Self, EngineError> {
        config
            .validate()
            .map_err(|e| EngineError::config(e.to_string()))?;

        let catalog = match &config.catalog.path {
            Some(path) => Catalog::from_path(path)?,
            None => Catalog::builtin()?,
        };

        let provider: Arc<dyn AIProvider> = match &config.ai.anthropic_api_key {
            Some(key) if config.ai.has_anthropic() => {
                let anthropic = AnthropicConfig::new(key.expose_secret().clone())
                    .with_model(config.ai.model.clone())
                    .with_base_url(config.ai.base_url.clone())
                    .with_timeout(config.ai.request_timeout())
                    .with_default_max_tokens(config.ai.max_tokens);
                let provider = AnthropicProvider::new(anthropic)
                    .map_err(|e| EngineError::config(e.to_string()))?;
                Arc::new(provider)
            }
            _ => {
                tracing::info!("no completion provider configured, running offline");
                Arc::new(OfflineProvider::new())
            }
        };

        let cache: Arc<dyn ResponseCache> = match config.cache.backend {
            CacheBackend::Memory => Arc::new(InMemoryResponseCache::new()),
            CacheBackend::Redis => {
                let url = config
                    .cache
                    .redis_url
                    .as_deref()
                    .ok_or_else(|| EngineError::config("cache.redis_url is required"))?;
                Arc::new(RedisResponseCache::connect(url).await?)
            }
        };

        let store: Arc<dyn SessionStore> = match (config.storage.backend, &config.storage.path) {
            (StorageBackend::File, Some(path)) => Arc::new(FileSessionStore::new(path)),
            (StorageBackend::File, None) => {
                return Err(EngineError::config("storage.path is required"));
            }
            (StorageBackend::Memory, _) => Arc::new(InMemorySessionStore::new()),
        };

        let enrichment = &config.enrichment;
        Self::builder()
            .catalog(catalog)
            .provider(provider)
            .cache(cache)
            .store(store)
            .queue_config(RequestQueueConfig {
                min_interval: enrichment.min_interval(),
                max_queue_wait: enrichment.max_queue_wait(),
            })
            .judgment_config(JudgmentConfig {
                enabled: enrichment.enabled,
                cache_ttl: enrichment.cache_ttl(),
                request_timeout: config.ai.request_timeout(),
                max_tokens: config.ai.max_tokens,
                retry_max_attempts: enrichment.retry_max_attempts,
                retry_base_delay: enrichment.retry_base_delay(),
                retry_max_delay: enrichment.retry_max_delay(),
            })
            .final_narrative_timeout(enrichment.final_narrative_timeout())
            .build()
            .await
    }

    /// Scores one category answer and schedules its enrichment.
    ///
    /// Returns as soon as the deterministic score is stored; commentary is
    /// attached later if the completion service answers in time.
    pub async fn submit_category_response(
        &self,
        category: Category,
        transcript: impl Into<String>,
        topics: Vec<String>,
    ) -> Result<CategoryScore, EngineError> {
        let result = self
            .submit
            .handle(SubmitCategoryResponseCommand {
                category,
                transcript: transcript.into(),
                topics,
            })
            .await?;

        if self.judgment.is_live() {
            let enrich = Arc::clone(&self.enrich);
            let cmd = EnrichCategoryCommand {
                score: result.score.clone(),
            };
            let mut tasks = self.enrichment_tasks.lock().await;
            while tasks.try_join_next().is_some() {}
            tasks.spawn(async move {
                if let Err(e) = enrich.handle(cmd).await {
                    tracing::warn!(category = %category.id(), error = %e, "enrichment not stored");
                }
            });
        }

        Ok(result.score)
    }

    /// Marks a category as being answered.
    pub async fn begin_category(&self, category: Category) -> Result<CategoryStatus, EngineError> {
        self.begin.handle(BeginCategoryCommand { category }).await
    }

    /// Sets how much a category counts in the overall ranking.
    pub async fn set_category_priority(
        &self,
        category: Category,
        priority: f64,
    ) -> Result<Weight, EngineError> {
        self.priority
            .handle(SetCategoryPriorityCommand { category, priority })
            .await
    }

    /// Builds the final recommendation from whatever has been answered.
    pub async fn get_final_recommendation(&self) -> Result<FinalRecommendation, EngineError> {
        self.generate.handle(GenerateRecommendationCommand).await
    }

    pub async fn get_cache_stats(&self) -> CacheStats {
        self.judgment.cache().stats().await
    }

    /// Cancels pending enrichment and forgets all answers and cached responses.
    pub async fn clear_all_data(&self) -> Result<(), EngineError> {
        self.enrichment_tasks.lock().await.abort_all();
        self.clear.handle(ClearSessionCommand).await
    }

    pub async fn session_snapshot(&self) -> SessionState {
        self.session.snapshot().await
    }

    pub async fn session_id(&self) -> SessionId {
        self.session.read(|s| s.id()).await
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Waits until every scheduled enrichment has finished.
    pub async fn wait_for_enrichment(&self) {
        loop {
            let mut pending = std::mem::take(&mut *self.enrichment_tasks.lock().await);
            if pending.is_empty() {
                return;
            }
            while let Some(outcome) = pending.join_next().await {
                if let Err(e) = outcome {
                    if !e.is_cancelled() {
                        tracing::warn!(error = %e, "enrichment task failed");
                    }
                }
            }
        }
    }
}

/// Builder for [`RecommendationEngine`]. Unset parts fall back to the
/// bundled catalog, an offline provider and in-memory adapters.
#[derive(Default)]
pub struct EngineBuilder {
    catalog: Option<Catalog>,
    provider: Option<Arc<dyn AIProvider>>,
    cache: Option<Arc<dyn ResponseCache>>,
    store: Option<Arc<dyn SessionStore>>,
    queue_config: Option<RequestQueueConfig>,
    judgment_config: Option<JudgmentConfig>,
    final_narrative_timeout: Option<Duration>,
}

impl EngineBuilder {
    pub fn catalog(mut self, catalog: Catalog) -> Self {
        self.catalog = Some(catalog);
        self
    }

    pub fn provider(mut self, provider: Arc<dyn AIProvider>) -> Self {
        self.provider = Some(provider);
        self
    }

    pub fn cache(mut self, cache: Arc<dyn ResponseCache>) -> Self {
        self.cache = Some(cache);
        self
    }

    pub fn store(mut self, store: Arc<dyn SessionStore>) -> Self {
        self.store = Some(store);
        self
    }

    pub fn queue_config(mut self, config: RequestQueueConfig) -> Self {
        self.queue_config = Some(config);
        self
    }

    pub fn judgment_config(mut self, config: JudgmentConfig) -> Self {
        self.judgment_config = Some(config);
        self
    }

    pub fn final_narrative_timeout(mut self, timeout: Duration) -> Self {
        self.final_narrative_timeout = Some(timeout);
        self
    }

    pub async fn build(self) -> Result<RecommendationEngine, EngineError> {
        let catalog = Arc::new(match self.catalog {
            Some(catalog) => catalog,
            None => Catalog::builtin()?,
        });
        let provider: Arc<dyn AIProvider> = match self.provider {
            Some(provider) => provider,
            None => Arc::new(OfflineProvider::new()),
        };
        let cache: Arc<dyn ResponseCache> = match self.cache {
            Some(cache) => cache,
            None => Arc::new(InMemoryResponseCache::new()),
        };
        let store: Arc<dyn SessionStore> = match self.store {
            Some(store) => store,
            None => Arc::new(InMemorySessionStore::new()),
        };
        let queue = Arc::new(RequestQueue::new(self.queue_config.unwrap_or_default()));

        let session = Arc::new(SessionHandle::open(store).await?);
        let judgment = Arc::new(AIJudgment::new(
            provider,
            Arc::clone(&cache),
            queue,
            Arc::clone(&catalog),
            self.judgment_config.unwrap_or_default(),
        ));

        tracing::info!(
            catalog_version = %catalog.version(),
            devices = catalog.len(),
            enrichment = judgment.is_live(),
            "recommendation engine ready"
        );

        Ok(RecommendationEngine {
            submit: SubmitCategoryResponseHandler::new(Arc::clone(&session), Arc::clone(&catalog)),
            enrich: Arc::new(EnrichCategoryHandler::new(
                Arc::clone(&session),
                Arc::clone(&judgment),
                Arc::clone(&catalog),
            )),
            begin: BeginCategoryHandler::new(Arc::clone(&session)),
            priority: SetCategoryPriorityHandler::new(Arc::clone(&session)),
            generate: GenerateRecommendationHandler::new(
                Arc::clone(&session),
                Arc::clone(&judgment),
                Arc::clone(&catalog),
                self.final_narrative_timeout
                    .unwrap_or(DEFAULT_FINAL_NARRATIVE_TIMEOUT),
            ),
            clear: ClearSessionHandler::new(Arc::clone(&session), cache),
            enrichment_tasks: Mutex::new(JoinSet::new()),
            catalog,
            session,
            judgment,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::ai::MockAIProvider;
    use crate::domain::scoring::NarrativeSource;

    #[tokio::test]
    async fn default_engine_runs_offline() {
        let engine = RecommendationEngine::builder().build().await.unwrap();

        engine
            .submit_category_response(Category::Cost, "Insurance coverage is essential", vec![])
            .await
            .unwrap();
        engine.wait_for_enrichment().await;
        let rec = engine.get_final_recommendation().await.unwrap();

        assert_eq!(rec.narrative.source, NarrativeSource::Fallback);
        assert_eq!(engine.get_cache_stats().await.total_requests, 0);
    }

    #[tokio::test]
    async fn enrichment_runs_in_background() {
        let provider = Arc::new(MockAIProvider::new().with_default_response("Nice fit."));
        let engine = RecommendationEngine::builder()
            .provider(provider.clone())
            .queue_config(RequestQueueConfig::unthrottled())
            .build()
            .await
            .unwrap();

        engine
            .submit_category_response(Category::Lifestyle, "I swim every day", vec![])
            .await
            .unwrap();
        engine.wait_for_enrichment().await;

        let state = engine.session_snapshot().await;
        assert_eq!(
            state.category_status(Category::Lifestyle),
            CategoryStatus::Enriched
        );
        assert_eq!(provider.call_count(), 1);
    }

    #[tokio::test]
    async fn clear_all_data_starts_over() {
        let engine = RecommendationEngine::builder().build().await.unwrap();
        engine
            .submit_category_response(Category::Support, "Good training matters", vec![])
            .await
            .unwrap();
        let before = engine.session_id().await;

        engine.clear_all_data().await.unwrap();

        assert_ne!(engine.session_id().await, before);
        assert!(engine.session_snapshot().await.scored().is_empty());
    }

    #[tokio::test]
    async fn from_default_config_builds_offline_engine() {
        let engine = RecommendationEngine::from_config(&AppConfig::default())
            .await
            .unwrap();
        assert_eq!(engine.catalog().len(), 6);
    }
}
