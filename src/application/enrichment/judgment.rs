//! AIJudgment - cached, paced and retried completion calls with fallback.
//!
//! Every outbound call goes through the same path:
//!
//! 1. Response cache lookup
//! 2. Request queue slot (spacing between dispatches)
//! 3. Provider call under a per-request timeout
//! 4. Exponential backoff on transient failures
//!
//! Any failure along the way yields a `Fallback` judgment. Callers never
//! see a provider error.

use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tokio::time::timeout;
use uuid::Uuid;

use crate::adapters::rate_limiter::{Lane, RateLimitError, RequestQueue};
use crate::application::retry_policy::RetryPolicy;
use crate::domain::catalog::Catalog;
use crate::domain::foundation::Timestamp;
use crate::domain::recommendation::Narrative;
use crate::domain::scoring::{CategoryNarrative, NarrativeSource};
use crate::ports::{AIError, AIProvider, CacheKey, CompletionRequest, ResponseCache};

use super::prompts::{CategoryContext, FinalContext};
use super::response::EnrichmentResult;

/// Tunables for [`AIJudgment`].
#[derive(Debug, Clone)]
pub struct JudgmentConfig {
    /// When false, every judgment is a fallback and nothing is dispatched.
    pub enabled: bool,
    pub cache_ttl: Duration,
    pub request_timeout: Duration,
    pub max_tokens: u32,
    pub retry_max_attempts: u32,
    pub retry_base_delay: Duration,
    pub retry_max_delay: Duration,
}

impl Default for JudgmentConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            cache_ttl: Duration::from_secs(3600),
            request_timeout: Duration::from_secs(30),
            max_tokens: 1024,
            retry_max_attempts: 5,
            retry_base_delay: Duration::from_secs(3),
            retry_max_delay: Duration::from_secs(60),
        }
    }
}

/// The outcome of one judgment.
#[derive(Debug, Clone, PartialEq)]
pub struct Judgment {
    pub result: EnrichmentResult,
    pub source: NarrativeSource,
}

impl Judgment {
    fn fallback(detail: impl Into<String>) -> Self {
        Self {
            result: EnrichmentResult::error(detail),
            source: NarrativeSource::Fallback,
        }
    }

    pub fn is_fallback(&self) -> bool {
        self.source == NarrativeSource::Fallback
    }

    /// Narrative to attach to a category score, if the judgment produced one.
    pub fn category_narrative(&self) -> Option<CategoryNarrative> {
        let text = self.result.summary()?;
        Some(CategoryNarrative {
            text: text.to_string(),
            strengths: self.result.strengths().to_vec(),
            considerations: self.result.considerations().to_vec(),
            source: self.source,
            attached_at: Timestamp::now(),
        })
    }

    /// Narrative for the final recommendation, if the judgment produced one.
    pub fn final_narrative(&self) -> Option<Narrative> {
        let text = self.result.summary()?;
        Some(Narrative {
            text: text.to_string(),
            strengths: self.result.strengths().to_vec(),
            considerations: self.result.considerations().to_vec(),
            source: self.source,
        })
    }
}

#[derive(Debug, Error)]
enum DispatchError {
    #[error("request queue: {0}")]
    Queue(#[from] RateLimitError),

    #[error("provider: {0}")]
    Provider(#[from] AIError),
}

impl DispatchError {
    fn is_retryable(&self) -> bool {
        match self {
            // Waiting longer in the queue would not help.
            DispatchError::Queue(_) => false,
            DispatchError::Provider(err) => err.is_retryable(),
        }
    }

    fn retry_after(&self) -> Option<Duration> {
        match self {
            DispatchError::Provider(AIError::RateLimited { retry_after_secs }) => {
                Some(Duration::from_secs(u64::from(*retry_after_secs)))
            }
            _ => None,
        }
    }
}

/// Completion-service gateway used by the enrichment handlers.
pub struct AIJudgment {
    provider: Arc<dyn AIProvider>,
    cache: Arc<dyn ResponseCache>,
    queue: Arc<RequestQueue>,
    catalog: Arc<Catalog>,
    retry: RetryPolicy<DispatchError>,
    config: JudgmentConfig,
}

impl AIJudgment {
    pub fn new(
        provider: Arc<dyn AIProvider>,
        cache: Arc<dyn ResponseCache>,
        queue: Arc<RequestQueue>,
        catalog: Arc<Catalog>,
        config: JudgmentConfig,
    ) -> Self {
        let retry = RetryPolicy::new(
            config.retry_max_attempts,
            config.retry_base_delay,
            config.retry_max_delay,
            DispatchError::is_retryable,
        )
        .with_requested_delay(DispatchError::retry_after);
        Self {
            provider,
            cache,
            queue,
            catalog,
            retry,
            config,
        }
    }

    pub fn cache(&self) -> &Arc<dyn ResponseCache> {
        &self.cache
    }

    /// True when calls can actually be dispatched.
    pub fn is_live(&self) -> bool {
        self.config.enabled && self.provider.provider_info().available
    }

    /// Commentary for one scored category.
    pub async fn judge_category(&self, ctx: &CategoryContext) -> Judgment {
        let max_tokens = self.config.max_tokens;
        self.judge(ctx.cache_key(), Lane::Standard, || {
            ctx.to_request(&trace_id(), max_tokens)
        })
        .await
    }

    /// Narrative for the final recommendation.
    ///
    /// A caller is waiting on this one, so it goes ahead of queued category
    /// enrichment.
    pub async fn judge_final(&self, ctx: &FinalContext) -> Judgment {
        let max_tokens = self.config.max_tokens;
        let catalog = Arc::clone(&self.catalog);
        self.judge(ctx.cache_key(), Lane::Priority, || {
            ctx.to_request(&trace_id(), max_tokens, &catalog)
        })
        .await
    }

    async fn judge<F>(&self, key: CacheKey, lane: Lane, build_request: F) -> Judgment
    where
        F: Fn() -> CompletionRequest,
    {
        if !self.is_live() {
            tracing::debug!(key = %key, "enrichment offline, using fallback");
            return Judgment::fallback("enrichment offline");
        }

        if let Some(cached) = self.lookup(&key).await {
            tracing::debug!(key = %key, "enrichment served from cache");
            return Judgment {
                result: cached,
                source: NarrativeSource::Cache,
            };
        }

        let outcome = self
            .retry
            .execute(|attempt| {
                let request = build_request();
                async move { self.dispatch(request, lane, attempt).await }
            })
            .await;

        let content = match outcome {
            Ok(content) => content,
            Err(err) => {
                tracing::warn!(key = %key, error = %err, "enrichment failed, using fallback");
                return Judgment::fallback(err.to_string());
            }
        };

        let result = EnrichmentResult::parse(&content, &self.catalog);
        if let EnrichmentResult::Error { detail } = &result {
            tracing::warn!(key = %key, detail = %detail, "unusable enrichment, using fallback");
            return Judgment {
                result,
                source: NarrativeSource::Fallback,
            };
        }

        self.store(&key, &result).await;
        Judgment {
            result,
            source: NarrativeSource::Remote,
        }
    }

    async fn dispatch(
        &self,
        request: CompletionRequest,
        lane: Lane,
        attempt: u32,
    ) -> Result<String, DispatchError> {
        // The permit is held for the whole call so requests never overlap.
        let _permit = self.queue.acquire_in(lane).await?;
        tracing::debug!(
            attempt,
            trace_id = %request.metadata.trace_id,
            category = ?request.metadata.category,
            "dispatching completion request"
        );

        let response = timeout(self.config.request_timeout, self.provider.complete(request))
            .await
            .map_err(|_| AIError::Timeout {
                timeout_secs: self.config.request_timeout.as_secs() as u32,
            })??;

        Ok(response.content)
    }

    async fn lookup(&self, key: &CacheKey) -> Option<EnrichmentResult> {
        match self.cache.get(key).await {
            Ok(Some(value)) => match serde_json::from_value::<EnrichmentResult>(value) {
                Ok(result) if result.is_usable() => Some(result),
                Ok(_) => None,
                Err(e) => {
                    tracing::warn!(key = %key, error = %e, "discarding unreadable cache entry");
                    None
                }
            },
            Ok(None) => None,
            Err(e) => {
                tracing::warn!(key = %key, error = %e, "cache lookup failed");
                None
            }
        }
    }

    async fn store(&self, key: &CacheKey, result: &EnrichmentResult) {
        let value = match serde_json::to_value(result) {
            Ok(value) => value,
            Err(e) => {
                tracing::warn!(key = %key, error = %e, "could not serialize enrichment");
                return;
            }
        };
        if let Err(e) = self.cache.set(key, value, self.config.cache_ttl).await {
            tracing::warn!(key = %key, error = %e, "cache write failed");
        }
    }
}

fn trace_id() -> String {
    Uuid::new_v4().to_string()
}
