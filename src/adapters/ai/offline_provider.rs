//! Offline Provider - used when no completion API key is configured.
//!
//! Every call fails immediately with a non-retryable error, so enrichment
//! falls straight through to the deterministic fallback without backoff.

use async_trait::async_trait;

use crate::ports::{AIError, AIProvider, CompletionRequest, CompletionResponse, ProviderInfo};

/// AIProvider that never answers.
#[derive(Debug, Clone, Copy, Default)]
pub struct OfflineProvider;

impl OfflineProvider {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl AIProvider for OfflineProvider {
    async fn complete(&self, _request: CompletionRequest) -> Result<CompletionResponse, AIError> {
        Err(AIError::InvalidRequest(
            "no completion provider configured".to_string(),
        ))
    }

    fn provider_info(&self) -> ProviderInfo {
        ProviderInfo::new("offline", "none").unavailable()
    }
}
