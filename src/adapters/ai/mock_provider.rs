//! Scriptable `AIProvider` for tests.
//!
//! Outcomes are scripted up front and consumed in order; once the script
//! runs out, every call gets the fallback outcome. Each call is recorded
//! with the tokio instant it arrived at so tests can check queue spacing
//! under a paused clock.
//!
//! ```ignore
//! let provider = MockAIProvider::new()
//!     .with_error(MockError::RateLimited { retry_after_secs: 1 })
//!     .with_response(r#"{"summary": "Omnipod 5 suits daily swimming"}"#);
//! ```

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::time::{sleep, Instant};

use crate::ports::{
    AIError, AIProvider, CompletionRequest, CompletionResponse, FinishReason, ProviderInfo,
    TokenUsage,
};

#[derive(Debug, Clone)]
pub struct MockAIProvider {
    script: Arc<Mutex<VecDeque<Outcome>>>,
    fallback: Outcome,
    delay: Duration,
    calls: Arc<Mutex<Vec<RecordedCall>>>,
}

#[derive(Debug, Clone)]
enum Outcome {
    Reply(String),
    Fail(MockError),
}

/// Failures a test can inject. Each maps onto one `AIError` variant.
#[derive(Debug, Clone)]
pub enum MockError {
    RateLimited { retry_after_secs: u32 },
    ContentFiltered { reason: String },
    Unavailable { message: String },
    AuthenticationFailed,
    Network { message: String },
    Timeout { timeout_secs: u32 },
}

impl From<MockError> for AIError {
    fn from(err: MockError) -> Self {
        match err {
            MockError::RateLimited { retry_after_secs } => AIError::rate_limited(retry_after_secs),
            MockError::ContentFiltered { reason } => AIError::ContentFiltered { reason },
            MockError::Unavailable { message } => AIError::unavailable(message),
            MockError::AuthenticationFailed => AIError::AuthenticationFailed,
            MockError::Network { message } => AIError::network(message),
            MockError::Timeout { timeout_secs } => AIError::Timeout { timeout_secs },
        }
    }
}

#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub request: CompletionRequest,
    pub at: Instant,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl Default for MockAIProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl MockAIProvider {
    /// Replies "Mock response" to everything.
    pub fn new() -> Self {
        Self {
            script: Arc::default(),
            fallback: Outcome::Reply("Mock response".to_string()),
            delay: Duration::ZERO,
            calls: Arc::default(),
        }
    }

    pub fn always_failing(error: MockError) -> Self {
        Self::new().with_default_error(error)
    }

    pub fn with_response(self, content: impl Into<String>) -> Self {
        lock(&self.script).push_back(Outcome::Reply(content.into()));
        self
    }

    pub fn with_error(self, error: MockError) -> Self {
        lock(&self.script).push_back(Outcome::Fail(error));
        self
    }

    pub fn with_default_response(mut self, content: impl Into<String>) -> Self {
        self.fallback = Outcome::Reply(content.into());
        self
    }

    pub fn with_default_error(mut self, error: MockError) -> Self {
        self.fallback = Outcome::Fail(error);
        self
    }

    /// Latency added to every call, on the tokio clock.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn call_count(&self) -> usize {
        lock(&self.calls).len()
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        lock(&self.calls).clone()
    }

    /// Arrival instants, oldest first.
    pub fn call_instants(&self) -> Vec<Instant> {
        lock(&self.calls).iter().map(|call| call.at).collect()
    }
}

#[async_trait]
impl AIProvider for MockAIProvider {
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, AIError> {
        lock(&self.calls).push(RecordedCall {
            request,
            at: Instant::now(),
        });
        if !self.delay.is_zero() {
            sleep(self.delay).await;
        }

        let outcome = lock(&self.script)
            .pop_front()
            .unwrap_or_else(|| self.fallback.clone());
        match outcome {
            Outcome::Reply(content) => Ok(CompletionResponse {
                content,
                usage: TokenUsage::new(10, 20),
                model: "mock-model".to_string(),
                finish_reason: FinishReason::Stop,
            }),
            Outcome::Fail(err) => Err(err.into()),
        }
    }

    fn provider_info(&self) -> ProviderInfo {
        ProviderInfo::new("mock", "mock-model")
    }
}
