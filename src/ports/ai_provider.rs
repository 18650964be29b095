//! Port for the remote completion service.
//!
//! Completions only ever add commentary. The engine must reach a full
//! recommendation when every call through this port fails, so adapters
//! make a single attempt and report what went wrong; pacing and retries
//! happen in `application::enrichment`.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::foundation::{Category, SessionId};

#[async_trait]
pub trait AIProvider: Send + Sync {
    /// One non-streaming completion.
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, AIError>;

    fn provider_info(&self) -> ProviderInfo;
}

/// A prompt plus generation limits.
#[derive(Debug, Clone)]
pub struct CompletionRequest {
    pub messages: Vec<Message>,
    pub system_prompt: Option<String>,
    /// Falls back to the adapter's own budget when unset.
    pub max_tokens: Option<u32>,
    pub temperature: Option<f32>,
    pub metadata: RequestMetadata,
}

impl CompletionRequest {
    pub fn new(metadata: RequestMetadata) -> Self {
        Self {
            messages: Vec::new(),
            system_prompt: None,
            max_tokens: None,
            temperature: None,
            metadata,
        }
    }

    pub fn with_message(mut self, role: MessageRole, content: impl Into<String>) -> Self {
        self.messages.push(Message {
            role,
            content: content.into(),
        });
        self
    }

    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = Some(prompt.into());
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub role: MessageRole,
    pub content: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    System,
    User,
    Assistant,
}

/// Who asked, for log correlation. Never sent to the provider.
#[derive(Debug, Clone)]
pub struct RequestMetadata {
    pub session_id: SessionId,
    /// `None` when the request is for the final narrative.
    pub category: Option<Category>,
    pub trace_id: String,
}

impl RequestMetadata {
    pub fn new(session_id: SessionId, category: Option<Category>, trace_id: impl Into<String>) -> Self {
        Self {
            session_id,
            category,
            trace_id: trace_id.into(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct CompletionResponse {
    pub content: String,
    pub usage: TokenUsage,
    pub model: String,
    pub finish_reason: FinishReason,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUsage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

impl TokenUsage {
    pub fn new(prompt_tokens: u32, completion_tokens: u32) -> Self {
        Self {
            prompt_tokens,
            completion_tokens,
            total_tokens: prompt_tokens + completion_tokens,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FinishReason {
    Stop,
    /// Ran into `max_tokens`; the content may be cut mid-sentence.
    Length,
    ContentFilter,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderInfo {
    pub name: String,
    pub model: String,
    /// False for a provider that can never answer. The engine skips the
    /// request queue entirely when it sees this.
    pub available: bool,
}

impl ProviderInfo {
    pub fn new(name: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            model: model.into(),
            available: true,
        }
    }

    pub fn unavailable(self) -> Self {
        Self {
            available: false,
            ..self
        }
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum AIError {
    #[error("throttled by provider, retry in {retry_after_secs}s")]
    RateLimited { retry_after_secs: u32 },

    #[error("completion refused: {reason}")]
    ContentFiltered { reason: String },

    /// Overloaded, 5xx, or not configured at all.
    #[error("provider unavailable: {message}")]
    Unavailable { message: String },

    #[error("provider rejected the credentials")]
    AuthenticationFailed,

    #[error("transport failure: {0}")]
    Network(String),

    #[error("unreadable provider response: {0}")]
    Parse(String),

    #[error("request rejected: {0}")]
    InvalidRequest(String),

    #[error("no answer within {timeout_secs}s")]
    Timeout { timeout_secs: u32 },
}

impl AIError {
    pub fn rate_limited(retry_after_secs: u32) -> Self {
        Self::RateLimited { retry_after_secs }
    }

    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable {
            message: message.into(),
        }
    }

    pub fn network(message: impl Into<String>) -> Self {
        Self::Network(message.into())
    }

    /// Transient failures worth another attempt. Everything else is final
    /// and sends the caller straight to its fallback.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::RateLimited { .. }
            | Self::Unavailable { .. }
            | Self::Network(_)
            | Self::Timeout { .. } => true,
            Self::ContentFiltered { .. }
            | Self::AuthenticationFailed
            | Self::Parse(_)
            | Self::InvalidRequest(_) => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_collects_prompt_and_limits() {
        let request = CompletionRequest::new(RequestMetadata::new(
            SessionId::new(),
            Some(Category::Support),
            "support-1",
        ))
        .with_system_prompt("You compare insulin pumps")
        .with_message(MessageRole::User, "Which pump has the best support?")
        .with_max_tokens(512)
        .with_temperature(0.0);

        assert_eq!(request.messages.len(), 1);
        assert_eq!(request.messages[0].role, MessageRole::User);
        assert_eq!(request.system_prompt.as_deref(), Some("You compare insulin pumps"));
        assert_eq!(request.max_tokens, Some(512));
        assert_eq!(request.metadata.category, Some(Category::Support));
    }

    #[test]
    fn usage_total_is_the_sum() {
        assert_eq!(TokenUsage::new(120, 30).total_tokens, 150);
    }

    #[test]
    fn unavailable_provider_info() {
        assert!(ProviderInfo::new("anthropic", "haiku").available);
        assert!(!ProviderInfo::new("offline", "none").unavailable().available);
    }

    #[test]
    fn transient_errors_are_retryable() {
        assert!(AIError::rate_limited(30).is_retryable());
        assert!(AIError::unavailable("overloaded").is_retryable());
        assert!(AIError::network("connection reset").is_retryable());
        assert!(AIError::Timeout { timeout_secs: 30 }.is_retryable());
    }

    #[test]
    fn final_errors_are_not_retryable() {
        assert!(!AIError::AuthenticationFailed.is_retryable());
        assert!(!AIError::Parse("truncated".into()).is_retryable());
        assert!(!AIError::InvalidRequest("no messages".into()).is_retryable());
        assert!(!AIError::ContentFiltered { reason: "policy".into() }.is_retryable());
    }

    #[test]
    fn throttling_message_carries_the_delay() {
        assert_eq!(
            AIError::rate_limited(12).to_string(),
            "throttled by provider, retry in 12s"
        );
    }
}
