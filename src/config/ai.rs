//! `ai.*`: which completion service to call, and how.

use secrecy::{ExposeSecret, Secret};
use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;

const MAX_TOKENS_LIMIT: u32 = 8192;

/// Leaving `anthropic_api_key` unset (or empty) runs the engine offline:
/// every narrative is the deterministic fallback.
#[derive(Debug, Clone, Deserialize)]
pub struct AiConfig {
    pub anthropic_api_key: Option<Secret<String>>,

    #[serde(default = "default_model")]
    pub model: String,

    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Seconds, 1..=300.
    #[serde(default = "default_timeout")]
    pub request_timeout_secs: u64,

    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
}

impl AiConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// True when a non-empty key is present.
    pub fn has_anthropic(&self) -> bool {
        self.anthropic_api_key
            .as_ref()
            .is_some_and(|k| !k.expose_secret().is_empty())
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if let Some(key) = &self.anthropic_api_key {
            let key = key.expose_secret();
            if !key.is_empty() && !key.starts_with("sk-ant-") {
                return Err(ValidationError::InvalidAnthropicKey);
            }
        }
        if self.request_timeout_secs == 0 || self.request_timeout_secs > 300 {
            return Err(ValidationError::InvalidTimeout);
        }
        if self.max_tokens == 0 || self.max_tokens > MAX_TOKENS_LIMIT {
            return Err(ValidationError::InvalidMaxTokens {
                max: MAX_TOKENS_LIMIT,
            });
        }
        if self.model.trim().is_empty() {
            return Err(ValidationError::MissingRequired("AI__MODEL"));
        }
        Ok(())
    }
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            anthropic_api_key: None,
            model: default_model(),
            base_url: default_base_url(),
            request_timeout_secs: default_timeout(),
            max_tokens: default_max_tokens(),
        }
    }
}

fn default_model() -> String {
    crate::adapters::ai::DEFAULT_ANTHROPIC_MODEL.to_string()
}

fn default_base_url() -> String {
    "https://api.anthropic.com".to_string()
}

fn default_timeout() -> u64 {
    30
}

fn default_max_tokens() -> u32 {
    1024
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_offline_and_valid() {
        let config = AiConfig::default();
        assert_eq!(config.request_timeout_secs, 30);
        assert_eq!(config.max_tokens, 1024);
        assert!(!config.has_anthropic());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn timeout_is_seconds() {
        let config = AiConfig {
            request_timeout_secs: 60,
            ..Default::default()
        };
        assert_eq!(config.request_timeout(), Duration::from_secs(60));
    }

    #[test]
    fn empty_key_means_offline() {
        let config = AiConfig {
            anthropic_api_key: Some(Secret::new(String::new())),
            ..Default::default()
        };
        assert!(!config.has_anthropic());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn key_without_anthropic_prefix_is_rejected() {
        let config = AiConfig {
            anthropic_api_key: Some(Secret::new("sk-xxx".to_string())),
            ..Default::default()
        };
        assert_eq!(config.validate(), Err(ValidationError::InvalidAnthropicKey));
    }

    #[test]
    fn zero_timeout_is_rejected() {
        let config = AiConfig {
            request_timeout_secs: 0,
            ..Default::default()
        };
        assert_eq!(config.validate(), Err(ValidationError::InvalidTimeout));
    }

    #[test]
    fn well_formed_key_goes_online() {
        let config = AiConfig {
            anthropic_api_key: Some(Secret::new("sk-ant-xxx".to_string())),
            ..Default::default()
        };
        assert!(config.has_anthropic());
        assert!(config.validate().is_ok());
    }
}
