//! AI Provider Adapters.
//!
//! Implementations of the AIProvider port.
//!
//! ## Available Adapters
//!
//! - `AnthropicProvider` - Anthropic Messages API
//! - `MockAIProvider` - Configurable mock for testing
//! - `OfflineProvider` - Used when no API key is configured; always fails

mod anthropic_provider;
mod mock_provider;
mod offline_provider;

pub use anthropic_provider::{AnthropicConfig, AnthropicProvider, DEFAULT_ANTHROPIC_MODEL};
pub use mock_provider::{MockAIProvider, MockError, RecordedCall};
pub use offline_provider::OfflineProvider;
