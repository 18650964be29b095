//! Session Store Port - Key/value persistence for the assessment session.
//!
//! The session is written as one JSON value under one key. Implementations
//! must make each `set` atomic: a reader sees the old value or the new
//! value, never a mix.

use async_trait::async_trait;

/// Errors that can occur during session storage operations.
#[derive(Debug, thiserror::Error)]
pub enum SessionStoreError {
    #[error("Failed to serialize session: {0}")]
    SerializationFailed(String),

    #[error("Failed to deserialize session: {0}")]
    DeserializationFailed(String),

    #[error("IO error: {0}")]
    IoError(String),

    #[error("Invalid key: {0}")]
    InvalidKey(String),
}

/// Port for persisting the session.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Loads the value stored under `key`, if any.
    async fn get(&self, key: &str) -> Result<Option<serde_json::Value>, SessionStoreError>;

    /// Replaces the value stored under `key`.
    async fn set(&self, key: &str, value: &serde_json::Value) -> Result<(), SessionStoreError>;

    /// Removes `key`. Removing a missing key is not an error.
    async fn remove(&self, key: &str) -> Result<(), SessionStoreError>;

    /// Removes every key.
    async fn clear(&self) -> Result<(), SessionStoreError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn errors_display_their_cause() {
        let err = SessionStoreError::IoError("disk full".to_string());
        assert_eq!(err.to_string(), "IO error: disk full");

        let err = SessionStoreError::InvalidKey("../etc".to_string());
        assert!(err.to_string().contains("Invalid key"));
    }
}
