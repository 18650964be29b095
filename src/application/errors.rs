//! Errors surfaced by the recommendation engine.
//!
//! Completion-service, cache and queue failures never appear here; they
//! degrade to fallback output inside the enrichment layer.

use thiserror::Error;

use crate::domain::catalog::CatalogError;
use crate::domain::foundation::ValidationError;
use crate::ports::{CacheError, SessionStoreError};

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Invalid input: {0}")]
    Validation(#[from] ValidationError),

    #[error("Catalog error: {0}")]
    Catalog(#[from] CatalogError),

    #[error("Session store error: {0}")]
    Store(#[from] SessionStoreError),

    /// Only raised while wiring adapters; runtime cache failures are absorbed.
    #[error("Cache setup failed: {0}")]
    CacheSetup(#[from] CacheError),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl EngineError {
    pub fn config(message: impl Into<String>) -> Self {
        EngineError::Config(message.into())
    }

    /// True if the caller passed bad input rather than hitting a fault.
    pub fn is_validation(&self) -> bool {
        matches!(self, EngineError::Validation(_))
    }
}
