//! SessionHandle - the one live `SessionState` and its persistence.
//!
//! Mutations are applied to a copy, written to the store, and only then
//! swapped in whole, so a failed operation never leaves a half-updated
//! state behind in memory or in the store. Writers are serialized by a gate.

use std::sync::Arc;

use tokio::sync::{Mutex, RwLock};

use crate::domain::foundation::ValidationError;
use crate::domain::session::{SessionState, SESSION_STORE_KEY};
use crate::ports::{SessionStore, SessionStoreError};

use super::errors::EngineError;

pub struct SessionHandle {
    state: RwLock<SessionState>,
    store: Arc<dyn SessionStore>,
    persist_gate: Mutex<()>,
}

impl SessionHandle {
    /// Restores the persisted session, or starts a fresh one.
    ///
    /// Unreadable or incompatible persisted state is discarded.
    pub async fn open(store: Arc<dyn SessionStore>) -> Result<Self, EngineError> {
        let state = match store.get(SESSION_STORE_KEY).await {
            Ok(Some(value)) => SessionState::restore(value).unwrap_or_else(SessionState::new),
            Ok(None) => SessionState::new(),
            Err(SessionStoreError::DeserializationFailed(reason)) => {
                tracing::warn!(reason = %reason, "discarding unreadable session");
                SessionState::new()
            }
            Err(e) => return Err(e.into()),
        };

        tracing::info!(
            session_id = %state.id(),
            scored = state.scored().len(),
            "session opened"
        );

        Ok(Self {
            state: RwLock::new(state),
            store,
            persist_gate: Mutex::new(()),
        })
    }

    pub async fn snapshot(&self) -> SessionState {
        self.state.read().await.clone()
    }

    pub async fn read<R>(&self, f: impl FnOnce(&SessionState) -> R) -> R {
        f(&*self.state.read().await)
    }

    /// Applies `f` to a copy, persists the copy, then makes it live.
    ///
    /// All writers hold `persist_gate`, so the state read here cannot change
    /// before the swap. A failed write leaves both memory and store as they
    /// were.
    pub async fn update<R>(
        &self,
        f: impl FnOnce(&mut SessionState) -> Result<R, ValidationError>,
    ) -> Result<R, EngineError> {
        let _gate = self.persist_gate.lock().await;

        let mut next = self.state.read().await.clone();
        let output = f(&mut next)?;
        let value = next
            .to_value()
            .map_err(|e| SessionStoreError::SerializationFailed(e.to_string()))?;

        self.store.set(SESSION_STORE_KEY, &value).await?;
        *self.state.write().await = next;
        Ok(output)
    }

    /// Drops all stored data and starts a fresh session.
    pub async fn reset(&self) -> Result<(), EngineError> {
        let _gate = self.persist_gate.lock().await;
        self.store.clear().await?;
        *self.state.write().await = SessionState::new();
        Ok(())
    }
}
