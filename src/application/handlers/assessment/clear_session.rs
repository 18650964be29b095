//! ClearSessionHandler - forgets every answer and cached response.

use std::sync::Arc;

use crate::application::errors::EngineError;
use crate::application::session_handle::SessionHandle;
use crate::ports::ResponseCache;

#[derive(Debug, Clone, Default)]
pub struct ClearSessionCommand;

pub struct ClearSessionHandler {
    session: Arc<SessionHandle>,
    cache: Arc<dyn ResponseCache>,
}

impl ClearSessionHandler {
    pub fn new(session: Arc<SessionHandle>, cache: Arc<dyn ResponseCache>) -> Self {
        Self { session, cache }
    }

    pub async fn handle(&self, _cmd: ClearSessionCommand) -> Result<(), EngineError> {
        if let Err(e) = self.cache.clear().await {
            tracing::warn!(error = %e, "response cache could not be cleared");
        }
        self.session.reset().await?;
        tracing::info!("all assessment data cleared");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::cache::InMemoryResponseCache;
    use crate::adapters::storage::InMemorySessionStore;
    use crate::domain::foundation::Category;
    use crate::ports::CacheKey;
    use serde_json::json;
    use std::time::Duration;

    #[tokio::test]
    async fn clears_cache_and_session() {
        let cache = Arc::new(InMemoryResponseCache::new());
        let key = CacheKey::for_enrichment("cost", "cheap please");
        cache
            .set(&key, json!({"kind": "freeform", "text": "x"}), Duration::from_secs(60))
            .await
            .unwrap();
        let session = Arc::new(
            SessionHandle::open(Arc::new(InMemorySessionStore::new()))
                .await
                .unwrap(),
        );
        session
            .update(|s| s.begin_category(Category::Cost))
            .await
            .unwrap();

        ClearSessionHandler::new(session.clone(), cache.clone())
            .handle(ClearSessionCommand)
            .await
            .unwrap();

        assert!(cache.get(&key).await.unwrap().is_none());
        assert_eq!(
            session.snapshot().await.category_status(Category::Cost),
            crate::domain::session::CategoryStatus::NotStarted
        );
    }
}
