//! BeginCategoryHandler - marks a category as being answered.

use std::sync::Arc;

use crate::application::errors::EngineError;
use crate::application::session_handle::SessionHandle;
use crate::domain::foundation::Category;
use crate::domain::session::CategoryStatus;

#[derive(Debug, Clone)]
pub struct BeginCategoryCommand {
    pub category: Category,
}

pub struct BeginCategoryHandler {
    session: Arc<SessionHandle>,
}

impl BeginCategoryHandler {
    pub fn new(session: Arc<SessionHandle>) -> Self {
        Self { session }
    }

    /// Returns the category's status after the transition.
    pub async fn handle(&self, cmd: BeginCategoryCommand) -> Result<CategoryStatus, EngineError> {
        let category = cmd.category;
        self.session
            .update(move |state| {
                state.begin_category(category)?;
                Ok(state.category_status(category))
            })
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::storage::InMemorySessionStore;

    #[tokio::test]
    async fn marks_category_in_progress_and_is_idempotent() {
        let session = Arc::new(
            SessionHandle::open(Arc::new(InMemorySessionStore::new()))
                .await
                .unwrap(),
        );
        let handler = BeginCategoryHandler::new(session);
        let cmd = BeginCategoryCommand {
            category: Category::Algorithm,
        };

        assert_eq!(handler.handle(cmd.clone()).await.unwrap(), CategoryStatus::InProgress);
        assert_eq!(handler.handle(cmd).await.unwrap(), CategoryStatus::InProgress);
    }
}
