//! SetCategoryPriorityHandler - changes how much a category counts overall.

use std::sync::Arc;

use crate::application::errors::EngineError;
use crate::application::session_handle::SessionHandle;
use crate::domain::foundation::{Category, Weight};

#[derive(Debug, Clone)]
pub struct SetCategoryPriorityCommand {
    pub category: Category,
    /// In `[0, 1]`; categories default to 1.0.
    pub priority: f64,
}

pub struct SetCategoryPriorityHandler {
    session: Arc<SessionHandle>,
}

impl SetCategoryPriorityHandler {
    pub fn new(session: Arc<SessionHandle>) -> Self {
        Self { session }
    }

    pub async fn handle(&self, cmd: SetCategoryPriorityCommand) -> Result<Weight, EngineError> {
        let priority = Weight::try_new(cmd.priority)?;
        let category = cmd.category;
        self.session
            .update(move |state| {
                state.set_priority(category, priority);
                Ok(priority)
            })
            .await
    }
}
