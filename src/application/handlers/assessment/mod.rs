//! Assessment handlers.

mod begin_category;
mod clear_session;
mod enrich_category;
mod generate_recommendation;
mod set_category_priority;
mod submit_category_response;

pub use begin_category::{BeginCategoryCommand, BeginCategoryHandler};
pub use clear_session::{ClearSessionCommand, ClearSessionHandler};
pub use enrich_category::{EnrichCategoryCommand, EnrichCategoryHandler, EnrichCategoryResult};
pub use generate_recommendation::{GenerateRecommendationCommand, GenerateRecommendationHandler};
pub use set_category_priority::{SetCategoryPriorityCommand, SetCategoryPriorityHandler};
pub use submit_category_response::{
    SubmitCategoryResponseCommand, SubmitCategoryResponseHandler, SubmitCategoryResponseResult,
    MAX_TRANSCRIPT_CHARS,
};
