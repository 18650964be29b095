//! Application handlers.
//!
//! Command and query handlers that orchestrate domain operations.

pub mod assessment;

pub use assessment::{
    BeginCategoryCommand, BeginCategoryHandler, ClearSessionCommand, ClearSessionHandler,
    EnrichCategoryCommand, EnrichCategoryHandler, EnrichCategoryResult,
    GenerateRecommendationCommand, GenerateRecommendationHandler, SetCategoryPriorityCommand,
    SetCategoryPriorityHandler, SubmitCategoryResponseCommand, SubmitCategoryResponseHandler,
    SubmitCategoryResponseResult, MAX_TRANSCRIPT_CHARS,
};
