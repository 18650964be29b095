//! Foundation module - Shared domain primitives.
//!
//! Contains value objects, identifiers, enums, and error types
//! that form the vocabulary of the recommendation engine.

mod category;
mod errors;
mod ids;
mod state_machine;
mod timestamp;
mod weight;

pub use category::Category;
pub use errors::ValidationError;
pub use ids::{ScoreId, SessionId};
pub use state_machine::StateMachine;
pub use timestamp::Timestamp;
pub use weight::Weight;
