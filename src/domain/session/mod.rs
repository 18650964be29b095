//! Session domain module.
//!
//! Holds the one explicit, versioned assessment aggregate and the two
//! lifecycles it enforces: per-category progress and the assessment as a
//! whole.

mod state;
mod status;

pub use state::{
    CategorySlot, NarrativeAttachment, SessionState, SESSION_SCHEMA_VERSION, SESSION_STORE_KEY,
};
pub use status::{AssessmentStatus, CategoryStatus};
