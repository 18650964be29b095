//! Domain layer containing business logic and domain types.
//!
//! # Module Organization
//!
//! - `foundation` - Shared domain primitives (value objects, IDs, enums, errors)
//! - `catalog` - Versioned registry of device profiles and dimension schema
//! - `preference` - Patient signal and rule-based preference extraction
//! - `scoring` - Deterministic per-category device scoring
//! - `session` - Versioned assessment aggregate and its state machines
//! - `recommendation` - Aggregation, fallback narrative and printable report

pub mod catalog;
pub mod foundation;
pub mod preference;
pub mod recommendation;
pub mod scoring;
pub mod session;
