//! PumpDrive - Insulin Pump Recommendation Engine
//!
//! This crate turns a patient's free-text answers across six preference
//! categories into a deterministic, explainable insulin pump recommendation,
//! optionally enriched with completion-service commentary.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
