//! Catalog Module - Static, versioned registry of insulin pump profiles.
//!
//! # Components
//!
//! - `DimensionSchema` - Dimensions defined per category for a schema version
//! - `DeviceProfile` - One device and its per-category dimension weights
//! - `Catalog` - Validated registry; integrity violations fail at load time

mod device;
mod errors;
mod registry;
mod schema;

pub use device::{DeviceProfile, TechnicalAttribute};
pub use errors::CatalogError;
pub use registry::{Catalog, CatalogExcerpt, ExcerptDevice};
pub use schema::{DimensionDef, DimensionSchema};

#[cfg(test)]
pub(crate) use registry::test_support;
