//! Catalog errors.

use thiserror::Error;

/// Errors raised while loading or querying the device catalog.
///
/// `Integrity` is a data bug and is fatal at load time; the catalog never
/// substitutes defaults for missing dimensions.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CatalogError {
    #[error("catalog integrity violation for '{device_id}': {reason}")]
    Integrity { device_id: String, reason: String },

    #[error("device not found: {0}")]
    NotFound(String),

    #[error("duplicate device id: {0}")]
    DuplicateDevice(String),

    #[error("catalog contains no devices")]
    Empty,

    #[error("failed to parse catalog: {0}")]
    Parse(String),

    #[error("failed to read catalog: {0}")]
    Io(String),
}

impl CatalogError {
    /// Creates an integrity error for a device.
    pub fn integrity(device_id: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Integrity {
            device_id: device_id.into(),
            reason: reason.into(),
        }
    }
}
