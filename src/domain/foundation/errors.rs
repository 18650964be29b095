//! Domain validation errors.

use thiserror::Error;

/// Malformed patient input or an illegal state change.
///
/// Always returned to the caller; never degraded to a fallback.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("{field} must be within [{min}, {max}], got {actual}")]
    OutOfRange {
        field: String,
        min: f64,
        max: f64,
        actual: f64,
    },

    #[error("{field} is {actual} characters long, limit is {max}")]
    TooLong {
        field: String,
        max: usize,
        actual: usize,
    },

    #[error("{field} is not valid: {reason}")]
    InvalidFormat { field: String, reason: String },

    #[error("cannot move from {from} to {to}")]
    InvalidTransition { from: String, to: String },

    #[error("no category has been scored yet")]
    NoCategoriesScored,
}

impl ValidationError {
    pub fn out_of_range(field: impl Into<String>, min: f64, max: f64, actual: f64) -> Self {
        Self::OutOfRange {
            field: field.into(),
            min,
            max,
            actual,
        }
    }

    pub fn too_long(field: impl Into<String>, max: usize, actual: usize) -> Self {
        Self::TooLong {
            field: field.into(),
            max,
            actual,
        }
    }

    pub fn invalid_format(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidFormat {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn priority_out_of_range_message() {
        let err = ValidationError::out_of_range("priority", 0.0, 1.0, 1.5);
        assert_eq!(err.to_string(), "priority must be within [0, 1], got 1.5");
    }

    #[test]
    fn oversized_transcript_message() {
        let err = ValidationError::too_long("transcript", 20_000, 20_001);
        assert_eq!(
            err.to_string(),
            "transcript is 20001 characters long, limit is 20000"
        );
    }

    #[test]
    fn nothing_scored_message() {
        assert_eq!(
            ValidationError::NoCategoriesScored.to_string(),
            "no category has been scored yet"
        );
    }
}
