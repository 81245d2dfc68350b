//! Domain error types

use thiserror::Error;

/// Domain-level errors.
///
/// Admission, normalization and sequencing never fail at runtime; these
/// errors only surface while validating configuration values.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DomainError {
    #[error("Invalid trigger range: min {min} / max {max} (need 0 <= min <= max)")]
    InvalidTriggerRange { min: i64, max: i64 },

    #[error("slot_size must be at least 1")]
    InvalidSlotSize,

    #[error("Probability must be within [0, 1], got {0}")]
    InvalidProbability(f64),

    #[error("Invalid pattern `{pattern}`: {message}")]
    InvalidPattern { pattern: String, message: String },

    #[error("Conversation `{key}` is claimed by both slot `{first}` and slot `{second}`")]
    OverlappingSlots {
        key: String,
        first: String,
        second: String,
    },

    #[error("Unknown backend kind: {0}")]
    UnknownBackendKind(String),
}

impl DomainError {
    /// Build an [`DomainError::InvalidPattern`] from a regex compile failure.
    pub fn invalid_pattern(pattern: &str, error: &regex::Error) -> Self {
        DomainError::InvalidPattern {
            pattern: pattern.to_string(),
            message: error.to_string(),
        }
    }
}
