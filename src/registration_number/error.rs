//! Registration number errors

use thiserror::Error;

/// Deterministic failures of encoding and allocation
///
/// None of these are retryable: the same input always fails the same way.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistrationNumberError {
    #[error("Invalid {field}: '{value}' has no registration code")]
    InvalidAttribute { field: &'static str, value: String },

    #[error("Subject '{subject}' is not offered for grade {grade}")]
    IneligibleCombination { grade: String, subject: String },

    #[error("Registration numbers exhausted for prefix {prefix}")]
    SequenceExhausted { prefix: String },
}

impl RegistrationNumberError {
    /// Get the error code for API responses
    pub fn code(&self) -> &'static str {
        match self {
            RegistrationNumberError::InvalidAttribute { .. } => "INVALID_ATTRIBUTE",
            RegistrationNumberError::IneligibleCombination { .. } => "INELIGIBLE_COMBINATION",
            RegistrationNumberError::SequenceExhausted { .. } => "SEQUENCE_EXHAUSTED",
        }
    }

    /// Name of the offending field, for form-level validation messages
    pub fn field(&self) -> Option<&'static str> {
        match self {
            RegistrationNumberError::InvalidAttribute { field, .. } => Some(*field),
            RegistrationNumberError::IneligibleCombination { .. } => Some("subject_track"),
            RegistrationNumberError::SequenceExhausted { .. } => None,
        }
    }
}
