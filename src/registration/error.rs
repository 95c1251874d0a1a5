//! Registration workflow errors

use thiserror::Error;

use crate::db::StoreError;
use crate::registration_number::RegistrationNumberError;

/// Errors surfaced to the registration form and the admin area
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistrationError {
    // === Validation Errors ===
    #[error(transparent)]
    Number(#[from] RegistrationNumberError),

    #[error("Invalid {field}: {reason}")]
    InvalidField {
        field: &'static str,
        reason: &'static str,
    },

    // === Allocation Errors ===
    #[error("Could not allocate a unique registration number after {attempts} attempts")]
    AllocationConflict { attempts: u32 },

    // === Lookup Errors ===
    #[error("Registration not found: {0}")]
    NotFound(String),

    // === System Errors ===
    #[error("Store error: {0}")]
    Store(StoreError),
}

impl RegistrationError {
    /// Get the error code for API responses
    pub fn code(&self) -> &'static str {
        match self {
            RegistrationError::Number(e) => e.code(),
            RegistrationError::InvalidField { .. } => "INVALID_FIELD",
            RegistrationError::AllocationConflict { .. } => "ALLOCATION_CONFLICT",
            RegistrationError::NotFound(_) => "REGISTRATION_NOT_FOUND",
            RegistrationError::Store(_) => "STORE_ERROR",
        }
    }

    /// Get HTTP status code suggestion
    pub fn http_status(&self) -> u16 {
        match self {
            RegistrationError::Number(RegistrationNumberError::SequenceExhausted { .. }) => 409,
            RegistrationError::Number(_) | RegistrationError::InvalidField { .. } => 400,
            RegistrationError::NotFound(_) => 404,
            RegistrationError::AllocationConflict { .. } => 503,
            RegistrationError::Store(_) => 500,
        }
    }
}

impl From<StoreError> for RegistrationError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::NotFound(what) => RegistrationError::NotFound(what),
            other => RegistrationError::Store(other),
        }
    }
}
