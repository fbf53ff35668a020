//! Error types for key operations

use thiserror::Error;

/// Message returned when a create or update request lacks a name or value.
pub const REQUIRED_FIELDS_MESSAGE: &str = "Name and value are required";

/// Message returned when a validation request carries a blank candidate.
pub const CANDIDATE_REQUIRED_MESSAGE: &str = "API key to check is required";

/// Key service error types
#[derive(Error, Debug)]
pub enum KeyError {
    /// Caller input failed a local check; the store was never contacted.
    #[error("{0}")]
    Validation(String),

    /// The store call failed. Carries the store's message verbatim.
    #[error("{0}")]
    StoreUnavailable(String),
}

impl KeyError {
    pub fn missing_fields() -> Self {
        KeyError::Validation(REQUIRED_FIELDS_MESSAGE.to_string())
    }

    pub fn missing_candidate() -> Self {
        KeyError::Validation(CANDIDATE_REQUIRED_MESSAGE.to_string())
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, KeyError::Validation(_))
    }
}

impl From<anyhow::Error> for KeyError {
    fn from(err: anyhow::Error) -> Self {
        tracing::warn!(error = %format!("{err:#}"), "Key store call failed");
        KeyError::StoreUnavailable(err.to_string())
    }
}

/// Result type alias for key service operations
pub type Result<T> = std::result::Result<T, KeyError>;
