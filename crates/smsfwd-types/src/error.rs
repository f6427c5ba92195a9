//! Error types for request validation in smsfwd-types.

use thiserror::Error;

/// Errors raised when a request body fails local validation.
///
/// This enum is marked `#[non_exhaustive]` to allow adding new error variants
/// in future versions without breaking downstream code.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum ValidationError {
    /// A required field was empty or whitespace only.
    #[error("field '{0}' must not be empty")]
    EmptyField(&'static str),
}

/// Result type alias using smsfwd-types' ValidationError type.
pub type ValidationResult<T> = std::result::Result<T, ValidationError>;
