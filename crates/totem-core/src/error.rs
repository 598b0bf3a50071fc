//! # Validation Errors
//!
//! Field-level validation failures raised by catalog write inputs.
//! The API layer maps every variant to a 422 response.

use thiserror::Error;

/// A write input violated a field rule.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// A required text field was missing or blank.
    #[error("{field} must not be empty")]
    Empty { field: &'static str },

    /// A text field exceeded its length limit (in characters).
    #[error("{field} must not exceed {max} characters")]
    TooLong { field: &'static str, max: usize },

    /// An identifier was zero or negative.
    #[error("{field} must be a positive id")]
    InvalidId { field: &'static str },

    /// A sort order was negative.
    #[error("{field} must not be negative")]
    Negative { field: &'static str },
}
