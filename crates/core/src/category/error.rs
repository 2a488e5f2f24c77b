//! Category error types.

use thiserror::Error;

/// Category registry errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CategoryError {
    /// Type was neither `income` nor `expense`.
    #[error("Invalid category type: {0}")]
    InvalidType(String),

    /// Name must not be blank.
    #[error("Category name cannot be empty")]
    EmptyName,
}
