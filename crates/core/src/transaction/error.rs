//! Transaction error types.

use rust_decimal::Decimal;
use tally_shared::types::TransactionId;
use thiserror::Error;

/// Transaction-related errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TransactionError {
    /// Transaction not found.
    #[error("Transaction not found: {0}")]
    NotFound(TransactionId),

    /// Amount cannot be negative.
    #[error("Amount cannot be negative: {0}")]
    NegativeAmount(Decimal),

    /// A total exceeds the `Decimal` range.
    #[error("Transaction totals exceed the representable range")]
    Overflow,

    /// Category must not be blank.
    #[error("Category cannot be empty")]
    EmptyCategory,
}
