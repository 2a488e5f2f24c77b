//! Query service error types.

use tally_shared::AppError;
use thiserror::Error;

use super::store::StoreError;
use crate::budget::BudgetError;
use crate::category::CategoryError;
use crate::transaction::TransactionError;

/// Errors surfaced by the query service.
#[derive(Debug, Error)]
pub enum QueryError {
    /// Budget rule violation or calculator failure.
    #[error(transparent)]
    Budget(#[from] BudgetError),

    /// Transaction rule violation.
    #[error(transparent)]
    Transaction(#[from] TransactionError),

    /// Category registry rule violation.
    #[error(transparent)]
    Category(#[from] CategoryError),

    /// Backing store failure.
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl From<QueryError> for AppError {
    fn from(err: QueryError) -> Self {
        let message = err.to_string();
        match err {
            QueryError::Budget(BudgetError::NotFound(_))
            | QueryError::Transaction(TransactionError::NotFound(_)) => Self::NotFound(message),
            QueryError::Budget(BudgetError::DuplicateCategory(_)) => Self::Conflict(message),
            QueryError::Budget(BudgetError::NegativeAmount | BudgetError::EmptyCategory)
            | QueryError::Transaction(
                TransactionError::NegativeAmount(_) | TransactionError::EmptyCategory,
            )
            | QueryError::Category(_) => Self::Validation(message),
            // Upstream invariant violations: the stored data itself is wrong.
            QueryError::Budget(
                BudgetError::InvalidBudget { .. }
                | BudgetError::InvalidTransaction { .. }
                | BudgetError::InvalidPeriod(_)
                | BudgetError::Overflow(_),
            )
            | QueryError::Transaction(TransactionError::Overflow) => Self::Internal(message),
            QueryError::Store(_) => Self::Database(message),
        }
    }
}
