//! Budget error types.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use tally_shared::types::{BudgetId, TransactionId};
use thiserror::Error;

/// Budget-related errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum BudgetError {
    /// A budget handed to the calculator has a negative limit.
    #[error("Invalid budget {budget_id}: limit {amount} is negative")]
    InvalidBudget {
        /// Offending budget.
        budget_id: BudgetId,
        /// Its limit.
        amount: Decimal,
    },

    /// A selected transaction has a negative amount.
    #[error("Invalid transaction {transaction_id}: amount {amount} is negative")]
    InvalidTransaction {
        /// Offending transaction.
        transaction_id: TransactionId,
        /// Its amount.
        amount: Decimal,
    },

    /// Month boundaries cannot be resolved in the evaluation timezone.
    #[error("Cannot resolve the start of {0} in the evaluation timezone")]
    InvalidPeriod(NaiveDate),

    /// Spending or its share of the limit exceeds the `Decimal` range.
    #[error("Amounts for budget {0} exceed the representable range")]
    Overflow(BudgetId),

    /// Budget not found.
    #[error("Budget not found: {0}")]
    NotFound(BudgetId),

    /// A budget for this category already exists for the user.
    #[error("Budget already exists for category {0}")]
    DuplicateCategory(String),

    /// Amount cannot be negative.
    #[error("Amount cannot be negative")]
    NegativeAmount,

    /// Category must not be blank.
    #[error("Category cannot be empty")]
    EmptyCategory,
}
