//! Storage abstraction for the query service.

use std::future::Future;

use tally_shared::types::{BudgetId, TransactionId, UserId};
use thiserror::Error;

use crate::budget::Budget;
use crate::category::CategoryRegistry;
use crate::transaction::{Transaction, TransactionFilter};

/// Failure reported by a store implementation.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// The backing store could not be reached or read.
    #[error("store unavailable: {0}")]
    Unavailable(String),

    /// A mutation could not be made durable.
    #[error("failed to persist changes: {0}")]
    Persistence(String),
}

/// Repository trait for per-user budgets, transactions and categories.
///
/// Implementations hand out owned copies; the service never holds a
/// reference into the store across calls.
pub trait LedgerStore: Send + Sync {
    /// All budgets of a user, active or not, in creation order.
    fn budgets(
        &self,
        user_id: UserId,
    ) -> impl Future<Output = Result<Vec<Budget>, StoreError>> + Send;

    /// Inserts a new budget.
    fn insert_budget(&self, budget: Budget) -> impl Future<Output = Result<(), StoreError>> + Send;

    /// Replaces a stored budget. Returns false if it does not exist.
    fn update_budget(
        &self,
        budget: Budget,
    ) -> impl Future<Output = Result<bool, StoreError>> + Send;

    /// Deletes a budget. Returns false if it does not exist.
    fn delete_budget(
        &self,
        user_id: UserId,
        budget_id: BudgetId,
    ) -> impl Future<Output = Result<bool, StoreError>> + Send;

    /// Transactions of a user matching `filter`, in no particular order.
    fn transactions(
        &self,
        user_id: UserId,
        filter: TransactionFilter,
    ) -> impl Future<Output = Result<Vec<Transaction>, StoreError>> + Send;

    /// Inserts a new transaction.
    fn insert_transaction(
        &self,
        transaction: Transaction,
    ) -> impl Future<Output = Result<(), StoreError>> + Send;

    /// Replaces a stored transaction. Returns false if it does not exist.
    fn update_transaction(
        &self,
        transaction: Transaction,
    ) -> impl Future<Output = Result<bool, StoreError>> + Send;

    /// Deletes a transaction. Returns false if it does not exist.
    fn delete_transaction(
        &self,
        user_id: UserId,
        transaction_id: TransactionId,
    ) -> impl Future<Output = Result<bool, StoreError>> + Send;

    /// Deletes every transaction of a user, returning how many were removed.
    fn clear_transactions(
        &self,
        user_id: UserId,
    ) -> impl Future<Output = Result<usize, StoreError>> + Send;

    /// The user's category registry, if one was ever saved.
    fn categories(
        &self,
        user_id: UserId,
    ) -> impl Future<Output = Result<Option<CategoryRegistry>, StoreError>> + Send;

    /// Stores the user's category registry.
    fn save_categories(
        &self,
        user_id: UserId,
        registry: CategoryRegistry,
    ) -> impl Future<Output = Result<(), StoreError>> + Send;
}
