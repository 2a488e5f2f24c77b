//! Transactions: recording, editing, listing and summarising.

pub mod error;
pub mod service;
pub mod summary;
pub mod types;

pub use error::TransactionError;
pub use service::TransactionService;
pub use summary::{CategoryBreakdown, FinancialSummary};
pub use types::{
    CreateTransactionInput, Transaction, TransactionFilter, TransactionType,
    UpdateTransactionInput,
};
