//! Budget query service: the boundary between storage and the calculator.
//!
//! Loads a user's records through a [`LedgerStore`], hands immutable
//! snapshots to the pure budget and transaction logic, and writes results
//! back. Errors translate into [`tally_shared::AppError`] for callers that
//! answer with HTTP-style status codes.

pub mod error;
pub mod service;
pub mod store;

pub use error::QueryError;
pub use service::BudgetQueryService;
pub use store::{LedgerStore, StoreError};
