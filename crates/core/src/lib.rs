//! Core business logic for Tally.
//!
//! This crate contains pure business logic with ZERO web or database dependencies.
//! Storage sits behind the [`query::LedgerStore`] trait.
//!
//! # Modules
//!
//! - `budget` - Budget validation and monthly progress evaluation
//! - `transaction` - Transaction rules, listing and financial summaries
//! - `category` - Per-user income and expense category registry
//! - `query` - Per-user service wiring storage to the calculators

pub mod budget;
pub mod category;
pub mod query;
pub mod transaction;
