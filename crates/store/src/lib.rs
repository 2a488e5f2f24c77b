//! Storage layer for Tally.
//!
//! This crate provides:
//! - [`MemoryStore`], a per-user [`tally_core::query::LedgerStore`] held in memory
//! - [`Snapshot`], the JSON file the store loads from and writes back to

pub mod memory;
pub mod snapshot;

pub use memory::MemoryStore;
pub use snapshot::{Snapshot, SnapshotError, UserCategories};
