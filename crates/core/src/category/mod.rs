//! Per-user category registry.

pub mod error;
pub mod registry;

pub use error::CategoryError;
pub use registry::CategoryRegistry;
