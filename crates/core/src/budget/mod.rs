//! Budget tracking and progress evaluation.

pub mod error;
pub mod period;
pub mod progress;
pub mod service;
pub mod types;


pub use error::BudgetError;
pub use period::EvaluationPeriod;
pub use progress::ProgressCalculator;
pub use service::BudgetService;
pub use types::{
    Budget, BudgetHealth, BudgetPeriod, BudgetProgress, BudgetScope, BudgetStatus,
    CreateBudgetInput, Percentage, UpdateBudgetInput,
};
