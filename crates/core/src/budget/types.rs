//! Budget data types.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize, Serializer};
use tally_shared::types::{BudgetId, UserId};

/// Which expenses a budget is measured against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BudgetScope {
    /// Only expenses whose category equals the budget's category.
    Category,
    /// Every expense, whatever its category.
    Overall,
}

/// Declared budget period.
///
/// Stored and round-tripped, but progress is always evaluated over the
/// calendar month containing the evaluation instant.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BudgetPeriod {
    /// Monthly budget.
    #[default]
    Monthly,
    /// Weekly budget.
    Weekly,
    /// Yearly budget.
    Yearly,
}

/// A spending limit for one user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Budget {
    /// Budget ID.
    pub id: BudgetId,
    /// Owning user.
    pub user_id: UserId,
    /// Category label; unique per user.
    pub category: String,
    /// Category-specific or overall.
    pub scope: BudgetScope,
    /// Spending limit.
    pub amount: Decimal,
    /// Declared period.
    #[serde(default)]
    pub period: BudgetPeriod,
    /// Inactive budgets are skipped by progress computation.
    #[serde(default = "default_active")]
    pub active: bool,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}

fn default_active() -> bool {
    true
}

/// Input for creating a budget.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateBudgetInput {
    /// Category label.
    pub category: String,
    /// Category-specific or overall.
    pub scope: BudgetScope,
    /// Spending limit.
    pub amount: Decimal,
    /// Declared period, monthly when omitted.
    #[serde(default)]
    pub period: Option<BudgetPeriod>,
}

/// Partial overwrite of a budget. `None` leaves a field untouched.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateBudgetInput {
    /// New category label.
    #[serde(default)]
    pub category: Option<String>,
    /// New scope.
    #[serde(default)]
    pub scope: Option<BudgetScope>,
    /// New limit.
    #[serde(default)]
    pub amount: Option<Decimal>,
    /// New declared period.
    #[serde(default)]
    pub period: Option<BudgetPeriod>,
    /// Enable or disable the budget.
    #[serde(default)]
    pub active: Option<bool>,
}

/// Budget status classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BudgetStatus {
    /// Below 80% of the limit.
    Good,
    /// From 80% up to, but excluding, 100% of the limit.
    Warning,
    /// At or over the limit.
    Exceeded,
}

/// Share of the limit consumed, in percent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Percentage {
    /// `spent / limit * 100`, unrounded.
    Finite(Decimal),
    /// Spending against a zero limit.
    Unbounded,
}

impl Percentage {
    /// Zero percent.
    pub const ZERO: Self = Self::Finite(Decimal::ZERO);

    /// Returns the finite value, if any.
    #[must_use]
    pub const fn as_decimal(&self) -> Option<Decimal> {
        match self {
            Self::Finite(value) => Some(*value),
            Self::Unbounded => None,
        }
    }

    /// Returns true for spending against a zero limit.
    #[must_use]
    pub const fn is_unbounded(&self) -> bool {
        matches!(self, Self::Unbounded)
    }
}

impl std::fmt::Display for Percentage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Finite(value) => write!(f, "{value}"),
            Self::Unbounded => write!(f, "Infinity"),
        }
    }
}

impl Serialize for Percentage {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Finite(value) => Serialize::serialize(value, serializer),
            Self::Unbounded => serializer.serialize_str("Infinity"),
        }
    }
}

/// Progress of one budget over the evaluation period.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BudgetProgress {
    /// The budget evaluated.
    pub budget: Budget,
    /// Sum of matching expenses.
    pub spent: Decimal,
    /// Share of the limit consumed.
    pub percentage: Percentage,
    /// `limit - spent`; negative once overspent.
    pub remaining: Decimal,
    /// Derived status.
    pub status: BudgetStatus,
}

/// Rollup of a progress list for the dashboard banner.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BudgetHealth {
    /// Budgets in `good` status.
    pub on_track: usize,
    /// Budgets in `warning` status.
    pub near_limit: usize,
    /// Budgets in `exceeded` status.
    pub exceeded: usize,
    /// Days remaining in the evaluation month after today.
    pub days_left: u32,
}
