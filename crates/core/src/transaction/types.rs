//! Transaction data types.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tally_shared::types::{TransactionId, UserId};

/// Direction of a transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionType {
    /// Money coming in.
    Income,
    /// Money going out. Only expenses count against budgets.
    Expense,
}

impl std::fmt::Display for TransactionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Income => write!(f, "income"),
            Self::Expense => write!(f, "expense"),
        }
    }
}

impl std::str::FromStr for TransactionType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "income" => Ok(Self::Income),
            "expense" => Ok(Self::Expense),
            _ => Err(format!("Unknown transaction type: {s}")),
        }
    }
}

/// One financial event for a user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    /// Transaction ID.
    pub id: TransactionId,
    /// Owning user.
    pub user_id: UserId,
    /// Income or expense.
    #[serde(rename = "type")]
    pub kind: TransactionType,
    /// Free-form category label.
    pub category: String,
    /// Non-negative amount.
    pub amount: Decimal,
    /// Optional description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// When the transaction happened.
    pub date: DateTime<Utc>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}

impl Transaction {
    /// Returns true for expense transactions.
    #[must_use]
    pub fn is_expense(&self) -> bool {
        self.kind == TransactionType::Expense
    }
}

/// Input for recording a transaction.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateTransactionInput {
    /// Income or expense.
    #[serde(rename = "type")]
    pub kind: TransactionType,
    /// Category label.
    pub category: String,
    /// Amount, must not be negative.
    pub amount: Decimal,
    /// Optional description.
    #[serde(default)]
    pub description: Option<String>,
    /// Transaction date; the creation instant when omitted.
    #[serde(default)]
    pub date: Option<DateTime<Utc>>,
}

/// Partial overwrite of a transaction. `None` leaves a field untouched.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateTransactionInput {
    /// New direction.
    #[serde(default, rename = "type")]
    pub kind: Option<TransactionType>,
    /// New category.
    #[serde(default)]
    pub category: Option<String>,
    /// New amount.
    #[serde(default)]
    pub amount: Option<Decimal>,
    /// New description.
    #[serde(default)]
    pub description: Option<String>,
    /// New date.
    #[serde(default)]
    pub date: Option<DateTime<Utc>>,
}

/// Criteria for listing transactions. Every set field must match.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct TransactionFilter {
    /// Only this direction.
    #[serde(default, rename = "type")]
    pub kind: Option<TransactionType>,
    /// Only this exact category.
    #[serde(default)]
    pub category: Option<String>,
    /// Inclusive lower bound on `date`.
    #[serde(default)]
    pub start_date: Option<DateTime<Utc>>,
    /// Inclusive upper bound on `date`.
    #[serde(default)]
    pub end_date: Option<DateTime<Utc>>,
}

impl TransactionFilter {
    /// Filter matching only expenses dated within `[start, end]`.
    #[must_use]
    pub fn expenses_between(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self {
            kind: Some(TransactionType::Expense),
            category: None,
            start_date: Some(start),
            end_date: Some(end),
        }
    }

    /// Returns true if the transaction satisfies every set criterion.
    #[must_use]
    pub fn matches(&self, transaction: &Transaction) -> bool {
        self.kind.is_none_or(|kind| transaction.kind == kind)
            && self
                .category
                .as_deref()
                .is_none_or(|category| transaction.category == category)
            && self.start_date.is_none_or(|start| transaction.date >= start)
            && self.end_date.is_none_or(|end| transaction.date <= end)
    }
}
