//! Income/expense totals and per-category breakdown.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::error::TransactionError;
use super::types::{Transaction, TransactionType};

/// Per-category totals, split by direction.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryBreakdown {
    /// Income totals keyed by category.
    pub income: BTreeMap<String, Decimal>,
    /// Expense totals keyed by category.
    pub expense: BTreeMap<String, Decimal>,
}

/// Totals over a set of transactions.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FinancialSummary {
    /// Sum of income.
    pub income: Decimal,
    /// Sum of expenses.
    pub expenses: Decimal,
    /// `income - expenses`.
    pub balance: Decimal,
    /// Totals per category.
    pub category_breakdown: CategoryBreakdown,
}

impl FinancialSummary {
    /// Aggregates the given transactions in a single pass.
    ///
    /// # Errors
    ///
    /// Returns `TransactionError::Overflow` if a total leaves the `Decimal` range.
    pub fn from_transactions<'a, I>(transactions: I) -> Result<Self, TransactionError>
    where
        I: IntoIterator<Item = &'a Transaction>,
    {
        let mut summary = Self::default();

        for transaction in transactions {
            let (total, bucket) = match transaction.kind {
                TransactionType::Income => (
                    &mut summary.income,
                    &mut summary.category_breakdown.income,
                ),
                TransactionType::Expense => (
                    &mut summary.expenses,
                    &mut summary.category_breakdown.expense,
                ),
            };
            *total = checked_add(*total, transaction.amount)?;
            let category = bucket
                .entry(transaction.category.clone())
                .or_insert(Decimal::ZERO);
            *category = checked_add(*category, transaction.amount)?;
        }

        summary.balance = summary
            .income
            .checked_sub(summary.expenses)
            .ok_or(TransactionError::Overflow)?;
        Ok(summary)
    }
}

fn checked_add(total: Decimal, amount: Decimal) -> Result<Decimal, TransactionError> {
    total.checked_add(amount).ok_or(TransactionError::Overflow)
}
