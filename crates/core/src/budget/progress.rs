//! Budget progress calculation.
//!
//! Pure functions from `(budgets, transactions, now)` to one progress record
//! per budget. No clock, no I/O, no shared state.

use chrono::{DateTime, TimeZone};
use rust_decimal::Decimal;

use super::error::BudgetError;
use super::period::EvaluationPeriod;
use super::types::{Budget, BudgetProgress, BudgetScope, BudgetStatus, Percentage};
use crate::transaction::Transaction;

/// Lower bound of the `warning` band, in percent.
pub const WARNING_THRESHOLD: Decimal = Decimal::from_parts(80, 0, 0, false, 0);

/// Lower bound of the `exceeded` band, in percent.
pub const EXCEEDED_THRESHOLD: Decimal = Decimal::ONE_HUNDRED;

/// Budget progress calculator.
pub struct ProgressCalculator;

impl ProgressCalculator {
    /// Computes progress for every budget over the calendar month containing `now`.
    ///
    /// Output order matches `budgets`. Inactive budgets are expected to be
    /// filtered out by the caller; they are evaluated like any other here.
    ///
    /// # Errors
    ///
    /// Returns `BudgetError::InvalidBudget` for a negative limit,
    /// `BudgetError::InvalidTransaction` for a selected transaction with a
    /// negative amount, `BudgetError::Overflow` if a sum or percentage leaves
    /// the `Decimal` range, and `BudgetError::InvalidPeriod` if the month
    /// cannot be resolved in `now`'s timezone.
    pub fn calculate<Tz: TimeZone>(
        budgets: &[Budget],
        transactions: &[Transaction],
        now: &DateTime<Tz>,
    ) -> Result<Vec<BudgetProgress>, BudgetError> {
        let period = EvaluationPeriod::month_containing(now)?;
        Self::calculate_for_period(budgets, transactions, &period)
    }

    /// Computes progress for every budget over an explicit period.
    ///
    /// # Errors
    ///
    /// See [`ProgressCalculator::calculate`].
    pub fn calculate_for_period(
        budgets: &[Budget],
        transactions: &[Transaction],
        period: &EvaluationPeriod,
    ) -> Result<Vec<BudgetProgress>, BudgetError> {
        let expenses: Vec<&Transaction> = transactions
            .iter()
            .filter(|t| t.is_expense() && period.contains(t.date))
            .collect();

        budgets
            .iter()
            .map(|budget| Self::evaluate(budget, &expenses))
            .collect()
    }

    fn evaluate(budget: &Budget, expenses: &[&Transaction]) -> Result<BudgetProgress, BudgetError> {
        let limit = budget.amount;
        if limit < Decimal::ZERO {
            return Err(BudgetError::InvalidBudget {
                budget_id: budget.id,
                amount: limit,
            });
        }

        let mut spent = Decimal::ZERO;
        for expense in expenses.iter().filter(|t| Self::in_scope(budget, t)) {
            if expense.amount < Decimal::ZERO {
                return Err(BudgetError::InvalidTransaction {
                    transaction_id: expense.id,
                    amount: expense.amount,
                });
            }
            spent = spent
                .checked_add(expense.amount)
                .ok_or(BudgetError::Overflow(budget.id))?;
        }

        let percentage =
            Self::percentage(spent, limit).ok_or(BudgetError::Overflow(budget.id))?;

        Ok(BudgetProgress {
            budget: budget.clone(),
            spent,
            percentage,
            remaining: limit - spent,
            status: Self::classify(percentage),
        })
    }

    fn in_scope(budget: &Budget, transaction: &Transaction) -> bool {
        match budget.scope {
            BudgetScope::Category => transaction.category == budget.category,
            BudgetScope::Overall => true,
        }
    }

    /// `spent / limit * 100`; unbounded when spending against a zero limit.
    ///
    /// Returns `None` if the quotient does not fit in a `Decimal`.
    #[must_use]
    pub fn percentage(spent: Decimal, limit: Decimal) -> Option<Percentage> {
        if limit.is_zero() {
            return Some(if spent > Decimal::ZERO {
                Percentage::Unbounded
            } else {
                Percentage::ZERO
            });
        }

        spent
            .checked_div(limit)
            .and_then(|ratio| ratio.checked_mul(Decimal::ONE_HUNDRED))
            .map(|pct| Percentage::Finite(pct.normalize()))
    }

    /// Classifies a reported percentage into its status band.
    #[must_use]
    pub fn classify(percentage: Percentage) -> BudgetStatus {
        match percentage {
            Percentage::Unbounded => BudgetStatus::Exceeded,
            Percentage::Finite(pct) if pct >= EXCEEDED_THRESHOLD => BudgetStatus::Exceeded,
            Percentage::Finite(pct) if pct >= WARNING_THRESHOLD => BudgetStatus::Warning,
            Percentage::Finite(_) => BudgetStatus::Good,
        }
    }
}
