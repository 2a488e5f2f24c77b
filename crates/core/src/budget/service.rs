//! Budget service for validation, edits and health rollups.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use tally_shared::types::{BudgetId, UserId};

use super::error::BudgetError;
use super::types::{
    Budget, BudgetHealth, BudgetProgress, BudgetStatus, CreateBudgetInput, UpdateBudgetInput,
};

/// Budget service for business logic.
pub struct BudgetService;

impl BudgetService {
    /// Builds a new active budget after checking it against the user's existing ones.
    ///
    /// # Errors
    ///
    /// Returns `BudgetError::NegativeAmount`, `BudgetError::EmptyCategory`, or
    /// `BudgetError::DuplicateCategory` if `existing` already has a budget for
    /// the category.
    pub fn build(
        user_id: UserId,
        input: CreateBudgetInput,
        existing: &[Budget],
        now: DateTime<Utc>,
    ) -> Result<Budget, BudgetError> {
        let category = Self::validate(&input.category, input.amount)?;
        Self::ensure_category_free(&category, None, existing)?;

        Ok(Budget {
            id: BudgetId::new(),
            user_id,
            category,
            scope: input.scope,
            amount: input.amount,
            period: input.period.unwrap_or_default(),
            active: true,
            created_at: now,
            updated_at: now,
        })
    }

    /// Overwrites the fields present in `input` and bumps `updated_at`.
    ///
    /// # Errors
    ///
    /// Returns an error if the result breaks a budget invariant or renames the
    /// budget onto a category another budget already uses.
    pub fn apply_update(
        mut budget: Budget,
        input: UpdateBudgetInput,
        existing: &[Budget],
        now: DateTime<Utc>,
    ) -> Result<Budget, BudgetError> {
        if let Some(category) = input.category {
            budget.category = category;
        }
        if let Some(scope) = input.scope {
            budget.scope = scope;
        }
        if let Some(amount) = input.amount {
            budget.amount = amount;
        }
        if let Some(period) = input.period {
            budget.period = period;
        }
        if let Some(active) = input.active {
            budget.active = active;
        }

        budget.category = Self::validate(&budget.category, budget.amount)?;
        Self::ensure_category_free(&budget.category, Some(budget.id), existing)?;
        budget.updated_at = now;
        Ok(budget)
    }

    /// Counts progress records per status band.
    #[must_use]
    pub fn health(progress: &[BudgetProgress], days_left: u32) -> BudgetHealth {
        progress.iter().fold(
            BudgetHealth {
                days_left,
                ..BudgetHealth::default()
            },
            |mut health, record| {
                match record.status {
                    BudgetStatus::Good => health.on_track += 1,
                    BudgetStatus::Warning => health.near_limit += 1,
                    BudgetStatus::Exceeded => health.exceeded += 1,
                }
                health
            },
        )
    }

    fn validate(category: &str, amount: Decimal) -> Result<String, BudgetError> {
        if amount < Decimal::ZERO {
            return Err(BudgetError::NegativeAmount);
        }

        let category = category.trim();
        if category.is_empty() {
            return Err(BudgetError::EmptyCategory);
        }

        Ok(category.to_string())
    }

    fn ensure_category_free(
        category: &str,
        own_id: Option<BudgetId>,
        existing: &[Budget],
    ) -> Result<(), BudgetError> {
        let taken = existing
            .iter()
            .any(|b| b.category == category && Some(b.id) != own_id);

        if taken {
            return Err(BudgetError::DuplicateCategory(category.to_string()));
        }
        Ok(())
    }
}
