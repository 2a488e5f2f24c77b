//! Budget query service implementation.

use std::sync::Arc;

use chrono::{DateTime, TimeZone, Utc};
use tally_shared::types::{BudgetId, Page, PageRequest, TransactionId, UserId};
use tracing::{debug, info, warn};

use super::error::QueryError;
use super::store::LedgerStore;
use crate::budget::{
    Budget, BudgetError, BudgetHealth, BudgetProgress, BudgetService, CreateBudgetInput,
    EvaluationPeriod, ProgressCalculator, UpdateBudgetInput,
};
use crate::category::CategoryRegistry;
use crate::transaction::{
    CreateTransactionInput, FinancialSummary, Transaction, TransactionError, TransactionFilter,
    TransactionService, UpdateTransactionInput,
};

/// Per-user budget, transaction and category operations over a store.
pub struct BudgetQueryService<S: LedgerStore> {
    store: Arc<S>,
}

impl<S: LedgerStore> Clone for BudgetQueryService<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
        }
    }
}

impl<S: LedgerStore> BudgetQueryService<S> {
    /// Create a new query service.
    #[must_use]
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    // ========================================================================
    // Progress
    // ========================================================================

    /// Progress of every active budget over the calendar month containing `now`.
    ///
    /// Only expenses dated within that month are fetched from the store.
    ///
    /// # Errors
    ///
    /// Returns `QueryError::Store` if loading fails, or `QueryError::Budget`
    /// if stored data violates a budget or transaction invariant.
    pub async fn budget_progress<Tz: TimeZone>(
        &self,
        user_id: UserId,
        now: &DateTime<Tz>,
    ) -> Result<Vec<BudgetProgress>, QueryError> {
        let period = EvaluationPeriod::month_containing(now)?;
        self.progress_for_period(user_id, &period).await
    }

    /// Status counts for the dashboard plus days left in the month.
    ///
    /// # Errors
    ///
    /// Same as [`BudgetQueryService::budget_progress`].
    pub async fn budget_health<Tz: TimeZone>(
        &self,
        user_id: UserId,
        now: &DateTime<Tz>,
    ) -> Result<BudgetHealth, QueryError> {
        let period = EvaluationPeriod::month_containing(now)?;
        let progress = self.progress_for_period(user_id, &period).await?;

        Ok(BudgetService::health(
            &progress,
            period.days_left(now.date_naive()),
        ))
    }

    async fn progress_for_period(
        &self,
        user_id: UserId,
        period: &EvaluationPeriod,
    ) -> Result<Vec<BudgetProgress>, QueryError> {
        let budgets: Vec<Budget> = self
            .store
            .budgets(user_id)
            .await?
            .into_iter()
            .filter(|b| b.active)
            .collect();

        let expenses = self
            .store
            .transactions(
                user_id,
                TransactionFilter::expenses_between(period.start(), period.last_instant()),
            )
            .await?;

        debug!(
            %user_id,
            budgets = budgets.len(),
            expenses = expenses.len(),
            month = %period.first_day(),
            "Evaluating budget progress"
        );

        ProgressCalculator::calculate_for_period(&budgets, &expenses, period).map_err(|e| {
            warn!(%user_id, error = %e, "Stored data violates budget invariants");
            e.into()
        })
    }

    // ========================================================================
    // Budgets
    // ========================================================================

    /// All budgets of a user, including inactive ones.
    ///
    /// # Errors
    ///
    /// Returns `QueryError::Store` if loading fails.
    pub async fn list_budgets(&self, user_id: UserId) -> Result<Vec<Budget>, QueryError> {
        Ok(self.store.budgets(user_id).await?)
    }

    /// Creates a budget, rejecting a second budget for the same category.
    ///
    /// # Errors
    ///
    /// Returns `QueryError::Budget` for invalid input or a duplicate category.
    pub async fn create_budget(
        &self,
        user_id: UserId,
        input: CreateBudgetInput,
        now: DateTime<Utc>,
    ) -> Result<Budget, QueryError> {
        let existing = self.store.budgets(user_id).await?;
        let budget = BudgetService::build(user_id, input, &existing, now)?;

        self.store.insert_budget(budget.clone()).await?;
        info!(%user_id, budget_id = %budget.id, category = %budget.category, "Budget created");
        Ok(budget)
    }

    /// Overwrites the given fields of a budget.
    ///
    /// # Errors
    ///
    /// Returns `BudgetError::NotFound` if the user has no such budget.
    pub async fn update_budget(
        &self,
        user_id: UserId,
        budget_id: BudgetId,
        input: UpdateBudgetInput,
        now: DateTime<Utc>,
    ) -> Result<Budget, QueryError> {
        let existing = self.store.budgets(user_id).await?;
        let current = existing
            .iter()
            .find(|b| b.id == budget_id)
            .cloned()
            .ok_or(BudgetError::NotFound(budget_id))?;

        let updated = BudgetService::apply_update(current, input, &existing, now)?;
        if !self.store.update_budget(updated.clone()).await? {
            return Err(BudgetError::NotFound(budget_id).into());
        }

        info!(%user_id, %budget_id, "Budget updated");
        Ok(updated)
    }

    /// Deletes a budget.
    ///
    /// # Errors
    ///
    /// Returns `BudgetError::NotFound` if the user has no such budget.
    pub async fn delete_budget(
        &self,
        user_id: UserId,
        budget_id: BudgetId,
    ) -> Result<(), QueryError> {
        if !self.store.delete_budget(user_id, budget_id).await? {
            return Err(BudgetError::NotFound(budget_id).into());
        }

        info!(%user_id, %budget_id, "Budget removed");
        Ok(())
    }

    // ========================================================================
    // Transactions
    // ========================================================================

    /// Lists transactions matching `filter`, newest first.
    ///
    /// # Errors
    ///
    /// Returns `QueryError::Store` if loading fails.
    pub async fn list_transactions(
        &self,
        user_id: UserId,
        filter: TransactionFilter,
        page: PageRequest,
    ) -> Result<Page<Transaction>, QueryError> {
        let transactions = self.store.transactions(user_id, filter.clone()).await?;
        Ok(TransactionService::list(transactions, &filter, page))
    }

    /// Records a transaction.
    ///
    /// # Errors
    ///
    /// Returns `QueryError::Transaction` for invalid input.
    pub async fn create_transaction(
        &self,
        user_id: UserId,
        input: CreateTransactionInput,
        now: DateTime<Utc>,
    ) -> Result<Transaction, QueryError> {
        let transaction = TransactionService::build(user_id, input, now)?;

        self.store.insert_transaction(transaction.clone()).await?;
        debug!(%user_id, transaction_id = %transaction.id, "Transaction recorded");
        Ok(transaction)
    }

    /// Overwrites the given fields of a transaction.
    ///
    /// # Errors
    ///
    /// Returns `TransactionError::NotFound` if the user has no such transaction.
    pub async fn update_transaction(
        &self,
        user_id: UserId,
        transaction_id: TransactionId,
        input: UpdateTransactionInput,
        now: DateTime<Utc>,
    ) -> Result<Transaction, QueryError> {
        let current = self
            .store
            .transactions(user_id, TransactionFilter::default())
            .await?
            .into_iter()
            .find(|t| t.id == transaction_id)
            .ok_or(TransactionError::NotFound(transaction_id))?;

        let updated = TransactionService::apply_update(current, input, now)?;
        if !self.store.update_transaction(updated.clone()).await? {
            return Err(TransactionError::NotFound(transaction_id).into());
        }
        Ok(updated)
    }

    /// Deletes a transaction.
    ///
    /// # Errors
    ///
    /// Returns `TransactionError::NotFound` if the user has no such transaction.
    pub async fn delete_transaction(
        &self,
        user_id: UserId,
        transaction_id: TransactionId,
    ) -> Result<(), QueryError> {
        if !self.store.delete_transaction(user_id, transaction_id).await? {
            return Err(TransactionError::NotFound(transaction_id).into());
        }
        Ok(())
    }

    /// Deletes all of a user's transactions, returning how many were removed.
    ///
    /// # Errors
    ///
    /// Returns `QueryError::Store` if the store fails.
    pub async fn clear_transactions(&self, user_id: UserId) -> Result<usize, QueryError> {
        let removed = self.store.clear_transactions(user_id).await?;
        info!(%user_id, removed, "Cleared all transactions");
        Ok(removed)
    }

    /// Income, expenses, balance and category breakdown, optionally within a date range.
    ///
    /// # Errors
    ///
    /// Returns `QueryError::Store` if loading fails.
    pub async fn financial_summary(
        &self,
        user_id: UserId,
        start_date: Option<DateTime<Utc>>,
        end_date: Option<DateTime<Utc>>,
    ) -> Result<FinancialSummary, QueryError> {
        let filter = TransactionFilter {
            start_date,
            end_date,
            ..TransactionFilter::default()
        };
        let transactions = self.store.transactions(user_id, filter).await?;
        Ok(FinancialSummary::from_transactions(&transactions)?)
    }

    // ========================================================================
    // Categories
    // ========================================================================

    /// The user's categories, created with the defaults on first access.
    ///
    /// # Errors
    ///
    /// Returns `QueryError::Store` if the store fails.
    pub async fn categories(&self, user_id: UserId) -> Result<CategoryRegistry, QueryError> {
        if let Some(registry) = self.store.categories(user_id).await? {
            return Ok(registry);
        }

        let registry = CategoryRegistry::default();
        self.store.save_categories(user_id, registry.clone()).await?;
        debug!(%user_id, "Created default categories");
        Ok(registry)
    }

    /// Adds a category under `kind` (`income` or `expense`) if not already present.
    ///
    /// # Errors
    ///
    /// Returns `QueryError::Category` for an unknown type or blank name.
    pub async fn add_category(
        &self,
        user_id: UserId,
        kind: &str,
        name: &str,
    ) -> Result<CategoryRegistry, QueryError> {
        let kind = CategoryRegistry::parse_kind(kind)?;
        let mut registry = self.categories(user_id).await?;

        if registry.add(kind, name)? {
            self.store.save_categories(user_id, registry.clone()).await?;
        }
        Ok(registry)
    }

    /// Removes a category under `kind` if present.
    ///
    /// # Errors
    ///
    /// Returns `QueryError::Category` for an unknown type or blank name.
    pub async fn remove_category(
        &self,
        user_id: UserId,
        kind: &str,
        name: &str,
    ) -> Result<CategoryRegistry, QueryError> {
        let kind = CategoryRegistry::parse_kind(kind)?;
        let mut registry = self.categories(user_id).await?;

        if registry.remove(kind, name)? {
            self.store.save_categories(user_id, registry.clone()).await?;
        }
        Ok(registry)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use rust_decimal_macros::dec;
    use tally_shared::AppError;

    use super::*;
    use crate::budget::{BudgetScope, BudgetStatus};
    use crate::query::StoreError;
    use crate::transaction::TransactionType;

    #[derive(Default)]
    struct FixtureStore {
        budgets: Mutex<Vec<Budget>>,
        transactions: Mutex<Vec<Transaction>>,
        categories: Mutex<Option<CategoryRegistry>>,
    }

    impl LedgerStore for FixtureStore {
        async fn budgets(&self, user_id: UserId) -> Result<Vec<Budget>, StoreError> {
            let budgets = self.budgets.lock().unwrap();
            Ok(budgets.iter().filter(|b| b.user_id == user_id).cloned().collect())
        }

        async fn insert_budget(&self, budget: Budget) -> Result<(), StoreError> {
            self.budgets.lock().unwrap().push(budget);
            Ok(())
        }

        async fn update_budget(&self, budget: Budget) -> Result<bool, StoreError> {
            let mut budgets = self.budgets.lock().unwrap();
            Ok(match budgets.iter_mut().find(|b| b.id == budget.id) {
                Some(slot) => {
                    *slot = budget;
                    true
                }
                None => false,
            })
        }

        async fn delete_budget(
            &self,
            user_id: UserId,
            budget_id: BudgetId,
        ) -> Result<bool, StoreError> {
            let mut budgets = self.budgets.lock().unwrap();
            let before = budgets.len();
            budgets.retain(|b| !(b.user_id == user_id && b.id == budget_id));
            Ok(budgets.len() != before)
        }

        async fn transactions(
            &self,
            user_id: UserId,
            filter: TransactionFilter,
        ) -> Result<Vec<Transaction>, StoreError> {
            let transactions = self.transactions.lock().unwrap();
            Ok(transactions
                .iter()
                .filter(|t| t.user_id == user_id && filter.matches(t))
                .cloned()
                .collect())
        }

        async fn insert_transaction(&self, transaction: Transaction) -> Result<(), StoreError> {
            self.transactions.lock().unwrap().push(transaction);
            Ok(())
        }

        async fn update_transaction(&self, transaction: Transaction) -> Result<bool, StoreError> {
            let mut transactions = self.transactions.lock().unwrap();
            Ok(match transactions.iter_mut().find(|t| t.id == transaction.id) {
                Some(slot) => {
                    *slot = transaction;
                    true
                }
                None => false,
            })
        }

        async fn delete_transaction(
            &self,
            user_id: UserId,
            transaction_id: TransactionId,
        ) -> Result<bool, StoreError> {
            let mut transactions = self.transactions.lock().unwrap();
            let before = transactions.len();
            transactions.retain(|t| !(t.user_id == user_id && t.id == transaction_id));
            Ok(transactions.len() != before)
        }

        async fn clear_transactions(&self, user_id: UserId) -> Result<usize, StoreError> {
            let mut transactions = self.transactions.lock().unwrap();
            let before = transactions.len();
            transactions.retain(|t| t.user_id != user_id);
            Ok(before - transactions.len())
        }

        async fn categories(
            &self,
            _user_id: UserId,
        ) -> Result<Option<CategoryRegistry>, StoreError> {
            Ok(self.categories.lock().unwrap().clone())
        }

        async fn save_categories(
            &self,
            _user_id: UserId,
            registry: CategoryRegistry,
        ) -> Result<(), StoreError> {
            *self.categories.lock().unwrap() = Some(registry);
            Ok(())
        }
    }

    struct FailingStore;

    impl LedgerStore for FailingStore {
        async fn budgets(&self, _: UserId) -> Result<Vec<Budget>, StoreError> {
            Err(StoreError::Unavailable("connection refused".into()))
        }
        async fn insert_budget(&self, _: Budget) -> Result<(), StoreError> {
            Err(StoreError::Persistence("read-only".into()))
        }
        async fn update_budget(&self, _: Budget) -> Result<bool, StoreError> {
            Err(StoreError::Persistence("read-only".into()))
        }
        async fn delete_budget(&self, _: UserId, _: BudgetId) -> Result<bool, StoreError> {
            Err(StoreError::Persistence("read-only".into()))
        }
        async fn transactions(
            &self,
            _: UserId,
            _: TransactionFilter,
        ) -> Result<Vec<Transaction>, StoreError> {
            Err(StoreError::Unavailable("connection refused".into()))
        }
        async fn insert_transaction(&self, _: Transaction) -> Result<(), StoreError> {
            Err(StoreError::Persistence("read-only".into()))
        }
        async fn update_transaction(&self, _: Transaction) -> Result<bool, StoreError> {
            Err(StoreError::Persistence("read-only".into()))
        }
        async fn delete_transaction(
            &self,
            _: UserId,
            _: TransactionId,
        ) -> Result<bool, StoreError> {
            Err(StoreError::Persistence("read-only".into()))
        }
        async fn clear_transactions(&self, _: UserId) -> Result<usize, StoreError> {
            Err(StoreError::Persistence("read-only".into()))
        }
        async fn categories(&self, _: UserId) -> Result<Option<CategoryRegistry>, StoreError> {
            Err(StoreError::Unavailable("connection refused".into()))
        }
        async fn save_categories(&self, _: UserId, _: CategoryRegistry) -> Result<(), StoreError> {
            Err(StoreError::Persistence("read-only".into()))
        }
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 19, 12, 0, 0).unwrap()
    }

    fn service() -> BudgetQueryService<FixtureStore> {
        BudgetQueryService::new(Arc::new(FixtureStore::default()))
    }

    fn food(amount: rust_decimal::Decimal) -> CreateBudgetInput {
        CreateBudgetInput {
            category: "Food".into(),
            scope: BudgetScope::Category,
            amount,
            period: None,
        }
    }

    fn spend(
        category: &str,
        amount: rust_decimal::Decimal,
        date: DateTime<Utc>,
    ) -> CreateTransactionInput {
        CreateTransactionInput {
            kind: TransactionType::Expense,
            category: category.into(),
            amount,
            description: None,
            date: Some(date),
        }
    }

    #[tokio::test]
    async fn test_progress_counts_only_this_month() {
        let svc = service();
        let user = UserId::new();
        svc.create_budget(user, food(dec!(500)), now()).await.unwrap();

        let this_month = Utc.with_ymd_and_hms(2026, 10, 3, 9, 0, 0).unwrap();
        let last_month = Utc.with_ymd_and_hms(2026, 9, 30, 23, 59, 59).unwrap();
        svc.create_transaction(user, spend("Food", dec!(420), this_month), now())
            .await
            .unwrap();
        svc.create_transaction(user, spend("Food", dec!(999), last_month), now())
            .await
            .unwrap();

        let progress = svc.budget_progress(user, &now()).await.unwrap();
        assert_eq!(progress.len(), 1);
        assert_eq!(progress[0].spent, dec!(420));
        assert_eq!(progress[0].remaining, dec!(80));
        assert_eq!(progress[0].status, BudgetStatus::Warning);
    }

    #[tokio::test]
    async fn test_progress_skips_inactive_budgets() {
        let svc = service();
        let user = UserId::new();
        let budget = svc.create_budget(user, food(dec!(100)), now()).await.unwrap();
        svc.update_budget(
            user,
            budget.id,
            UpdateBudgetInput {
                active: Some(false),
                ..UpdateBudgetInput::default()
            },
            now(),
        )
        .await
        .unwrap();

        assert!(svc.budget_progress(user, &now()).await.unwrap().is_empty());
        assert_eq!(svc.list_budgets(user).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_progress_is_per_user() {
        let svc = service();
        let alice = UserId::new();
        let bob = UserId::new();
        svc.create_budget(alice, food(dec!(100)), now()).await.unwrap();
        svc.create_transaction(bob, spend("Food", dec!(100), now()), now())
            .await
            .unwrap();

        let progress = svc.budget_progress(alice, &now()).await.unwrap();
        assert_eq!(progress[0].spent, dec!(0));
        assert_eq!(progress[0].status, BudgetStatus::Good);
    }

    #[tokio::test]
    async fn test_health_rollup() {
        let svc = service();
        let user = UserId::new();
        svc.create_budget(user, food(dec!(100)), now()).await.unwrap();
        svc.create_budget(
            user,
            CreateBudgetInput {
                category: "Total".into(),
                scope: BudgetScope::Overall,
                amount: dec!(1000),
                period: None,
            },
            now(),
        )
        .await
        .unwrap();
        svc.create_transaction(user, spend("Food", dec!(150), now()), now())
            .await
            .unwrap();

        let health = svc.budget_health(user, &now()).await.unwrap();
        assert_eq!(health.exceeded, 1);
        assert_eq!(health.on_track, 1);
        assert_eq!(health.near_limit, 0);
        assert_eq!(health.days_left, 12);
    }

    #[tokio::test]
    async fn test_duplicate_budget_is_conflict() {
        let svc = service();
        let user = UserId::new();
        svc.create_budget(user, food(dec!(100)), now()).await.unwrap();

        let err = svc.create_budget(user, food(dec!(200)), now()).await.unwrap_err();
        assert_eq!(AppError::from(err).status_code(), 409);
    }

    #[tokio::test]
    async fn test_missing_records_are_not_found() {
        let svc = service();
        let user = UserId::new();

        let err = svc.delete_budget(user, BudgetId::new()).await.unwrap_err();
        assert_eq!(AppError::from(err).status_code(), 404);

        let err = svc
            .update_transaction(
                user,
                TransactionId::new(),
                UpdateTransactionInput::default(),
                now(),
            )
            .await
            .unwrap_err();
        assert_eq!(AppError::from(err).status_code(), 404);
    }

    #[tokio::test]
    async fn test_store_failure_maps_to_500() {
        let svc = BudgetQueryService::new(Arc::new(FailingStore));
        let err = svc.budget_progress(UserId::new(), &now()).await.unwrap_err();

        let app = AppError::from(err);
        assert_eq!(app.status_code(), 500);
        assert_eq!(app.error_code(), "DATABASE_ERROR");
    }

    #[tokio::test]
    async fn test_corrupt_stored_budget_is_internal_error() {
        let store = Arc::new(FixtureStore::default());
        let user = UserId::new();
        let mut bad = BudgetService::build(user, food(dec!(10)), &[], now()).unwrap();
        bad.amount = dec!(-10);
        store.insert_budget(bad).await.unwrap();

        let err = BudgetQueryService::new(store)
            .budget_progress(user, &now())
            .await
            .unwrap_err();
        assert_eq!(AppError::from(err).error_code(), "INTERNAL_ERROR");
    }

    #[tokio::test]
    async fn test_list_transactions_newest_first() {
        let svc = service();
        let user = UserId::new();
        for day in [3, 17, 9] {
            let date = Utc.with_ymd_and_hms(2026, 10, day, 8, 0, 0).unwrap();
            svc.create_transaction(user, spend("Food", dec!(1), date), now())
                .await
                .unwrap();
        }

        let page = svc
            .list_transactions(user, TransactionFilter::default(), PageRequest::new(1, 2))
            .await
            .unwrap();
        assert_eq!(page.total, 3);
        assert_eq!(page.total_pages, 2);
        assert_eq!(page.items.len(), 2);
        assert!(page.items[0].date > page.items[1].date);
    }

    #[tokio::test]
    async fn test_summary_and_clear() {
        let svc = service();
        let user = UserId::new();
        svc.create_transaction(
            user,
            CreateTransactionInput {
                kind: TransactionType::Income,
                category: "Salary".into(),
                amount: dec!(3000),
                description: None,
                date: None,
            },
            now(),
        )
        .await
        .unwrap();
        svc.create_transaction(user, spend("Food", dec!(120.50), now()), now())
            .await
            .unwrap();

        let summary = svc.financial_summary(user, None, None).await.unwrap();
        assert_eq!(summary.balance, dec!(2879.50));

        assert_eq!(svc.clear_transactions(user).await.unwrap(), 2);
        let summary = svc.financial_summary(user, None, None).await.unwrap();
        assert_eq!(summary.income, dec!(0));
    }

    #[tokio::test]
    async fn test_categories_default_then_edit() {
        let svc = service();
        let user = UserId::new();

        let registry = svc.categories(user).await.unwrap();
        assert!(registry.contains(TransactionType::Expense, "Food"));

        let registry = svc.add_category(user, "expense", "Pets").await.unwrap();
        assert!(registry.contains(TransactionType::Expense, "Pets"));

        let registry = svc.remove_category(user, "expense", "Food").await.unwrap();
        assert!(!registry.contains(TransactionType::Expense, "Food"));
        let stored = svc.categories(user).await.unwrap();
        assert!(!stored.contains(TransactionType::Expense, "Food"));

        let err = svc.add_category(user, "transfer", "Pets").await.unwrap_err();
        assert_eq!(AppError::from(err).status_code(), 400);
    }
}
