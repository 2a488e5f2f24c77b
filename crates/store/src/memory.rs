//! In-memory ledger store.

use std::path::{Path, PathBuf};

use dashmap::DashMap;
use tally_core::budget::Budget;
use tally_core::category::CategoryRegistry;
use tally_core::query::{LedgerStore, StoreError};
use tally_core::transaction::{Transaction, TransactionFilter};
use tally_shared::types::{BudgetId, TransactionId, UserId};
use tokio::sync::Mutex;
use tracing::{error, info};

use crate::snapshot::{Snapshot, SnapshotError, UserCategories};

#[derive(Debug, Clone, Default)]
struct UserLedger {
    budgets: Vec<Budget>,
    transactions: Vec<Transaction>,
    categories: Option<CategoryRegistry>,
}

/// Per-user records held in memory, optionally backed by a snapshot file.
///
/// With autosave on, every successful mutation rewrites the snapshot before
/// the call returns. A mutation whose snapshot cannot be written is undone.
#[derive(Debug, Default)]
pub struct MemoryStore {
    users: DashMap<UserId, UserLedger>,
    snapshot_path: Option<PathBuf>,
    autosave: bool,
    write_lock: Mutex<()>,
}

impl MemoryStore {
    /// Creates an empty store with no backing file.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Opens a store backed by the snapshot at `path`, loading it if present.
    ///
    /// # Errors
    ///
    /// Returns an error if an existing snapshot cannot be read or parsed.
    pub async fn open(path: impl Into<PathBuf>, autosave: bool) -> Result<Self, SnapshotError> {
        let path = path.into();
        let snapshot = Snapshot::load(&path).await?;

        info!(
            path = %path.display(),
            budgets = snapshot.budgets.len(),
            transactions = snapshot.transactions.len(),
            autosave,
            "Opened ledger store"
        );

        let mut store = Self::from_snapshot(snapshot);
        store.snapshot_path = Some(path);
        store.autosave = autosave;
        Ok(store)
    }

    /// Builds an unbacked store holding the records of `snapshot`.
    #[must_use]
    pub fn from_snapshot(snapshot: Snapshot) -> Self {
        let users: DashMap<UserId, UserLedger> = DashMap::new();

        for budget in snapshot.budgets {
            users.entry(budget.user_id).or_default().budgets.push(budget);
        }
        for transaction in snapshot.transactions {
            users
                .entry(transaction.user_id)
                .or_default()
                .transactions
                .push(transaction);
        }
        for entry in snapshot.categories {
            users.entry(entry.user_id).or_default().categories = Some(entry.categories);
        }

        Self {
            users,
            ..Self::default()
        }
    }

    /// Copies every record into a snapshot, ordered by user and then by ID.
    #[must_use]
    pub fn snapshot(&self) -> Snapshot {
        let mut snapshot = Snapshot::default();

        for user in &self.users {
            snapshot.budgets.extend(user.budgets.iter().cloned());
            snapshot.transactions.extend(user.transactions.iter().cloned());
            if let Some(categories) = &user.categories {
                snapshot.categories.push(UserCategories {
                    user_id: *user.key(),
                    categories: categories.clone(),
                });
            }
        }

        snapshot.budgets.sort_by_key(|b| (b.user_id, b.id));
        snapshot.transactions.sort_by_key(|t| (t.user_id, t.id));
        snapshot.categories.sort_by_key(|c| c.user_id);
        snapshot
    }

    /// Path of the backing snapshot, if any.
    #[must_use]
    pub fn snapshot_path(&self) -> Option<&Path> {
        self.snapshot_path.as_deref()
    }

    /// Writes the snapshot file now. Does nothing for an unbacked store.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    pub async fn flush(&self) -> Result<(), SnapshotError> {
        let _guard = self.write_lock.lock().await;
        self.write_snapshot().await
    }

    async fn write_snapshot(&self) -> Result<(), SnapshotError> {
        match &self.snapshot_path {
            Some(path) => self.snapshot().save(path).await,
            None => Ok(()),
        }
    }

    /// Applies `apply` to one user's records and, with autosave on, persists
    /// the result. `apply` reports whether it changed anything; the user's
    /// previous records are restored if the snapshot write fails.
    async fn commit<T, F>(&self, user_id: UserId, apply: F) -> Result<T, StoreError>
    where
        T: Send,
        F: FnOnce(&mut UserLedger) -> (T, bool) + Send,
    {
        let _guard = self.write_lock.lock().await;

        let (value, previous) = {
            let mut user = self.users.entry(user_id).or_default();
            let previous = self.autosave.then(|| user.clone());
            let (value, changed) = apply(&mut *user);
            (value, previous.filter(|_| changed))
        };

        let Some(previous) = previous else {
            return Ok(value);
        };

        if let Err(e) = self.write_snapshot().await {
            self.users.insert(user_id, previous);
            error!(%user_id, error = %e, "Failed to persist ledger snapshot, change rolled back");
            return Err(StoreError::Persistence(e.to_string()));
        }
        Ok(value)
    }
}

fn replace_by<T>(items: &mut [T], item: T, same: impl Fn(&T) -> bool) -> bool {
    match items.iter_mut().find(|existing| same(existing)) {
        Some(slot) => {
            *slot = item;
            true
        }
        None => false,
    }
}

fn remove_by<T>(items: &mut Vec<T>, same: impl Fn(&T) -> bool) -> usize {
    let before = items.len();
    items.retain(|existing| !same(existing));
    before - items.len()
}

impl LedgerStore for MemoryStore {
    async fn budgets(&self, user_id: UserId) -> Result<Vec<Budget>, StoreError> {
        Ok(self
            .users
            .get(&user_id)
            .map(|user| user.budgets.clone())
            .unwrap_or_default())
    }

    async fn insert_budget(&self, budget: Budget) -> Result<(), StoreError> {
        self.commit(budget.user_id, |user| {
            user.budgets.push(budget);
            ((), true)
        })
        .await
    }

    async fn update_budget(&self, budget: Budget) -> Result<bool, StoreError> {
        self.commit(budget.user_id, |user| {
            let id = budget.id;
            let replaced = replace_by(&mut user.budgets, budget, |b| b.id == id);
            (replaced, replaced)
        })
        .await
    }

    async fn delete_budget(
        &self,
        user_id: UserId,
        budget_id: BudgetId,
    ) -> Result<bool, StoreError> {
        self.commit(user_id, |user| {
            let removed = remove_by(&mut user.budgets, |b| b.id == budget_id) > 0;
            (removed, removed)
        })
        .await
    }

    async fn transactions(
        &self,
        user_id: UserId,
        filter: TransactionFilter,
    ) -> Result<Vec<Transaction>, StoreError> {
        Ok(self
            .users
            .get(&user_id)
            .map(|user| {
                user.transactions
                    .iter()
                    .filter(|t| filter.matches(t))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn insert_transaction(&self, transaction: Transaction) -> Result<(), StoreError> {
        self.commit(transaction.user_id, |user| {
            user.transactions.push(transaction);
            ((), true)
        })
        .await
    }

    async fn update_transaction(&self, transaction: Transaction) -> Result<bool, StoreError> {
        self.commit(transaction.user_id, |user| {
            let id = transaction.id;
            let replaced = replace_by(&mut user.transactions, transaction, |t| t.id == id);
            (replaced, replaced)
        })
        .await
    }

    async fn delete_transaction(
        &self,
        user_id: UserId,
        transaction_id: TransactionId,
    ) -> Result<bool, StoreError> {
        self.commit(user_id, |user| {
            let removed = remove_by(&mut user.transactions, |t| t.id == transaction_id) > 0;
            (removed, removed)
        })
        .await
    }

    async fn clear_transactions(&self, user_id: UserId) -> Result<usize, StoreError> {
        self.commit(user_id, |user| {
            let removed = std::mem::take(&mut user.transactions).len();
            (removed, removed > 0)
        })
        .await
    }

    async fn categories(&self, user_id: UserId) -> Result<Option<CategoryRegistry>, StoreError> {
        Ok(self
            .users
            .get(&user_id)
            .and_then(|user| user.categories.clone()))
    }

    async fn save_categories(
        &self,
        user_id: UserId,
        registry: CategoryRegistry,
    ) -> Result<(), StoreError> {
        self.commit(user_id, |user| {
            user.categories = Some(registry);
            ((), true)
        })
        .await
    }
}
