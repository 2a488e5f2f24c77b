//! Allowed category labels, split by direction.
//!
//! A convenience list for pickers and defaults. Transactions are free to use
//! labels that are not registered.

use serde::{Deserialize, Serialize};

use super::error::CategoryError;
use crate::transaction::TransactionType;

const DEFAULT_INCOME: [&str; 5] = ["Salary", "Freelance", "Investments", "Gifts", "Other"];

const DEFAULT_EXPENSE: [&str; 8] = [
    "Food",
    "Transport",
    "Utilities",
    "Entertainment",
    "Healthcare",
    "Shopping",
    "Education",
    "Other",
];

/// A user's income and expense category lists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryRegistry {
    /// Income categories, in insertion order.
    pub income: Vec<String>,
    /// Expense categories, in insertion order.
    pub expense: Vec<String>,
}

impl Default for CategoryRegistry {
    fn default() -> Self {
        Self {
            income: DEFAULT_INCOME.iter().map(ToString::to_string).collect(),
            expense: DEFAULT_EXPENSE.iter().map(ToString::to_string).collect(),
        }
    }
}

impl CategoryRegistry {
    /// Parses a category type as given by a caller.
    ///
    /// # Errors
    ///
    /// Returns `CategoryError::InvalidType` for anything but `income`/`expense`.
    pub fn parse_kind(kind: &str) -> Result<TransactionType, CategoryError> {
        kind.parse()
            .map_err(|_| CategoryError::InvalidType(kind.to_string()))
    }

    /// Returns the list for one direction.
    #[must_use]
    pub fn list(&self, kind: TransactionType) -> &[String] {
        match kind {
            TransactionType::Income => &self.income,
            TransactionType::Expense => &self.expense,
        }
    }

    /// Returns true if `name` is registered under `kind`.
    #[must_use]
    pub fn contains(&self, kind: TransactionType, name: &str) -> bool {
        self.list(kind).iter().any(|c| c == name)
    }

    /// Appends `name` unless already present. Returns true if it was added.
    ///
    /// # Errors
    ///
    /// Returns `CategoryError::EmptyName` for a blank name.
    pub fn add(&mut self, kind: TransactionType, name: &str) -> Result<bool, CategoryError> {
        let name = Self::clean(name)?;
        if self.contains(kind, name) {
            return Ok(false);
        }
        self.list_mut(kind).push(name.to_string());
        Ok(true)
    }

    /// Removes `name`. Returns true if it was present.
    ///
    /// # Errors
    ///
    /// Returns `CategoryError::EmptyName` for a blank name.
    pub fn remove(&mut self, kind: TransactionType, name: &str) -> Result<bool, CategoryError> {
        let name = Self::clean(name)?;
        let list = self.list_mut(kind);
        let before = list.len();
        list.retain(|c| c != name);
        Ok(list.len() != before)
    }

    fn list_mut(&mut self, kind: TransactionType) -> &mut Vec<String> {
        match kind {
            TransactionType::Income => &mut self.income,
            TransactionType::Expense => &mut self.expense,
        }
    }

    fn clean(name: &str) -> Result<&str, CategoryError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(CategoryError::EmptyName);
        }
        Ok(name)
    }
}
