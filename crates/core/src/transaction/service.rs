//! Transaction construction, edits and listing.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use tally_shared::types::{Page, PageRequest, TransactionId, UserId};

use super::error::TransactionError;
use super::types::{CreateTransactionInput, Transaction, TransactionFilter, UpdateTransactionInput};

/// Transaction business rules.
pub struct TransactionService;

impl TransactionService {
    /// Builds a new transaction for `user_id`, dating it `now` if no date was given.
    ///
    /// # Errors
    ///
    /// Returns `TransactionError::NegativeAmount` or `TransactionError::EmptyCategory`
    /// when the input breaks a transaction invariant.
    pub fn build(
        user_id: UserId,
        input: CreateTransactionInput,
        now: DateTime<Utc>,
    ) -> Result<Transaction, TransactionError> {
        let category = Self::validate(&input.category, input.amount)?;

        Ok(Transaction {
            id: TransactionId::new(),
            user_id,
            kind: input.kind,
            category,
            amount: input.amount,
            description: input.description,
            date: input.date.unwrap_or(now),
            created_at: now,
            updated_at: now,
        })
    }

    /// Overwrites the fields present in `input` and bumps `updated_at`.
    ///
    /// # Errors
    ///
    /// Returns an error if the resulting transaction would break an invariant.
    pub fn apply_update(
        mut transaction: Transaction,
        input: UpdateTransactionInput,
        now: DateTime<Utc>,
    ) -> Result<Transaction, TransactionError> {
        if let Some(kind) = input.kind {
            transaction.kind = kind;
        }
        if let Some(category) = input.category {
            transaction.category = category;
        }
        if let Some(amount) = input.amount {
            transaction.amount = amount;
        }
        if input.description.is_some() {
            transaction.description = input.description;
        }
        if let Some(date) = input.date {
            transaction.date = date;
        }

        transaction.category = Self::validate(&transaction.category, transaction.amount)?;
        transaction.updated_at = now;
        Ok(transaction)
    }

    /// Applies `filter`, sorts newest first and cuts out the requested page.
    #[must_use]
    pub fn list(
        transactions: Vec<Transaction>,
        filter: &TransactionFilter,
        page: PageRequest,
    ) -> Page<Transaction> {
        let mut matching: Vec<Transaction> = transactions
            .into_iter()
            .filter(|t| filter.matches(t))
            .collect();
        matching.sort_by(|a, b| b.date.cmp(&a.date));

        page.paginate(matching)
    }

    fn validate(category: &str, amount: Decimal) -> Result<String, TransactionError> {
        if amount < Decimal::ZERO {
            return Err(TransactionError::NegativeAmount(amount));
        }

        let category = category.trim();
        if category.is_empty() {
            return Err(TransactionError::EmptyCategory);
        }

        Ok(category.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transaction::types::TransactionType;
    use chrono::TimeZone;
    use rust_decimal_macros::dec;

    fn at(day: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, day, 12, 0, 0).unwrap()
    }

    fn input(amount: Decimal, date: Option<DateTime<Utc>>) -> CreateTransactionInput {
        CreateTransactionInput {
            kind: TransactionType::Expense,
            category: " Food ".to_string(),
            amount,
            description: Some("groceries".to_string()),
            date,
        }
    }

    #[test]
    fn test_build_defaults_date_to_now() {
        let user = UserId::new();
        let tx = TransactionService::build(user, input(dec!(12.50), None), at(5)).unwrap();

        assert_eq!(tx.user_id, user);
        assert_eq!(tx.date, at(5));
        assert_eq!(tx.created_at, at(5));
        assert_eq!(tx.category, "Food");
    }

    #[test]
    fn test_build_keeps_explicit_date() {
        let tx =
            TransactionService::build(UserId::new(), input(dec!(1), Some(at(2))), at(5)).unwrap();
        assert_eq!(tx.date, at(2));
    }

    #[test]
    fn test_build_rejects_negative_amount() {
        let err =
            TransactionService::build(UserId::new(), input(dec!(-0.01), None), at(5)).unwrap_err();
        assert_eq!(err, TransactionError::NegativeAmount(dec!(-0.01)));
    }

    #[test]
    fn test_build_accepts_zero_amount() {
        assert!(TransactionService::build(UserId::new(), input(dec!(0), None), at(5)).is_ok());
    }

    #[test]
    fn test_update_overwrites_only_given_fields() {
        let tx = TransactionService::build(UserId::new(), input(dec!(10), None), at(1)).unwrap();
        let update = UpdateTransactionInput {
            amount: Some(dec!(25)),
            kind: Some(TransactionType::Income),
            ..UpdateTransactionInput::default()
        };

        let updated = TransactionService::apply_update(tx.clone(), update, at(3)).unwrap();
        assert_eq!(updated.amount, dec!(25));
        assert_eq!(updated.kind, TransactionType::Income);
        assert_eq!(updated.category, tx.category);
        assert_eq!(updated.description, tx.description);
        assert_eq!(updated.created_at, at(1));
        assert_eq!(updated.updated_at, at(3));
    }

    #[test]
    fn test_update_rejects_blank_category() {
        let tx = TransactionService::build(UserId::new(), input(dec!(10), None), at(1)).unwrap();
        let update = UpdateTransactionInput {
            category: Some("   ".to_string()),
            ..UpdateTransactionInput::default()
        };
        assert_eq!(
            TransactionService::apply_update(tx, update, at(2)).unwrap_err(),
            TransactionError::EmptyCategory
        );
    }

    #[test]
    fn test_list_sorts_newest_first_and_paginates() {
        let user = UserId::new();
        let txs: Vec<Transaction> = (1..=5)
            .map(|day| {
                TransactionService::build(user, input(dec!(1), Some(at(day))), at(9)).unwrap()
            })
            .collect();

        let page =
            TransactionService::list(txs, &TransactionFilter::default(), PageRequest::new(1, 2));
        assert_eq!(page.total, 5);
        assert_eq!(page.total_pages, 3);
        let dates: Vec<_> = page.items.iter().map(|t| t.date).collect();
        assert_eq!(dates, vec![at(5), at(4)]);
    }

    #[test]
    fn test_list_applies_inclusive_date_filter() {
        let user = UserId::new();
        let txs: Vec<Transaction> = (1..=5)
            .map(|day| {
                TransactionService::build(user, input(dec!(1), Some(at(day))), at(9)).unwrap()
            })
            .collect();
        let filter = TransactionFilter {
            start_date: Some(at(2)),
            end_date: Some(at(4)),
            ..TransactionFilter::default()
        };

        let page = TransactionService::list(txs, &filter, PageRequest::default());
        assert_eq!(page.total, 3);
    }
}
