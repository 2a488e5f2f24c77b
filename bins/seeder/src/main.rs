//! Snapshot seeder for Tally development and testing.
//!
//! Fills the configured snapshot with random income and expense transactions
//! from the last 90 days for one user.
//!
//! Usage: cargo run --bin seeder -- --count 50

use std::sync::Arc;

use anyhow::Context;
use chrono::{DateTime, TimeDelta, Utc};
use clap::Parser;
use rand::Rng;
use rand::seq::IndexedRandom;
use rust_decimal::Decimal;
use tally_core::query::BudgetQueryService;
use tally_core::transaction::{CreateTransactionInput, TransactionType};
use tally_shared::AppConfig;
use tally_shared::types::UserId;
use tally_store::MemoryStore;

const INCOME_CATEGORIES: &[&str] = &["Salary", "Freelance", "Bonus", "Investments", "Gift"];
const EXPENSE_CATEGORIES: &[&str] = &[
    "Food",
    "Transport",
    "Shopping",
    "Entertainment",
    "Bills",
    "Groceries",
    "Travel",
    "Health",
    "Education",
    "Rent",
];

/// Oldest seeded transaction, in seconds before now.
const WINDOW_SECS: i64 = 90 * 24 * 60 * 60;

#[derive(Debug, Parser)]
#[command(name = "seeder", about = "Seed a Tally snapshot with sample transactions")]
struct Args {
    /// Number of transactions to generate.
    #[arg(long, default_value_t = 50)]
    count: usize,

    /// User to seed.
    #[arg(long, env = "TALLY_USER", default_value_t = UserId::LOCAL)]
    user: UserId,

    /// Delete the user's existing transactions first.
    #[arg(long)]
    clear: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let args = Args::parse();
    let config = AppConfig::load().context("Failed to load configuration")?;
    let path = config.store.snapshot_path;

    println!("Opening snapshot at {}...", path.display());
    let store = Arc::new(
        MemoryStore::open(&path, false)
            .await
            .context("Failed to open ledger store")?,
    );
    let service = BudgetQueryService::new(Arc::clone(&store));

    if args.clear {
        let removed = service.clear_transactions(args.user).await?;
        println!("  Removed {removed} existing transactions");
    }

    let now = Utc::now();
    println!("Seeding {} transactions for {}...", args.count, args.user);
    for input in sample_transactions(&mut rand::rng(), args.count, now) {
        service.create_transaction(args.user, input, now).await?;
    }

    store.flush().await.context("Failed to save ledger snapshot")?;
    println!("Seeding complete!");
    Ok(())
}

/// Roughly 40% income, amounts 10.00 to 5000.00, dates in the last 90 days.
///
/// Amounts are cent-precise and dates trail `now` so the current month always
/// has spending to evaluate, unlike a fixed calendar year of whole-unit
/// amounts (5,000 to 55,000 income, 100 to 15,000 expense).
fn sample_transactions<R: Rng + ?Sized>(
    rng: &mut R,
    count: usize,
    now: DateTime<Utc>,
) -> Vec<CreateTransactionInput> {
    (0..count)
        .map(|_| {
            let kind = if rng.random_ratio(2, 5) {
                TransactionType::Income
            } else {
                TransactionType::Expense
            };
            let categories = match kind {
                TransactionType::Income => INCOME_CATEGORIES,
                TransactionType::Expense => EXPENSE_CATEGORIES,
            };
            let category = categories.choose(rng).copied().unwrap_or("Other");

            CreateTransactionInput {
                kind,
                category: category.to_string(),
                amount: Decimal::new(rng.random_range(1_000..=500_000), 2),
                description: Some(format!("{category} transaction")),
                date: Some(now - TimeDelta::seconds(rng.random_range(0..WINDOW_SECS))),
            }
        })
        .collect()
}
