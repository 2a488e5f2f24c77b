//! Command line arguments.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use clap::{Args, Parser, Subcommand, ValueEnum};
use rust_decimal::Decimal;
use tally_core::budget::{BudgetPeriod, BudgetScope};
use tally_core::transaction::TransactionType;
use tally_shared::types::{BudgetId, TransactionId, UserId};

/// Personal budget tracker.
#[derive(Debug, Parser)]
#[command(name = "tally", version, about)]
pub struct Cli {
    /// User whose records to read and change.
    #[arg(long, global = true, env = "TALLY_USER", default_value_t = UserId::LOCAL)]
    pub user: UserId,

    /// Act as of this instant (RFC 3339 or YYYY-MM-DD) instead of now.
    #[arg(long, global = true, value_parser = parse_instant)]
    pub now: Option<DateTime<Utc>>,

    #[command(subcommand)]
    pub command: Command,
}

/// Top-level commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Progress of every active budget over the current month.
    Progress,
    /// Budgets on track, near their limit and exceeded, plus days left.
    Health,
    /// Income, expenses, balance and per-category totals.
    Summary(RangeArgs),
    /// Create, edit and list budgets.
    #[command(subcommand)]
    Budgets(BudgetCommand),
    /// Record, edit and list transactions.
    #[command(subcommand)]
    Transactions(TransactionCommand),
    /// Manage income and expense categories.
    #[command(subcommand)]
    Categories(CategoryCommand),
}

/// Optional inclusive date range.
#[derive(Debug, Args)]
pub struct RangeArgs {
    /// Earliest transaction date.
    #[arg(long, value_parser = parse_instant)]
    pub from: Option<DateTime<Utc>>,
    /// Latest transaction date.
    #[arg(long, value_parser = parse_instant)]
    pub to: Option<DateTime<Utc>>,
}

#[derive(Debug, Subcommand)]
pub enum BudgetCommand {
    /// List all budgets.
    List,
    /// Create a budget.
    Create {
        /// Category the budget limits.
        category: String,
        /// Spending limit.
        amount: Decimal,
        /// Count only this category, or every expense.
        #[arg(long, value_enum, default_value_t = ScopeArg::Category)]
        scope: ScopeArg,
        /// Declared period.
        #[arg(long, value_enum)]
        period: Option<PeriodArg>,
    },
    /// Change fields of a budget.
    Update {
        /// Budget to change.
        id: BudgetId,
        #[arg(long)]
        category: Option<String>,
        #[arg(long)]
        amount: Option<Decimal>,
        #[arg(long, value_enum)]
        scope: Option<ScopeArg>,
        #[arg(long, value_enum)]
        period: Option<PeriodArg>,
        /// Enable or disable the budget.
        #[arg(long)]
        active: Option<bool>,
    },
    /// Delete a budget.
    Delete {
        /// Budget to delete.
        id: BudgetId,
    },
}

#[derive(Debug, Subcommand)]
pub enum TransactionCommand {
    /// Record a transaction.
    Add {
        /// Income or expense.
        #[arg(value_enum)]
        kind: KindArg,
        /// Category label.
        category: String,
        /// Amount, never negative.
        amount: Decimal,
        #[arg(long)]
        description: Option<String>,
        /// Transaction date; now when omitted.
        #[arg(long, value_parser = parse_instant)]
        date: Option<DateTime<Utc>>,
    },
    /// List transactions, newest first.
    List {
        #[arg(long, value_enum)]
        kind: Option<KindArg>,
        #[arg(long)]
        category: Option<String>,
        #[command(flatten)]
        range: RangeArgs,
        #[arg(long, default_value_t = 1)]
        page: u32,
        #[arg(long, default_value_t = 10)]
        limit: u32,
    },
    /// Change fields of a transaction.
    Update {
        /// Transaction to change.
        id: TransactionId,
        #[arg(long, value_enum)]
        kind: Option<KindArg>,
        #[arg(long)]
        category: Option<String>,
        #[arg(long)]
        amount: Option<Decimal>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long, value_parser = parse_instant)]
        date: Option<DateTime<Utc>>,
    },
    /// Delete a transaction.
    Delete {
        /// Transaction to delete.
        id: TransactionId,
    },
    /// Delete every transaction of the user.
    Clear,
}

#[derive(Debug, Subcommand)]
pub enum CategoryCommand {
    /// List income and expense categories.
    List,
    /// Add a category.
    Add {
        /// `income` or `expense`.
        kind: String,
        name: String,
    },
    /// Remove a category.
    Remove {
        /// `income` or `expense`.
        kind: String,
        name: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ScopeArg {
    Category,
    Overall,
}

impl From<ScopeArg> for BudgetScope {
    fn from(arg: ScopeArg) -> Self {
        match arg {
            ScopeArg::Category => Self::Category,
            ScopeArg::Overall => Self::Overall,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum PeriodArg {
    Monthly,
    Weekly,
    Yearly,
}

impl From<PeriodArg> for BudgetPeriod {
    fn from(arg: PeriodArg) -> Self {
        match arg {
            PeriodArg::Monthly => Self::Monthly,
            PeriodArg::Weekly => Self::Weekly,
            PeriodArg::Yearly => Self::Yearly,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum KindArg {
    Income,
    Expense,
}

impl From<KindArg> for TransactionType {
    fn from(arg: KindArg) -> Self {
        match arg {
            KindArg::Income => Self::Income,
            KindArg::Expense => Self::Expense,
        }
    }
}

/// Parses RFC 3339, or a bare date as midnight UTC.
fn parse_instant(s: &str) -> Result<DateTime<Utc>, String> {
    if let Ok(at) = DateTime::parse_from_rfc3339(s) {
        return Ok(at.with_timezone(&Utc));
    }

    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .map(|date| date.and_time(NaiveTime::MIN).and_utc())
        .map_err(|_| format!("expected RFC 3339 or YYYY-MM-DD, got {s:?}"))
}
