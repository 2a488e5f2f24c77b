//! Command dispatch onto the query service.

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use serde_json::{Value, json};
use tally_core::budget::{CreateBudgetInput, UpdateBudgetInput};
use tally_core::query::{BudgetQueryService, LedgerStore};
use tally_core::transaction::{CreateTransactionInput, TransactionFilter, UpdateTransactionInput};
use tally_shared::types::{PageRequest, UserId};

use crate::cli::{BudgetCommand, CategoryCommand, Command, TransactionCommand};

/// Runs one command for `user` and returns its JSON output.
///
/// Query failures come back as a `QueryError` inside the `anyhow::Error`.
pub async fn run<S: LedgerStore>(
    service: &BudgetQueryService<S>,
    user: UserId,
    command: Command,
    now: DateTime<Utc>,
    tz: Tz,
) -> anyhow::Result<Value> {
    let local_now = now.with_timezone(&tz);

    let output = match command {
        Command::Progress => {
            serde_json::to_value(service.budget_progress(user, &local_now).await?)?
        }
        Command::Health => serde_json::to_value(service.budget_health(user, &local_now).await?)?,
        Command::Summary(range) => serde_json::to_value(
            service
                .financial_summary(user, range.from, range.to)
                .await?,
        )?,
        Command::Budgets(cmd) => budgets(service, user, cmd, now).await?,
        Command::Transactions(cmd) => transactions(service, user, cmd, now).await?,
        Command::Categories(cmd) => categories(service, user, cmd).await?,
    };

    Ok(output)
}

async fn budgets<S: LedgerStore>(
    service: &BudgetQueryService<S>,
    user: UserId,
    command: BudgetCommand,
    now: DateTime<Utc>,
) -> anyhow::Result<Value> {
    let output = match command {
        BudgetCommand::List => serde_json::to_value(service.list_budgets(user).await?)?,
        BudgetCommand::Create {
            category,
            amount,
            scope,
            period,
        } => {
            let input = CreateBudgetInput {
                category,
                scope: scope.into(),
                amount,
                period: period.map(Into::into),
            };
            serde_json::to_value(service.create_budget(user, input, now).await?)?
        }
        BudgetCommand::Update {
            id,
            category,
            amount,
            scope,
            period,
            active,
        } => {
            let input = UpdateBudgetInput {
                category,
                scope: scope.map(Into::into),
                amount,
                period: period.map(Into::into),
                active,
            };
            serde_json::to_value(service.update_budget(user, id, input, now).await?)?
        }
        BudgetCommand::Delete { id } => {
            service.delete_budget(user, id).await?;
            json!({ "deleted": id })
        }
    };

    Ok(output)
}

async fn transactions<S: LedgerStore>(
    service: &BudgetQueryService<S>,
    user: UserId,
    command: TransactionCommand,
    now: DateTime<Utc>,
) -> anyhow::Result<Value> {
    let output = match command {
        TransactionCommand::Add {
            kind,
            category,
            amount,
            description,
            date,
        } => {
            let input = CreateTransactionInput {
                kind: kind.into(),
                category,
                amount,
                description,
                date,
            };
            serde_json::to_value(service.create_transaction(user, input, now).await?)?
        }
        TransactionCommand::List {
            kind,
            category,
            range,
            page,
            limit,
        } => {
            let filter = TransactionFilter {
                kind: kind.map(Into::into),
                category,
                start_date: range.from,
                end_date: range.to,
            };
            let page = service
                .list_transactions(user, filter, PageRequest::new(page, limit))
                .await?;
            serde_json::to_value(page)?
        }
        TransactionCommand::Update {
            id,
            kind,
            category,
            amount,
            description,
            date,
        } => {
            let input = UpdateTransactionInput {
                kind: kind.map(Into::into),
                category,
                amount,
                description,
                date,
            };
            serde_json::to_value(service.update_transaction(user, id, input, now).await?)?
        }
        TransactionCommand::Delete { id } => {
            service.delete_transaction(user, id).await?;
            json!({ "deleted": id })
        }
        TransactionCommand::Clear => {
            let removed = service.clear_transactions(user).await?;
            json!({ "deleted": removed })
        }
    };

    Ok(output)
}

async fn categories<S: LedgerStore>(
    service: &BudgetQueryService<S>,
    user: UserId,
    command: CategoryCommand,
) -> anyhow::Result<Value> {
    let registry = match command {
        CategoryCommand::List => service.categories(user).await?,
        CategoryCommand::Add { kind, name } => service.add_category(user, &kind, &name).await?,
        CategoryCommand::Remove { kind, name } => {
            service.remove_category(user, &kind, &name).await?
        }
    };

    Ok(serde_json::to_value(registry)?)
}
