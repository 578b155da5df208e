use clap::Subcommand;
use serde::Serialize;
use thiserror::Error;

use fintrack_core::RecordId;

use crate::{
    backend::Backend,
    render,
    storage::{ExpenseStorage, RegionalExpenseStorage, SalaryStorage, StorageError},
};

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Command {
    /// Salary records
    Salary {
        #[command(subcommand)]
        action: Action,
    },
    /// Expense records
    Expense {
        #[command(subcommand)]
        action: Action,
    },
    /// Regional expense records (in-memory backend only)
    Regional {
        #[command(subcommand)]
        action: Action,
    },
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Action {
    /// List records, oldest first
    List {
        /// Print a table instead of JSON
        #[arg(long)]
        table: bool,
    },
    /// Add a record from a JSON object
    Add {
        #[arg(long)]
        json: String,
    },
    /// Change the fields present in a JSON object
    Update {
        id: RecordId,
        #[arg(long)]
        json: String,
    },
    /// Delete a record
    Delete { id: RecordId },
}

#[derive(Debug, Error)]
pub enum CommandError {
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Serialize)]
struct DeleteOutcome {
    id: RecordId,
    deleted: bool,
}

fn to_json<T: Serialize + ?Sized>(value: &T) -> Result<String, CommandError> {
    Ok(serde_json::to_string_pretty(value)?)
}

/// Runs one command against `backend` and returns what should be printed.
pub fn run(backend: &Backend, command: &Command) -> Result<String, CommandError> {
    match command {
        Command::Salary { action } => run_salary(backend.partial(), action),
        Command::Expense { action } => run_expense(backend.partial(), action),
        Command::Regional { action } => {
            let storage = backend.full().ok_or_else(|| {
                StorageError::Unsupported(format!(
                    "regional expenses are not stored by the {} backend",
                    backend.name()
                ))
            })?;
            run_regional(storage, action)
        }
    }
}

fn run_salary(storage: &(impl SalaryStorage + ?Sized), action: &Action) -> Result<String, CommandError> {
    match action {
        Action::List { table } => {
            let salaries = storage.list_salaries()?;
            if *table {
                Ok(render::salary_table(&salaries).to_string())
            } else {
                to_json(&salaries)
            }
        }
        Action::Add { json } => to_json(&storage.add_salary(&serde_json::from_str(json)?)?),
        Action::Update { id, json } => to_json(&storage.update_salary(*id, &serde_json::from_str(json)?)?),
        Action::Delete { id } => to_json(&DeleteOutcome {
            id: *id,
            deleted: storage.delete_salary(*id)?,
        }),
    }
}

fn run_expense(storage: &(impl ExpenseStorage + ?Sized), action: &Action) -> Result<String, CommandError> {
    match action {
        Action::List { table } => {
            let expenses = storage.list_expenses()?;
            if *table {
                Ok(render::expense_table(&expenses).to_string())
            } else {
                to_json(&expenses)
            }
        }
        Action::Add { json } => to_json(&storage.add_expense(&serde_json::from_str(json)?)?),
        Action::Update { id, json } => to_json(&storage.update_expense(*id, &serde_json::from_str(json)?)?),
        Action::Delete { id } => to_json(&DeleteOutcome {
            id: *id,
            deleted: storage.delete_expense(*id)?,
        }),
    }
}

fn run_regional(
    storage: &(impl RegionalExpenseStorage + ?Sized),
    action: &Action,
) -> Result<String, CommandError> {
    match action {
        Action::List { table } => {
            let expenses = storage.list_regional_expenses()?;
            if *table {
                Ok(render::expense_table(&expenses).to_string())
            } else {
                to_json(&expenses)
            }
        }
        Action::Add { json } => to_json(&storage.add_regional_expense(&serde_json::from_str(json)?)?),
        Action::Update { id, json } => {
            to_json(&storage.update_regional_expense(*id, &serde_json::from_str(json)?)?)
        }
        Action::Delete { id } => to_json(&DeleteOutcome {
            id: *id,
            deleted: storage.delete_regional_expense(*id)?,
        }),
    }
}
