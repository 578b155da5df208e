use std::{
    str::FromStr,
    sync::{Mutex, MutexGuard},
};

use rusqlite::{params, Connection, OptionalExtension, Row};
use rust_decimal::Decimal;
use time::OffsetDateTime;

use fintrack_core::{
    normalize, Expense, ExpenseChanges, ExpenseDraft, ExpensePatch, NewExpense, NewSalary, RecordId,
    RecordKind, Salary, SalaryChanges, SalaryDraft, SalaryPatch,
};

use crate::storage::{ExpenseStorage, SalaryStorage, StorageError};

const SALARY_COLUMNS: &str = "id, amount, month, year, notes, date, created_at";
const EXPENSE_COLUMNS: &str = "id, amount, category, description, date, created_at";

/// SQLite-backed salaries and expenses. Regional expenses are not stored here.
pub struct SqliteStorage {
    conn: Mutex<Connection>,
}

impl SqliteStorage {
    pub fn new(path: &str) -> Result<Self, StorageError> {
        let conn = if path == ":memory:" {
            Connection::open_in_memory()
        } else {
            Connection::open(path)
        }
        .map_err(db_err)?;

        conn.execute_batch("PRAGMA journal_mode=WAL;").map_err(db_err)?;

        let storage = Self {
            conn: Mutex::new(conn),
        };
        storage.init_schema()?;
        tracing::info!(path, "SQLite storage opened");
        Ok(storage)
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>, StorageError> {
        self.conn
            .lock()
            .map_err(|_| StorageError::Other("SQLite connection lock poisoned".to_string()))
    }

    fn init_schema(&self) -> Result<(), StorageError> {
        let conn = self.conn()?;
        conn.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS salaries (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                amount TEXT NOT NULL,
                month TEXT NOT NULL,
                year INTEGER NOT NULL,
                notes TEXT NOT NULL DEFAULT '',
                date INTEGER NOT NULL,
                created_at INTEGER NOT NULL
            );

            CREATE TABLE IF NOT EXISTS expenses (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                amount TEXT NOT NULL,
                category TEXT NOT NULL,
                description TEXT NOT NULL DEFAULT '',
                date INTEGER NOT NULL,
                created_at INTEGER NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_salaries_created_at
                ON salaries(created_at);

            CREATE INDEX IF NOT EXISTS idx_expenses_created_at
                ON expenses(created_at);
            ",
        )
        .map_err(db_err)?;
        Ok(())
    }
}

fn db_err(e: rusqlite::Error) -> StorageError {
    StorageError::Database(e.to_string())
}

// Timestamps are stored as unix microseconds so they sort numerically.
fn to_micros(t: OffsetDateTime) -> i64 {
    (t.unix_timestamp_nanos() / 1_000) as i64
}

fn from_micros(micros: i64) -> Result<OffsetDateTime, StorageError> {
    OffsetDateTime::from_unix_timestamp_nanos(i128::from(micros) * 1_000)
        .map_err(|e| StorageError::Database(format!("Invalid timestamp {}: {}", micros, e)))
}

fn str_to_decimal(s: &str) -> Result<Decimal, StorageError> {
    Decimal::from_str(s).map_err(|e| StorageError::Database(format!("Invalid decimal {:?}: {}", s, e)))
}

struct SalaryRow {
    id: RecordId,
    amount: String,
    month: String,
    year: i32,
    notes: String,
    date: i64,
    created_at: i64,
}

impl SalaryRow {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            amount: row.get(1)?,
            month: row.get(2)?,
            year: row.get(3)?,
            notes: row.get(4)?,
            date: row.get(5)?,
            created_at: row.get(6)?,
        })
    }

    fn into_salary(self) -> Result<Salary, StorageError> {
        Ok(Salary {
            id: self.id,
            amount: str_to_decimal(&self.amount)?,
            month: self.month,
            year: self.year,
            notes: self.notes,
            date: from_micros(self.date)?,
            created_at: from_micros(self.created_at)?,
        })
    }
}

struct ExpenseRow {
    id: RecordId,
    amount: String,
    category: String,
    description: String,
    date: i64,
    created_at: i64,
}

impl ExpenseRow {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            amount: row.get(1)?,
            category: row.get(2)?,
            description: row.get(3)?,
            date: row.get(4)?,
            created_at: row.get(5)?,
        })
    }

    fn into_expense(self) -> Result<Expense, StorageError> {
        Ok(Expense {
            id: self.id,
            amount: str_to_decimal(&self.amount)?,
            category: self.category,
            description: self.description,
            date: from_micros(self.date)?,
            created_at: from_micros(self.created_at)?,
        })
    }
}

impl SalaryStorage for SqliteStorage {
    fn list_salaries(&self) -> Result<Vec<Salary>, StorageError> {
        let conn = self.conn()?;
        let mut stmt = conn
            .prepare(&format!(
                "SELECT {} FROM salaries ORDER BY created_at ASC, id ASC",
                SALARY_COLUMNS
            ))
            .map_err(db_err)?;

        let rows = stmt
            .query_map([], SalaryRow::from_row)
            .map_err(db_err)?
            .collect::<Result<Vec<_>, _>>()
            .map_err(db_err)?;

        rows.into_iter().map(SalaryRow::into_salary).collect()
    }

    fn add_salary(&self, input: &NewSalary) -> Result<Salary, StorageError> {
        let draft = SalaryDraft::new(input, normalize::now())?;
        let conn = self.conn()?;
        let row = conn
            .query_row(
                &format!(
                    "INSERT INTO salaries (amount, month, year, notes, date, created_at)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                     RETURNING {}",
                    SALARY_COLUMNS
                ),
                params![
                    draft.amount.to_string(),
                    draft.month,
                    draft.year,
                    draft.notes,
                    to_micros(draft.date),
                    to_micros(draft.created_at)
                ],
                SalaryRow::from_row,
            )
            .map_err(db_err)?;

        let salary = row.into_salary()?;
        tracing::debug!(kind = %RecordKind::Salary, id = salary.id, "Record added");
        Ok(salary)
    }

    fn update_salary(&self, id: RecordId, patch: &SalaryPatch) -> Result<Salary, StorageError> {
        let changes = SalaryChanges::new(patch)?;
        let conn = self.conn()?;
        let row = conn
            .query_row(
                &format!(
                    "UPDATE salaries SET
                        amount = COALESCE(?1, amount),
                        month = COALESCE(?2, month),
                        year = COALESCE(?3, year),
                        notes = COALESCE(?4, notes),
                        date = COALESCE(?5, date)
                     WHERE id = ?6
                     RETURNING {}",
                    SALARY_COLUMNS
                ),
                params![
                    changes.amount.map(|a| a.to_string()),
                    changes.month,
                    changes.year,
                    changes.notes,
                    changes.date.map(to_micros),
                    id
                ],
                SalaryRow::from_row,
            )
            .optional()
            .map_err(db_err)?
            .ok_or(StorageError::RecordNotFound(RecordKind::Salary, id))?;

        let salary = row.into_salary()?;
        tracing::debug!(kind = %RecordKind::Salary, id, "Record updated");
        Ok(salary)
    }

    fn delete_salary(&self, id: RecordId) -> Result<bool, StorageError> {
        let conn = self.conn()?;
        let affected = conn
            .execute("DELETE FROM salaries WHERE id = ?1", params![id])
            .map_err(db_err)?;
        tracing::debug!(kind = %RecordKind::Salary, id, deleted = affected > 0, "Record delete");
        Ok(affected > 0)
    }
}

impl ExpenseStorage for SqliteStorage {
    fn list_expenses(&self) -> Result<Vec<Expense>, StorageError> {
        let conn = self.conn()?;
        let mut stmt = conn
            .prepare(&format!(
                "SELECT {} FROM expenses ORDER BY created_at ASC, id ASC",
                EXPENSE_COLUMNS
            ))
            .map_err(db_err)?;

        let rows = stmt
            .query_map([], ExpenseRow::from_row)
            .map_err(db_err)?
            .collect::<Result<Vec<_>, _>>()
            .map_err(db_err)?;

        rows.into_iter().map(ExpenseRow::into_expense).collect()
    }

    fn add_expense(&self, input: &NewExpense) -> Result<Expense, StorageError> {
        let draft = ExpenseDraft::new(input, normalize::now())?;
        let conn = self.conn()?;
        let row = conn
            .query_row(
                &format!(
                    "INSERT INTO expenses (amount, category, description, date, created_at)
                     VALUES (?1, ?2, ?3, ?4, ?5)
                     RETURNING {}",
                    EXPENSE_COLUMNS
                ),
                params![
                    draft.amount.to_string(),
                    draft.category,
                    draft.description,
                    to_micros(draft.date),
                    to_micros(draft.created_at)
                ],
                ExpenseRow::from_row,
            )
            .map_err(db_err)?;

        let expense = row.into_expense()?;
        tracing::debug!(kind = %RecordKind::Expense, id = expense.id, "Record added");
        Ok(expense)
    }

    fn update_expense(&self, id: RecordId, patch: &ExpensePatch) -> Result<Expense, StorageError> {
        let changes = ExpenseChanges::new(patch)?;
        let conn = self.conn()?;
        let row = conn
            .query_row(
                &format!(
                    "UPDATE expenses SET
                        amount = COALESCE(?1, amount),
                        category = COALESCE(?2, category),
                        description = COALESCE(?3, description),
                        date = COALESCE(?4, date)
                     WHERE id = ?5
                     RETURNING {}",
                    EXPENSE_COLUMNS
                ),
                params![
                    changes.amount.map(|a| a.to_string()),
                    changes.category,
                    changes.description,
                    changes.date.map(to_micros),
                    id
                ],
                ExpenseRow::from_row,
            )
            .optional()
            .map_err(db_err)?
            .ok_or(StorageError::RecordNotFound(RecordKind::Expense, id))?;

        let expense = row.into_expense()?;
        tracing::debug!(kind = %RecordKind::Expense, id, "Record updated");
        Ok(expense)
    }

    fn delete_expense(&self, id: RecordId) -> Result<bool, StorageError> {
        let conn = self.conn()?;
        let affected = conn
            .execute("DELETE FROM expenses WHERE id = ?1", params![id])
            .map_err(db_err)?;
        tracing::debug!(kind = %RecordKind::Expense, id, deleted = affected > 0, "Record delete");
        Ok(affected > 0)
    }
}
