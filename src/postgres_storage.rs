use std::sync::{Mutex, MutexGuard};

use postgres::{Client, NoTls, Row};

use fintrack_core::{
    normalize, Expense, ExpenseChanges, ExpenseDraft, ExpensePatch, NewExpense, NewSalary, RecordId,
    RecordKind, Salary, SalaryChanges, SalaryDraft, SalaryPatch,
};

use crate::storage::{ExpenseStorage, SalaryStorage, StorageError};

const SALARY_COLUMNS: &str = "id, amount, month, year, notes, date, created_at";
const EXPENSE_COLUMNS: &str = "id, amount, category, description, date, created_at";

/// PostgreSQL-backed salaries and expenses.
///
/// Amounts live in `NUMERIC` columns and dates in `TIMESTAMPTZ`, so the
/// coercion done by `fintrack_core::normalize` maps directly onto column types.
/// Regional expenses have no table here; use an in-memory backend for them.
pub struct PostgresStorage {
    client: Mutex<Client>,
}

impl PostgresStorage {
    pub fn new(connection_string: &str) -> Result<Self, StorageError> {
        let client = Client::connect(connection_string, NoTls)
            .map_err(|e| StorageError::Database(format!("PostgreSQL connection failed: {}", e)))?;

        let storage = Self {
            client: Mutex::new(client),
        };
        storage.init_schema()?;
        tracing::info!("PostgreSQL storage opened");
        Ok(storage)
    }

    fn client(&self) -> Result<MutexGuard<'_, Client>, StorageError> {
        self.client
            .lock()
            .map_err(|_| StorageError::Other("PostgreSQL client lock poisoned".to_string()))
    }

    fn init_schema(&self) -> Result<(), StorageError> {
        let mut client = self.client()?;
        client
            .batch_execute(
                "
            CREATE TABLE IF NOT EXISTS salaries (
                id BIGSERIAL PRIMARY KEY,
                amount NUMERIC NOT NULL,
                month TEXT NOT NULL,
                year INTEGER NOT NULL,
                notes TEXT NOT NULL DEFAULT '',
                date TIMESTAMPTZ NOT NULL DEFAULT now(),
                created_at TIMESTAMPTZ NOT NULL DEFAULT now()
            );

            CREATE TABLE IF NOT EXISTS expenses (
                id BIGSERIAL PRIMARY KEY,
                amount NUMERIC NOT NULL,
                category TEXT NOT NULL,
                description TEXT NOT NULL DEFAULT '',
                date TIMESTAMPTZ NOT NULL DEFAULT now(),
                created_at TIMESTAMPTZ NOT NULL DEFAULT now()
            );

            CREATE INDEX IF NOT EXISTS idx_pg_salaries_created_at
                ON salaries(created_at);

            CREATE INDEX IF NOT EXISTS idx_pg_expenses_created_at
                ON expenses(created_at);
            ",
            )
            .map_err(db_err)?;
        Ok(())
    }
}

fn db_err(e: postgres::Error) -> StorageError {
    StorageError::Database(e.to_string())
}

fn row_to_salary(row: &Row) -> Result<Salary, StorageError> {
    Ok(Salary {
        id: row.try_get("id").map_err(db_err)?,
        amount: row.try_get("amount").map_err(db_err)?,
        month: row.try_get("month").map_err(db_err)?,
        year: row.try_get("year").map_err(db_err)?,
        notes: row.try_get("notes").map_err(db_err)?,
        date: row.try_get("date").map_err(db_err)?,
        created_at: row.try_get("created_at").map_err(db_err)?,
    })
}

fn row_to_expense(row: &Row) -> Result<Expense, StorageError> {
    Ok(Expense {
        id: row.try_get("id").map_err(db_err)?,
        amount: row.try_get("amount").map_err(db_err)?,
        category: row.try_get("category").map_err(db_err)?,
        description: row.try_get("description").map_err(db_err)?,
        date: row.try_get("date").map_err(db_err)?,
        created_at: row.try_get("created_at").map_err(db_err)?,
    })
}

impl SalaryStorage for PostgresStorage {
    fn list_salaries(&self) -> Result<Vec<Salary>, StorageError> {
        let mut client = self.client()?;
        let rows = client
            .query(
                &format!("SELECT {} FROM salaries ORDER BY created_at ASC, id ASC", SALARY_COLUMNS),
                &[],
            )
            .map_err(db_err)?;
        rows.iter().map(row_to_salary).collect()
    }

    fn add_salary(&self, input: &NewSalary) -> Result<Salary, StorageError> {
        let draft = SalaryDraft::new(input, normalize::now())?;
        let mut client = self.client()?;
        let row = client
            .query_one(
                &format!(
                    "INSERT INTO salaries (amount, month, year, notes, date, created_at)
                     VALUES ($1, $2, $3, $4, $5, $6)
                     RETURNING {}",
                    SALARY_COLUMNS
                ),
                &[
                    &draft.amount,
                    &draft.month,
                    &draft.year,
                    &draft.notes,
                    &draft.date,
                    &draft.created_at,
                ],
            )
            .map_err(db_err)?;

        let salary = row_to_salary(&row)?;
        tracing::debug!(kind = %RecordKind::Salary, id = salary.id, "Record added");
        Ok(salary)
    }

    fn update_salary(&self, id: RecordId, patch: &SalaryPatch) -> Result<Salary, StorageError> {
        let changes = SalaryChanges::new(patch)?;
        let mut client = self.client()?;
        let row = client
            .query_opt(
                &format!(
                    "UPDATE salaries SET
                        amount = COALESCE($1::numeric, amount),
                        month = COALESCE($2::text, month),
                        year = COALESCE($3::integer, year),
                        notes = COALESCE($4::text, notes),
                        date = COALESCE($5::timestamptz, date)
                     WHERE id = $6
                     RETURNING {}",
                    SALARY_COLUMNS
                ),
                &[
                    &changes.amount,
                    &changes.month,
                    &changes.year,
                    &changes.notes,
                    &changes.date,
                    &id,
                ],
            )
            .map_err(db_err)?
            .ok_or(StorageError::RecordNotFound(RecordKind::Salary, id))?;

        let salary = row_to_salary(&row)?;
        tracing::debug!(kind = %RecordKind::Salary, id, "Record updated");
        Ok(salary)
    }

    fn delete_salary(&self, id: RecordId) -> Result<bool, StorageError> {
        let mut client = self.client()?;
        let affected = client
            .execute("DELETE FROM salaries WHERE id = $1", &[&id])
            .map_err(db_err)?;
        tracing::debug!(kind = %RecordKind::Salary, id, deleted = affected > 0, "Record delete");
        Ok(affected > 0)
    }
}

impl ExpenseStorage for PostgresStorage {
    fn list_expenses(&self) -> Result<Vec<Expense>, StorageError> {
        let mut client = self.client()?;
        let rows = client
            .query(
                &format!("SELECT {} FROM expenses ORDER BY created_at ASC, id ASC", EXPENSE_COLUMNS),
                &[],
            )
            .map_err(db_err)?;
        rows.iter().map(row_to_expense).collect()
    }

    fn add_expense(&self, input: &NewExpense) -> Result<Expense, StorageError> {
        let draft = ExpenseDraft::new(input, normalize::now())?;
        let mut client = self.client()?;
        let row = client
            .query_one(
                &format!(
                    "INSERT INTO expenses (amount, category, description, date, created_at)
                     VALUES ($1, $2, $3, $4, $5)
                     RETURNING {}",
                    EXPENSE_COLUMNS
                ),
                &[
                    &draft.amount,
                    &draft.category,
                    &draft.description,
                    &draft.date,
                    &draft.created_at,
                ],
            )
            .map_err(db_err)?;

        let expense = row_to_expense(&row)?;
        tracing::debug!(kind = %RecordKind::Expense, id = expense.id, "Record added");
        Ok(expense)
    }

    fn update_expense(&self, id: RecordId, patch: &ExpensePatch) -> Result<Expense, StorageError> {
        let changes = ExpenseChanges::new(patch)?;
        let mut client = self.client()?;
        let row = client
            .query_opt(
                &format!(
                    "UPDATE expenses SET
                        amount = COALESCE($1::numeric, amount),
                        category = COALESCE($2::text, category),
                        description = COALESCE($3::text, description),
                        date = COALESCE($4::timestamptz, date)
                     WHERE id = $5
                     RETURNING {}",
                    EXPENSE_COLUMNS
                ),
                &[
                    &changes.amount,
                    &changes.category,
                    &changes.description,
                    &changes.date,
                    &id,
                ],
            )
            .map_err(db_err)?
            .ok_or(StorageError::RecordNotFound(RecordKind::Expense, id))?;

        let expense = row_to_expense(&row)?;
        tracing::debug!(kind = %RecordKind::Expense, id, "Record updated");
        Ok(expense)
    }

    fn delete_expense(&self, id: RecordId) -> Result<bool, StorageError> {
        let mut client = self.client()?;
        let affected = client
            .execute("DELETE FROM expenses WHERE id = $1", &[&id])
            .map_err(db_err)?;
        tracing::debug!(kind = %RecordKind::Expense, id, deleted = affected > 0, "Record delete");
        Ok(affected > 0)
    }
}
