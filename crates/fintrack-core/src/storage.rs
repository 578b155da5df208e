use crate::models::{
    write::{ExpensePatch, NewExpense, NewSalary, SalaryPatch},
    Expense, RecordId, RecordKind, Salary,
};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("{0} not found: {1}")]
    RecordNotFound(RecordKind, RecordId),
    #[error("invalid amount: {0:?}")]
    InvalidAmount(String),
    #[error("invalid date: {0:?}")]
    InvalidDate(String),
    #[error("unsupported operation: {0}")]
    Unsupported(String),
    #[error("database error: {0}")]
    Database(String),
    #[error("{0}")]
    Other(String),
}

pub trait SalaryStorage: Send + Sync {
    /// All salaries, oldest `created_at` first.
    fn list_salaries(&self) -> Result<Vec<Salary>, StorageError>;
    fn add_salary(&self, input: &NewSalary) -> Result<Salary, StorageError>;
    fn update_salary(&self, id: RecordId, patch: &SalaryPatch) -> Result<Salary, StorageError>;
    /// Returns false when there was nothing to delete.
    fn delete_salary(&self, id: RecordId) -> Result<bool, StorageError>;
}

pub trait ExpenseStorage: Send + Sync {
    fn list_expenses(&self) -> Result<Vec<Expense>, StorageError>;
    fn add_expense(&self, input: &NewExpense) -> Result<Expense, StorageError>;
    fn update_expense(&self, id: RecordId, patch: &ExpensePatch) -> Result<Expense, StorageError>;
    fn delete_expense(&self, id: RecordId) -> Result<bool, StorageError>;
}

/// Regional expenses are a separate collection with their own id sequence.
pub trait RegionalExpenseStorage: Send + Sync {
    fn list_regional_expenses(&self) -> Result<Vec<Expense>, StorageError>;
    fn add_regional_expense(&self, input: &NewExpense) -> Result<Expense, StorageError>;
    fn update_regional_expense(&self, id: RecordId, patch: &ExpensePatch) -> Result<Expense, StorageError>;
    fn delete_regional_expense(&self, id: RecordId) -> Result<bool, StorageError>;
}

/// Salaries and expenses. Every backend provides at least this much.
pub trait PartialStorage: SalaryStorage + ExpenseStorage {}

impl<T: SalaryStorage + ExpenseStorage + ?Sized> PartialStorage for T {}

/// Salaries, expenses and regional expenses.
pub trait FullStorage: PartialStorage + RegionalExpenseStorage {}

impl<T: PartialStorage + RegionalExpenseStorage + ?Sized> FullStorage for T {}
