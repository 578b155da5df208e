//! Core types and traits for fintrack storage backends.
//!
//! This crate provides the storage traits, the record models and the shared
//! normalization rules, so backends in other crates or modules only deal with
//! already coerced values.

pub mod models;
pub mod normalize;
pub mod storage;

// Re-export key types at crate root for convenience
pub use models::{Expense, RecordId, RecordKind, Salary};
pub use models::write::{AmountInput, DateInput, ExpensePatch, NewExpense, NewSalary, SalaryPatch};
pub use normalize::{ExpenseChanges, ExpenseDraft, SalaryChanges, SalaryDraft};
pub use storage::{
    ExpenseStorage, FullStorage, PartialStorage, RegionalExpenseStorage, SalaryStorage, StorageError,
};
