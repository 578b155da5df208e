use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use time::OffsetDateTime;

use fintrack_core::{
    normalize, Expense, ExpenseChanges, ExpenseDraft, ExpensePatch, NewExpense, NewSalary, RecordId,
    RecordKind, Salary, SalaryChanges, SalaryDraft, SalaryPatch,
};

// Re-export core storage types so callers can use crate::storage::* directly
pub use fintrack_core::storage::{
    ExpenseStorage, FullStorage, PartialStorage, RegionalExpenseStorage, SalaryStorage, StorageError,
};

trait StoredRecord: Clone {
    fn id(&self) -> RecordId;
    fn created_at(&self) -> OffsetDateTime;
}

impl StoredRecord for Salary {
    fn id(&self) -> RecordId {
        self.id
    }

    fn created_at(&self) -> OffsetDateTime {
        self.created_at
    }
}

impl StoredRecord for Expense {
    fn id(&self) -> RecordId {
        self.id
    }

    fn created_at(&self) -> OffsetDateTime {
        self.created_at
    }
}

/// One record category: records in insertion order plus its own id counter.
struct Collection<T> {
    records: Vec<T>,
    next_id: RecordId,
}

impl<T: StoredRecord> Collection<T> {
    fn new() -> Self {
        Self {
            records: Vec::new(),
            next_id: 1,
        }
    }

    fn next_sequence(&mut self) -> RecordId {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    fn list(&self) -> Vec<T> {
        let mut records = self.records.clone();
        records.sort_by_key(|r| (r.created_at(), r.id()));
        records
    }

    fn insert(&mut self, build: impl FnOnce(RecordId) -> T) -> T {
        let id = self.next_sequence();
        let record = build(id);
        self.records.push(record.clone());
        record
    }

    fn update(&mut self, id: RecordId, apply: impl FnOnce(&mut T)) -> Option<T> {
        let position = self.records.iter().position(|r| r.id() == id)?;
        let mut merged = self.records[position].clone();
        apply(&mut merged);
        self.records[position] = merged.clone();
        Some(merged)
    }

    fn delete(&mut self, id: RecordId) -> bool {
        match self.records.iter().position(|r| r.id() == id) {
            Some(position) => {
                self.records.remove(position);
                true
            }
            None => false,
        }
    }
}

struct Collections {
    salaries: Collection<Salary>,
    expenses: Collection<Expense>,
    regional_expenses: Collection<Expense>,
}

/// Process-local storage. Everything is lost when the instance is dropped.
pub struct InMemoryStorage {
    collections: RwLock<Collections>,
}

impl Default for InMemoryStorage {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryStorage {
    pub fn new() -> Self {
        Self {
            collections: RwLock::new(Collections {
                salaries: Collection::new(),
                expenses: Collection::new(),
                regional_expenses: Collection::new(),
            }),
        }
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Collections>, StorageError> {
        self.collections
            .read()
            .map_err(|_| StorageError::Other("in-memory storage lock poisoned".to_string()))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Collections>, StorageError> {
        self.collections
            .write()
            .map_err(|_| StorageError::Other("in-memory storage lock poisoned".to_string()))
    }

    fn add_expense_to(
        collection: &mut Collection<Expense>,
        kind: RecordKind,
        input: &NewExpense,
    ) -> Result<Expense, StorageError> {
        let draft = ExpenseDraft::new(input, normalize::now())?;
        let expense = collection.insert(|id| draft.into_record(id));
        tracing::debug!(%kind, id = expense.id, "Record added");
        Ok(expense)
    }

    fn update_expense_in(
        collection: &mut Collection<Expense>,
        kind: RecordKind,
        id: RecordId,
        patch: &ExpensePatch,
    ) -> Result<Expense, StorageError> {
        let changes = ExpenseChanges::new(patch)?;
        let expense = collection
            .update(id, |e| changes.apply(e))
            .ok_or(StorageError::RecordNotFound(kind, id))?;
        tracing::debug!(%kind, id, "Record updated");
        Ok(expense)
    }

    fn delete_expense_from(collection: &mut Collection<Expense>, kind: RecordKind, id: RecordId) -> bool {
        let deleted = collection.delete(id);
        tracing::debug!(%kind, id, deleted, "Record delete");
        deleted
    }
}

impl SalaryStorage for InMemoryStorage {
    fn list_salaries(&self) -> Result<Vec<Salary>, StorageError> {
        Ok(self.read()?.salaries.list())
    }

    fn add_salary(&self, input: &NewSalary) -> Result<Salary, StorageError> {
        let draft = SalaryDraft::new(input, normalize::now())?;
        let salary = self.write()?.salaries.insert(|id| draft.into_record(id));
        tracing::debug!(kind = %RecordKind::Salary, id = salary.id, "Record added");
        Ok(salary)
    }

    fn update_salary(&self, id: RecordId, patch: &SalaryPatch) -> Result<Salary, StorageError> {
        let changes = SalaryChanges::new(patch)?;
        let salary = self
            .write()?
            .salaries
            .update(id, |s| changes.apply(s))
            .ok_or(StorageError::RecordNotFound(RecordKind::Salary, id))?;
        tracing::debug!(kind = %RecordKind::Salary, id, "Record updated");
        Ok(salary)
    }

    fn delete_salary(&self, id: RecordId) -> Result<bool, StorageError> {
        let deleted = self.write()?.salaries.delete(id);
        tracing::debug!(kind = %RecordKind::Salary, id, deleted, "Record delete");
        Ok(deleted)
    }
}

impl ExpenseStorage for InMemoryStorage {
    fn list_expenses(&self) -> Result<Vec<Expense>, StorageError> {
        Ok(self.read()?.expenses.list())
    }

    fn add_expense(&self, input: &NewExpense) -> Result<Expense, StorageError> {
        Self::add_expense_to(&mut self.write()?.expenses, RecordKind::Expense, input)
    }

    fn update_expense(&self, id: RecordId, patch: &ExpensePatch) -> Result<Expense, StorageError> {
        Self::update_expense_in(&mut self.write()?.expenses, RecordKind::Expense, id, patch)
    }

    fn delete_expense(&self, id: RecordId) -> Result<bool, StorageError> {
        Ok(Self::delete_expense_from(&mut self.write()?.expenses, RecordKind::Expense, id))
    }
}

impl RegionalExpenseStorage for InMemoryStorage {
    fn list_regional_expenses(&self) -> Result<Vec<Expense>, StorageError> {
        Ok(self.read()?.regional_expenses.list())
    }

    fn add_regional_expense(&self, input: &NewExpense) -> Result<Expense, StorageError> {
        Self::add_expense_to(&mut self.write()?.regional_expenses, RecordKind::RegionalExpense, input)
    }

    fn update_regional_expense(&self, id: RecordId, patch: &ExpensePatch) -> Result<Expense, StorageError> {
        Self::update_expense_in(&mut self.write()?.regional_expenses, RecordKind::RegionalExpense, id, patch)
    }

    fn delete_regional_expense(&self, id: RecordId) -> Result<bool, StorageError> {
        Ok(Self::delete_expense_from(
            &mut self.write()?.regional_expenses,
            RecordKind::RegionalExpense,
            id,
        ))
    }
}
