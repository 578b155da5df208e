//! Behaviour every backend must share. Each function takes a storage that may
//! already hold rows, so only the records a check adds are inspected.
#![allow(dead_code)]

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use time::macros::datetime;

use fintrack::models::write::{ExpensePatch, NewExpense, NewSalary, SalaryPatch};
use fintrack::models::{RecordId, RecordKind};
use fintrack::normalize;
use fintrack::storage::{PartialStorage, StorageError};

const MISSING_ID: RecordId = 987_654_321;

pub fn salary_ids_increase_and_list_in_addition_order(storage: &dyn PartialStorage) {
    let first = storage.add_salary(&NewSalary { month: Some("Jan".to_string()), ..Default::default() }).unwrap();
    let second = storage.add_salary(&NewSalary { month: Some("Feb".to_string()), ..Default::default() }).unwrap();
    assert!(second.id > first.id);

    let listed: Vec<RecordId> = storage
        .list_salaries()
        .unwrap()
        .into_iter()
        .map(|s| s.id)
        .filter(|id| *id == first.id || *id == second.id)
        .collect();
    assert_eq!(listed, vec![first.id, second.id]);
}

pub fn expense_ids_increase(storage: &dyn PartialStorage) {
    let first = storage.add_expense(&NewExpense::default()).unwrap();
    let second = storage.add_expense(&NewExpense::default()).unwrap();
    assert_ne!(first.id, second.id);
    assert!(second.id > first.id);
}

pub fn expense_add_coerces_text_amount(storage: &dyn PartialStorage) {
    let expense = storage
        .add_expense(&NewExpense {
            amount: Some("150.5".into()),
            category: Some("food".to_string()),
            description: Some("lunch".to_string()),
            date: Some("2024-01-15".into()),
        })
        .unwrap();

    assert_eq!(expense.amount, dec!(150.5));
    assert_eq!(expense.category, "food");
    assert_eq!(expense.description, "lunch");
    assert_eq!(expense.date, datetime!(2024-01-15 0:00 UTC));
    assert_eq!(expense.created_at, datetime!(2024-01-15 0:00 UTC));
}

pub fn salary_add_fills_defaults(storage: &dyn PartialStorage) {
    let before = normalize::now();
    let salary = storage
        .add_salary(&NewSalary {
            amount: Some(1000i64.into()),
            month: Some("Jan".to_string()),
            year: Some(2024),
            ..Default::default()
        })
        .unwrap();
    let after = normalize::now();

    assert_eq!(salary.amount, dec!(1000));
    assert_eq!(salary.notes, "");
    assert_eq!(salary.year, 2024);
    assert!(salary.date >= before && salary.date <= after);
    assert!(salary.created_at >= before && salary.created_at <= after);
}

pub fn expense_add_without_date_uses_now(storage: &dyn PartialStorage) {
    let before = normalize::now();
    let expense = storage.add_expense(&NewExpense { category: Some("rent".to_string()), ..Default::default() }).unwrap();
    let after = normalize::now();

    assert_eq!(expense.amount, Decimal::ZERO);
    assert_eq!(expense.description, "");
    assert!(expense.created_at >= before && expense.created_at <= after);
    assert_eq!(expense.date, expense.created_at);
}

pub fn list_orders_by_created_at(storage: &dyn PartialStorage) {
    let march = storage
        .add_expense(&NewExpense { date: Some("2024-03-01".into()), ..Default::default() })
        .unwrap();
    let january = storage
        .add_expense(&NewExpense { date: Some("2024-01-01".into()), ..Default::default() })
        .unwrap();
    let february = storage
        .add_expense(&NewExpense { date: Some("2024-02-01".into()), ..Default::default() })
        .unwrap();

    let wanted = [march.id, january.id, february.id];
    let listed: Vec<RecordId> = storage
        .list_expenses()
        .unwrap()
        .into_iter()
        .map(|e| e.id)
        .filter(|id| wanted.contains(id))
        .collect();
    assert_eq!(listed, vec![january.id, february.id, march.id]);

    // Moving the effective date does not move the record in the listing.
    storage
        .update_expense(march.id, &ExpensePatch { date: Some("2023-12-01".into()), ..Default::default() })
        .unwrap();
    let listed: Vec<RecordId> = storage
        .list_expenses()
        .unwrap()
        .into_iter()
        .map(|e| e.id)
        .filter(|id| wanted.contains(id))
        .collect();
    assert_eq!(listed, vec![january.id, february.id, march.id]);
}

pub fn salary_partial_update(storage: &dyn PartialStorage) {
    let salary = storage
        .add_salary(&NewSalary {
            amount: Some(1000i64.into()),
            month: Some("Jan".to_string()),
            year: Some(2024),
            notes: Some("base".to_string()),
            date: Some("2024-01-31".into()),
        })
        .unwrap();

    let updated = storage
        .update_salary(salary.id, &SalaryPatch { amount: Some("1250.40".into()), ..Default::default() })
        .unwrap();
    assert_eq!(updated.id, salary.id);
    assert_eq!(updated.amount, dec!(1250.4));
    assert_eq!(updated.month, "Jan");
    assert_eq!(updated.year, 2024);
    assert_eq!(updated.notes, "base");
    assert_eq!(updated.date, salary.date);
    assert_eq!(updated.created_at, salary.created_at);

    let updated = storage
        .update_salary(
            salary.id,
            &SalaryPatch {
                notes: Some("with bonus".to_string()),
                date: Some("2024-02-01T09:30:00Z".into()),
                ..Default::default()
            },
        )
        .unwrap();
    assert_eq!(updated.amount, dec!(1250.4));
    assert_eq!(updated.notes, "with bonus");
    assert_eq!(updated.date, datetime!(2024-02-01 9:30 UTC));

    let stored = storage.list_salaries().unwrap().into_iter().find(|s| s.id == salary.id).unwrap();
    assert_eq!(stored, updated);
}

pub fn expense_update_keeps_created_at(storage: &dyn PartialStorage) {
    let expense = storage
        .add_expense(&NewExpense {
            amount: Some("20".into()),
            category: Some("transport".to_string()),
            date: Some("2024-01-10".into()),
            ..Default::default()
        })
        .unwrap();

    let updated = storage
        .update_expense(
            expense.id,
            &ExpensePatch {
                date: Some("2024-01-20".into()),
                description: Some("bus pass".to_string()),
                ..Default::default()
            },
        )
        .unwrap();
    assert_eq!(updated.amount, dec!(20));
    assert_eq!(updated.category, "transport");
    assert_eq!(updated.description, "bus pass");
    assert_eq!(updated.date, datetime!(2024-01-20 0:00 UTC));
    assert_eq!(updated.created_at, datetime!(2024-01-10 0:00 UTC));
}

pub fn update_missing_is_not_found(storage: &dyn PartialStorage) {
    assert!(matches!(
        storage.update_salary(MISSING_ID, &SalaryPatch::default()),
        Err(StorageError::RecordNotFound(RecordKind::Salary, MISSING_ID))
    ));
    assert!(matches!(
        storage.update_expense(MISSING_ID, &ExpensePatch { amount: Some("1".into()), ..Default::default() }),
        Err(StorageError::RecordNotFound(RecordKind::Expense, MISSING_ID))
    ));
}

pub fn delete_reports_existence(storage: &dyn PartialStorage) {
    assert!(!storage.delete_salary(MISSING_ID).unwrap());
    assert!(!storage.delete_expense(MISSING_ID).unwrap());

    let salary = storage.add_salary(&NewSalary::default()).unwrap();
    let expense = storage.add_expense(&NewExpense::default()).unwrap();

    assert!(storage.delete_salary(salary.id).unwrap());
    assert!(!storage.delete_salary(salary.id).unwrap());
    assert!(storage.delete_expense(expense.id).unwrap());
    assert!(!storage.delete_expense(expense.id).unwrap());

    assert!(storage.list_salaries().unwrap().iter().all(|s| s.id != salary.id));
    assert!(storage.list_expenses().unwrap().iter().all(|e| e.id != expense.id));
}

pub fn invalid_input_is_rejected(storage: &dyn PartialStorage) {
    let before = storage.list_expenses().unwrap().len();

    assert!(matches!(
        storage.add_expense(&NewExpense { amount: Some("twelve".into()), ..Default::default() }),
        Err(StorageError::InvalidAmount(_))
    ));
    assert!(matches!(
        storage.add_expense(&NewExpense { date: Some("yesterday".into()), ..Default::default() }),
        Err(StorageError::InvalidDate(_))
    ));
    assert_eq!(storage.list_expenses().unwrap().len(), before);

    let salary = storage.add_salary(&NewSalary { amount: Some("10".into()), ..Default::default() }).unwrap();
    assert!(matches!(
        storage.update_salary(salary.id, &SalaryPatch { amount: Some("ten".into()), ..Default::default() }),
        Err(StorageError::InvalidAmount(_))
    ));
    let stored = storage.list_salaries().unwrap().into_iter().find(|s| s.id == salary.id).unwrap();
    assert_eq!(stored.amount, dec!(10));
}

/// Runs every check above against one storage, in order.
pub fn run_all(storage: &dyn PartialStorage) {
    salary_ids_increase_and_list_in_addition_order(storage);
    expense_ids_increase(storage);
    expense_add_coerces_text_amount(storage);
    salary_add_fills_defaults(storage);
    expense_add_without_date_uses_now(storage);
    list_orders_by_created_at(storage);
    salary_partial_update(storage);
    expense_update_keeps_created_at(storage);
    update_missing_is_not_found(storage);
    delete_reports_existence(storage);
    invalid_input_is_rejected(storage);
}
