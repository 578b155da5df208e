//! Default-filling and coercion shared by every storage backend.
//!
//! Backends never interpret caller input themselves: `add` goes through a
//! draft built here and `update` through a change set built here, so an amount
//! of `"150.5"` or a date of `"2024-01-15"` ends up as the same stored value no
//! matter which backend receives it.

use std::str::FromStr;

use rust_decimal::Decimal;
use time::{
    format_description::well_known::Rfc3339, macros::format_description, Date, Duration,
    OffsetDateTime, PrimitiveDateTime, UtcOffset,
};

use crate::{
    models::{
        write::{AmountInput, DateInput, ExpensePatch, NewExpense, NewSalary, SalaryPatch},
        Expense, RecordId, Salary,
    },
    storage::StorageError,
};

/// Current time in UTC at the precision every backend can store.
pub fn now() -> OffsetDateTime {
    normalize_timestamp(OffsetDateTime::now_utc())
}

/// Converts to UTC and truncates to whole microseconds.
pub fn normalize_timestamp(t: OffsetDateTime) -> OffsetDateTime {
    let t = t.to_offset(UtcOffset::UTC);
    t - Duration::nanoseconds(i64::from(t.nanosecond() % 1_000))
}

pub fn coerce_amount(input: &AmountInput) -> Result<Decimal, StorageError> {
    match input {
        AmountInput::Number(d) => Ok(d.normalize()),
        AmountInput::Text(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                return Err(StorageError::InvalidAmount(s.clone()));
            }
            Decimal::from_str(trimmed)
                .or_else(|_| Decimal::from_scientific(trimmed))
                .map(|d| d.normalize())
                .map_err(|_| StorageError::InvalidAmount(s.clone()))
        }
    }
}

pub fn coerce_date(input: &DateInput) -> Result<OffsetDateTime, StorageError> {
    let parsed = match input {
        DateInput::Timestamp(t) => *t,
        DateInput::Millis(ms) => {
            OffsetDateTime::from_unix_timestamp_nanos(i128::from(*ms) * 1_000_000)
                .map_err(|_| StorageError::InvalidDate(ms.to_string()))?
        }
        DateInput::Text(s) => parse_date_text(s.trim())
            .ok_or_else(|| StorageError::InvalidDate(s.clone()))?,
    };
    Ok(normalize_timestamp(parsed))
}

fn parse_date_text(s: &str) -> Option<OffsetDateTime> {
    if let Ok(t) = OffsetDateTime::parse(s, &Rfc3339) {
        return Some(t);
    }
    // Offset-less date-times and plain dates are taken as UTC.
    if let Ok(t) = PrimitiveDateTime::parse(s, format_description!("[year]-[month]-[day]T[hour]:[minute]:[second]")) {
        return Some(t.assume_utc());
    }
    if let Ok(d) = Date::parse(s, format_description!("[year]-[month]-[day]")) {
        return Some(d.midnight().assume_utc());
    }
    None
}

/// A salary with every field resolved, waiting for an id.
#[derive(Debug, Clone, PartialEq)]
pub struct SalaryDraft {
    pub amount: Decimal,
    pub month: String,
    pub year: i32,
    pub notes: String,
    pub date: OffsetDateTime,
    pub created_at: OffsetDateTime,
}

impl SalaryDraft {
    /// Salaries are always stamped with the time of the call.
    pub fn new(input: &NewSalary, now: OffsetDateTime) -> Result<Self, StorageError> {
        Ok(Self {
            amount: input.amount.as_ref().map(coerce_amount).transpose()?.unwrap_or(Decimal::ZERO),
            month: input.month.clone().unwrap_or_default(),
            year: input.year.unwrap_or_else(|| now.year()),
            notes: input.notes.clone().unwrap_or_default(),
            date: input.date.as_ref().map(coerce_date).transpose()?.unwrap_or(now),
            created_at: now,
        })
    }

    pub fn into_record(self, id: RecordId) -> Salary {
        Salary {
            id,
            amount: self.amount,
            month: self.month,
            year: self.year,
            notes: self.notes,
            date: self.date,
            created_at: self.created_at,
        }
    }
}

/// An expense with every field resolved, waiting for an id.
#[derive(Debug, Clone, PartialEq)]
pub struct ExpenseDraft {
    pub amount: Decimal,
    pub category: String,
    pub description: String,
    pub date: OffsetDateTime,
    pub created_at: OffsetDateTime,
}

impl ExpenseDraft {
    /// An expense is stamped with its effective date when one is given.
    pub fn new(input: &NewExpense, now: OffsetDateTime) -> Result<Self, StorageError> {
        let date = input.date.as_ref().map(coerce_date).transpose()?;
        Ok(Self {
            amount: input.amount.as_ref().map(coerce_amount).transpose()?.unwrap_or(Decimal::ZERO),
            category: input.category.clone().unwrap_or_default(),
            description: input.description.clone().unwrap_or_default(),
            date: date.unwrap_or(now),
            created_at: date.unwrap_or(now),
        })
    }

    pub fn into_record(self, id: RecordId) -> Expense {
        Expense {
            id,
            amount: self.amount,
            category: self.category,
            description: self.description,
            date: self.date,
            created_at: self.created_at,
        }
    }
}

/// A coerced salary patch. `None` fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SalaryChanges {
    pub amount: Option<Decimal>,
    pub month: Option<String>,
    pub year: Option<i32>,
    pub notes: Option<String>,
    pub date: Option<OffsetDateTime>,
}

impl SalaryChanges {
    pub fn new(patch: &SalaryPatch) -> Result<Self, StorageError> {
        Ok(Self {
            amount: patch.amount.as_ref().map(coerce_amount).transpose()?,
            month: patch.month.clone(),
            year: patch.year,
            notes: patch.notes.clone(),
            date: patch.date.as_ref().map(coerce_date).transpose()?,
        })
    }

    pub fn apply(self, salary: &mut Salary) {
        if let Some(amount) = self.amount {
            salary.amount = amount;
        }
        if let Some(month) = self.month {
            salary.month = month;
        }
        if let Some(year) = self.year {
            salary.year = year;
        }
        if let Some(notes) = self.notes {
            salary.notes = notes;
        }
        if let Some(date) = self.date {
            salary.date = date;
        }
    }
}

/// A coerced expense patch. `created_at` is never part of it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExpenseChanges {
    pub amount: Option<Decimal>,
    pub category: Option<String>,
    pub description: Option<String>,
    pub date: Option<OffsetDateTime>,
}

impl ExpenseChanges {
    pub fn new(patch: &ExpensePatch) -> Result<Self, StorageError> {
        Ok(Self {
            amount: patch.amount.as_ref().map(coerce_amount).transpose()?,
            category: patch.category.clone(),
            description: patch.description.clone(),
            date: patch.date.as_ref().map(coerce_date).transpose()?,
        })
    }

    pub fn apply(self, expense: &mut Expense) {
        if let Some(amount) = self.amount {
            expense.amount = amount;
        }
        if let Some(category) = self.category {
            expense.category = category;
        }
        if let Some(description) = self.description {
            expense.description = description;
        }
        if let Some(date) = self.date {
            expense.date = date;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use time::macros::datetime;

    #[test]
    fn test_coerce_amount_from_text() {
        assert_eq!(coerce_amount(&"150.5".into()).unwrap(), dec!(150.5));
        assert_eq!(coerce_amount(&" 12 ".into()).unwrap(), dec!(12));
        assert_eq!(coerce_amount(&"1e3".into()).unwrap(), dec!(1000));
    }

    #[test]
    fn test_coerce_amount_rejects_garbage() {
        assert!(matches!(coerce_amount(&"abc".into()), Err(StorageError::InvalidAmount(_))));
        assert!(matches!(coerce_amount(&"".into()), Err(StorageError::InvalidAmount(_))));
    }

    #[test]
    fn test_coerce_date_formats() {
        let expected = datetime!(2024-01-15 0:00 UTC);
        assert_eq!(coerce_date(&"2024-01-15".into()).unwrap(), expected);
        assert_eq!(coerce_date(&"2024-01-15T00:00:00Z".into()).unwrap(), expected);
        assert_eq!(coerce_date(&"2024-01-15T02:00:00+02:00".into()).unwrap(), expected);
        assert_eq!(coerce_date(&"2024-01-15T00:00:00".into()).unwrap(), expected);
        assert_eq!(coerce_date(&DateInput::Millis(1_705_276_800_000)).unwrap(), expected);
    }

    #[test]
    fn test_coerce_date_rejects_garbage() {
        assert!(matches!(coerce_date(&"not a date".into()), Err(StorageError::InvalidDate(_))));
        assert!(matches!(coerce_date(&"2024-13-40".into()), Err(StorageError::InvalidDate(_))));
    }

    #[test]
    fn test_timestamps_are_truncated_to_micros() {
        let t = datetime!(2024-01-15 10:30:00.123456789 UTC);
        assert_eq!(normalize_timestamp(t), datetime!(2024-01-15 10:30:00.123456 UTC));
    }

    #[test]
    fn test_salary_draft_defaults() {
        let now = datetime!(2024-03-01 12:00 UTC);
        let draft = SalaryDraft::new(&NewSalary::default(), now).unwrap();
        assert_eq!(draft.amount, Decimal::ZERO);
        assert_eq!(draft.month, "");
        assert_eq!(draft.year, 2024);
        assert_eq!(draft.notes, "");
        assert_eq!(draft.date, now);
        assert_eq!(draft.created_at, now);
    }

    #[test]
    fn test_salary_created_at_ignores_effective_date() {
        let now = datetime!(2024-03-01 12:00 UTC);
        let input = NewSalary {
            amount: Some(1000i64.into()),
            date: Some("2023-12-31".into()),
            ..Default::default()
        };
        let draft = SalaryDraft::new(&input, now).unwrap();
        assert_eq!(draft.date, datetime!(2023-12-31 0:00 UTC));
        assert_eq!(draft.created_at, now);
    }

    #[test]
    fn test_expense_created_at_follows_effective_date() {
        let now = datetime!(2024-03-01 12:00 UTC);
        let dated = NewExpense {
            date: Some("2024-01-15".into()),
            ..Default::default()
        };
        assert_eq!(ExpenseDraft::new(&dated, now).unwrap().created_at, datetime!(2024-01-15 0:00 UTC));

        let undated = ExpenseDraft::new(&NewExpense::default(), now).unwrap();
        assert_eq!(undated.created_at, now);
        assert_eq!(undated.description, "");
    }

    #[test]
    fn test_expense_changes_leave_created_at_alone() {
        let mut expense = ExpenseDraft::new(
            &NewExpense {
                amount: Some("10".into()),
                category: Some("food".into()),
                date: Some("2024-01-15".into()),
                ..Default::default()
            },
            datetime!(2024-03-01 12:00 UTC),
        )
        .unwrap()
        .into_record(1);

        let changes = ExpenseChanges::new(&ExpensePatch {
            amount: Some("12.50".into()),
            date: Some("2024-02-01".into()),
            ..Default::default()
        })
        .unwrap();
        changes.apply(&mut expense);

        assert_eq!(expense.amount, dec!(12.5));
        assert_eq!(expense.category, "food");
        assert_eq!(expense.date, datetime!(2024-02-01 0:00 UTC));
        assert_eq!(expense.created_at, datetime!(2024-01-15 0:00 UTC));
    }
}
