use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer};
use time::OffsetDateTime;

/// A monetary amount as supplied by a caller, before coercion.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum AmountInput {
    Text(String),
    Number(Decimal),
}

impl From<Decimal> for AmountInput {
    fn from(value: Decimal) -> Self {
        AmountInput::Number(value)
    }
}

impl From<i64> for AmountInput {
    fn from(value: i64) -> Self {
        AmountInput::Number(Decimal::from(value))
    }
}

impl From<&str> for AmountInput {
    fn from(value: &str) -> Self {
        AmountInput::Text(value.to_string())
    }
}

impl From<String> for AmountInput {
    fn from(value: String) -> Self {
        AmountInput::Text(value)
    }
}

/// A date as supplied by a caller: an RFC 3339 / `YYYY-MM-DD` string, epoch
/// milliseconds, or an already typed timestamp.
#[derive(Debug, Clone, PartialEq)]
pub enum DateInput {
    Timestamp(OffsetDateTime),
    Text(String),
    Millis(i64),
}

impl<'de> Deserialize<'de> for DateInput {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Wire {
            Text(String),
            Millis(i64),
        }

        Ok(match Wire::deserialize(deserializer)? {
            Wire::Text(s) => DateInput::Text(s),
            Wire::Millis(ms) => DateInput::Millis(ms),
        })
    }
}

impl From<OffsetDateTime> for DateInput {
    fn from(value: OffsetDateTime) -> Self {
        DateInput::Timestamp(value)
    }
}

impl From<&str> for DateInput {
    fn from(value: &str) -> Self {
        DateInput::Text(value.to_string())
    }
}

impl From<String> for DateInput {
    fn from(value: String) -> Self {
        DateInput::Text(value)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct NewSalary {
    pub amount: Option<AmountInput>,
    pub month: Option<String>,
    pub year: Option<i32>,
    pub notes: Option<String>,
    pub date: Option<DateInput>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct NewExpense {
    pub amount: Option<AmountInput>,
    pub category: Option<String>,
    pub description: Option<String>,
    pub date: Option<DateInput>,
}

/// Fields to change on a salary. `None` leaves the stored value alone.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SalaryPatch {
    pub amount: Option<AmountInput>,
    pub month: Option<String>,
    pub year: Option<i32>,
    pub notes: Option<String>,
    pub date: Option<DateInput>,
}

/// Fields to change on an expense or regional expense.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ExpensePatch {
    pub amount: Option<AmountInput>,
    pub category: Option<String>,
    pub description: Option<String>,
    pub date: Option<DateInput>,
}
