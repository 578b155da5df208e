use prettytable::{row, Table};
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;

use fintrack_core::{Expense, Salary};

fn fmt_time(t: &OffsetDateTime) -> String {
    t.format(&Rfc3339).unwrap_or_else(|_| t.to_string())
}

pub fn salary_table(salaries: &[Salary]) -> Table {
    let mut table = Table::new();
    table.add_row(row!["Id", "Amount", "Month", "Year", "Notes", "Date", "Created"]);
    table.add_empty_row();

    for s in salaries {
        table.add_row(row![
            s.id,
            s.amount,
            s.month,
            s.year,
            s.notes,
            fmt_time(&s.date),
            fmt_time(&s.created_at)
        ]);
    }

    table
}

pub fn expense_table(expenses: &[Expense]) -> Table {
    let mut table = Table::new();
    table.add_row(row!["Id", "Amount", "Category", "Description", "Date", "Created"]);
    table.add_empty_row();

    for e in expenses {
        table.add_row(row![
            e.id,
            e.amount,
            e.category,
            e.description,
            fmt_time(&e.date),
            fmt_time(&e.created_at)
        ]);
    }

    table
}
