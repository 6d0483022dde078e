use axum::{
    extract::State,
    http::header::{CONTENT_DISPOSITION, CONTENT_TYPE},
    response::{IntoResponse, Response},
};
use serde::Serialize;
use time::format_description::well_known::Rfc3339;

use crate::{
    Error,
    expense::{Expense, ExpenseState, get_expenses},
};

const CSV_HEADER: [&str; 6] = ["id", "description", "amount", "category", "email", "date"];

#[derive(Serialize)]
struct CsvRow<'a> {
    id: String,
    description: &'a str,
    amount: f64,
    category: &'a str,
    email: &'a str,
    date: String,
}

impl<'a> CsvRow<'a> {
    fn new(expense: &'a Expense) -> Result<Self, Error> {
        Ok(Self {
            id: expense.id.to_string(),
            description: &expense.description,
            amount: expense.amount,
            category: &expense.category,
            email: expense.email.as_deref().unwrap_or_default(),
            date: expense
                .date
                .format(&Rfc3339)
                .map_err(|error| Error::CsvError(error.to_string()))?,
        })
    }
}

/// Write `expenses` as CSV with a header row, even when there are no expenses.
fn expenses_to_csv(expenses: &[Expense]) -> Result<Vec<u8>, Error> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(Vec::new());

    writer
        .write_record(CSV_HEADER)
        .map_err(|error| Error::CsvError(error.to_string()))?;

    for expense in expenses {
        writer
            .serialize(CsvRow::new(expense)?)
            .map_err(|error| Error::CsvError(error.to_string()))?;
    }

    writer
        .into_inner()
        .map_err(|error| Error::CsvError(error.to_string()))
}

/// A route handler that downloads every expense as a CSV file, newest first.
pub async fn export_expenses_endpoint(State(state): State<ExpenseState>) -> Result<Response, Error> {
    let connection = state.pool.get().await?;
    let expenses = get_expenses(None, &connection)?;
    drop(connection);

    let csv = expenses_to_csv(&expenses)?;

    Ok((
        [
            (CONTENT_TYPE, "text/csv; charset=utf-8"),
            (CONTENT_DISPOSITION, "attachment; filename=\"expenses.csv\""),
        ],
        csv,
    )
        .into_response())
}
