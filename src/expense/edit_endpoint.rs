use axum::{
    Json,
    extract::{Path, State},
};

use crate::{
    Error,
    expense::{Expense, ExpenseInput, ExpenseState, parse_expense_id, update_expense},
    json::JsonBody,
};

/// A route handler for changing some or all of the fields of an expense.
///
/// Fields missing from the body keep their current value. Responds with the updated expense.
pub async fn update_expense_endpoint(
    State(state): State<ExpenseState>,
    Path(expense_id): Path<String>,
    JsonBody(input): JsonBody<ExpenseInput>,
) -> Result<Json<Expense>, Error> {
    let expense_id = parse_expense_id(&expense_id)?;
    let patch = input.into_patch()?;
    let connection = state.pool.get().await?;

    let expense = update_expense(expense_id, patch, &connection)?;

    tracing::info!("Updated expense {expense_id}");

    Ok(Json(expense))
}
