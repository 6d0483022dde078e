use axum::{
    Json,
    extract::{Path, State},
};

use crate::{
    Error,
    expense::{Expense, ExpenseState, get_expense, get_expenses_by_category, parse_expense_id},
};

/// A route handler for getting a single expense by its ID.
pub async fn get_expense_endpoint(
    State(state): State<ExpenseState>,
    Path(expense_id): Path<String>,
) -> Result<Json<Expense>, Error> {
    let expense_id = parse_expense_id(&expense_id)?;
    let connection = state.pool.get().await?;

    get_expense(expense_id, &connection).map(Json)
}

/// A route handler for listing the expenses in exactly one category, newest first.
pub async fn get_expenses_by_category_endpoint(
    State(state): State<ExpenseState>,
    Path(category): Path<String>,
) -> Result<Json<Vec<Expense>>, Error> {
    let connection = state.pool.get().await?;

    get_expenses_by_category(&category, &connection).map(Json)
}
