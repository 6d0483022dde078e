use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::Form;
use maud::{Markup, html};

use crate::{
    endpoints::{self, format_endpoint},
    expense::{ExpenseId, get_expense, parse_expense_id, update_expense},
    html::base,
    tracker::{
        TrackerState,
        error_page::error_page,
        form::{ExpenseForm, expense_form},
    },
};

fn edit_expense_view(
    expense_id: ExpenseId,
    form: &ExpenseForm,
    error_message: Option<&str>,
) -> Markup {
    let content = html! {
        h1 { "Edit Expense" }

        (expense_form(
            &format_endpoint(endpoints::EDIT_EXPENSE_VIEW, expense_id),
            form,
            "Update Expense",
            error_message,
        ))

        p { a href=(endpoints::EXPENSES_VIEW) { "Cancel" } }
    };

    base("Edit Expense", &content)
}

/// Display the edit form filled with the current values of an expense.
pub async fn get_edit_expense_page(
    State(state): State<TrackerState>,
    Path(expense_id): Path<String>,
) -> Response {
    let expense_id = match parse_expense_id(&expense_id) {
        Ok(expense_id) => expense_id,
        Err(error) => return error_page(error),
    };

    let result = match state.pool.get().await {
        Ok(connection) => get_expense(expense_id, &connection),
        Err(error) => Err(error),
    };

    match result {
        Ok(expense) => {
            edit_expense_view(expense_id, &ExpenseForm::from_expense(&expense), None).into_response()
        }
        Err(error) => error_page(error),
    }
}

/// Apply the edit form and go back to the list.
///
/// A blank email leaves the stored email unchanged.
pub async fn post_edit_expense(
    State(state): State<TrackerState>,
    Path(expense_id): Path<String>,
    Form(form): Form<ExpenseForm>,
) -> Response {
    let expense_id = match parse_expense_id(&expense_id) {
        Ok(expense_id) => expense_id,
        Err(error) => return error_page(error),
    };

    let patch = match form.to_input().into_patch() {
        Ok(patch) => patch,
        Err(error) => {
            return (
                StatusCode::BAD_REQUEST,
                edit_expense_view(expense_id, &form, Some(error.summary())),
            )
                .into_response();
        }
    };

    let result = match state.pool.get().await {
        Ok(connection) => update_expense(expense_id, patch, &connection),
        Err(error) => Err(error),
    };

    match result {
        Ok(expense) => {
            tracing::info!("Updated expense {} from the edit form", expense.id);
            Redirect::to(endpoints::EXPENSES_VIEW).into_response()
        }
        Err(error) => error_page(error),
    }
}
