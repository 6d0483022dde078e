//! The API endpoints URIs.
//!
//! For endpoints that take a parameter, e.g., '/api/expenses/{expense_id}', use [format_endpoint].

/// The root route, a plain text liveness check.
pub const ROOT: &str = "/";
/// The JSON health check.
pub const HEALTH: &str = "/health";

/// The page that lists expenses with the running total and the add form.
pub const EXPENSES_VIEW: &str = "/expenses";
/// The page for editing an existing expense.
pub const EDIT_EXPENSE_VIEW: &str = "/expenses/{expense_id}/edit";
/// The form target for deleting an expense from the expenses page.
pub const DELETE_EXPENSE_VIEW: &str = "/expenses/{expense_id}/delete";
/// The form target for saving the total shown on the expenses page.
pub const SAVE_TOTAL_VIEW: &str = "/expenses/save-total";
/// The page showing the expenses and saved total for an email address.
pub const PREVIOUS_EXPENSES_VIEW: &str = "/expenses/previous";

/// The route to list and create expenses.
pub const EXPENSES_API: &str = "/api/expenses";
/// The route to get, update or delete a single expense.
pub const EXPENSE_API: &str = "/api/expenses/{expense_id}";
/// The route to list the expenses in a category.
pub const EXPENSES_BY_CATEGORY_API: &str = "/api/expenses/category/{category}";
/// The route to download every expense as a CSV file.
pub const EXPORT_EXPENSES_API: &str = "/api/expenses/export";
/// The route to save a total snapshot.
pub const SAVE_TOTAL_API: &str = "/api/expenses/save-total";
/// The route to fetch a saved total snapshot.
pub const TOTAL_API: &str = "/api/expenses/total/{snapshot_id}";
/// The route to retrieve the expenses and total saved for an email or token.
pub const RETRIEVE_API: &str = "/api/expenses/retrieve";

/// Replace the parameter in `endpoint_path` with `id`.
///
/// A parameter is a string that starts with a left brace, followed by
/// lowercase letters or underscores, and ends with a right brace.
/// For example, in the endpoint path '/api/expenses/{expense_id}', '{expense_id}' is the parameter.
///
/// This function assumes that an endpoint path only contains ASCII characters
/// and a single parameter.
///
/// If no parameter is found in `endpoint_path`, the function returns the
/// the original `endpoint_path`.
pub fn format_endpoint(endpoint_path: &str, id: impl std::fmt::Display) -> String {
    let Some(param_start) = endpoint_path.find('{') else {
        return endpoint_path.to_string();
    };

    let param_end = endpoint_path[param_start..]
        .find('}')
        .map(|end| param_start + end + 1)
        .unwrap_or(endpoint_path.len());

    format!(
        "{}{}{}",
        &endpoint_path[..param_start],
        id,
        &endpoint_path[param_end..]
    )
}
