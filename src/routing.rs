//! Application router configuration.

use axum::{
    Json, Router,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde_json::json;

use crate::{
    AppState, endpoints,
    expense::{
        create_expense_endpoint, delete_expense_endpoint, export_expenses_endpoint,
        get_expense_endpoint, get_expenses_by_category_endpoint, list_expenses_endpoint,
        update_expense_endpoint,
    },
    snapshot::{get_total_endpoint, retrieve_endpoint, save_total_endpoint},
    tracker::{
        get_edit_expense_page, get_expenses_page, get_previous_expenses_page, post_create_expense,
        post_delete_expense, post_edit_expense, post_save_total,
    },
};

/// Return a router with all the app's routes.
pub fn build_router(state: AppState) -> Router {
    let api_routes = Router::new()
        .route(
            endpoints::EXPENSES_API,
            get(list_expenses_endpoint).post(create_expense_endpoint),
        )
        .route(endpoints::EXPORT_EXPENSES_API, get(export_expenses_endpoint))
        .route(endpoints::SAVE_TOTAL_API, post(save_total_endpoint))
        .route(endpoints::RETRIEVE_API, post(retrieve_endpoint))
        .route(endpoints::TOTAL_API, get(get_total_endpoint))
        .route(
            endpoints::EXPENSES_BY_CATEGORY_API,
            get(get_expenses_by_category_endpoint),
        )
        .route(
            endpoints::EXPENSE_API,
            get(get_expense_endpoint)
                .put(update_expense_endpoint)
                .delete(delete_expense_endpoint),
        );

    let page_routes = Router::new()
        .route(
            endpoints::EXPENSES_VIEW,
            get(get_expenses_page).post(post_create_expense),
        )
        .route(endpoints::SAVE_TOTAL_VIEW, post(post_save_total))
        .route(endpoints::PREVIOUS_EXPENSES_VIEW, get(get_previous_expenses_page))
        .route(
            endpoints::EDIT_EXPENSE_VIEW,
            get(get_edit_expense_page).post(post_edit_expense),
        )
        .route(endpoints::DELETE_EXPENSE_VIEW, post(post_delete_expense));

    Router::new()
        .route(endpoints::ROOT, get(get_root))
        .route(endpoints::HEALTH, get(get_health))
        .merge(api_routes)
        .merge(page_routes)
        .fallback(get_404_not_found)
        .with_state(state)
}

/// A plain text liveness check.
async fn get_root() -> &'static str {
    "Expense Tracker API is running"
}

async fn get_health() -> Json<serde_json::Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

async fn get_404_not_found() -> Response {
    (StatusCode::NOT_FOUND, Json(json!({ "error": "Not found" }))).into_response()
}
