use axum::{
    Json,
    extract::{Query, State, rejection::QueryRejection},
    http::HeaderName,
    response::{IntoResponse, Response},
};

use crate::{
    Error,
    expense::{ExpenseState, count_expenses, get_expenses},
    pagination::PageParams,
};

/// The response header that holds the number of stored expenses, regardless of paging.
pub const TOTAL_COUNT_HEADER: HeaderName = HeaderName::from_static("x-total-count");

/// A route handler for listing expenses newest first.
///
/// Without query parameters every expense is returned. With `page` and/or
/// `limit` only that page is returned.
pub async fn list_expenses_endpoint(
    State(state): State<ExpenseState>,
    query: Result<Query<PageParams>, QueryRejection>,
) -> Result<Response, Error> {
    let Query(params) = query.map_err(|rejection| Error::InvalidPagination(rejection.body_text()))?;
    let page = state.pagination_config.page_range(&params)?;

    let connection = state.pool.get().await?;
    let expenses = get_expenses(page, &connection)?;
    let total_count = count_expenses(&connection)?;

    Ok(([(TOTAL_COUNT_HEADER, total_count.to_string())], Json(expenses)).into_response())
}
