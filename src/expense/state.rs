use axum::extract::FromRef;

use crate::{AppState, db::ConnectionPool, pagination::PaginationConfig};

/// The state needed by the expense API endpoints.
#[derive(Debug, Clone)]
pub struct ExpenseState {
    /// The pool of database connections for managing expenses.
    pub pool: ConnectionPool,
    /// Controls how the expense list is paged.
    pub pagination_config: PaginationConfig,
}

impl FromRef<AppState> for ExpenseState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            pool: state.pool.clone(),
            pagination_config: state.pagination_config.clone(),
        }
    }
}
