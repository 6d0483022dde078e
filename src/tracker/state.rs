use std::sync::Arc;

use axum::extract::FromRef;

use crate::{AppState, db::ConnectionPool, mailer::Mailer};

/// The state needed by the expense tracker page.
#[derive(Debug, Clone)]
pub struct TrackerState {
    /// The pool of database connections for managing expenses.
    pub pool: ConnectionPool,
    /// Sends the summary when the total is saved.
    pub mailer: Arc<dyn Mailer>,
}

impl FromRef<AppState> for TrackerState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            pool: state.pool.clone(),
            mailer: state.mailer.clone(),
        }
    }
}
