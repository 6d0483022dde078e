use std::sync::Arc;

use axum::extract::FromRef;

use crate::{AppState, db::ConnectionPool, mailer::Mailer};

/// The state needed to save and look up totals.
#[derive(Debug, Clone)]
pub struct SnapshotState {
    /// The pool of database connections for managing saved totals.
    pub pool: ConnectionPool,
    /// Sends the summary when a total is saved for an email.
    pub mailer: Arc<dyn Mailer>,
}

impl FromRef<AppState> for SnapshotState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            pool: state.pool.clone(),
            mailer: state.mailer.clone(),
        }
    }
}
