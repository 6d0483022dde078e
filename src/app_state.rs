//! Implements a struct that holds the state of the REST server.

use std::sync::Arc;

use crate::{db::ConnectionPool, mailer::Mailer, pagination::PaginationConfig};

/// The state of the REST server.
#[derive(Debug, Clone)]
pub struct AppState {
    /// The pool of database connections shared by all handlers.
    pub pool: ConnectionPool,

    /// Sends expense summaries when a total is saved for an email.
    pub mailer: Arc<dyn Mailer>,

    /// The config that controls how to page lists of expenses.
    pub pagination_config: PaginationConfig,
}

impl AppState {
    /// Create a new [AppState] from an already opened connection pool.
    pub fn new(
        pool: ConnectionPool,
        mailer: Arc<dyn Mailer>,
        pagination_config: PaginationConfig,
    ) -> Self {
        Self {
            pool,
            mailer,
            pagination_config,
        }
    }
}
