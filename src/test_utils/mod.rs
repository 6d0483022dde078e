#![allow(missing_docs)]

pub(crate) mod html;
pub(crate) mod mailer;

use std::sync::Arc;

pub(crate) use html::{
    assert_valid_html, must_get_form, parse_html_document, select_texts,
};
pub(crate) use mailer::MockMailer;

use crate::{AppState, db::ConnectionPool, pagination::PaginationConfig};

/// An [AppState] backed by an in-memory database.
#[track_caller]
pub(crate) fn must_create_test_state(mailer: Arc<MockMailer>) -> AppState {
    let pool = ConnectionPool::in_memory().expect("Could not create in-memory pool");

    AppState::new(pool, mailer, PaginationConfig::default())
}
