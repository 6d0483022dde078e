//! Expense Tracker is a web app for recording what you spend.
//!
//! This library provides a JSON REST API for expenses and saved totals, and a
//! small server-rendered page for using it from a browser.

#![warn(missing_docs)]

use std::{net::SocketAddr, time::Duration};

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_server::Handle;
use serde::Serialize;
use tokio::signal;

mod app_state;
mod config;
mod db;
mod email;
mod endpoints;
mod expense;
mod html;
mod json;
mod logging;
mod mailer;
mod pagination;
mod routing;
mod snapshot;
mod tracker;

#[cfg(test)]
mod test_utils;

pub use app_state::AppState;
pub use config::Config;
pub use db::{ConnectionPool, DEFAULT_POOL_SIZE};
pub use email::EmailAddress;
pub use expense::{Expense, ExpenseId, total_expense};
pub use logging::{LOG_BODY_LENGTH_LIMIT, logging_middleware};
pub use mailer::{DisabledMailer, ExpenseSummary, Mailer, SmtpConfig, SmtpMailer, SummaryItem};
pub use pagination::PaginationConfig;
pub use routing::build_router;
pub use snapshot::{SnapshotId, SnapshotOwner, TotalSnapshot};

/// An async task that waits for either the ctrl+c or terminate signal, whichever comes first, and
/// then signals the server to shut down gracefully.
///
/// `handle` is a handle to an Axum `Server`.
pub async fn graceful_shutdown(handle: Handle<SocketAddr>) {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::debug!("Received ctrl+c signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
        _ = terminate => {
            tracing::debug!("Received terminate signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
    }
}

/// The errors that may occur in the application.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Error {
    /// The request body could not be parsed as JSON of the expected shape.
    #[error("could not parse the request body: {0}")]
    InvalidJson(String),

    /// A required text field was missing or only contained whitespace.
    #[error("{0} must be provided and cannot be empty")]
    EmptyField(&'static str),

    /// The amount could not be parsed as a finite number.
    #[error("\"{0}\" is not a number")]
    AmountNotANumber(String),

    /// The amount of an expense was zero or negative.
    #[error("amount must be greater than zero, got {0}")]
    NonPositiveAmount(f64),

    /// The amount of an expense was larger than [expense::MAX_AMOUNT].
    #[error("amount must be no more than {max}, got {0}", max = expense::MAX_AMOUNT)]
    AmountTooLarge(f64),

    /// The total of a snapshot was not a finite, non-negative number.
    #[error("\"{0}\" is not a valid total, expected a number no less than zero")]
    InvalidTotal(String),

    /// The email address does not look like `name@domain.tld`.
    #[error("\"{0}\" is not a valid email address")]
    InvalidEmail(String),

    /// The identifier in the request path is not a valid UUID.
    #[error("\"{0}\" is not a valid ID")]
    InvalidId(String),

    /// A total snapshot request specified both an email and a token.
    #[error("a total can be saved for an email or a token, but not both")]
    ConflictingOwner,

    /// The `page` or `limit` query parameters are out of range or malformed.
    #[error("invalid pagination parameters: {0}")]
    InvalidPagination(String),

    /// The requested resource was not found.
    ///
    /// Internally, this error may occur when a query returns no rows.
    #[error("the requested resource could not be found")]
    NotFound,

    /// Tried to update an expense that does not exist
    #[error("tried to update an expense that is not in the database")]
    UpdateMissingExpense,

    /// Tried to delete an expense that does not exist
    #[error("tried to delete an expense that is not in the database")]
    DeleteMissingExpense,

    /// No total snapshot matched the requested ID or token.
    #[error("no saved total matches the request")]
    SnapshotNotFound,

    /// An unhandled/unexpected SQL error.
    #[error("an unexpected SQL error occurred: {0}")]
    SqlError(rusqlite::Error),

    /// Could not acquire the database lock
    #[error("could not acquire the database lock")]
    DatabaseLockError,

    /// The connection pool was closed, e.g. during shutdown.
    #[error("the database connection pool has been closed")]
    PoolClosed,

    /// An error occurred while serializing a struct as JSON
    #[error("could not serialize as JSON: {0}")]
    JSONSerializationError(String),

    /// The expenses could not be written as CSV.
    #[error("could not write CSV: {0}")]
    CsvError(String),

    /// The summary email could not be built or sent.
    #[error("could not send email: {0}")]
    EmailError(String),
}

impl From<rusqlite::Error> for Error {
    fn from(value: rusqlite::Error) -> Self {
        match value {
            rusqlite::Error::QueryReturnedNoRows => Error::NotFound,
            error => {
                tracing::error!("an unhandled SQL error occurred: {}", error);
                Error::SqlError(error)
            }
        }
    }
}

/// The JSON body sent to the client when a request fails.
#[derive(Debug, Serialize)]
struct ErrorBody {
    error: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<String>,
}

impl Error {
    fn status_code(&self) -> StatusCode {
        match self {
            Error::InvalidJson(_)
            | Error::EmptyField(_)
            | Error::AmountNotANumber(_)
            | Error::NonPositiveAmount(_)
            | Error::AmountTooLarge(_)
            | Error::InvalidTotal(_)
            | Error::InvalidEmail(_)
            | Error::InvalidId(_)
            | Error::ConflictingOwner
            | Error::InvalidPagination(_) => StatusCode::BAD_REQUEST,
            Error::NotFound
            | Error::UpdateMissingExpense
            | Error::DeleteMissingExpense
            | Error::SnapshotNotFound => StatusCode::NOT_FOUND,
            Error::SqlError(_)
            | Error::DatabaseLockError
            | Error::PoolClosed
            | Error::JSONSerializationError(_)
            | Error::CsvError(_)
            | Error::EmailError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn summary(&self) -> &'static str {
        match self {
            Error::InvalidJson(_) => "Invalid request body",
            Error::EmptyField(_) => "Missing required fields",
            Error::AmountNotANumber(_) => "Amount must be a number",
            Error::NonPositiveAmount(_) => "Amount must be greater than zero",
            Error::AmountTooLarge(_) => "Amount is too large",
            Error::InvalidTotal(_) => "Invalid total amount",
            Error::InvalidEmail(_) => "Please provide a valid email address",
            Error::InvalidId(_) => "Invalid ID",
            Error::ConflictingOwner => "Provide either an email or a token",
            Error::InvalidPagination(_) => "Invalid pagination parameters",
            Error::NotFound => "Not found",
            Error::UpdateMissingExpense | Error::DeleteMissingExpense => "Expense not found",
            Error::SnapshotNotFound => "Total not found",
            _ => "Failed to process your request",
        }
    }

    /// The human readable summary and, for client errors, the detail of
    /// what was wrong with the request.
    ///
    /// Server errors never include details, the cause is only logged.
    fn into_body(self) -> ErrorBody {
        let details = if self.status_code().is_client_error() {
            Some(self.to_string())
        } else {
            None
        };

        ErrorBody {
            error: self.summary(),
            details,
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = self.status_code();

        if status.is_server_error() {
            tracing::error!("An unexpected error occurred: {}", self);
        }

        (status, Json(self.into_body())).into_response()
    }
}

#[cfg(test)]
mod error_response_tests {
    use axum::{http::StatusCode, response::IntoResponse};
    use serde_json::{Value, json};

    use crate::Error;

    async fn response_json(error: Error) -> (StatusCode, Value) {
        let response = error.into_response();
        let status = response.status();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("could not read response body");

        (
            status,
            serde_json::from_slice(&body).expect("response body is not JSON"),
        )
    }

    #[tokio::test]
    async fn validation_error_includes_details() {
        let (status, body) = response_json(Error::NonPositiveAmount(-1.0)).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(
            body,
            json!({
                "error": "Amount must be greater than zero",
                "details": "amount must be greater than zero, got -1"
            })
        );
    }

    #[tokio::test]
    async fn missing_expense_is_not_found() {
        let (status, body) = response_json(Error::DeleteMissingExpense).await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "Expense not found");
    }

    #[tokio::test]
    async fn sql_error_hides_driver_message() {
        let (status, body) = response_json(Error::SqlError(
            rusqlite::Error::InvalidColumnName("secret_column".to_owned()),
        ))
        .await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, json!({ "error": "Failed to process your request" }));
    }

    #[test]
    fn no_rows_maps_to_not_found() {
        let error = Error::from(rusqlite::Error::QueryReturnedNoRows);

        assert_eq!(error, Error::NotFound);
    }
}
