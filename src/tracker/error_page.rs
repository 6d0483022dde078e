use axum::response::{IntoResponse, Response};

use crate::{Error, html::error_view};

/// Render `error` as a full HTML page with a matching status code.
///
/// The cause of server errors is only logged.
pub fn error_page(error: Error) -> Response {
    let status = error.status_code();

    let description = if status.is_server_error() {
        tracing::error!("An unexpected error occurred while rendering a page: {error}");
        "Something went wrong on our end. Try again later or check the logs on the server."
            .to_owned()
    } else {
        error.to_string()
    };

    (
        status,
        error_view(error.summary(), status.as_str(), &description),
    )
        .into_response()
}
