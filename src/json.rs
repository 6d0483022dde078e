//! A JSON body extractor that reports malformed bodies with the app's error shape.

use axum::extract::{FromRequest, rejection::JsonRejection};

use crate::Error;

/// Like [axum::Json], but rejects bad bodies with an [Error::InvalidJson]
/// so the client gets `{"error": ..., "details": ...}` instead of plain text.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(Error))]
pub struct JsonBody<T>(pub T);

impl From<JsonRejection> for Error {
    fn from(rejection: JsonRejection) -> Self {
        Error::InvalidJson(rejection.body_text())
    }
}
