use axum::{
    Json,
    extract::{Path, State},
};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::{
    Error,
    email::EmailAddress,
    expense::{Expense, get_expenses_by_email},
    json::JsonBody,
    snapshot::{
        SnapshotId, SnapshotOwner, SnapshotState, TotalSnapshot, get_snapshot,
        get_snapshot_by_owner,
    },
};

/// A saved total in the shape sent to clients.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TotalResponse {
    id: SnapshotId,
    total_expense: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    token: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    saved_at: OffsetDateTime,
    expenses: Vec<Expense>,
}

impl From<TotalSnapshot> for TotalResponse {
    fn from(snapshot: TotalSnapshot) -> Self {
        let (email, token) = match snapshot.owner {
            SnapshotOwner::Email(email) => (Some(email.to_string()), None),
            SnapshotOwner::Token(token) => (None, Some(token)),
        };

        Self {
            id: snapshot.id,
            total_expense: snapshot.total,
            email,
            token,
            saved_at: snapshot.saved_at,
            expenses: snapshot.expenses,
        }
    }
}

/// A route handler for getting a saved total by its ID.
pub async fn get_total_endpoint(
    State(state): State<SnapshotState>,
    Path(snapshot_id): Path<String>,
) -> Result<Json<TotalResponse>, Error> {
    let snapshot_id =
        Uuid::parse_str(snapshot_id.trim()).map_err(|_| Error::InvalidId(snapshot_id.clone()))?;
    let connection = state.pool.get().await?;

    get_snapshot(snapshot_id, &connection).map(|snapshot| Json(snapshot.into()))
}

/// The body of a request to look up expenses by email or token.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct RetrieveRequest {
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    token: Option<String>,
}

/// The expenses and total found for an email or token.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RetrieveResponse {
    success: bool,
    expenses: Vec<Expense>,
    total_expense: f64,
}

/// The expenses currently linked to `email` and the last total saved for it, or zero.
pub fn previous_expenses(
    email: EmailAddress,
    connection: &Connection,
) -> Result<(Vec<Expense>, f64), Error> {
    let expenses = get_expenses_by_email(email.as_ref(), connection)?;
    let total = get_snapshot_by_owner(&SnapshotOwner::Email(email), connection)?
        .map(|snapshot| snapshot.total)
        .unwrap_or(0.0);

    Ok((expenses, total))
}

/// A route handler for looking up expenses by email or by token.
///
/// For an email, the expenses currently linked to it are returned along with
/// the last total saved for it, or zero. For a token, the expenses and total
/// captured when the token was saved are returned.
pub async fn retrieve_endpoint(
    State(state): State<SnapshotState>,
    JsonBody(request): JsonBody<RetrieveRequest>,
) -> Result<Json<RetrieveResponse>, Error> {
    let email = EmailAddress::parse_optional(request.email.as_deref())?;
    let token = request
        .token
        .as_deref()
        .map(str::trim)
        .filter(|token| !token.is_empty());

    let connection = state.pool.get().await?;

    let (expenses, total_expense) = match (email, token) {
        (Some(_), Some(_)) => return Err(Error::ConflictingOwner),
        (None, None) => return Err(Error::EmptyField("email or token")),
        (Some(email), None) => previous_expenses(email, &connection)?,
        (None, Some(token)) => {
            let snapshot =
                get_snapshot_by_owner(&SnapshotOwner::Token(token.to_owned()), &connection)?
                    .ok_or(Error::SnapshotNotFound)?;

            (snapshot.expenses, snapshot.total)
        }
    };

    Ok(Json(RetrieveResponse {
        success: true,
        expenses,
        total_expense,
    }))
}
