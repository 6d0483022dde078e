use axum::{Json, extract::State};
use serde::Serialize;
use time::OffsetDateTime;

use crate::{
    Error,
    db::ConnectionPool,
    expense::{get_expenses, get_expenses_by_email},
    json::JsonBody,
    mailer::{ExpenseSummary, Mailer},
    snapshot::{
        SaveTotalRequest, SnapshotId, SnapshotOwner, SnapshotState, TotalSnapshot, parse_total,
        upsert_snapshot, validate_total,
    },
};

/// The result of saving a total.
#[derive(Debug, Clone, PartialEq)]
pub struct SaveOutcome {
    /// The stored snapshot.
    pub snapshot: TotalSnapshot,
    /// Whether a summary email was delivered. Always `false` for token owners.
    pub email_sent: bool,
}

impl SaveOutcome {
    /// A message for the user describing what happened.
    pub fn message(&self) -> &'static str {
        match (&self.snapshot.owner, self.email_sent) {
            (SnapshotOwner::Email(_), true) => "Expense summary saved and email sent successfully",
            (SnapshotOwner::Email(_), false) => "Expense saved but email failed to send",
            (SnapshotOwner::Token(_), _) => "Expense summary saved",
        }
    }
}

/// Save `total` for `owner` and, for email owners, send them a summary.
///
/// Email owners capture the expenses linked to their address, token owners
/// capture every expense. A failed email is logged and reported through
/// [SaveOutcome::email_sent], the total is still saved.
///
/// # Errors
/// Returns an [Error::InvalidTotal] if `total` is negative or not finite, or
/// an error if the database cannot be read or written.
pub async fn save_total(
    owner: SnapshotOwner,
    total: f64,
    pool: &ConnectionPool,
    mailer: &dyn Mailer,
) -> Result<SaveOutcome, Error> {
    let total = validate_total(total)?;

    let snapshot = {
        let connection = pool.get().await?;
        let expenses = match &owner {
            SnapshotOwner::Email(email) => get_expenses_by_email(email.as_ref(), &connection)?,
            SnapshotOwner::Token(_) => get_expenses(None, &connection)?,
        };

        upsert_snapshot(&owner, total, &expenses, OffsetDateTime::now_utc(), &connection)?
    };

    tracing::info!("Saved total {} as snapshot {}", snapshot.total, snapshot.id);

    let email_sent = match &snapshot.owner {
        SnapshotOwner::Email(email) => {
            let summary = ExpenseSummary::new(email.clone(), snapshot.total, &snapshot.expenses);

            match mailer.send(&summary).await {
                Ok(()) => true,
                Err(error) => {
                    tracing::error!(
                        "Could not send expense summary for snapshot {}: {error}",
                        snapshot.id
                    );
                    false
                }
            }
        }
        SnapshotOwner::Token(_) => false,
    };

    Ok(SaveOutcome {
        snapshot,
        email_sent,
    })
}

/// The response body for a saved total.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveTotalResponse {
    success: bool,
    id: SnapshotId,
    #[serde(skip_serializing_if = "Option::is_none")]
    token: Option<String>,
    email_sent: bool,
    message: &'static str,
}

impl From<SaveOutcome> for SaveTotalResponse {
    fn from(outcome: SaveOutcome) -> Self {
        let message = outcome.message();
        let token = match outcome.snapshot.owner {
            SnapshotOwner::Token(token) => Some(token),
            SnapshotOwner::Email(_) => None,
        };

        Self {
            success: true,
            id: outcome.snapshot.id,
            token,
            email_sent: outcome.email_sent,
            message,
        }
    }
}

/// A route handler for saving a total for an email address or a token.
///
/// The generated or supplied token is returned so the client can retrieve the total later.
pub async fn save_total_endpoint(
    State(state): State<SnapshotState>,
    JsonBody(request): JsonBody<SaveTotalRequest>,
) -> Result<Json<SaveTotalResponse>, Error> {
    let total = parse_total(request.total_expense.as_ref())?;
    let owner = request.owner()?;

    let outcome = save_total(owner, total, &state.pool, state.mailer.as_ref()).await?;

    Ok(Json(outcome.into()))
}
