use serde::Deserialize;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::{
    Error,
    email::EmailAddress,
    expense::{AmountInput, Expense},
};

/// Database identifier for a saved total.
pub type SnapshotId = Uuid;

/// Who a saved total belongs to.
#[derive(Debug, Clone, PartialEq)]
pub enum SnapshotOwner {
    /// The total is emailed to, and can be looked up by, this address.
    Email(EmailAddress),
    /// The total can be looked up by anyone holding this token.
    Token(String),
}

impl SnapshotOwner {
    /// The value stored in the `owner_kind` column.
    pub fn kind(&self) -> &'static str {
        match self {
            SnapshotOwner::Email(_) => "email",
            SnapshotOwner::Token(_) => "token",
        }
    }

    /// The email address or token.
    pub fn value(&self) -> &str {
        match self {
            SnapshotOwner::Email(email) => email.as_ref(),
            SnapshotOwner::Token(token) => token,
        }
    }

    /// Rebuild an owner from its stored `kind` and `value`.
    ///
    /// Returns `None` for an unknown kind.
    pub fn from_parts(kind: &str, value: String) -> Option<Self> {
        match kind {
            "email" => Some(SnapshotOwner::Email(EmailAddress::new_unchecked(&value))),
            "token" => Some(SnapshotOwner::Token(value)),
            _ => None,
        }
    }
}

/// A stored total together with the expenses it was computed from.
#[derive(Debug, Clone, PartialEq)]
pub struct TotalSnapshot {
    /// The ID of the snapshot, kept when the owner saves again.
    pub id: SnapshotId,
    /// The email address or token the total was saved for.
    pub owner: SnapshotOwner,
    /// The total, zero or more.
    pub total: f64,
    /// A copy of the expenses as they were when the total was saved.
    pub expenses: Vec<Expense>,
    /// When the total was last saved.
    pub saved_at: OffsetDateTime,
}

/// The body of a request to save a total.
#[derive(Debug, Default, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveTotalRequest {
    /// Save the total for this email and send a summary to it.
    #[serde(default)]
    pub email: Option<String>,
    /// Save the total under this token.
    #[serde(default)]
    pub token: Option<String>,
    /// The total shown to the user.
    #[serde(default)]
    pub total_expense: Option<AmountInput>,
}

impl SaveTotalRequest {
    /// Work out who the total is saved for.
    ///
    /// Blank values count as missing. When neither an email nor a token is
    /// given a new random token is generated.
    ///
    /// # Errors
    /// Returns an [Error::ConflictingOwner] if both are given, or an
    /// [Error::InvalidEmail] for a malformed email.
    pub fn owner(&self) -> Result<SnapshotOwner, Error> {
        let email = EmailAddress::parse_optional(self.email.as_deref())?;
        let token = self
            .token
            .as_deref()
            .map(str::trim)
            .filter(|token| !token.is_empty());

        match (email, token) {
            (Some(_), Some(_)) => Err(Error::ConflictingOwner),
            (Some(email), None) => Ok(SnapshotOwner::Email(email)),
            (None, Some(token)) => Ok(SnapshotOwner::Token(token.to_owned())),
            (None, None) => Ok(SnapshotOwner::Token(Uuid::new_v4().to_string())),
        }
    }
}

/// Validate a total sent by a client.
///
/// # Errors
/// Returns an [Error::EmptyField] if the total is missing, or an
/// [Error::InvalidTotal] if it is not a finite number or is negative.
pub fn parse_total(total: Option<&AmountInput>) -> Result<f64, Error> {
    let total = total.ok_or(Error::EmptyField("totalExpense"))?;
    let invalid = || {
        Error::InvalidTotal(match total {
            AmountInput::Number(number) => number.to_string(),
            AmountInput::Text(text) => text.clone(),
        })
    };

    match total.parse() {
        Ok(number) => validate_total(number).map_err(|_| invalid()),
        Err(Error::EmptyField(_)) => Err(Error::EmptyField("totalExpense")),
        Err(_) => Err(invalid()),
    }
}

/// Check that `total` can be saved: finite and zero or positive.
///
/// # Errors
/// Returns an [Error::InvalidTotal] for negative, infinite or NaN totals.
pub fn validate_total(total: f64) -> Result<f64, Error> {
    if total.is_finite() && total >= 0.0 {
        Ok(total)
    } else {
        Err(Error::InvalidTotal(total.to_string()))
    }
}
