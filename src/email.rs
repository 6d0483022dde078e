//! Validated email addresses.

use std::{fmt::Display, str::FromStr, sync::OnceLock};

use regex::Regex;
use serde::Serialize;

use crate::Error;

/// An email address in the form `name@domain.tld`.
///
/// The check is intentionally loose: anything without whitespace that has a
/// local part, an `@` and a domain containing a dot is accepted.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct EmailAddress(String);

fn email_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();

    PATTERN.get_or_init(|| {
        Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern is a valid regex")
    })
}

impl EmailAddress {
    /// Create and validate an email address.
    ///
    /// Surrounding whitespace is removed before validating.
    ///
    /// # Errors
    ///
    /// This function will return an [Error::InvalidEmail] if `raw_email` is not a valid email address.
    pub fn new(raw_email: &str) -> Result<Self, Error> {
        let email = raw_email.trim();

        if email_pattern().is_match(email) {
            Ok(Self(email.to_owned()))
        } else {
            Err(Error::InvalidEmail(raw_email.to_owned()))
        }
    }

    /// Create a new `EmailAddress` without any validation.
    ///
    /// The caller should ensure that `raw_email` is a correctly formatted email address,
    /// e.g. because it was read back from the database.
    pub fn new_unchecked(raw_email: &str) -> Self {
        Self(raw_email.to_owned())
    }

    /// Parse an optional form or JSON field, where a blank value means no email.
    pub fn parse_optional(raw_email: Option<&str>) -> Result<Option<Self>, Error> {
        match raw_email.map(str::trim) {
            None | Some("") => Ok(None),
            Some(email) => Self::new(email).map(Some),
        }
    }
}

impl AsRef<str> for EmailAddress {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl FromStr for EmailAddress {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        EmailAddress::new(s)
    }
}

impl Display for EmailAddress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
