//! Core expense domain types and validation.

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::{Error, email::EmailAddress};

/// Database identifier for an expense.
pub type ExpenseId = Uuid;

/// The categories offered by the expense form.
///
/// Categories are free-form text, these are only suggestions.
pub const SUGGESTED_CATEGORIES: [&str; 5] = ["Food", "Transport", "Entertainment", "Bills", "Other"];

/// Parse an expense ID taken from a request path.
///
/// # Errors
/// Returns an [Error::InvalidId] if `raw` is not a UUID.
pub fn parse_expense_id(raw: &str) -> Result<ExpenseId, Error> {
    Uuid::parse_str(raw.trim()).map_err(|_| Error::InvalidId(raw.to_owned()))
}

/// One persisted spending entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Expense {
    /// The ID of the expense, generated when it is created.
    pub id: ExpenseId,
    /// A text description of what the money was spent on.
    pub description: String,
    /// How much was spent, always greater than zero.
    pub amount: f64,
    /// A label for grouping expenses, e.g. "Food".
    pub category: String,
    /// The email address the expense is linked to, used for emailed summaries.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// When the expense was recorded by the server.
    #[serde(with = "time::serde::rfc3339")]
    pub date: OffsetDateTime,
}

/// A number sent by a client, either as a JSON number or as text.
///
/// HTML forms and some clients send amounts as strings, e.g. `"4.50"`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AmountInput {
    /// A JSON number.
    Number(f64),
    /// A string that should contain a number.
    Text(String),
}

impl AmountInput {
    /// Parse the input into a finite number.
    ///
    /// # Errors
    /// Returns [Error::EmptyField] for blank text and [Error::AmountNotANumber]
    /// for text that is not a number or for infinite/NaN values.
    pub fn parse(&self) -> Result<f64, Error> {
        let number = match self {
            AmountInput::Number(number) => *number,
            AmountInput::Text(text) if text.trim().is_empty() => {
                return Err(Error::EmptyField("amount"));
            }
            AmountInput::Text(text) => text
                .trim()
                .parse::<f64>()
                .map_err(|_| Error::AmountNotANumber(text.clone()))?,
        };

        if number.is_finite() {
            Ok(number)
        } else {
            Err(Error::AmountNotANumber(number.to_string()))
        }
    }
}

impl From<f64> for AmountInput {
    fn from(value: f64) -> Self {
        AmountInput::Number(value)
    }
}

/// The fields a client sends to create or update an expense.
///
/// Every field is optional so that missing fields can be reported with a
/// useful message and so the same shape can be used for partial updates.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpenseInput {
    /// A text description of what the money was spent on.
    #[serde(default)]
    pub description: Option<String>,
    /// How much was spent.
    #[serde(default)]
    pub amount: Option<AmountInput>,
    /// The expense category.
    #[serde(default)]
    pub category: Option<String>,
    /// An optional email address to link the expense to.
    #[serde(default)]
    pub email: Option<String>,
}

/// A validated expense that has not been stored yet.
#[derive(Debug, Clone, PartialEq)]
pub struct NewExpense {
    pub description: String,
    pub amount: f64,
    pub category: String,
    pub email: Option<EmailAddress>,
}

/// The validated changes to apply to an existing expense.
///
/// `None` means "leave this field as it is".
#[derive(Debug, Default, Clone, PartialEq)]
pub struct ExpensePatch {
    pub description: Option<String>,
    pub amount: Option<f64>,
    pub category: Option<String>,
    pub email: Option<EmailAddress>,
}

impl ExpensePatch {
    /// Whether the patch would change nothing.
    pub fn is_empty(&self) -> bool {
        self.description.is_none()
            && self.amount.is_none()
            && self.category.is_none()
            && self.email.is_none()
    }
}

fn non_empty_text(field: &'static str, text: &str) -> Result<String, Error> {
    let text = text.trim();

    if text.is_empty() {
        Err(Error::EmptyField(field))
    } else {
        Ok(text.to_owned())
    }
}

/// The largest amount a single expense may have.
///
/// Summing any realistic number of expenses stays finite below this bound.
pub const MAX_AMOUNT: f64 = 1_000_000_000_000.0;

fn positive_amount(amount: &AmountInput) -> Result<f64, Error> {
    let amount = amount.parse()?;

    if amount <= 0.0 {
        Err(Error::NonPositiveAmount(amount))
    } else if amount > MAX_AMOUNT {
        Err(Error::AmountTooLarge(amount))
    } else {
        Ok(amount)
    }
}

impl ExpenseInput {
    /// Validate the input as a new expense, every field except email is required.
    ///
    /// # Errors
    /// Returns an [Error::EmptyField] if description, amount or category is
    /// missing or blank, an [Error::AmountNotANumber] or
    /// [Error::NonPositiveAmount] or [Error::AmountTooLarge] for a bad amount, or an
    /// [Error::InvalidEmail] if a non-blank email is malformed.
    pub fn into_new_expense(self) -> Result<NewExpense, Error> {
        let description = non_empty_text("description", self.description.as_deref().unwrap_or(""))?;
        let amount = positive_amount(
            self.amount
                .as_ref()
                .ok_or(Error::EmptyField("amount"))?,
        )?;
        let category = non_empty_text("category", self.category.as_deref().unwrap_or(""))?;
        let email = EmailAddress::parse_optional(self.email.as_deref())?;

        Ok(NewExpense {
            description,
            amount,
            category,
            email,
        })
    }

    /// Validate each supplied field as a change to an existing expense.
    ///
    /// A blank email is treated as not supplied.
    ///
    /// # Errors
    /// Returns the same errors as [ExpenseInput::into_new_expense], but only
    /// for the fields that were supplied.
    pub fn into_patch(self) -> Result<ExpensePatch, Error> {
        Ok(ExpensePatch {
            description: self
                .description
                .map(|description| non_empty_text("description", &description))
                .transpose()?,
            amount: self.amount.as_ref().map(positive_amount).transpose()?,
            category: self
                .category
                .map(|category| non_empty_text("category", &category))
                .transpose()?,
            email: EmailAddress::parse_optional(self.email.as_deref())?,
        })
    }
}


#[cfg(test)]
mod amount_input_tests {
    use crate::{Error, expense::AmountInput};

    #[test]
    fn parses_number() {
        assert_eq!(AmountInput::Number(4.5).parse(), Ok(4.5));
    }

    #[test]
    fn parses_numeric_text() {
        assert_eq!(AmountInput::Text(" 12.30 ".to_owned()).parse(), Ok(12.3));
    }

    #[test]
    fn rejects_non_numeric_text() {
        let result = AmountInput::Text("twelve".to_owned()).parse();

        assert_eq!(result, Err(Error::AmountNotANumber("twelve".to_owned())));
    }

    #[test]
    fn rejects_infinity() {
        let result = AmountInput::Text("inf".to_owned()).parse();

        assert!(matches!(result, Err(Error::AmountNotANumber(_))));
    }

    #[test]
    fn blank_text_is_missing() {
        let result = AmountInput::Text("  ".to_owned()).parse();

        assert_eq!(result, Err(Error::EmptyField("amount")));
    }

    #[test]
    fn deserializes_number_and_string() {
        let number: AmountInput = serde_json::from_str("4.5").unwrap();
        let text: AmountInput = serde_json::from_str("\"4.5\"").unwrap();

        assert_eq!(number, AmountInput::Number(4.5));
        assert_eq!(text, AmountInput::Text("4.5".to_owned()));
    }
}

#[cfg(test)]
mod expense_input_tests {
    use crate::{
        Error,
        email::EmailAddress,
        expense::{AmountInput, ExpenseInput, ExpensePatch, MAX_AMOUNT, NewExpense},
    };

    fn coffee() -> ExpenseInput {
        ExpenseInput {
            description: Some("Coffee".to_owned()),
            amount: Some(4.5.into()),
            category: Some("Food".to_owned()),
            email: None,
        }
    }

    #[test]
    fn valid_input_creates_new_expense() {
        let got = coffee().into_new_expense();

        assert_eq!(
            got,
            Ok(NewExpense {
                description: "Coffee".to_owned(),
                amount: 4.5,
                category: "Food".to_owned(),
                email: None,
            })
        );
    }

    #[test]
    fn missing_description_is_rejected() {
        let input = ExpenseInput {
            description: None,
            ..coffee()
        };

        assert_eq!(input.into_new_expense(), Err(Error::EmptyField("description")));
    }

    #[test]
    fn blank_category_is_rejected() {
        let input = ExpenseInput {
            category: Some(" \t".to_owned()),
            ..coffee()
        };

        assert_eq!(input.into_new_expense(), Err(Error::EmptyField("category")));
    }

    #[test]
    fn missing_amount_is_rejected() {
        let input = ExpenseInput {
            amount: None,
            ..coffee()
        };

        assert_eq!(input.into_new_expense(), Err(Error::EmptyField("amount")));
    }

    #[test]
    fn zero_amount_is_rejected() {
        let input = ExpenseInput {
            amount: Some(0.0.into()),
            ..coffee()
        };

        assert_eq!(input.into_new_expense(), Err(Error::NonPositiveAmount(0.0)));
    }

    #[test]
    fn negative_text_amount_is_rejected() {
        let input = ExpenseInput {
            amount: Some(AmountInput::Text("-3".to_owned())),
            ..coffee()
        };

        assert_eq!(input.into_new_expense(), Err(Error::NonPositiveAmount(-3.0)));
    }

    #[test]
    fn amount_over_maximum_is_rejected() {
        let input = ExpenseInput {
            amount: Some(1e308.into()),
            ..coffee()
        };

        assert_eq!(input.into_new_expense(), Err(Error::AmountTooLarge(1e308)));
    }

    #[test]
    fn maximum_amount_is_accepted() {
        let input = ExpenseInput {
            amount: Some(MAX_AMOUNT.into()),
            ..coffee()
        };

        assert_eq!(input.into_new_expense().map(|expense| expense.amount), Ok(MAX_AMOUNT));
    }

    #[test]
    fn invalid_email_is_rejected() {
        let input = ExpenseInput {
            email: Some("nope".to_owned()),
            ..coffee()
        };

        assert_eq!(
            input.into_new_expense(),
            Err(Error::InvalidEmail("nope".to_owned()))
        );
    }

    #[test]
    fn patch_only_contains_supplied_fields() {
        let input = ExpenseInput {
            amount: Some(AmountInput::Text("7".to_owned())),
            email: Some("me@example.com".to_owned()),
            ..Default::default()
        };

        let patch = input.into_patch();

        assert_eq!(
            patch,
            Ok(ExpensePatch {
                description: None,
                amount: Some(7.0),
                category: None,
                email: Some(EmailAddress::new_unchecked("me@example.com")),
            })
        );
    }

    #[test]
    fn patch_rejects_blank_description() {
        let input = ExpenseInput {
            description: Some(String::new()),
            ..Default::default()
        };

        assert_eq!(input.into_patch(), Err(Error::EmptyField("description")));
    }

    #[test]
    fn empty_input_is_empty_patch() {
        let patch = ExpenseInput::default().into_patch().unwrap();

        assert!(patch.is_empty());
    }
}
