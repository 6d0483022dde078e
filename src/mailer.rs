//! Emailing expense summaries.
//!
//! Saving a total for an email address sends the owner a summary of the
//! total and the expenses linked to that address. The rest of the app only
//! depends on the [Mailer] trait, so the transport can be swapped out, e.g.
//! for [DisabledMailer] when no SMTP server is configured.

use std::fmt::Debug;

use futures_util::future::BoxFuture;
use lettre::{
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
    message::{Mailbox, MultiPart},
    transport::smtp::authentication::Credentials,
};
use maud::html;

use crate::{Error, email::EmailAddress, expense::Expense};

/// One line of an expense summary.
#[derive(Debug, Clone, PartialEq)]
pub struct SummaryItem {
    /// What the money was spent on.
    pub description: String,
    /// How much was spent.
    pub amount: f64,
}

/// The content of a summary email.
#[derive(Debug, Clone, PartialEq)]
pub struct ExpenseSummary {
    /// Who the summary is sent to.
    pub recipient: EmailAddress,
    /// The saved total.
    pub total: f64,
    /// The expenses linked to the recipient at the time the total was saved.
    pub items: Vec<SummaryItem>,
}

impl ExpenseSummary {
    /// Create a summary for `recipient` listing `expenses`.
    pub fn new(recipient: EmailAddress, total: f64, expenses: &[Expense]) -> Self {
        Self {
            recipient,
            total,
            items: expenses
                .iter()
                .map(|expense| SummaryItem {
                    description: expense.description.clone(),
                    amount: expense.amount,
                })
                .collect(),
        }
    }

    /// The email subject line.
    pub fn subject(&self) -> String {
        format!("Your Expense Summary - Total: ${:.2}", self.total)
    }

    /// The plain text body.
    pub fn text_body(&self) -> String {
        let lines = self
            .items
            .iter()
            .map(|item| format!("{} - ${:.2}", item.description, item.amount))
            .collect::<Vec<_>>()
            .join("\n");

        format!("Your Expense Summary\nTotal: ${:.2}\n\n{lines}", self.total)
    }

    /// The HTML body, descriptions are escaped.
    pub fn html_body(&self) -> String {
        html!(
            h1 { "Your Expense Summary" }
            p { "Total: $" (format!("{:.2}", self.total)) }
            ul
            {
                @for item in &self.items {
                    li { (item.description) " - $" (format!("{:.2}", item.amount)) }
                }
            }
        )
        .into_string()
    }
}

/// Something that can deliver an [ExpenseSummary].
pub trait Mailer: Debug + Send + Sync {
    /// Send `summary` to its recipient.
    ///
    /// # Errors
    /// Returns an [Error::EmailError] if the message could not be delivered.
    fn send<'a>(&'a self, summary: &'a ExpenseSummary) -> BoxFuture<'a, Result<(), Error>>;
}

/// The settings for sending email through an SMTP server.
#[derive(Debug, Clone, PartialEq)]
pub struct SmtpConfig {
    /// The SMTP server host name.
    pub host: String,
    /// The SMTP server port. Port 465 uses implicit TLS, other ports use STARTTLS.
    pub port: u16,
    /// The user name to authenticate with, if the server requires it.
    pub username: Option<String>,
    /// The password to authenticate with.
    pub password: Option<String>,
    /// The sender, e.g. `Expense Tracker <no-reply@example.com>`.
    pub from: String,
}

/// Sends summaries through an SMTP server.
pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
}

impl SmtpMailer {
    /// Create a mailer for the server described by `config`.
    ///
    /// No connection is made until the first email is sent.
    ///
    /// # Errors
    /// Returns an [Error::EmailError] if the sender address is invalid or the
    /// TLS settings for `host` cannot be created.
    pub fn new(config: &SmtpConfig) -> Result<Self, Error> {
        let from = config
            .from
            .parse::<Mailbox>()
            .map_err(|error| Error::EmailError(format!("invalid sender address: {error}")))?;

        let builder = if config.port == 465 {
            AsyncSmtpTransport::<Tokio1Executor>::relay(&config.host)
        } else {
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.host)
        }
        .map_err(|error| Error::EmailError(format!("could not configure SMTP relay: {error}")))?
        .port(config.port);

        let builder = match (&config.username, &config.password) {
            (Some(username), Some(password)) => {
                builder.credentials(Credentials::new(username.clone(), password.clone()))
            }
            _ => builder,
        };

        Ok(Self {
            transport: builder.build(),
            from,
        })
    }
}

impl Debug for SmtpMailer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SmtpMailer")
            .field("from", &self.from.to_string())
            .finish_non_exhaustive()
    }
}

impl Mailer for SmtpMailer {
    fn send<'a>(&'a self, summary: &'a ExpenseSummary) -> BoxFuture<'a, Result<(), Error>> {
        Box::pin(async move {
            let to = summary
                .recipient
                .as_ref()
                .parse::<Mailbox>()
                .map_err(|error| Error::EmailError(format!("invalid recipient: {error}")))?;

            let message = Message::builder()
                .from(self.from.clone())
                .to(to)
                .subject(summary.subject())
                .multipart(MultiPart::alternative_plain_html(
                    summary.text_body(),
                    summary.html_body(),
                ))
                .map_err(|error| Error::EmailError(format!("could not build email: {error}")))?;

            self.transport
                .send(message)
                .await
                .map_err(|error| Error::EmailError(error.to_string()))?;

            tracing::info!("Sent expense summary to {}", summary.recipient);

            Ok(())
        })
    }
}

/// The mailer used when no SMTP server is configured, every send fails.
#[derive(Debug, Default, Clone)]
pub struct DisabledMailer;

impl Mailer for DisabledMailer {
    fn send<'a>(&'a self, summary: &'a ExpenseSummary) -> BoxFuture<'a, Result<(), Error>> {
        Box::pin(async move {
            tracing::warn!(
                "Not sending expense summary to {}, no SMTP server is configured",
                summary.recipient
            );

            Err(Error::EmailError("email is not configured".to_owned()))
        })
    }
}
