//! Server configuration read from command line arguments and environment variables.

use std::{net::IpAddr, path::PathBuf};

use clap::Parser;

use crate::{db::DEFAULT_POOL_SIZE, mailer::SmtpConfig, pagination::PaginationConfig};

/// The web server for the expense tracker.
///
/// Every option can also be set with the environment variable shown in its help text.
#[derive(Parser, Debug, Clone, PartialEq)]
#[command(version, about, long_about = None)]
pub struct Config {
    /// File path to the application SQLite database.
    #[arg(long, env = "DB_PATH", default_value = "expenses.db")]
    pub db_path: PathBuf,

    /// The address to listen on.
    #[arg(long, env = "HOST", default_value = "127.0.0.1")]
    pub host: IpAddr,

    /// The port to serve the app from.
    #[arg(short, long, env = "PORT", default_value_t = 5111)]
    pub port: u16,

    /// The number of database connections to keep open.
    #[arg(long, env = "DB_POOL_SIZE", default_value_t = DEFAULT_POOL_SIZE)]
    pub pool_size: usize,

    /// The SMTP server used to email summaries. Email is disabled if unset.
    #[arg(long, env = "SMTP_HOST")]
    pub smtp_host: Option<String>,

    /// The SMTP server port, 465 for implicit TLS or 587 for STARTTLS.
    #[arg(long, env = "SMTP_PORT", default_value_t = 587)]
    pub smtp_port: u16,

    /// The user name for the SMTP server.
    #[arg(long, env = "SMTP_USERNAME")]
    pub smtp_username: Option<String>,

    /// The password for the SMTP server.
    #[arg(long, env = "SMTP_PASSWORD", hide_env_values = true)]
    pub smtp_password: Option<String>,

    /// The sender of summary emails.
    #[arg(long, env = "MAIL_FROM", default_value = "Expense Tracker <no-reply@localhost>")]
    pub mail_from: String,

    /// The number of expenses per page when a page is requested without a limit.
    #[arg(long, env = "PAGE_SIZE", default_value_t = 20)]
    pub page_size: u64,

    /// The largest number of expenses a client can request per page.
    #[arg(long, env = "MAX_PAGE_SIZE", default_value_t = 100)]
    pub max_page_size: u64,
}

impl Config {
    /// The SMTP settings, or `None` when no SMTP host is configured.
    pub fn smtp_config(&self) -> Option<SmtpConfig> {
        let host = self
            .smtp_host
            .as_deref()
            .map(str::trim)
            .filter(|host| !host.is_empty())?;

        Some(SmtpConfig {
            host: host.to_owned(),
            port: self.smtp_port,
            username: self.smtp_username.clone(),
            password: self.smtp_password.clone(),
            from: self.mail_from.clone(),
        })
    }

    /// The paging settings for the expense list.
    pub fn pagination_config(&self) -> PaginationConfig {
        PaginationConfig {
            default_page_size: self.page_size,
            max_page_size: self.max_page_size.max(self.page_size),
        }
    }
}
