use std::sync::Mutex;

use futures_util::future::BoxFuture;

use crate::{
    Error,
    mailer::{ExpenseSummary, Mailer},
};

/// Records the summaries it is asked to send instead of sending them.
#[derive(Debug, Default)]
pub(crate) struct MockMailer {
    sent: Mutex<Vec<ExpenseSummary>>,
    fail: bool,
}

impl MockMailer {
    /// A mailer whose every send fails.
    pub(crate) fn failing() -> Self {
        Self {
            sent: Mutex::default(),
            fail: true,
        }
    }

    /// The summaries sent so far.
    pub(crate) fn sent(&self) -> Vec<ExpenseSummary> {
        self.sent.lock().unwrap().clone()
    }
}

impl Mailer for MockMailer {
    fn send<'a>(&'a self, summary: &'a ExpenseSummary) -> BoxFuture<'a, Result<(), Error>> {
        Box::pin(async move {
            if self.fail {
                return Err(Error::EmailError("mock mailer always fails".to_owned()));
            }

            self.sent.lock().unwrap().push(summary.clone());
            Ok(())
        })
    }
}
