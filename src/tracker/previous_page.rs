use axum::{
    extract::{Query, State, rejection::QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use serde::Deserialize;

use crate::{
    Error,
    db::ConnectionPool,
    email::EmailAddress,
    endpoints,
    expense::Expense,
    html::{base, format_currency},
    snapshot::previous_expenses,
    tracker::{TrackerState, error_page::error_page, expenses_page::expense_table},
};

#[derive(Debug, Default, Deserialize)]
pub struct PreviousExpensesQuery {
    #[serde(default)]
    email: String,
}

/// The form for looking up the expenses saved for an email address.
pub(super) fn retrieve_form(email: &str) -> Markup {
    html! {
        form method="get" action=(endpoints::PREVIOUS_EXPENSES_VIEW)
        {
            label for="retrieve-email" { "Show expenses for" }
            input
                type="email"
                name="email"
                id="retrieve-email"
                placeholder="you@example.com"
                required
                value=(email);

            button type="submit" { "Retrieve Previous Expenses" }
        }
    }
}

fn previous_page(email: &str, found: Option<(&[Expense], f64)>, error: Option<&str>) -> Markup {
    let content = html! {
        h1 { "Previous Expenses" }

        section class="card"
        {
            (retrieve_form(email))

            @if let Some(error_message) = error {
                p class="error" { (error_message) }
            }

            p { a href=(endpoints::EXPENSES_VIEW) { "Back to all expenses" } }
        }

        @if let Some((expenses, saved_total)) = found {
            section class="card"
            {
                h2 { "Saved Total" }
                p class="total" id="saved-total" { (format_currency(saved_total)) }
            }

            section class="card"
            {
                h2 { "Expenses for " (email) }
                (expense_table(expenses))
            }
        }
    };

    base("Previous Expenses", &content)
}

async fn load_previous_expenses(
    email: EmailAddress,
    pool: &ConnectionPool,
) -> Result<(Vec<Expense>, f64), Error> {
    let connection = pool.get().await?;

    previous_expenses(email, &connection)
}

/// Display the expenses linked to an email address and the total last saved for it.
pub async fn get_previous_expenses_page(
    State(state): State<TrackerState>,
    query: Result<Query<PreviousExpensesQuery>, QueryRejection>,
) -> Response {
    let raw_email = query.map(|Query(query)| query.email).unwrap_or_default();

    let email = match EmailAddress::new(&raw_email) {
        Ok(email) => email,
        Err(error) => {
            return (
                StatusCode::BAD_REQUEST,
                previous_page(&raw_email, None, Some(error.summary())),
            )
                .into_response();
        }
    };

    match load_previous_expenses(email.clone(), &state.pool).await {
        Ok((expenses, saved_total)) => {
            previous_page(email.as_ref(), Some((expenses.as_slice(), saved_total)), None)
                .into_response()
        }
        Err(error) => error_page(error),
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::{
        extract::{Query, State},
        http::StatusCode,
    };
    use time::macros::datetime;

    use crate::{
        db::ConnectionPool,
        email::EmailAddress,
        expense::{NewExpense, create_expense},
        snapshot::{SnapshotOwner, upsert_snapshot},
        test_utils::{MockMailer, assert_valid_html, parse_html_document, select_texts},
        tracker::{
            TrackerState, get_previous_expenses_page, previous_page::PreviousExpensesQuery,
        },
    };

    async fn get_test_state() -> TrackerState {
        let state = TrackerState {
            pool: ConnectionPool::in_memory().expect("Could not create pool"),
            mailer: Arc::new(MockMailer::default()),
        };
        let connection = state.pool.get().await.unwrap();
        for (description, amount, email) in [
            ("Coffee", 4.5, Some("me@example.com")),
            ("Bus", 2.5, Some("someone@example.com")),
            ("Snack", 3.0, None),
        ] {
            create_expense(
                NewExpense {
                    description: description.to_owned(),
                    amount,
                    category: "Other".to_owned(),
                    email: email.map(EmailAddress::new_unchecked),
                },
                datetime!(2025-10-05 12:00 UTC),
                &connection,
            )
            .unwrap();
        }
        drop(connection);

        state
    }

    fn query(email: &str) -> Query<PreviousExpensesQuery> {
        Query(PreviousExpensesQuery {
            email: email.to_owned(),
        })
    }

    #[tokio::test]
    async fn shows_expenses_and_saved_total_for_email() {
        let state = get_test_state().await;
        let connection = state.pool.get().await.unwrap();
        upsert_snapshot(
            &SnapshotOwner::Email(EmailAddress::new_unchecked("me@example.com")),
            42.0,
            &[],
            datetime!(2025-10-06 09:00 UTC),
            &connection,
        )
        .unwrap();
        drop(connection);

        let response = get_previous_expenses_page(State(state), Ok(query(" me@example.com "))).await;

        assert_eq!(response.status(), StatusCode::OK);
        let html = parse_html_document(response).await;
        assert_valid_html(&html);
        assert_eq!(select_texts(&html, "#saved-total"), vec!["$42.00"]);
        assert_eq!(select_texts(&html, "tbody tr td:first-child"), vec!["Coffee"]);
    }

    #[tokio::test]
    async fn email_without_saved_total_shows_zero() {
        let state = get_test_state().await;

        let response =
            get_previous_expenses_page(State(state), Ok(query("someone@example.com"))).await;

        let html = parse_html_document(response).await;
        assert_eq!(select_texts(&html, "#saved-total"), vec!["$0.00"]);
        assert_eq!(select_texts(&html, "tbody tr td:first-child"), vec!["Bus"]);
    }

    #[tokio::test]
    async fn invalid_email_shows_error() {
        let state = get_test_state().await;

        let response = get_previous_expenses_page(State(state), Ok(query("nope"))).await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let html = parse_html_document(response).await;
        assert_valid_html(&html);
        assert_eq!(
            select_texts(&html, ".error"),
            vec!["Please provide a valid email address"]
        );
        assert!(select_texts(&html, "#saved-total").is_empty());
    }
}
