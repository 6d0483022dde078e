use axum::{
    extract::{Path, Query, State, rejection::QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::Form;
use maud::{Markup, html};
use serde::Deserialize;
use time::OffsetDateTime;

use crate::{
    Error,
    db::ConnectionPool,
    email::EmailAddress,
    endpoints::{self, format_endpoint},
    expense::{
        Expense, create_expense, delete_expense, get_expenses, parse_expense_id, total_expense,
    },
    html::{base, format_currency, format_date},
    snapshot::{SnapshotOwner, save_total},
    tracker::{
        TrackerState,
        error_page::error_page,
        form::{ExpenseForm, expense_form},
        previous_page::retrieve_form,
    },
};

/// The outcome of the last save, shown as a notice above the total.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SavedNotice {
    EmailSent,
    EmailFailed,
}

impl SavedNotice {
    fn query_value(self) -> &'static str {
        match self {
            SavedNotice::EmailSent => "email-sent",
            SavedNotice::EmailFailed => "email-failed",
        }
    }

    fn message(self) -> &'static str {
        match self {
            SavedNotice::EmailSent => "Expense summary saved and email sent successfully",
            SavedNotice::EmailFailed => "Expense saved but email failed to send",
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct ExpensesPageQuery {
    #[serde(default)]
    saved: Option<SavedNotice>,
}

#[derive(Debug, Default, Deserialize)]
pub struct SaveTotalForm {
    #[serde(default)]
    email: String,
}

/// Everything shown on the expenses page.
#[derive(Debug, Default)]
struct ExpensesPage<'a> {
    expenses: &'a [Expense],
    form: ExpenseForm,
    form_error: Option<&'a str>,
    save_email: &'a str,
    save_error: Option<&'a str>,
    notice: Option<SavedNotice>,
}

impl ExpensesPage<'_> {
    fn render(&self) -> Markup {
        let total = total_expense(self.expenses);

        let content = html! {
            h1 { "Expense Tracker" }

            section class="card"
            {
                h2 { "Total Expenses" }
                p class="total" id="total" { (format_currency(total)) }

                @if let Some(notice) = self.notice {
                    p class="notice" { (notice.message()) }
                }

                form method="post" action=(endpoints::SAVE_TOTAL_VIEW)
                {
                    label for="save-email" { "Email a summary to" }
                    input
                        type="email"
                        name="email"
                        id="save-email"
                        placeholder="you@example.com"
                        required
                        value=(self.save_email);

                    @if let Some(error_message) = self.save_error {
                        p class="error" { (error_message) }
                    }

                    button type="submit" { "Save Total" }
                }

                p { a href=(endpoints::EXPORT_EXPENSES_API) download="expenses.csv" { "Export to CSV" } }
            }

            section class="card"
            {
                h2 { "Previous Expenses" }
                (retrieve_form(""))
            }

            h2 { "Add Expense" }
            (expense_form(endpoints::EXPENSES_VIEW, &self.form, "Add Expense", self.form_error))

            section class="card"
            {
                h2 { "Expenses" }
                (expense_table(self.expenses))
            }
        };

        base("Expenses", &content)
    }
}

pub(super) fn expense_table(expenses: &[Expense]) -> Markup {
    html! {
        table
        {
            thead
            {
                tr
                {
                    th { "Description" }
                    th { "Amount" }
                    th { "Category" }
                    th { "Date" }
                    th { "Actions" }
                }
            }

            tbody
            {
                @for expense in expenses {
                    tr data-expense-id=(expense.id.to_string())
                    {
                        td { (expense.description) }
                        td { (format_currency(expense.amount)) }
                        td { span class="badge" { (expense.category) } }
                        td { (format_date(expense.date)) }
                        td
                        {
                            a href=(format_endpoint(endpoints::EDIT_EXPENSE_VIEW, expense.id)) { "Edit" }
                            " "
                            form
                                class="inline"
                                method="post"
                                action=(format_endpoint(endpoints::DELETE_EXPENSE_VIEW, expense.id))
                            {
                                button type="submit" { "Delete" }
                            }
                        }
                    }
                }

                @if expenses.is_empty() {
                    tr
                    {
                        td colspan="5" { "No expenses yet. Add one above." }
                    }
                }
            }
        }
    }
}

async fn load_expenses(pool: &ConnectionPool) -> Result<Vec<Expense>, Error> {
    let connection = pool.get().await?;

    get_expenses(None, &connection)
}

/// Display the expense table, the total and the forms for adding expenses and saving the total.
pub async fn get_expenses_page(
    State(state): State<TrackerState>,
    query: Result<Query<ExpensesPageQuery>, QueryRejection>,
) -> Response {
    let notice = query.map(|Query(query)| query.saved).unwrap_or_default();

    match load_expenses(&state.pool).await {
        Ok(expenses) => ExpensesPage {
            expenses: &expenses,
            notice,
            ..Default::default()
        }
        .render()
        .into_response(),
        Err(error) => error_page(error),
    }
}

/// Create an expense from the add form and go back to the list.
///
/// On a validation error the page is shown again with the submitted values and the error.
pub async fn post_create_expense(
    State(state): State<TrackerState>,
    Form(form): Form<ExpenseForm>,
) -> Response {
    let new_expense = match form.to_input().into_new_expense() {
        Ok(new_expense) => new_expense,
        Err(error) => {
            return match load_expenses(&state.pool).await {
                Ok(expenses) => (
                    StatusCode::BAD_REQUEST,
                    ExpensesPage {
                        expenses: &expenses,
                        form,
                        form_error: Some(error.summary()),
                        ..Default::default()
                    }
                    .render(),
                )
                    .into_response(),
                Err(error) => error_page(error),
            };
        }
    };

    let result = match state.pool.get().await {
        Ok(connection) => create_expense(new_expense, OffsetDateTime::now_utc(), &connection),
        Err(error) => Err(error),
    };

    match result {
        Ok(expense) => {
            tracing::info!("Created expense {} from the expense form", expense.id);
            Redirect::to(endpoints::EXPENSES_VIEW).into_response()
        }
        Err(error) => error_page(error),
    }
}

/// Delete an expense and go back to the list.
pub async fn post_delete_expense(
    State(state): State<TrackerState>,
    Path(expense_id): Path<String>,
) -> Response {
    let expense_id = match parse_expense_id(&expense_id) {
        Ok(expense_id) => expense_id,
        Err(error) => return error_page(error),
    };

    let result = match state.pool.get().await {
        Ok(connection) => delete_expense(expense_id, &connection),
        Err(error) => Err(error),
    };

    match result {
        Ok(()) => Redirect::to(endpoints::EXPENSES_VIEW).into_response(),
        Err(error) => error_page(error),
    }
}

/// Save the total of every expense for the submitted email and send them a summary.
pub async fn post_save_total(
    State(state): State<TrackerState>,
    Form(form): Form<SaveTotalForm>,
) -> Response {
    let expenses = match load_expenses(&state.pool).await {
        Ok(expenses) => expenses,
        Err(error) => return error_page(error),
    };

    let email = match EmailAddress::new(&form.email) {
        Ok(email) => email,
        Err(error) => {
            return (
                StatusCode::BAD_REQUEST,
                ExpensesPage {
                    expenses: &expenses,
                    save_email: &form.email,
                    save_error: Some(error.summary()),
                    ..Default::default()
                }
                .render(),
            )
                .into_response();
        }
    };

    let total = total_expense(&expenses);

    match save_total(SnapshotOwner::Email(email), total, &state.pool, state.mailer.as_ref()).await
    {
        Ok(outcome) => {
            let notice = if outcome.email_sent {
                SavedNotice::EmailSent
            } else {
                SavedNotice::EmailFailed
            };
            Redirect::to(&format!(
                "{}?saved={}",
                endpoints::EXPENSES_VIEW,
                notice.query_value()
            ))
            .into_response()
        }
        Err(error) => error_page(error),
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::{
        extract::{Path, Query, State},
        http::{StatusCode, header::LOCATION},
    };
    use axum_extra::extract::Form;
    use time::{Duration, macros::datetime};
    use uuid::Uuid;

    use crate::{
        db::ConnectionPool,
        email::EmailAddress,
        expense::{Expense, NewExpense, count_expenses, create_expense, get_expense},
        test_utils::{
            MockMailer, assert_valid_html, must_get_form, parse_html_document, select_texts,
        },
        tracker::{
            TrackerState,
            expenses_page::{ExpensesPageQuery, SaveTotalForm, SavedNotice},
            form::ExpenseForm,
            get_expenses_page, post_create_expense, post_delete_expense, post_save_total,
        },
    };

    async fn get_test_state(mailer: Arc<MockMailer>) -> (TrackerState, Vec<Expense>) {
        let state = TrackerState {
            pool: ConnectionPool::in_memory().expect("Could not create pool"),
            mailer,
        };
        let connection = state.pool.get().await.unwrap();
        let start = datetime!(2025-10-05 12:00 UTC);
        let expenses = [("Coffee", 4.5, "Food"), ("Lunch", 12.0, "Food")]
            .into_iter()
            .enumerate()
            .map(|(i, (description, amount, category))| {
                create_expense(
                    NewExpense {
                        description: description.to_owned(),
                        amount,
                        category: category.to_owned(),
                        email: Some(EmailAddress::new_unchecked("me@example.com")),
                    },
                    start + Duration::hours(i as i64),
                    &connection,
                )
                .unwrap()
            })
            .collect();
        drop(connection);

        (state, expenses)
    }

    fn location(response: &axum::response::Response) -> &str {
        response
            .headers()
            .get(LOCATION)
            .expect("location header missing")
            .to_str()
            .unwrap()
    }

    #[tokio::test]
    async fn empty_page_shows_placeholder_and_zero_total() {
        let state = TrackerState {
            pool: ConnectionPool::in_memory().unwrap(),
            mailer: Arc::new(MockMailer::default()),
        };

        let response = get_expenses_page(State(state), Ok(Query(ExpensesPageQuery::default()))).await;

        assert_eq!(response.status(), StatusCode::OK);
        let html = parse_html_document(response).await;
        assert_valid_html(&html);
        assert_eq!(select_texts(&html, "#total"), vec!["$0.00"]);
        assert_eq!(
            select_texts(&html, "tbody td"),
            vec!["No expenses yet. Add one above."]
        );
    }

    #[tokio::test]
    async fn page_lists_expenses_newest_first_with_total() {
        let (state, _) = get_test_state(Arc::new(MockMailer::default())).await;

        let response = get_expenses_page(State(state), Ok(Query(ExpensesPageQuery::default()))).await;

        let html = parse_html_document(response).await;
        assert_valid_html(&html);
        assert_eq!(select_texts(&html, "#total"), vec!["$16.50"]);
        assert_eq!(
            select_texts(&html, "tbody tr td:first-child"),
            vec!["Lunch", "Coffee"]
        );
        assert_eq!(select_texts(&html, "tbody .badge"), vec!["Food", "Food"]);
    }

    #[tokio::test]
    async fn page_shows_saved_notice() {
        let (state, _) = get_test_state(Arc::new(MockMailer::default())).await;
        let query = ExpensesPageQuery {
            saved: Some(SavedNotice::EmailFailed),
        };

        let response = get_expenses_page(State(state), Ok(Query(query))).await;

        let html = parse_html_document(response).await;
        assert_eq!(
            select_texts(&html, ".notice"),
            vec!["Expense saved but email failed to send"]
        );
    }

    #[tokio::test]
    async fn create_redirects_to_list() {
        let (state, _) = get_test_state(Arc::new(MockMailer::default())).await;
        let form = ExpenseForm {
            description: "Bus".to_owned(),
            amount: "2.50".to_owned(),
            category: "Transport".to_owned(),
            email: String::new(),
        };

        let response = post_create_expense(State(state.clone()), Form(form)).await;

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&response), "/expenses");
        let connection = state.pool.get().await.unwrap();
        assert_eq!(count_expenses(&connection), Ok(3));
    }

    #[tokio::test]
    async fn invalid_create_shows_error_and_keeps_values() {
        let (state, _) = get_test_state(Arc::new(MockMailer::default())).await;
        let form = ExpenseForm {
            description: "Bus".to_owned(),
            amount: "-2".to_owned(),
            category: "Transport".to_owned(),
            email: String::new(),
        };

        let response = post_create_expense(State(state.clone()), Form(form)).await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let html = parse_html_document(response).await;
        assert_eq!(
            select_texts(&html, "form[action=\"/expenses\"] .error"),
            vec!["Amount must be greater than zero"]
        );
        let description = html
            .select(&scraper::Selector::parse("#description").unwrap())
            .next()
            .unwrap();
        assert_eq!(description.value().attr("value"), Some("Bus"));
        let connection = state.pool.get().await.unwrap();
        assert_eq!(count_expenses(&connection), Ok(2));
    }

    #[tokio::test]
    async fn delete_redirects_and_missing_is_not_found() {
        let (state, expenses) = get_test_state(Arc::new(MockMailer::default())).await;
        let id = expenses[0].id;

        let first = post_delete_expense(State(state.clone()), Path(id.to_string())).await;
        let second = post_delete_expense(State(state.clone()), Path(id.to_string())).await;
        let unknown = post_delete_expense(State(state.clone()), Path(Uuid::new_v4().to_string())).await;

        assert_eq!(first.status(), StatusCode::SEE_OTHER);
        assert_eq!(second.status(), StatusCode::NOT_FOUND);
        assert_eq!(unknown.status(), StatusCode::NOT_FOUND);
        let connection = state.pool.get().await.unwrap();
        assert!(get_expense(id, &connection).is_err());
    }

    #[tokio::test]
    async fn save_total_emails_summary_and_redirects() {
        let mailer = Arc::new(MockMailer::default());
        let (state, _) = get_test_state(mailer.clone()).await;

        let response = post_save_total(
            State(state),
            Form(SaveTotalForm {
                email: "me@example.com".to_owned(),
            }),
        )
        .await;

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&response), "/expenses?saved=email-sent");
        let sent = mailer.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].total, 16.5);
    }

    #[tokio::test]
    async fn save_total_reports_failed_email() {
        let (state, _) = get_test_state(Arc::new(MockMailer::failing())).await;

        let response = post_save_total(
            State(state),
            Form(SaveTotalForm {
                email: "me@example.com".to_owned(),
            }),
        )
        .await;

        assert_eq!(location(&response), "/expenses?saved=email-failed");
    }

    #[tokio::test]
    async fn save_total_rejects_invalid_email() {
        let mailer = Arc::new(MockMailer::default());
        let (state, _) = get_test_state(mailer.clone()).await;

        let response = post_save_total(
            State(state),
            Form(SaveTotalForm {
                email: "not an email".to_owned(),
            }),
        )
        .await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let html = parse_html_document(response).await;
        assert_eq!(
            select_texts(&html, "form[action=\"/expenses/save-total\"] .error"),
            vec!["Please provide a valid email address"]
        );
        assert!(mailer.sent().is_empty());
    }

    #[tokio::test]
    async fn page_has_previous_expenses_form() {
        let (state, _) = get_test_state(Arc::new(MockMailer::default())).await;

        let response = get_expenses_page(State(state), Ok(Query(ExpensesPageQuery::default()))).await;

        let html = parse_html_document(response).await;
        let form = must_get_form(&html, "/expenses/previous");
        assert_eq!(form.value().attr("method"), Some("get"));
        let email_input = form
            .select(&scraper::Selector::parse("input[name=email]").unwrap())
            .next()
            .expect("email input missing");
        assert_eq!(email_input.value().attr("type"), Some("email"));
    }
}
