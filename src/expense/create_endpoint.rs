use axum::{Json, extract::State, http::StatusCode};
use time::OffsetDateTime;

use crate::{
    Error,
    expense::{Expense, ExpenseInput, ExpenseState, create_expense},
    json::JsonBody,
};

/// A route handler for creating a new expense.
///
/// The server assigns the ID and the date. Responds with `201 Created` and the stored expense.
pub async fn create_expense_endpoint(
    State(state): State<ExpenseState>,
    JsonBody(input): JsonBody<ExpenseInput>,
) -> Result<(StatusCode, Json<Expense>), Error> {
    let new_expense = input.into_new_expense()?;
    let connection = state.pool.get().await?;

    let expense = create_expense(new_expense, OffsetDateTime::now_utc(), &connection)
        .inspect_err(|error| tracing::error!("Could not create expense: {error}"))?;

    tracing::info!("Created expense {}", expense.id);

    Ok((StatusCode::CREATED, Json(expense)))
}

#[cfg(test)]
mod tests {
    use axum::{extract::State, http::StatusCode};

    use crate::{
        Error,
        db::ConnectionPool,
        expense::{
            AmountInput, ExpenseInput, ExpenseState, create_expense_endpoint, get_expense,
        },
        json::JsonBody,
        pagination::PaginationConfig,
    };

    fn get_test_state() -> ExpenseState {
        ExpenseState {
            pool: ConnectionPool::in_memory().expect("Could not create pool"),
            pagination_config: PaginationConfig::default(),
        }
    }

    #[tokio::test]
    async fn creates_expense() {
        let state = get_test_state();
        let input = ExpenseInput {
            description: Some("Coffee".to_owned()),
            amount: Some(AmountInput::Text("4.50".to_owned())),
            category: Some("Food".to_owned()),
            email: Some("me@example.com".to_owned()),
        };

        let (status, axum::Json(expense)) =
            create_expense_endpoint(State(state.clone()), JsonBody(input))
                .await
                .expect("Could not create expense");

        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(expense.description, "Coffee");
        assert_eq!(expense.amount, 4.5);
        assert_eq!(expense.email.as_deref(), Some("me@example.com"));
        let connection = state.pool.get().await.unwrap();
        assert_eq!(get_expense(expense.id, &connection), Ok(expense));
    }

    #[tokio::test]
    async fn rejects_missing_fields_without_storing_anything() {
        let state = get_test_state();
        let input = ExpenseInput {
            description: Some("Coffee".to_owned()),
            ..Default::default()
        };

        let result = create_expense_endpoint(State(state.clone()), JsonBody(input)).await;

        assert_eq!(result.unwrap_err(), Error::EmptyField("amount"));
        let connection = state.pool.get().await.unwrap();
        assert_eq!(crate::expense::count_expenses(&connection), Ok(0));
    }
}
