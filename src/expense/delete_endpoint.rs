use axum::{
    extract::{Path, State},
    http::StatusCode,
};

use crate::{
    Error,
    expense::{ExpenseState, delete_expense, parse_expense_id},
};

/// A route handler for deleting an expense, responds with `204 No Content`.
pub async fn delete_expense_endpoint(
    State(state): State<ExpenseState>,
    Path(expense_id): Path<String>,
) -> Result<StatusCode, Error> {
    let expense_id = parse_expense_id(&expense_id)?;
    let connection = state.pool.get().await?;

    delete_expense(expense_id, &connection)?;

    tracing::info!("Deleted expense {expense_id}");

    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use axum::{
        extract::{Path, State},
        http::StatusCode,
    };
    use time::macros::datetime;

    use crate::{
        Error,
        db::ConnectionPool,
        expense::{ExpenseState, NewExpense, create_expense, delete_expense_endpoint, get_expense},
        pagination::PaginationConfig,
    };

    #[tokio::test]
    async fn deletes_expense_once() {
        let state = ExpenseState {
            pool: ConnectionPool::in_memory().expect("Could not create pool"),
            pagination_config: PaginationConfig::default(),
        };
        let connection = state.pool.get().await.unwrap();
        let expense = create_expense(
            NewExpense {
                description: "Coffee".to_owned(),
                amount: 4.5,
                category: "Food".to_owned(),
                email: None,
            },
            datetime!(2025-10-05 08:00 UTC),
            &connection,
        )
        .unwrap();
        drop(connection);

        let first = delete_expense_endpoint(State(state.clone()), Path(expense.id.to_string())).await;
        let second =
            delete_expense_endpoint(State(state.clone()), Path(expense.id.to_string())).await;

        assert_eq!(first, Ok(StatusCode::NO_CONTENT));
        assert_eq!(second, Err(Error::DeleteMissingExpense));
        let connection = state.pool.get().await.unwrap();
        assert_eq!(get_expense(expense.id, &connection), Err(Error::NotFound));
    }

    #[tokio::test]
    async fn malformed_id_is_invalid() {
        let state = ExpenseState {
            pool: ConnectionPool::in_memory().expect("Could not create pool"),
            pagination_config: PaginationConfig::default(),
        };

        let result = delete_expense_endpoint(State(state), Path("abc".to_owned())).await;

        assert_eq!(result, Err(Error::InvalidId("abc".to_owned())));
    }
}
