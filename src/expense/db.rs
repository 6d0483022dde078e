//! Database operations for expenses.

use rusqlite::{Connection, Row, params};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::{
    Error,
    expense::{Expense, ExpenseId, ExpensePatch, NewExpense},
    pagination::PageRange,
};

const EXPENSE_COLUMNS: &str = "id, description, amount, category, email, date";

/// Store a new expense with a freshly generated ID and the given `date`.
///
/// # Errors
/// Returns an [Error::SqlError] if the insert fails.
pub fn create_expense(
    expense: NewExpense,
    date: OffsetDateTime,
    connection: &Connection,
) -> Result<Expense, Error> {
    let id = Uuid::new_v4();

    connection
        .prepare(&format!(
            "INSERT INTO expense (id, description, amount, category, email, date)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)
             RETURNING {EXPENSE_COLUMNS}"
        ))?
        .query_row(
            params![
                id,
                expense.description,
                expense.amount,
                expense.category,
                expense.email.as_ref().map(|email| email.as_ref()),
                date,
            ],
            map_expense_row,
        )
        .map_err(Error::from)
}

/// Retrieve a single expense by its `id`.
///
/// # Errors
/// Returns an [Error::NotFound] if no expense has the ID.
pub fn get_expense(id: ExpenseId, connection: &Connection) -> Result<Expense, Error> {
    connection
        .prepare(&format!(
            "SELECT {EXPENSE_COLUMNS} FROM expense WHERE id = :id"
        ))?
        .query_row(&[(":id", &id)], map_expense_row)
        .map_err(Error::from)
}

/// Retrieve expenses newest first, optionally restricted to one page.
pub fn get_expenses(page: Option<PageRange>, connection: &Connection) -> Result<Vec<Expense>, Error> {
    // SQLite treats a negative limit as no limit.
    let (limit, offset) = match page {
        Some(page) => (page.limit, page.offset),
        None => (-1, 0),
    };

    connection
        .prepare(&format!(
            "SELECT {EXPENSE_COLUMNS} FROM expense
             ORDER BY date DESC, rowid DESC
             LIMIT ?1 OFFSET ?2"
        ))?
        .query_map((limit, offset), map_expense_row)?
        .map(|maybe_expense| maybe_expense.map_err(Error::from))
        .collect()
}

/// Retrieve the expenses with exactly the given `category`, newest first.
pub fn get_expenses_by_category(
    category: &str,
    connection: &Connection,
) -> Result<Vec<Expense>, Error> {
    connection
        .prepare(&format!(
            "SELECT {EXPENSE_COLUMNS} FROM expense
             WHERE category = ?1
             ORDER BY date DESC, rowid DESC"
        ))?
        .query_map([category], map_expense_row)?
        .map(|maybe_expense| maybe_expense.map_err(Error::from))
        .collect()
}

/// Retrieve the expenses linked to `email`, newest first.
pub fn get_expenses_by_email(email: &str, connection: &Connection) -> Result<Vec<Expense>, Error> {
    connection
        .prepare(&format!(
            "SELECT {EXPENSE_COLUMNS} FROM expense
             WHERE email = ?1
             ORDER BY date DESC, rowid DESC"
        ))?
        .query_map([email], map_expense_row)?
        .map(|maybe_expense| maybe_expense.map_err(Error::from))
        .collect()
}

/// Get the total number of expenses in the database.
pub fn count_expenses(connection: &Connection) -> Result<u32, Error> {
    connection
        .query_row("SELECT COUNT(*) FROM expense", [], |row| row.get(0))
        .map_err(Error::from)
}

/// Apply `patch` to the expense with `id` and return the updated expense.
///
/// Fields that are `None` in the patch keep their current value. The date is never changed.
///
/// # Errors
/// Returns an [Error::UpdateMissingExpense] if no expense has the ID.
pub fn update_expense(
    id: ExpenseId,
    patch: ExpensePatch,
    connection: &Connection,
) -> Result<Expense, Error> {
    if patch.is_empty() {
        return get_expense(id, connection).map_err(|error| match error {
            Error::NotFound => Error::UpdateMissingExpense,
            error => error,
        });
    }

    connection
        .prepare(&format!(
            "UPDATE expense SET
                description = COALESCE(?1, description),
                amount = COALESCE(?2, amount),
                category = COALESCE(?3, category),
                email = COALESCE(?4, email)
             WHERE id = ?5
             RETURNING {EXPENSE_COLUMNS}"
        ))?
        .query_row(
            params![
                patch.description,
                patch.amount,
                patch.category,
                patch.email.as_ref().map(|email| email.as_ref()),
                id,
            ],
            map_expense_row,
        )
        .map_err(|error| match error {
            rusqlite::Error::QueryReturnedNoRows => Error::UpdateMissingExpense,
            error => error.into(),
        })
}

/// Permanently delete the expense with `id`.
///
/// # Errors
/// Returns an [Error::DeleteMissingExpense] if no expense has the ID.
pub fn delete_expense(id: ExpenseId, connection: &Connection) -> Result<(), Error> {
    let rows_affected = connection.execute("DELETE FROM expense WHERE id = ?1", [id])?;

    if rows_affected == 0 {
        return Err(Error::DeleteMissingExpense);
    }

    Ok(())
}

/// Create the expense table and its indexes.
pub fn create_expense_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute_batch(
        "CREATE TABLE IF NOT EXISTS expense (
            id BLOB PRIMARY KEY NOT NULL,
            description TEXT NOT NULL,
            amount REAL NOT NULL CHECK (amount > 0),
            category TEXT NOT NULL,
            email TEXT,
            date TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_expense_date ON expense(date);
        CREATE INDEX IF NOT EXISTS idx_expense_category ON expense(category);
        CREATE INDEX IF NOT EXISTS idx_expense_email ON expense(email);",
    )?;

    Ok(())
}

/// Map a database row to an [Expense].
pub fn map_expense_row(row: &Row) -> Result<Expense, rusqlite::Error> {
    Ok(Expense {
        id: row.get(0)?,
        description: row.get(1)?,
        amount: row.get(2)?,
        category: row.get(3)?,
        email: row.get(4)?,
        date: row.get(5)?,
    })
}
