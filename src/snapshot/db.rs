//! Database operations for saved totals.

use rusqlite::{Connection, OptionalExtension, Row, params, types::Type};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::{
    Error,
    expense::Expense,
    snapshot::{SnapshotId, SnapshotOwner, TotalSnapshot},
};

const SNAPSHOT_COLUMNS: &str = "id, owner_kind, owner, total, expenses, saved_at";

/// Save `total` and a copy of `expenses` for `owner`.
///
/// If the owner already has a saved total it is overwritten and keeps its ID.
///
/// # Errors
/// Returns an [Error::JSONSerializationError] if the expenses cannot be
/// encoded, or an [Error::SqlError] if the write fails.
pub fn upsert_snapshot(
    owner: &SnapshotOwner,
    total: f64,
    expenses: &[Expense],
    saved_at: OffsetDateTime,
    connection: &Connection,
) -> Result<TotalSnapshot, Error> {
    let expenses_json = serde_json::to_string(expenses)
        .map_err(|error| Error::JSONSerializationError(error.to_string()))?;

    connection
        .prepare(&format!(
            "INSERT INTO total_snapshot (id, owner_kind, owner, total, expenses, saved_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)
             ON CONFLICT (owner_kind, owner) DO UPDATE SET
                total = excluded.total,
                expenses = excluded.expenses,
                saved_at = excluded.saved_at
             RETURNING {SNAPSHOT_COLUMNS}"
        ))?
        .query_row(
            params![
                Uuid::new_v4(),
                owner.kind(),
                owner.value(),
                total,
                expenses_json,
                saved_at,
            ],
            map_snapshot_row,
        )
        .map_err(Error::from)
}

/// Retrieve a saved total by its `id`.
///
/// # Errors
/// Returns an [Error::SnapshotNotFound] if no saved total has the ID.
pub fn get_snapshot(id: SnapshotId, connection: &Connection) -> Result<TotalSnapshot, Error> {
    connection
        .prepare(&format!(
            "SELECT {SNAPSHOT_COLUMNS} FROM total_snapshot WHERE id = :id"
        ))?
        .query_row(&[(":id", &id)], map_snapshot_row)
        .map_err(|error| match error {
            rusqlite::Error::QueryReturnedNoRows => Error::SnapshotNotFound,
            error => error.into(),
        })
}

/// Retrieve the saved total for `owner`, if there is one.
pub fn get_snapshot_by_owner(
    owner: &SnapshotOwner,
    connection: &Connection,
) -> Result<Option<TotalSnapshot>, Error> {
    connection
        .prepare(&format!(
            "SELECT {SNAPSHOT_COLUMNS} FROM total_snapshot
             WHERE owner_kind = ?1 AND owner = ?2"
        ))?
        .query_row((owner.kind(), owner.value()), map_snapshot_row)
        .optional()
        .map_err(Error::from)
}

/// Create the table for saved totals.
///
/// An owner can have at most one saved total.
pub fn create_snapshot_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS total_snapshot (
            id BLOB PRIMARY KEY NOT NULL,
            owner_kind TEXT NOT NULL CHECK (owner_kind IN ('email', 'token')),
            owner TEXT NOT NULL,
            total REAL NOT NULL CHECK (total >= 0),
            expenses TEXT NOT NULL,
            saved_at TEXT NOT NULL,
            UNIQUE(owner_kind, owner)
        )",
        (),
    )?;

    Ok(())
}

fn map_snapshot_row(row: &Row) -> Result<TotalSnapshot, rusqlite::Error> {
    let kind: String = row.get(1)?;
    let owner = SnapshotOwner::from_parts(&kind, row.get(2)?).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            1,
            Type::Text,
            format!("unknown owner kind \"{kind}\"").into(),
        )
    })?;

    let expenses_json: String = row.get(4)?;
    let expenses = serde_json::from_str(&expenses_json).map_err(|error| {
        rusqlite::Error::FromSqlConversionFailure(4, Type::Text, Box::new(error))
    })?;

    Ok(TotalSnapshot {
        id: row.get(0)?,
        owner,
        total: row.get(3)?,
        expenses,
        saved_at: row.get(5)?,
    })
}
