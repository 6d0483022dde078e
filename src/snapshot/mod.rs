//! Saved totals: a point-in-time copy of the expense total and the expenses
//! behind it, stored for an email address or an opaque token.

mod db;
mod domain;
mod retrieve_endpoint;
mod save_endpoint;
mod state;

pub use db::{create_snapshot_table, get_snapshot, get_snapshot_by_owner, upsert_snapshot};
pub use domain::{
    SaveTotalRequest, SnapshotId, SnapshotOwner, TotalSnapshot, parse_total, validate_total,
};
pub use retrieve_endpoint::{get_total_endpoint, previous_expenses, retrieve_endpoint};
pub use save_endpoint::{save_total, save_total_endpoint};
pub use state::SnapshotState;
