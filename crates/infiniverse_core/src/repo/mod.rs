//! Repository contracts and SQLite implementations for registry tables.
//!
//! # Responsibility
//! - Keep SQL for `lands`, `deposits`, `polys` and `persistents` inside
//!   the persistence boundary.
//! - Decode rows into validated model values.
//!
//! # Invariants
//! - Repositories never open transactions; callers hand in a connection or
//!   transaction and own commit/rollback.
//! - Read paths reject invalid persisted state instead of masking it.

use crate::error::{RegistryError, RegistryResult};
use crate::model::account::AccountName;
use rusqlite::Connection;

pub mod catalog_repo;
pub mod deposit_repo;
pub mod land_repo;
pub mod placement_repo;

/// Next free primary key: one past the current maximum, `0` when empty.
///
/// `table` must be a trusted identifier, never caller input.
fn available_primary_key(conn: &Connection, table: &'static str) -> RegistryResult<u64> {
    let next: i64 = conn.query_row(
        &format!("SELECT COALESCE(MAX(id) + 1, 0) FROM {table};"),
        [],
        |row| row.get(0),
    )?;
    u64::try_from(next)
        .map_err(|_| RegistryError::InvalidData(format!("negative id in {table}.id")))
}

fn parse_account(value: String, column: &'static str) -> RegistryResult<AccountName> {
    AccountName::new(value.as_str()).map_err(|_| {
        RegistryError::InvalidData(format!("invalid account `{value}` in {column}"))
    })
}
