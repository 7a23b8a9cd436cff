//! Repository layer: SQL for each entity plus the schema-driven engines.
//!
//! # Responsibility
//! - Keep SQLite statements inside the persistence boundary.
//! - Enforce uniqueness and delete policy from `model::schema`, uniformly
//!   for every kind.
//!
//! # Invariants
//! - Write paths validate and check uniqueness before the first SQL
//!   mutation.
//! - Read paths reject undecodable rows instead of masking them.
//! - Repositories never open transactions; the store hands them one.

pub(crate) mod cascade;
pub(crate) mod named_repo;
pub(crate) mod recipe_repo;
pub(crate) mod unique;

use crate::error::{StoreError, StoreResult};
use crate::model::schema::EntityKind;
use rusqlite::Connection;
use uuid::Uuid;

/// SQL expression for "now" in epoch milliseconds.
pub(crate) const NOW_MS_SQL: &str = "(strftime('%s', 'now') * 1000)";

pub(crate) fn parse_uuid(value: &str, column: &str) -> StoreResult<Uuid> {
    Uuid::parse_str(value)
        .map_err(|_| StoreError::InvalidData(format!("invalid uuid value `{value}` in {column}")))
}

pub(crate) fn row_exists(conn: &Connection, kind: EntityKind, id: Uuid) -> StoreResult<bool> {
    let exists: i64 = conn.query_row(
        &format!(
            "SELECT EXISTS(SELECT 1 FROM {} WHERE uuid = ?1);",
            kind.schema().table
        ),
        [id.to_string()],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}

pub(crate) fn require_exists(conn: &Connection, kind: EntityKind, id: Uuid) -> StoreResult<()> {
    if !row_exists(conn, kind, id)? {
        return Err(StoreError::not_found(kind, id));
    }
    Ok(())
}

pub(crate) fn count_rows(conn: &Connection, kind: EntityKind) -> StoreResult<u64> {
    let count: i64 = conn.query_row(
        &format!("SELECT COUNT(*) FROM {};", kind.schema().table),
        [],
        |row| row.get(0),
    )?;
    u64::try_from(count).map_err(|_| StoreError::InvalidData(format!("negative row count {count}")))
}
