//! Delete engine interpreting `model::schema::RELATIONSHIPS`.
//!
//! # Invariants
//! - `Deny` rules are checked before any row is touched.
//! - `Cascade` recurses through the same engine, so owned children apply
//!   their own inbound rules.
//! - Runs inside the caller's transaction; an error leaves the caller to
//!   roll back everything done so far.

use crate::error::{StoreError, StoreResult};
use crate::model::schema::{inbound_relationships, DeleteRule, EntityKind};
use crate::repo::{parse_uuid, require_exists, NOW_MS_SQL};
use crate::store::change_feed::ChangeSet;
use log::debug;
use rusqlite::Connection;
use uuid::Uuid;

/// Deletes one entity and applies every inbound relationship policy.
pub(crate) fn delete_entity(
    conn: &Connection,
    kind: EntityKind,
    id: Uuid,
    changes: &mut ChangeSet,
) -> StoreResult<()> {
    require_exists(conn, kind, id)?;
    let id_text = id.to_string();

    for relationship in inbound_relationships(kind) {
        let owner_table = relationship.owner.schema().table;
        let column = relationship.column;

        match relationship.on_delete {
            DeleteRule::Deny => {
                let count: i64 = conn.query_row(
                    &format!("SELECT COUNT(*) FROM {owner_table} WHERE {column} = ?1;"),
                    [id_text.as_str()],
                    |row| row.get(0),
                )?;
                if count > 0 {
                    return Err(StoreError::InUse {
                        kind,
                        id,
                        referenced_by: relationship.owner,
                        count: count as usize,
                    });
                }
            }
            DeleteRule::Nullify => {
                let changed = conn.execute(
                    &format!(
                        "UPDATE {owner_table}
                         SET {column} = NULL,
                             updated_at = {NOW_MS_SQL}
                         WHERE {column} = ?1;"
                    ),
                    [id_text.as_str()],
                )?;
                debug!(
                    "event=cascade module=repo relationship={} rule=nullify affected={}",
                    relationship.name, changed
                );
                if changed > 0 {
                    changes.touch(relationship.owner);
                }
            }
            DeleteRule::Cascade => {
                let children = child_ids(conn, owner_table, column, &id_text)?;
                debug!(
                    "event=cascade module=repo relationship={} rule=cascade affected={}",
                    relationship.name,
                    children.len()
                );
                for child in children {
                    delete_entity(conn, relationship.owner, child, changes)?;
                }
            }
        }
    }

    conn.execute(
        &format!("DELETE FROM {} WHERE uuid = ?1;", kind.schema().table),
        [id_text.as_str()],
    )?;
    changes.touch(kind);
    Ok(())
}

fn child_ids(conn: &Connection, table: &str, column: &str, parent: &str) -> StoreResult<Vec<Uuid>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT uuid FROM {table} WHERE {column} = ?1 ORDER BY uuid ASC;"
    ))?;
    let mut rows = stmt.query([parent])?;
    let mut ids = Vec::new();
    while let Some(row) = rows.next()? {
        let value: String = row.get(0)?;
        ids.push(parse_uuid(&value, &format!("{table}.uuid"))?);
    }
    Ok(ids)
}
