//! Recipe store schema versions.
//!
//! # Responsibility
//! - List every schema step, oldest first, with its embedded SQL.
//! - Move a database forward to a target version in one transaction.
//!
//! # Invariants
//! - Step versions start at 1 and increase by exactly one.
//! - `PRAGMA user_version` always names the last step applied.
//! - A database stamped past [`latest_version`] is never touched.

use crate::db::{DbError, DbResult};
use log::{debug, info};
use rusqlite::Connection;

/// One forward-only schema step.
#[derive(Debug, Clone, Copy)]
struct SchemaStep {
    version: u32,
    label: &'static str,
    sql: &'static str,
}

const SCHEMA_STEPS: &[SchemaStep] = &[
    SchemaStep {
        version: 1,
        label: "init",
        sql: include_str!("0001_init.sql"),
    },
    SchemaStep {
        version: 2,
        label: "sort_indexes",
        sql: include_str!("0002_sort_indexes.sql"),
    },
];

/// Newest schema version this build can write.
pub fn latest_version() -> u32 {
    SCHEMA_STEPS.last().map_or(0, |step| step.version)
}

/// Brings the database up to [`latest_version`].
pub fn apply_migrations(conn: &mut Connection) -> DbResult<()> {
    apply_migrations_to(conn, latest_version())
}

/// Brings the database up to `target_version` (capped at the latest).
///
/// Lets callers materialize an older schema, e.g. to exercise upgrades.
/// Already-newer databases are left alone; databases newer than this
/// build fail with [`DbError::UnsupportedSchemaVersion`].
pub fn apply_migrations_to(conn: &mut Connection, target_version: u32) -> DbResult<()> {
    let from_version = current_user_version(conn)?;
    let steps = pending_steps(from_version, target_version)?;
    let Some(last) = steps.last() else {
        return Ok(());
    };
    let to_version = last.version;

    let tx = conn.transaction()?;
    for step in steps {
        debug!(
            "event=db_migrate_step module=db version={} label={}",
            step.version, step.label
        );
        tx.execute_batch(step.sql)?;
    }
    tx.pragma_update(None, "user_version", to_version)?;
    tx.commit()?;

    info!(
        "event=db_migrate module=db status=ok from_version={} to_version={}",
        from_version, to_version
    );
    Ok(())
}

/// Reads the schema version stored in the database header.
pub fn current_user_version(conn: &Connection) -> DbResult<u32> {
    Ok(conn.pragma_query_value(None, "user_version", |row| row.get::<_, u32>(0))?)
}

/// Steps strictly after `from_version` up to `target_version`.
fn pending_steps(from_version: u32, target_version: u32) -> DbResult<&'static [SchemaStep]> {
    let latest = latest_version();
    if from_version > latest {
        return Err(DbError::UnsupportedSchemaVersion {
            db_version: from_version,
            latest_supported: latest,
        });
    }

    let target = target_version.min(latest);
    if from_version >= target {
        return Ok(&[]);
    }
    // Versions are dense and 1-based, so a version doubles as a slice end.
    Ok(&SCHEMA_STEPS[from_version as usize..target as usize])
}

#[cfg(test)]
mod tests {
    use super::{latest_version, pending_steps, SCHEMA_STEPS};
    use crate::db::DbError;

    #[test]
    fn step_versions_are_dense_from_one() {
        for (index, step) in SCHEMA_STEPS.iter().enumerate() {
            assert_eq!(step.version as usize, index + 1, "step {}", step.label);
        }
        assert_eq!(latest_version(), SCHEMA_STEPS.len() as u32);
    }

    #[test]
    fn pending_steps_cover_the_gap_only() {
        let versions = |from, to| {
            pending_steps(from, to)
                .unwrap()
                .iter()
                .map(|step| step.version)
                .collect::<Vec<_>>()
        };
        assert_eq!(versions(0, latest_version()), vec![1, 2]);
        assert_eq!(versions(0, 1), vec![1]);
        assert_eq!(versions(1, 99), vec![2]);
        assert!(versions(2, 1).is_empty());
    }

    #[test]
    fn newer_database_is_refused() {
        match pending_steps(latest_version() + 1, latest_version()) {
            Err(DbError::UnsupportedSchemaVersion {
                db_version,
                latest_supported,
            }) => {
                assert_eq!(db_version, latest_version() + 1);
                assert_eq!(latest_supported, latest_version());
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }
}
