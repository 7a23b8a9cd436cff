//! The recipe store handle.
//!
//! # Responsibility
//! - Own the single SQLite connection for the process lifetime.
//! - Run every mutation as one `BEGIN IMMEDIATE` transaction and publish
//!   change notices after commit.
//! - Serve snapshot reads against the same connection.
//!
//! # Invariants
//! - Writers hold the connection lock for the whole transaction, cascade
//!   included, so no two mutations interleave.
//! - A failed mutation rolls back completely; readers never observe a
//!   partial write.
//! - At most one shared handle exists per process (`open_shared`).

pub mod change_feed;
mod mutation;
mod read;

use crate::db::{open_db, open_db_in_memory, DbError, DbResult};
use crate::error::StoreResult;
use crate::model::schema::EntityKind;
use change_feed::{ChangeFeed, ChangeNotice, ChangeSet};
use log::{error, info, warn};
use once_cell::sync::OnceCell;
use parking_lot::Mutex;
use rusqlite::{Connection, TransactionBehavior};
use std::path::{Path, PathBuf};
use std::sync::mpsc::Receiver;
use std::time::Instant;

/// File name used by [`RecipeStore::open_in_dir`].
pub const STORE_FILE_NAME: &str = "swiftbites.sqlite3";

static SHARED_STORE: OnceCell<RecipeStore> = OnceCell::new();

/// Handle to one recipe database.
pub struct RecipeStore {
    conn: Mutex<Connection>,
    feed: ChangeFeed,
    location: Option<PathBuf>,
}

impl RecipeStore {
    /// Opens or creates the store file at `path`, migrating it if needed.
    pub fn open(path: impl AsRef<Path>) -> DbResult<Self> {
        let path = path.as_ref();
        let conn = open_db(path)?;
        Ok(Self::from_connection(conn, Some(path.to_path_buf())))
    }

    /// Opens or creates [`STORE_FILE_NAME`] inside `dir`.
    pub fn open_in_dir(dir: impl AsRef<Path>) -> DbResult<Self> {
        Self::open(dir.as_ref().join(STORE_FILE_NAME))
    }

    pub fn open_in_memory() -> DbResult<Self> {
        let conn = open_db_in_memory()?;
        Ok(Self::from_connection(conn, None))
    }

    fn from_connection(conn: Connection, location: Option<PathBuf>) -> Self {
        Self {
            conn: Mutex::new(conn),
            feed: ChangeFeed::new(),
            location,
        }
    }

    /// Store file path; `None` for in-memory stores.
    pub fn location(&self) -> Option<&Path> {
        self.location.as_deref()
    }

    /// Watches `kinds` (all kinds when empty) for committed changes.
    pub fn subscribe(&self, kinds: &[EntityKind]) -> Receiver<ChangeNotice> {
        self.feed.subscribe(kinds)
    }

    /// Flushes and closes the connection.
    pub fn close(self) -> DbResult<()> {
        self.conn
            .into_inner()
            .close()
            .map_err(|(_, err)| DbError::Sqlite(err))?;
        info!("event=db_close module=store status=ok");
        Ok(())
    }

    /// Runs a read under the connection lock.
    pub(crate) fn read<T>(&self, op: impl FnOnce(&Connection) -> StoreResult<T>) -> StoreResult<T> {
        let conn = self.conn.lock();
        op(&conn)
    }

    /// Runs `op` as one immediate transaction and publishes its changes.
    ///
    /// Any error drops the transaction, which rolls it back. Publishing
    /// happens after commit but before the connection lock is released.
    pub(crate) fn write<T>(
        &self,
        name: &'static str,
        op: impl FnOnce(&Connection, &mut ChangeSet) -> StoreResult<T>,
    ) -> StoreResult<T> {
        let started_at = Instant::now();
        let mut changes = ChangeSet::default();

        let (result, sequence) = {
            let mut conn = self.conn.lock();
            let result = Self::run_transaction(&mut conn, &mut changes, op);
            // Sequence numbers follow commit order only while the lock is held.
            let sequence = match &result {
                Ok(_) => self.feed.publish(&changes),
                Err(_) => None,
            };
            (result, sequence)
        };

        match &result {
            Ok(_) => {
                info!(
                    "event=store_write module=store op={} status=ok duration_ms={} sequence={}",
                    name,
                    started_at.elapsed().as_millis(),
                    sequence.map_or_else(|| "none".to_string(), |value| value.to_string())
                );
            }
            Err(err) if err.is_recoverable() => {
                warn!(
                    "event=store_write module=store op={} status=rejected duration_ms={} error_code={}",
                    name,
                    started_at.elapsed().as_millis(),
                    err.code()
                );
            }
            Err(err) => {
                error!(
                    "event=store_write module=store op={} status=error duration_ms={} error_code={} error={}",
                    name,
                    started_at.elapsed().as_millis(),
                    err.code(),
                    err
                );
            }
        }
        result
    }

    fn run_transaction<T>(
        conn: &mut Connection,
        changes: &mut ChangeSet,
        op: impl FnOnce(&Connection, &mut ChangeSet) -> StoreResult<T>,
    ) -> StoreResult<T> {
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        let value = op(&tx, changes)?;
        tx.commit()?;
        Ok(value)
    }
}

/// Opens the process-wide store, or returns it if already open at `path`.
///
/// A second call with a different path is rejected; the first handle
/// stays active for the life of the process.
pub fn open_shared(path: impl AsRef<Path>) -> DbResult<&'static RecipeStore> {
    let requested = path.as_ref().to_path_buf();
    let store = SHARED_STORE.get_or_try_init(|| RecipeStore::open(&requested))?;

    match store.location() {
        Some(active) if active == requested.as_path() => Ok(store),
        active => Err(DbError::AlreadyOpen {
            active: active.map_or_else(|| PathBuf::from(":memory:"), Path::to_path_buf),
            requested,
        }),
    }
}

/// Returns the process-wide store if [`open_shared`] succeeded.
pub fn shared() -> Option<&'static RecipeStore> {
    SHARED_STORE.get()
}

#[cfg(test)]
mod tests {
    use super::{open_shared, shared, RecipeStore, STORE_FILE_NAME};
    use crate::db::DbError;

    #[test]
    fn open_in_dir_creates_missing_directories() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("app").join("data");

        let store = RecipeStore::open_in_dir(&nested).unwrap();
        assert_eq!(store.location(), Some(nested.join(STORE_FILE_NAME).as_path()));
        store.close().unwrap();
        assert!(nested.join(STORE_FILE_NAME).exists());
    }

    #[test]
    fn shared_store_is_idempotent_and_rejects_other_locations() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("shared.sqlite3");
        let other = dir.path().join("other.sqlite3");

        let first = open_shared(&path).unwrap();
        let second = open_shared(&path).unwrap();
        assert!(std::ptr::eq(first, second));
        assert!(std::ptr::eq(shared().unwrap(), first));

        match open_shared(&other) {
            Err(DbError::AlreadyOpen { active, requested }) => {
                assert_eq!(active, path);
                assert_eq!(requested, other);
            }
            Err(err) => panic!("unexpected error: {err}"),
            Ok(_) => panic!("second location must be rejected"),
        }
    }
}
