//! Shared storage engine handle.
//!
//! # Responsibility
//! - Own the single migrated connection and serialize access to it.
//! - Run statements on the tokio blocking pool so callers only suspend.
//! - Bump a per-table change counter after every write that touched rows.
//!
//! # Invariants
//! - Cloning a [`Database`] shares the same connection and notifier.
//! - A table's counter only moves after the write has been committed.

use super::open::{open_db, open_db_in_memory};
use super::{DbError, DbResult};
use log::debug;
use rusqlite::Connection;
use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::watch;

/// Cheaply cloneable handle to the application database.
#[derive(Clone)]
pub struct Database {
    inner: Arc<Inner>,
}

struct Inner {
    conn: Mutex<Connection>,
    changes: Mutex<HashMap<&'static str, watch::Sender<u64>>>,
}

impl Database {
    /// Opens the database file at `path`, creating and migrating it if needed.
    pub fn open(path: impl AsRef<Path>) -> DbResult<Self> {
        Ok(Self::from_connection(open_db(path)?))
    }

    /// Opens a private in-memory database.
    pub fn open_in_memory() -> DbResult<Self> {
        Ok(Self::from_connection(open_db_in_memory()?))
    }

    fn from_connection(conn: Connection) -> Self {
        Self {
            inner: Arc::new(Inner {
                conn: Mutex::new(conn),
                changes: Mutex::new(HashMap::new()),
            }),
        }
    }

    /// Runs `f` against the connection on the calling thread.
    ///
    /// Meant for bootstrap checks; request paths use [`Database::read`] and
    /// [`Database::write`].
    pub fn with_connection<T, E, F>(&self, f: F) -> Result<T, E>
    where
        E: From<DbError>,
        F: FnOnce(&Connection) -> Result<T, E>,
    {
        let conn = self
            .inner
            .conn
            .lock()
            .map_err(|_| E::from(DbError::ConnectionPoisoned))?;
        f(&conn)
    }

    /// Runs a read-only closure on the blocking pool.
    pub async fn read<T, E, F>(&self, f: F) -> Result<T, E>
    where
        T: Send + 'static,
        E: From<DbError> + Send + 'static,
        F: FnOnce(&Connection) -> Result<T, E> + Send + 'static,
    {
        let db = self.clone();
        tokio::task::spawn_blocking(move || db.with_connection(f))
            .await
            .map_err(|err| E::from(DbError::Background(err.to_string())))?
    }

    /// Runs a mutating closure on the blocking pool.
    ///
    /// `f` returns the number of affected rows; subscribers of `table` are
    /// notified only when that number is non-zero.
    pub async fn write<E, F>(&self, table: &'static str, f: F) -> Result<usize, E>
    where
        E: From<DbError> + Send + 'static,
        F: FnOnce(&Connection) -> Result<usize, E> + Send + 'static,
    {
        let changed = self.read(f).await?;
        if changed > 0 {
            self.notify(table);
        }
        Ok(changed)
    }

    /// Subscribes to change notifications for `table`.
    ///
    /// The receiver's value is an opaque counter; only the fact that it
    /// changed is meaningful.
    pub fn subscribe(&self, table: &'static str) -> watch::Receiver<u64> {
        self.change_sender(table, |sender| sender.subscribe())
    }

    fn notify(&self, table: &'static str) {
        self.change_sender(table, |sender| {
            sender.send_modify(|generation| *generation = generation.wrapping_add(1));
            debug!(
                "event=table_changed module=db table={} generation={} subscribers={}",
                table,
                *sender.borrow(),
                sender.receiver_count()
            );
        });
    }

    fn change_sender<T>(&self, table: &'static str, f: impl FnOnce(&watch::Sender<u64>) -> T) -> T {
        let mut changes = self
            .inner
            .changes
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        let sender = changes
            .entry(table)
            .or_insert_with(|| watch::channel(0).0);
        f(sender)
    }
}
