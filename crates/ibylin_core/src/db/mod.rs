//! SQLite storage engine, schema descriptors and migrations.
//!
//! # Responsibility
//! - Open and configure the single application SQLite connection.
//! - Apply schema migrations in deterministic order.
//! - Publish per-table change notifications for live queries.
//!
//! # Invariants
//! - Schema version is tracked via `PRAGMA user_version`.
//! - Application data is never read or written before migrations succeed.
//! - All access goes through one shared connection owned by [`Database`].

use std::error::Error;
use std::fmt::{Display, Formatter};

mod engine;
pub mod migrations;
mod open;
pub mod schema;

pub use engine::Database;
pub use open::{database_path, open_db, open_db_in_memory, DEFAULT_DATABASE_NAME};

pub type DbResult<T> = Result<T, DbError>;

#[derive(Debug)]
pub enum DbError {
    Sqlite(rusqlite::Error),
    UnsupportedSchemaVersion {
        db_version: u32,
        latest_supported: u32,
    },
    /// Required table is absent from the opened database.
    MissingTable(&'static str),
    /// Required column is absent from an existing table.
    MissingColumn {
        table: &'static str,
        column: &'static str,
    },
    /// A previous holder of the connection panicked mid-statement.
    ConnectionPoisoned,
    /// The blocking worker running a statement failed to complete.
    Background(String),
    /// Parent directory for the database file could not be created.
    CreateDirectory(std::io::Error),
}

impl Display for DbError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sqlite(err) => write!(f, "{err}"),
            Self::UnsupportedSchemaVersion {
                db_version,
                latest_supported,
            } => write!(
                f,
                "database schema version {db_version} is newer than supported {latest_supported}"
            ),
            Self::MissingTable(table) => write!(f, "database is missing table `{table}`"),
            Self::MissingColumn { table, column } => {
                write!(f, "database table `{table}` is missing column `{column}`")
            }
            Self::ConnectionPoisoned => write!(f, "database connection lock is poisoned"),
            Self::Background(message) => write!(f, "database worker failed: {message}"),
            Self::CreateDirectory(err) => {
                write!(f, "failed to create database directory: {err}")
            }
        }
    }
}

impl Error for DbError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Sqlite(err) => Some(err),
            Self::CreateDirectory(err) => Some(err),
            Self::UnsupportedSchemaVersion { .. }
            | Self::MissingTable(_)
            | Self::MissingColumn { .. }
            | Self::ConnectionPoisoned
            | Self::Background(_) => None,
        }
    }
}

impl From<rusqlite::Error> for DbError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}
