//! Explicit table descriptors for the SQLite schema.
//!
//! # Responsibility
//! - Describe persisted tables (name, columns, key designation) as data.
//! - Render `CREATE TABLE` statements consumed by migrations.
//! - Verify that an opened connection matches a descriptor.
//!
//! # Invariants
//! - Every table has exactly one primary-key column.
//! - Column order in a descriptor is the canonical `SELECT` order.

use super::{DbError, DbResult};
use rusqlite::Connection;

/// SQLite storage class of a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnType {
    Integer,
    Real,
    Text,
}

impl ColumnType {
    fn as_sql(self) -> &'static str {
        match self {
            Self::Integer => "INTEGER",
            Self::Real => "REAL",
            Self::Text => "TEXT",
        }
    }
}

/// One column of a [`TableSchema`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnSchema {
    pub name: &'static str,
    pub kind: ColumnType,
    pub primary_key: bool,
    pub nullable: bool,
}

impl ColumnSchema {
    /// Creates a required, non-key column.
    pub const fn new(name: &'static str, kind: ColumnType) -> Self {
        Self {
            name,
            kind,
            primary_key: false,
            nullable: false,
        }
    }

    pub const fn primary_key(mut self) -> Self {
        self.primary_key = true;
        self
    }

    pub const fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }

    fn definition(&self) -> String {
        let mut sql = format!("{} {}", self.name, self.kind.as_sql());
        if self.primary_key {
            sql.push_str(" PRIMARY KEY");
        } else if !self.nullable {
            sql.push_str(" NOT NULL");
        }
        sql
    }
}

/// Declarative description of one persisted table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableSchema {
    pub name: &'static str,
    pub columns: &'static [ColumnSchema],
}

impl TableSchema {
    /// Renders an idempotent `CREATE TABLE` statement.
    pub fn create_table_sql(&self) -> String {
        let columns = self
            .columns
            .iter()
            .map(ColumnSchema::definition)
            .collect::<Vec<_>>()
            .join(",\n    ");
        format!("CREATE TABLE IF NOT EXISTS {} (\n    {}\n);", self.name, columns)
    }

    /// Comma-separated column list in descriptor order.
    pub fn column_list(&self) -> String {
        self.columns
            .iter()
            .map(|column| column.name)
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Returns the primary-key column, if the descriptor declares one.
    pub fn primary_key(&self) -> Option<&ColumnSchema> {
        self.columns.iter().find(|column| column.primary_key)
    }
}

/// `users` table: one row per [`crate::User`], keyed by `id`.
pub const USERS_TABLE: TableSchema = TableSchema {
    name: "users",
    columns: &[
        ColumnSchema::new("id", ColumnType::Integer).primary_key(),
        ColumnSchema::new("name", ColumnType::Text),
        ColumnSchema::new("email", ColumnType::Text),
        ColumnSchema::new("avatar", ColumnType::Text).nullable(),
    ],
};

/// Checks that `table` exists on `conn` with every descriptor column.
///
/// # Errors
/// - `DbError::MissingTable` when the table is absent.
/// - `DbError::MissingColumn` for the first absent column.
pub fn ensure_table_ready(conn: &Connection, table: &TableSchema) -> DbResult<()> {
    if !table_exists(conn, table.name)? {
        return Err(DbError::MissingTable(table.name));
    }

    let present = table_columns(conn, table.name)?;
    for column in table.columns {
        if !present.iter().any(|name| name == column.name) {
            return Err(DbError::MissingColumn {
                table: table.name,
                column: column.name,
            });
        }
    }

    Ok(())
}

fn table_exists(conn: &Connection, table: &str) -> DbResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM sqlite_master
            WHERE type = 'table' AND name = ?1
        );",
        [table],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}

fn table_columns(conn: &Connection, table: &str) -> DbResult<Vec<String>> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({table});"))?;
    let names = stmt
        .query_map([], |row| row.get::<_, String>(1))?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(names)
}
