//! User data-access contract and SQLite implementation.
//!
//! # Responsibility
//! - Provide CRUD over the `users` table plus a live listing stream.
//! - Keep SQL details inside the persistence boundary.
//!
//! # Invariants
//! - Insert is insert-or-replace keyed by `id`; no field validation.
//! - Storage failures are returned unchanged as `RepoError::Db`.
//! - The listing stream emits the current snapshot first, then one snapshot
//!   per committed change to `users`.

use crate::db::schema::{ensure_table_ready, USERS_TABLE};
use crate::db::{Database, DbError};
use crate::model::user::{User, UserId};
use async_stream::stream;
use async_trait::async_trait;
use futures::Stream;
use log::{debug, info};
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::pin::Pin;

pub type RepoResult<T> = Result<T, RepoError>;

/// Live sequence of full `users` snapshots.
///
/// Dropping the stream unsubscribes.
pub type UserListStream = Pin<Box<dyn Stream<Item = RepoResult<Vec<User>>> + Send>>;

/// Repository error for user persistence operations.
#[derive(Debug)]
pub enum RepoError {
    Db(DbError),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
        }
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Data-access interface for the `users` table.
#[async_trait]
pub trait UserDao: Send + Sync {
    /// Subscribes to the full user set.
    fn get_all_users(&self) -> UserListStream;
    async fn get_user_by_id(&self, id: UserId) -> RepoResult<Option<User>>;
    /// Writes `user`, replacing any row with the same id.
    async fn insert_user(&self, user: &User) -> RepoResult<()>;
    /// Removes the row matching `user.id`; absent rows are ignored.
    async fn delete_user(&self, user: &User) -> RepoResult<()>;
    async fn delete_all_users(&self) -> RepoResult<()>;
}

/// SQLite-backed user DAO.
#[derive(Clone)]
pub struct SqliteUserDao {
    database: Database,
}

impl SqliteUserDao {
    /// Creates a DAO after checking that `users` matches its descriptor.
    pub fn try_new(database: Database) -> RepoResult<Self> {
        database.with_connection(|conn| {
            ensure_table_ready(conn, &USERS_TABLE).map_err(RepoError::from)
        })?;
        Ok(Self { database })
    }
}

#[async_trait]
impl UserDao for SqliteUserDao {
    fn get_all_users(&self) -> UserListStream {
        let database = self.database.clone();
        let mut changes = database.subscribe(USERS_TABLE.name);

        Box::pin(stream! {
            loop {
                // Mark seen before querying so a write racing the query
                // still triggers another snapshot.
                let _ = *changes.borrow_and_update();
                let snapshot = database.read(query_all_users).await;
                let failed = snapshot.is_err();
                yield snapshot;
                if failed || changes.changed().await.is_err() {
                    break;
                }
            }
        })
    }

    async fn get_user_by_id(&self, id: UserId) -> RepoResult<Option<User>> {
        self.database
            .read(move |conn| {
                let sql = format!(
                    "SELECT {} FROM {} WHERE id = ?1;",
                    USERS_TABLE.column_list(),
                    USERS_TABLE.name
                );
                let user = conn.query_row(&sql, [id], parse_user_row).optional()?;
                Ok::<_, RepoError>(user)
            })
            .await
    }

    async fn insert_user(&self, user: &User) -> RepoResult<()> {
        let user = user.clone();
        let id = user.id;
        self.database
            .write(USERS_TABLE.name, move |conn| {
                let changed = conn.execute(
                    "INSERT OR REPLACE INTO users (id, name, email, avatar)
                     VALUES (?1, ?2, ?3, ?4);",
                    params![user.id, user.name, user.email, user.avatar],
                )?;
                Ok::<_, RepoError>(changed)
            })
            .await?;
        info!("event=user_insert module=repo status=ok user_id={id}");
        Ok(())
    }

    async fn delete_user(&self, user: &User) -> RepoResult<()> {
        let id = user.id;
        let changed = self
            .database
            .write(USERS_TABLE.name, move |conn| {
                Ok::<_, RepoError>(conn.execute("DELETE FROM users WHERE id = ?1;", [id])?)
            })
            .await?;
        info!("event=user_delete module=repo status=ok user_id={id} changed={changed}");
        Ok(())
    }

    async fn delete_all_users(&self) -> RepoResult<()> {
        let changed = self
            .database
            .write(USERS_TABLE.name, |conn| {
                Ok::<_, RepoError>(conn.execute("DELETE FROM users;", [])?)
            })
            .await?;
        info!("event=user_delete_all module=repo status=ok changed={changed}");
        Ok(())
    }
}

fn query_all_users(conn: &Connection) -> RepoResult<Vec<User>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {} FROM {};",
        USERS_TABLE.column_list(),
        USERS_TABLE.name
    ))?;
    let users = stmt
        .query_map([], parse_user_row)?
        .collect::<Result<Vec<_>, _>>()?;
    debug!("event=user_list module=repo status=ok count={}", users.len());
    Ok(users)
}

fn parse_user_row(row: &Row<'_>) -> rusqlite::Result<User> {
    Ok(User {
        id: row.get("id")?,
        name: row.get("name")?,
        email: row.get("email")?,
        avatar: row.get("avatar")?,
    })
}
