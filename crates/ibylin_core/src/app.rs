//! Composition root.
//!
//! # Responsibility
//! - Build the storage engine, DAO and repository once at startup.
//! - Build the unrelated shared singletons (reading history, reader prefs).
//! - Hand out shared handles for the lifetime of the container.
//!
//! # Invariants
//! - Exactly one [`Database`] per container; every consumer shares it.
//! - Accessors return clones of the same `Arc`, never fresh instances.

use crate::config::{AppConfig, StorageLocation};
use crate::db::{database_path, Database};
use crate::history::{HistoryError, ReadingHistoryStore};
use crate::preferences::ReaderPreferencesManager;
use crate::repo::user_dao::{RepoError, SqliteUserDao};
use crate::service::user_repository::{UserRepository, UserRepositoryImpl};
use log::{error, info};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::Arc;
use std::time::Instant;

pub type AppResult<T> = Result<T, AppError>;

#[derive(Debug)]
pub enum AppError {
    Storage(RepoError),
    History(HistoryError),
}

impl Display for AppError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Storage(err) => write!(f, "storage setup failed: {err}"),
            Self::History(err) => write!(f, "reading history setup failed: {err}"),
        }
    }
}

impl Error for AppError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Storage(err) => Some(err),
            Self::History(err) => Some(err),
        }
    }
}

impl From<RepoError> for AppError {
    fn from(value: RepoError) -> Self {
        Self::Storage(value)
    }
}

impl From<crate::db::DbError> for AppError {
    fn from(value: crate::db::DbError) -> Self {
        Self::Storage(RepoError::Db(value))
    }
}

impl From<HistoryError> for AppError {
    fn from(value: HistoryError) -> Self {
        Self::History(value)
    }
}

/// Process-wide singletons, built once from an [`AppConfig`].
pub struct AppContainer {
    config: AppConfig,
    database: Database,
    user_dao: Arc<SqliteUserDao>,
    user_repository: Arc<dyn UserRepository>,
    reading_history: Arc<ReadingHistoryStore>,
    reader_preferences: Arc<ReaderPreferencesManager>,
}

impl AppContainer {
    /// Builds every singleton described by `config`.
    ///
    /// # Errors
    /// - `AppError::Storage` when the database cannot be opened or migrated.
    /// - `AppError::History` when an existing history file is unreadable.
    pub fn build(config: AppConfig) -> AppResult<Self> {
        let started_at = Instant::now();
        let result = Self::assemble(config);
        match &result {
            Ok(container) => info!(
                "event=container_build module=app status=ok in_memory={} duration_ms={}",
                container.config.data_dir().is_none(),
                started_at.elapsed().as_millis()
            ),
            Err(err) => error!(
                "event=container_build module=app status=error duration_ms={} error={}",
                started_at.elapsed().as_millis(),
                err
            ),
        }
        result
    }

    fn assemble(config: AppConfig) -> AppResult<Self> {
        let (database, reading_history) = match &config.storage {
            StorageLocation::Directory(dir) => (
                Database::open(database_path(dir, &config.database_name))?,
                ReadingHistoryStore::open(dir.join(&config.history_file_name))?,
            ),
            StorageLocation::InMemory => {
                (Database::open_in_memory()?, ReadingHistoryStore::in_memory())
            }
        };

        let user_dao = Arc::new(SqliteUserDao::try_new(database.clone())?);
        let user_repository: Arc<dyn UserRepository> =
            Arc::new(UserRepositoryImpl::new(Arc::clone(&user_dao)));
        let reader_preferences = Arc::new(ReaderPreferencesManager::new(
            config.reader_preferences.clone(),
        ));

        Ok(Self {
            config,
            database,
            user_dao,
            user_repository,
            reading_history: Arc::new(reading_history),
            reader_preferences,
        })
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn database(&self) -> Database {
        self.database.clone()
    }

    pub fn user_dao(&self) -> Arc<SqliteUserDao> {
        Arc::clone(&self.user_dao)
    }

    pub fn user_repository(&self) -> Arc<dyn UserRepository> {
        Arc::clone(&self.user_repository)
    }

    pub fn reading_history(&self) -> Arc<ReadingHistoryStore> {
        Arc::clone(&self.reading_history)
    }

    pub fn reader_preferences(&self) -> Arc<ReaderPreferencesManager> {
        Arc::clone(&self.reader_preferences)
    }
}
