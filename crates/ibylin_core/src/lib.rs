//! Local persistence core for the ibylin e-reader.
//! Owns the user database, reading history and reader preferences.

pub mod app;
pub mod config;
pub mod db;
pub mod history;
pub mod logging;
pub mod model;
pub mod preferences;
pub mod repo;
pub mod service;

pub use app::{AppContainer, AppError, AppResult};
pub use config::{AppConfig, StorageLocation};
pub use db::{Database, DbError, DbResult};
pub use history::{HistoryError, HistoryResult, ReadingHistoryStore, ReadingSession};
pub use logging::{default_log_level, init_logging, logging_status, LogLevel, LoggingError};
pub use model::reader_preferences::{ReaderPreferences, TextAlign, Theme};
pub use model::reading_history::{
    generate_book_id, ReadingHistory, ReadingHistoryValidationError,
};
pub use model::user::{User, UserId};
pub use preferences::ReaderPreferencesManager;
pub use repo::user_dao::{RepoError, RepoResult, SqliteUserDao, UserDao, UserListStream};
pub use service::user_repository::{UserRepository, UserRepositoryImpl};

/// Minimal health-check API for host integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
