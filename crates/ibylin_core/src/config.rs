//! Startup configuration for the composition root.
//!
//! # Responsibility
//! - Describe where persistent state lives and how logging starts.
//! - Resolve overrides from the process environment.

use crate::db::DEFAULT_DATABASE_NAME;
use crate::history::DEFAULT_HISTORY_FILE_NAME;
use crate::logging::default_log_level;
use crate::model::reader_preferences::ReaderPreferences;
use std::path::PathBuf;

pub const DATA_DIR_ENV: &str = "IBYLIN_DATA_DIR";
pub const LOG_LEVEL_ENV: &str = "IBYLIN_LOG_LEVEL";

const FALLBACK_DATA_DIR_NAME: &str = "ibylin";

/// Where the application keeps its persistent state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageLocation {
    /// Database and history files under this directory.
    Directory(PathBuf),
    /// Nothing touches the file system; state dies with the container.
    InMemory,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub storage: StorageLocation,
    pub database_name: String,
    pub history_file_name: String,
    pub log_level: String,
    pub reader_preferences: ReaderPreferences,
}

impl AppConfig {
    /// Configuration rooted at `data_dir` with default file names.
    ///
    /// A relative `data_dir` is resolved against the working directory.
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        let data_dir = data_dir.into();
        let data_dir = std::path::absolute(&data_dir).unwrap_or(data_dir);
        Self::with_storage(StorageLocation::Directory(data_dir))
    }

    pub fn in_memory() -> Self {
        Self::with_storage(StorageLocation::InMemory)
    }

    /// Resolves `IBYLIN_DATA_DIR` and `IBYLIN_LOG_LEVEL`.
    ///
    /// Blank values are ignored. The data directory falls back to
    /// `<tmp>/ibylin`.
    pub fn from_env() -> Self {
        let data_dir = non_blank_env(DATA_DIR_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|| std::env::temp_dir().join(FALLBACK_DATA_DIR_NAME));
        let mut config = Self::new(data_dir);
        if let Some(level) = non_blank_env(LOG_LEVEL_ENV) {
            config.log_level = level;
        }
        config
    }

    fn with_storage(storage: StorageLocation) -> Self {
        Self {
            storage,
            database_name: DEFAULT_DATABASE_NAME.to_string(),
            history_file_name: DEFAULT_HISTORY_FILE_NAME.to_string(),
            log_level: default_log_level().to_string(),
            reader_preferences: ReaderPreferences::default(),
        }
    }

    /// Data directory, or `None` for in-memory storage.
    pub fn data_dir(&self) -> Option<&PathBuf> {
        match &self.storage {
            StorageLocation::Directory(dir) => Some(dir),
            StorageLocation::InMemory => None,
        }
    }

    /// Default log directory: `<data_dir>/logs`.
    pub fn log_dir(&self) -> Option<PathBuf> {
        self.data_dir().map(|dir| dir.join("logs"))
    }
}

fn non_blank_env(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|raw| raw.trim().to_string())
        .filter(|value| !value.is_empty())
}
