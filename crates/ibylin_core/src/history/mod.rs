//! Reading-history persistence.
//!
//! # Responsibility
//! - Remember the last book read and a bounded, newest-first history list.
//! - Persist both as one JSON document next to the database.
//!
//! # Invariants
//! - At most [`MAX_HISTORY_ENTRIES`] records are kept, one per `book_id`.
//! - Records are validated before they are stored.
//! - The file is replaced atomically; a crash never leaves half a document.
//! - Memory changes only after the new document is on disk.
//!
//! Stored separately from the SQLite `users` table.

use crate::model::reading_history::{
    generate_book_id, ReadingHistory, ReadingHistoryValidationError,
};
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::{SystemTime, UNIX_EPOCH};

pub const MAX_HISTORY_ENTRIES: usize = 50;
pub const DEFAULT_HISTORY_FILE_NAME: &str = "reading_history.json";

pub type HistoryResult<T> = Result<T, HistoryError>;

#[derive(Debug)]
pub enum HistoryError {
    Io(std::io::Error),
    Serde(serde_json::Error),
    Validation(ReadingHistoryValidationError),
}

impl Display for HistoryError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(err) => write!(f, "reading history io failed: {err}"),
            Self::Serde(err) => write!(f, "reading history file is malformed: {err}"),
            Self::Validation(err) => write!(f, "{err}"),
        }
    }
}

impl Error for HistoryError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            Self::Serde(err) => Some(err),
            Self::Validation(err) => Some(err),
        }
    }
}

impl From<std::io::Error> for HistoryError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<serde_json::Error> for HistoryError {
    fn from(value: serde_json::Error) -> Self {
        Self::Serde(value)
    }
}

impl From<ReadingHistoryValidationError> for HistoryError {
    fn from(value: ReadingHistoryValidationError) -> Self {
        Self::Validation(value)
    }
}

/// Input reported by the reading engine at the end of a session.
#[derive(Debug, Clone, PartialEq)]
pub struct ReadingSession {
    pub book_path: String,
    pub book_title: String,
    pub book_author: Option<String>,
    pub current_page: u32,
    pub total_pages: u32,
    pub read_progress: f32,
    pub cover_path: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct HistoryDocument {
    last_read_book: Option<ReadingHistory>,
    #[serde(default)]
    history: Vec<ReadingHistory>,
}

/// Reading-history store backed by a JSON file or by memory only.
pub struct ReadingHistoryStore {
    path: Option<PathBuf>,
    state: Mutex<HistoryDocument>,
}

impl ReadingHistoryStore {
    /// Opens the history file at `path`; a missing file starts empty.
    pub fn open(path: impl AsRef<Path>) -> HistoryResult<Self> {
        let path = path.as_ref().to_path_buf();
        let document = match std::fs::read(&path) {
            Ok(bytes) => serde_json::from_slice(&bytes)?,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => HistoryDocument::default(),
            Err(err) => return Err(err.into()),
        };
        debug!(
            "event=history_open module=history status=ok entries={}",
            document.history.len()
        );
        Ok(Self {
            path: Some(path),
            state: Mutex::new(document),
        })
    }

    /// Creates a store that never touches the file system.
    pub fn in_memory() -> Self {
        Self {
            path: None,
            state: Mutex::new(HistoryDocument::default()),
        }
    }

    /// Records a finished reading session and returns the stored record.
    ///
    /// The record becomes the last-read book and replaces any earlier entry
    /// for the same book.
    pub fn record_reading(&self, session: ReadingSession) -> HistoryResult<ReadingHistory> {
        let record = ReadingHistory {
            book_id: generate_book_id(&session.book_path),
            book_path: session.book_path,
            book_title: session.book_title,
            book_author: session.book_author,
            last_read_time: now_epoch_ms(),
            read_progress: session.read_progress,
            current_page: session.current_page,
            total_pages: session.total_pages,
            cover_path: session.cover_path,
        };
        record.validate()?;

        let mut state = self.lock();
        let mut next = state.clone();
        next.last_read_book = Some(record.clone());
        match next
            .history
            .iter()
            .position(|entry| entry.book_id == record.book_id)
        {
            Some(index) => next.history[index] = record.clone(),
            None => next.history.push(record.clone()),
        }
        next.history.sort_by(|a, b| b.last_read_time.cmp(&a.last_read_time));
        next.history.truncate(MAX_HISTORY_ENTRIES);
        self.persist(&next)?;
        *state = next;

        info!(
            "event=history_record module=history status=ok book_id={} progress_pct={}",
            record.book_id,
            record.progress_percent()
        );
        Ok(record)
    }

    pub fn last_read_book(&self) -> Option<ReadingHistory> {
        self.lock().last_read_book.clone()
    }

    /// Returns history entries, most recently read first.
    pub fn reading_history(&self) -> Vec<ReadingHistory> {
        self.lock().history.clone()
    }

    pub fn has_reading_history(&self) -> bool {
        let state = self.lock();
        state.last_read_book.is_some() || !state.history.is_empty()
    }

    /// Replaces an existing entry with the same `book_id`.
    ///
    /// Returns `false` without writing when the book has no entry.
    pub fn update_record(&self, record: &ReadingHistory) -> HistoryResult<bool> {
        record.validate()?;

        let mut state = self.lock();
        let Some(index) = state
            .history
            .iter()
            .position(|entry| entry.book_id == record.book_id)
        else {
            warn!(
                "event=history_update module=history status=skipped reason=not_found book_id={}",
                record.book_id
            );
            return Ok(false);
        };
        let mut next = state.clone();
        next.history[index] = record.clone();
        let is_last_read = next
            .last_read_book
            .as_ref()
            .is_some_and(|last| last.book_id == record.book_id);
        if is_last_read {
            next.last_read_book = Some(record.clone());
        }
        self.persist(&next)?;
        *state = next;

        info!(
            "event=history_update module=history status=ok book_id={}",
            record.book_id
        );
        Ok(true)
    }

    /// Forgets the last-read book and every history entry.
    pub fn clear(&self) -> HistoryResult<()> {
        let mut state = self.lock();
        let next = HistoryDocument::default();
        self.persist(&next)?;
        *state = next;
        info!("event=history_clear module=history status=ok");
        Ok(())
    }

    fn lock(&self) -> MutexGuard<'_, HistoryDocument> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn persist(&self, document: &HistoryDocument) -> HistoryResult<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let staging = path.with_extension("json.tmp");
        std::fs::write(&staging, serde_json::to_vec_pretty(document)?)?;
        std::fs::rename(&staging, path)?;
        Ok(())
    }
}

fn now_epoch_ms() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| i64::try_from(elapsed.as_millis()).unwrap_or(i64::MAX))
        .unwrap_or(0)
}
