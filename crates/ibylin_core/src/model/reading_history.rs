//! Reading-history domain model.
//!
//! # Responsibility
//! - Capture where a reader left off in one book.
//! - Validate progress and pagination before the record is persisted.
//!
//! # Invariants
//! - `read_progress` is within `0.0..=1.0`.
//! - `current_page <= total_pages` whenever `total_pages > 0`.
//! - `book_id` is stable for a given book file path.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Reading position and progress for one book.
///
/// Serialized with camelCase keys to stay compatible with history files
/// written by the app.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReadingHistory {
    pub book_id: String,
    pub book_path: String,
    pub book_title: String,
    pub book_author: Option<String>,
    /// Unix epoch milliseconds of the last reading session.
    pub last_read_time: i64,
    pub read_progress: f32,
    pub current_page: u32,
    /// Zero when the reading engine has not paginated the book yet.
    pub total_pages: u32,
    pub cover_path: Option<String>,
}

/// Validation failures for [`ReadingHistory`].
#[derive(Debug, Clone, PartialEq)]
pub enum ReadingHistoryValidationError {
    EmptyBookId,
    EmptyBookPath,
    ProgressOutOfRange(f32),
    PageBeyondTotal { current_page: u32, total_pages: u32 },
}

impl Display for ReadingHistoryValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyBookId => write!(f, "book_id cannot be empty"),
            Self::EmptyBookPath => write!(f, "book_path cannot be empty"),
            Self::ProgressOutOfRange(value) => {
                write!(f, "read_progress {value} is outside 0.0..=1.0")
            }
            Self::PageBeyondTotal {
                current_page,
                total_pages,
            } => write!(
                f,
                "current_page {current_page} exceeds total_pages {total_pages}"
            ),
        }
    }
}

impl Error for ReadingHistoryValidationError {}

impl ReadingHistory {
    /// Checks progress/pagination invariants.
    pub fn validate(&self) -> Result<(), ReadingHistoryValidationError> {
        if self.book_id.trim().is_empty() {
            return Err(ReadingHistoryValidationError::EmptyBookId);
        }
        if self.book_path.trim().is_empty() {
            return Err(ReadingHistoryValidationError::EmptyBookPath);
        }
        // NaN fails the range check as well.
        if !(0.0..=1.0).contains(&self.read_progress) {
            return Err(ReadingHistoryValidationError::ProgressOutOfRange(
                self.read_progress,
            ));
        }
        if self.total_pages > 0 && self.current_page > self.total_pages {
            return Err(ReadingHistoryValidationError::PageBeyondTotal {
                current_page: self.current_page,
                total_pages: self.total_pages,
            });
        }
        Ok(())
    }

    /// Progress rounded down to a whole percentage.
    pub fn progress_percent(&self) -> u8 {
        (self.read_progress.clamp(0.0, 1.0) * 100.0) as u8
    }

    /// Short label for list rows: `page/total`, or a percentage when the
    /// book has not been paginated.
    pub fn progress_text(&self) -> String {
        if self.total_pages > 0 {
            format!("{}/{}", self.current_page, self.total_pages)
        } else {
            format!("{}%", self.progress_percent())
        }
    }
}

/// Derives the stable book identity from its file path.
pub fn generate_book_id(book_path: &str) -> String {
    Uuid::new_v5(&Uuid::NAMESPACE_URL, book_path.as_bytes()).to_string()
}
