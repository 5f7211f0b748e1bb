//! Domain value objects.
//!
//! # Responsibility
//! - Define the records exchanged between storage and the presentation layer.
//!
//! # Invariants
//! - Models carry no storage handles; persistence lives in `repo`/`history`.

pub mod reader_preferences;
pub mod reading_history;
pub mod user;
