//! Data-access layer over the storage engine.
//!
//! # Responsibility
//! - Define table-oriented data access contracts.
//! - Isolate SQLite query details from the repository/service layer.
//!
//! # Invariants
//! - DAOs hold no state beyond a shared [`crate::db::Database`] handle.
//! - "Not found" is `Ok(None)`; only storage failures are errors.

pub mod user_dao;
