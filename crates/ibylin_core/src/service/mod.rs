//! Use-case facing repositories.
//!
//! # Responsibility
//! - Present stable contracts to the presentation layer.
//! - Keep UI callers decoupled from DAO and storage details.

pub mod user_repository;
