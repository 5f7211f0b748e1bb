//! User domain model.
//!
//! # Invariants
//! - `id` is the sole identity and lookup key; it is unique across storage.
//! - Records are replaced whole; there is no partial-field update.

use serde::{Deserialize, Serialize};

/// Integer identity of a stored user.
pub type UserId = i64;

/// Locally stored user profile.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub name: String,
    pub email: String,
    /// URI or file path of the avatar image.
    pub avatar: Option<String>,
}

impl User {
    /// Creates a user without an avatar.
    pub fn new(id: UserId, name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            email: email.into(),
            avatar: None,
        }
    }

    pub fn with_avatar(mut self, avatar: impl Into<String>) -> Self {
        self.avatar = Some(avatar.into());
        self
    }
}
