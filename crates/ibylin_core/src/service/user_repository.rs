//! UI-facing user repository.
//!
//! # Responsibility
//! - Expose the narrow user contract consumed by the presentation layer.
//! - Delegate every call to a [`UserDao`] implementation.
//!
//! # Invariants
//! - Results and errors are forwarded unchanged.
//! - The repository stays storage-agnostic.

use crate::model::user::{User, UserId};
use crate::repo::user_dao::{RepoResult, UserDao, UserListStream};
use async_trait::async_trait;
use std::sync::Arc;

/// User operations available to upper layers.
#[async_trait]
pub trait UserRepository: Send + Sync {
    fn get_users(&self) -> UserListStream;
    async fn get_user_by_id(&self, id: UserId) -> RepoResult<Option<User>>;
    async fn insert_user(&self, user: &User) -> RepoResult<()>;
    async fn delete_user(&self, user: &User) -> RepoResult<()>;
}

/// Pass-through repository over a shared DAO.
pub struct UserRepositoryImpl<D: UserDao> {
    dao: Arc<D>,
}

impl<D: UserDao> UserRepositoryImpl<D> {
    pub fn new(dao: Arc<D>) -> Self {
        Self { dao }
    }
}

#[async_trait]
impl<D: UserDao + 'static> UserRepository for UserRepositoryImpl<D> {
    fn get_users(&self) -> UserListStream {
        self.dao.get_all_users()
    }

    async fn get_user_by_id(&self, id: UserId) -> RepoResult<Option<User>> {
        self.dao.get_user_by_id(id).await
    }

    async fn insert_user(&self, user: &User) -> RepoResult<()> {
        self.dao.insert_user(user).await
    }

    async fn delete_user(&self, user: &User) -> RepoResult<()> {
        self.dao.delete_user(user).await
    }
}
