//! Persistence seams.
//!
//! `UserRepository` and `TaskRepository` describe the document store the services rely on.
//! Every task method takes the owner id, so a backend cannot be asked for a task without
//! the ownership filter. Two backends exist: [`memory`] for tests and local runs, and
//! [`postgres`] for deployments.

pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use serde::Serialize;
use uuid::Uuid;

use crate::error::AppError;
use crate::models::{NewUser, Task, TaskChanges, User};

pub use memory::{MemoryTaskRepository, MemoryUserRepository};
pub use postgres::{connect, PgTaskRepository, PgUserRepository};

/// The store the repositories were built on, as reported by `/health`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    Memory,
    Postgres,
}

#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Persists a user. Fails with `AppError::Conflict` when the email is taken.
    async fn insert(&self, user: NewUser) -> Result<User, AppError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, AppError>;

    /// `email` must already be normalized.
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError>;

    /// Replaces name and email, and the hash when one is given.
    /// Returns `None` when the user no longer exists.
    async fn update_profile(
        &self,
        id: Uuid,
        name: &str,
        email: &str,
        password_hash: Option<&str>,
    ) -> Result<Option<User>, AppError>;

    /// Returns `false` when the user no longer exists.
    async fn update_password(&self, id: Uuid, password_hash: &str) -> Result<bool, AppError>;
}

#[async_trait]
pub trait TaskRepository: Send + Sync {
    async fn insert(&self, task: Task) -> Result<Task, AppError>;

    /// All tasks of `owner`, newest first.
    async fn list(&self, owner: Uuid) -> Result<Vec<Task>, AppError>;

    async fn find(&self, owner: Uuid, id: Uuid) -> Result<Option<Task>, AppError>;

    async fn update(
        &self,
        owner: Uuid,
        id: Uuid,
        changes: TaskChanges,
    ) -> Result<Option<Task>, AppError>;

    /// Returns `false` when nothing matched.
    async fn delete(&self, owner: Uuid, id: Uuid) -> Result<bool, AppError>;
}
