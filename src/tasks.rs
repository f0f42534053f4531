//! Owner-scoped task lifecycle.
//!
//! `TaskStore` itself exposes no task operations. Callers first obtain an [`OwnedTasks`]
//! handle with [`TaskStore::for_owner`], which needs the `AuthenticatedUser` produced by
//! the auth middleware, and every operation on the handle is filtered by that owner.

use std::sync::Arc;
use uuid::Uuid;

use crate::auth::AuthenticatedUser;
use crate::db::TaskRepository;
use crate::error::AppError;
use crate::models::{NewTask, Task, TaskChanges, TaskInput, TaskPatch};

#[derive(Clone)]
pub struct TaskStore {
    repo: Arc<dyn TaskRepository>,
}

impl TaskStore {
    pub fn new(repo: Arc<dyn TaskRepository>) -> Self {
        Self { repo }
    }

    pub fn for_owner(&self, owner: AuthenticatedUser) -> OwnedTasks<'_> {
        OwnedTasks {
            repo: self.repo.as_ref(),
            owner: owner.user_id(),
        }
    }
}

/// The tasks of a single user.
pub struct OwnedTasks<'a> {
    repo: &'a dyn TaskRepository,
    owner: Uuid,
}

fn task_not_found() -> AppError {
    AppError::NotFound("Task not found".into())
}

/// Task ids arrive as path strings; one that is not a UUID cannot name an owned task.
pub fn parse_task_id(raw: &str) -> Result<Uuid, AppError> {
    Uuid::parse_str(raw).map_err(|_| task_not_found())
}

impl OwnedTasks<'_> {
    pub async fn create(&self, input: TaskInput) -> Result<Task, AppError> {
        let task = Task::new(NewTask::from_input(input)?, self.owner);
        let task = self.repo.insert(task).await?;
        log::info!("user {} created task {}", self.owner, task.id);
        Ok(task)
    }

    /// Newest first.
    pub async fn list(&self) -> Result<Vec<Task>, AppError> {
        self.repo.list(self.owner).await
    }

    pub async fn get(&self, id: Uuid) -> Result<Task, AppError> {
        self.repo
            .find(self.owner, id)
            .await?
            .ok_or_else(task_not_found)
    }

    pub async fn update(&self, id: Uuid, patch: TaskPatch) -> Result<Task, AppError> {
        let changes = TaskChanges::from_patch(patch)?;
        self.repo
            .update(self.owner, id, changes)
            .await?
            .ok_or_else(task_not_found)
    }

    pub async fn delete(&self, id: Uuid) -> Result<(), AppError> {
        if !self.repo.delete(self.owner, id).await? {
            return Err(task_not_found());
        }
        log::info!("user {} deleted task {}", self.owner, id);
        Ok(())
    }
}
