use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{TaskRepository, UserRepository};
use crate::error::AppError;
use crate::models::{NewUser, Task, TaskChanges, User};

/// In-process user store. Email uniqueness is checked under the write lock.
#[derive(Debug, Default)]
pub struct MemoryUserRepository {
    users: RwLock<HashMap<Uuid, User>>,
}

impl MemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

fn email_taken(users: &HashMap<Uuid, User>, email: &str, except: Option<Uuid>) -> bool {
    users
        .values()
        .any(|user| user.email == email && Some(user.id) != except)
}

#[async_trait]
impl UserRepository for MemoryUserRepository {
    async fn insert(&self, input: NewUser) -> Result<User, AppError> {
        let mut users = self.users.write().await;
        if email_taken(&users, &input.email, None) {
            return Err(AppError::Conflict("User already exists".into()));
        }
        let user = User::new(input);
        users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, AppError> {
        Ok(self.users.read().await.get(&id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        let users = self.users.read().await;
        Ok(users.values().find(|user| user.email == email).cloned())
    }

    async fn update_profile(
        &self,
        id: Uuid,
        name: &str,
        email: &str,
        password_hash: Option<&str>,
    ) -> Result<Option<User>, AppError> {
        let mut users = self.users.write().await;
        if !users.contains_key(&id) {
            return Ok(None);
        }
        if email_taken(&users, email, Some(id)) {
            return Err(AppError::Conflict("Email is already in use".into()));
        }
        let Some(user) = users.get_mut(&id) else {
            return Ok(None);
        };
        user.name = name.to_string();
        user.email = email.to_string();
        if let Some(hash) = password_hash {
            user.password_hash = hash.to_string();
        }
        Ok(Some(user.clone()))
    }

    async fn update_password(&self, id: Uuid, password_hash: &str) -> Result<bool, AppError> {
        let mut users = self.users.write().await;
        match users.get_mut(&id) {
            Some(user) => {
                user.password_hash = password_hash.to_string();
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

/// In-process task store. Tasks are kept in insertion order.
#[derive(Debug, Default)]
pub struct MemoryTaskRepository {
    tasks: RwLock<Vec<Task>>,
}

impl MemoryTaskRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TaskRepository for MemoryTaskRepository {
    async fn insert(&self, task: Task) -> Result<Task, AppError> {
        self.tasks.write().await.push(task.clone());
        Ok(task)
    }

    async fn list(&self, owner: Uuid) -> Result<Vec<Task>, AppError> {
        let tasks = self.tasks.read().await;
        // Reverse first so equal timestamps still come out newest-inserted first.
        let mut owned: Vec<Task> = tasks
            .iter()
            .rev()
            .filter(|task| task.owner == owner)
            .cloned()
            .collect();
        owned.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(owned)
    }

    async fn find(&self, owner: Uuid, id: Uuid) -> Result<Option<Task>, AppError> {
        let tasks = self.tasks.read().await;
        Ok(tasks
            .iter()
            .find(|task| task.id == id && task.owner == owner)
            .cloned())
    }

    async fn update(
        &self,
        owner: Uuid,
        id: Uuid,
        changes: TaskChanges,
    ) -> Result<Option<Task>, AppError> {
        let mut tasks = self.tasks.write().await;
        match tasks
            .iter_mut()
            .find(|task| task.id == id && task.owner == owner)
        {
            Some(task) => {
                task.apply(changes);
                Ok(Some(task.clone()))
            }
            None => Ok(None),
        }
    }

    async fn delete(&self, owner: Uuid, id: Uuid) -> Result<bool, AppError> {
        let mut tasks = self.tasks.write().await;
        let before = tasks.len();
        tasks.retain(|task| !(task.id == id && task.owner == owner));
        Ok(tasks.len() != before)
    }
}
