use async_trait::async_trait;
use sqlx::postgres::{PgPool, PgPoolOptions};
use uuid::Uuid;

use super::{TaskRepository, UserRepository};
use crate::error::AppError;
use crate::models::{NewUser, Task, TaskChanges, User};

const USER_COLUMNS: &str = "id, name, email, password_hash, created_at";
const TASK_COLUMNS: &str =
    "id, title, description, priority, due_date, owner, status, completed, created_at, updated_at";

/// Opens the pool and applies the embedded migrations.
pub async fn connect(database_url: &str, max_connections: u32) -> Result<PgPool, AppError> {
    let pool = PgPoolOptions::new()
        .max_connections(max_connections)
        .connect(database_url)
        .await?;
    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .map_err(|e| AppError::DatabaseError(format!("Migration failed: {}", e)))?;
    Ok(pool)
}

#[derive(Debug, Clone)]
pub struct PgUserRepository {
    pool: PgPool,
}

impl PgUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserRepository for PgUserRepository {
    async fn insert(&self, input: NewUser) -> Result<User, AppError> {
        let user = User::new(input);
        let sql = format!(
            "INSERT INTO users ({cols}) VALUES ($1, $2, $3, $4, $5) RETURNING {cols}",
            cols = USER_COLUMNS
        );
        let stored = sqlx::query_as::<_, User>(&sql)
            .bind(user.id)
            .bind(&user.name)
            .bind(&user.email)
            .bind(&user.password_hash)
            .bind(user.created_at)
            .fetch_one(&self.pool)
            .await?;
        Ok(stored)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, AppError> {
        let sql = format!("SELECT {} FROM users WHERE id = $1", USER_COLUMNS);
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        let sql = format!("SELECT {} FROM users WHERE email = $1", USER_COLUMNS);
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    async fn update_profile(
        &self,
        id: Uuid,
        name: &str,
        email: &str,
        password_hash: Option<&str>,
    ) -> Result<Option<User>, AppError> {
        let sql = format!(
            "UPDATE users SET name = $2, email = $3, password_hash = COALESCE($4, password_hash) \
             WHERE id = $1 RETURNING {}",
            USER_COLUMNS
        );
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(id)
            .bind(name)
            .bind(email)
            .bind(password_hash)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| match AppError::from(e) {
                AppError::Conflict(_) => AppError::Conflict("Email is already in use".into()),
                other => other,
            })?;
        Ok(user)
    }

    async fn update_password(&self, id: Uuid, password_hash: &str) -> Result<bool, AppError> {
        let result = sqlx::query("UPDATE users SET password_hash = $2 WHERE id = $1")
            .bind(id)
            .bind(password_hash)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

#[derive(Debug, Clone)]
pub struct PgTaskRepository {
    pool: PgPool,
}

impl PgTaskRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TaskRepository for PgTaskRepository {
    async fn insert(&self, task: Task) -> Result<Task, AppError> {
        let sql = format!(
            "INSERT INTO tasks ({cols}) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10) \
             RETURNING {cols}",
            cols = TASK_COLUMNS
        );
        let stored = sqlx::query_as::<_, Task>(&sql)
            .bind(task.id)
            .bind(&task.title)
            .bind(&task.description)
            .bind(task.priority)
            .bind(task.due_date)
            .bind(task.owner)
            .bind(task.status)
            .bind(task.completed)
            .bind(task.created_at)
            .bind(task.updated_at)
            .fetch_one(&self.pool)
            .await?;
        Ok(stored)
    }

    async fn list(&self, owner: Uuid) -> Result<Vec<Task>, AppError> {
        let sql = format!(
            "SELECT {} FROM tasks WHERE owner = $1 ORDER BY created_at DESC",
            TASK_COLUMNS
        );
        let tasks = sqlx::query_as::<_, Task>(&sql)
            .bind(owner)
            .fetch_all(&self.pool)
            .await?;
        Ok(tasks)
    }

    async fn find(&self, owner: Uuid, id: Uuid) -> Result<Option<Task>, AppError> {
        let sql = format!(
            "SELECT {} FROM tasks WHERE id = $1 AND owner = $2",
            TASK_COLUMNS
        );
        let task = sqlx::query_as::<_, Task>(&sql)
            .bind(id)
            .bind(owner)
            .fetch_optional(&self.pool)
            .await?;
        Ok(task)
    }

    async fn update(
        &self,
        owner: Uuid,
        id: Uuid,
        changes: TaskChanges,
    ) -> Result<Option<Task>, AppError> {
        let sql = format!(
            "UPDATE tasks SET \
                title = COALESCE($3, title), \
                description = COALESCE($4, description), \
                priority = COALESCE($5, priority), \
                due_date = COALESCE($6, due_date), \
                status = COALESCE($7, status), \
                completed = COALESCE($8, completed), \
                updated_at = NOW() \
             WHERE id = $1 AND owner = $2 \
             RETURNING {}",
            TASK_COLUMNS
        );
        let task = sqlx::query_as::<_, Task>(&sql)
            .bind(id)
            .bind(owner)
            .bind(changes.title)
            .bind(changes.description)
            .bind(changes.priority)
            .bind(changes.due_date)
            .bind(changes.status)
            .bind(changes.completed)
            .fetch_optional(&self.pool)
            .await?;
        Ok(task)
    }

    async fn delete(&self, owner: Uuid, id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM tasks WHERE id = $1 AND owner = $2")
            .bind(id)
            .bind(owner)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
