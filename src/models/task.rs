use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;
use uuid::Uuid;

use crate::error::AppError;

/// Represents the priority of a task.
/// Corresponds to the `task_priority` SQL enum.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default, sqlx::Type)]
#[sqlx(type_name = "task_priority", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum TaskPriority {
    #[default]
    Low,
    Medium,
    High,
}

/// Represents the status of a task.
/// Corresponds to the `task_status` SQL enum.
///
/// Independent of `Task::completed`; nothing keeps the two in agreement.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default, sqlx::Type)]
#[sqlx(type_name = "task_status", rename_all = "kebab-case")]
#[serde(rename_all = "kebab-case")]
pub enum TaskStatus {
    #[default]
    Pending,
    InProgress,
    Completed,
}

/// Represents a task as stored and returned by the API.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub priority: TaskPriority,
    pub due_date: Option<DateTime<Utc>>,
    /// Identifier of the user who created the task. Never changes.
    pub owner: Uuid,
    pub status: TaskStatus,
    pub completed: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Request body for `POST /api/tasks`.
///
/// Loosely-typed fields are kept as raw JSON until `NewTask::from_input` normalizes them.
/// Unknown keys (`owner`, `status`, `id`, ...) are dropped by serde.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskInput {
    pub title: Option<String>,
    pub description: Option<String>,
    pub priority: Option<Value>,
    pub due_date: Option<Value>,
    pub completed: Option<Value>,
}

/// Request body for `PUT /api/tasks/{id}`. Every field is optional.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub priority: Option<Value>,
    pub due_date: Option<Value>,
    pub status: Option<Value>,
    pub completed: Option<Value>,
}

/// A validated task ready to be stored; the owner is supplied by the scoped store.
#[derive(Debug, Clone, PartialEq)]
pub struct NewTask {
    pub title: String,
    pub description: String,
    pub priority: TaskPriority,
    pub due_date: Option<DateTime<Utc>>,
    pub completed: bool,
}

/// Validated changes for an update. `None` leaves the stored value as it is.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TaskChanges {
    pub title: Option<String>,
    pub description: Option<String>,
    pub priority: Option<TaskPriority>,
    pub due_date: Option<DateTime<Utc>>,
    pub status: Option<TaskStatus>,
    pub completed: Option<bool>,
}

/// The truthy-string rule for `completed`.
///
/// Only the exact strings `"True"` and `"Yes"` mean true. Every other value, including
/// lowercase `"yes"` and the JSON boolean `true`, is false. Clients depend on this
/// exact behaviour, so it is kept as is.
pub fn coerce_completed(raw: &Value) -> bool {
    matches!(raw.as_str(), Some("True") | Some("Yes"))
}

/// Lowercases a priority string and checks it against the allowed values.
pub fn normalize_priority(raw: &Value) -> Result<TaskPriority, AppError> {
    let text = raw
        .as_str()
        .ok_or_else(|| AppError::ValidationError("Priority must be a string".into()))?;
    match text.to_lowercase().as_str() {
        "low" => Ok(TaskPriority::Low),
        "medium" => Ok(TaskPriority::Medium),
        "high" => Ok(TaskPriority::High),
        _ => Err(AppError::ValidationError(
            "Priority must be one of low, medium or high".into(),
        )),
    }
}

/// Accepts an RFC 3339 timestamp or a plain `YYYY-MM-DD` date (midnight UTC).
pub fn parse_due_date(raw: &Value) -> Result<DateTime<Utc>, AppError> {
    let invalid = || AppError::ValidationError("Invalid due date".into());
    let text = raw.as_str().ok_or_else(invalid)?;
    if let Ok(ts) = DateTime::parse_from_rfc3339(text) {
        return Ok(ts.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| Utc.from_utc_datetime(&naive))
        .ok_or_else(invalid)
}

/// Status values are matched exactly.
pub fn parse_status(raw: &Value) -> Result<TaskStatus, AppError> {
    serde_json::from_value(raw.clone()).map_err(|_| {
        AppError::ValidationError("Status must be one of pending, in-progress or completed".into())
    })
}

fn required_title(title: &str) -> Result<String, AppError> {
    if title.trim().is_empty() {
        return Err(AppError::ValidationError("Title is required".into()));
    }
    Ok(title.to_string())
}

impl NewTask {
    pub fn from_input(input: TaskInput) -> Result<Self, AppError> {
        let title = required_title(input.title.as_deref().unwrap_or_default())?;
        let priority = match &input.priority {
            Some(raw) => normalize_priority(raw)?,
            None => TaskPriority::default(),
        };
        let due_date = input.due_date.as_ref().map(parse_due_date).transpose()?;
        Ok(Self {
            title,
            description: input.description.unwrap_or_default(),
            priority,
            due_date,
            completed: input.completed.as_ref().map_or(false, coerce_completed),
        })
    }
}

impl TaskChanges {
    pub fn from_patch(patch: TaskPatch) -> Result<Self, AppError> {
        Ok(Self {
            title: patch.title.as_deref().map(required_title).transpose()?,
            description: patch.description,
            priority: patch.priority.as_ref().map(normalize_priority).transpose()?,
            due_date: patch.due_date.as_ref().map(parse_due_date).transpose()?,
            status: patch.status.as_ref().map(parse_status).transpose()?,
            completed: patch.completed.as_ref().map(coerce_completed),
        })
    }
}

impl Task {
    /// Creates a new `Task` owned by `owner`, with status `pending` and fresh timestamps.
    pub fn new(input: NewTask, owner: Uuid) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            title: input.title,
            description: input.description,
            priority: input.priority,
            due_date: input.due_date,
            owner,
            status: TaskStatus::default(),
            completed: input.completed,
            created_at: now,
            updated_at: now,
        }
    }

    /// Applies validated changes and bumps `updated_at`. The owner is untouched.
    pub fn apply(&mut self, changes: TaskChanges) {
        if let Some(title) = changes.title {
            self.title = title;
        }
        if let Some(description) = changes.description {
            self.description = description;
        }
        if let Some(priority) = changes.priority {
            self.priority = priority;
        }
        if let Some(due_date) = changes.due_date {
            self.due_date = Some(due_date);
        }
        if let Some(status) = changes.status {
            self.status = status;
        }
        if let Some(completed) = changes.completed {
            self.completed = completed;
        }
        self.updated_at = Utc::now();
    }
}
