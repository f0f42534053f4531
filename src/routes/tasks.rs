use crate::{
    auth::AuthenticatedUser,
    error::AppError,
    models::{TaskInput, TaskPatch},
    tasks::{parse_task_id, TaskStore},
};
use actix_web::{delete, get, post, put, web, HttpResponse, Responder};
use serde_json::json;

/// Lists the caller's tasks, newest first.
///
/// ## Responses:
/// - `200 OK`: `{ "success": true, "tasks": [...] }`
/// - `401 Unauthorized`: missing or invalid token.
#[get("")]
pub async fn get_tasks(
    store: web::Data<TaskStore>,
    caller: AuthenticatedUser,
) -> Result<impl Responder, AppError> {
    let tasks = store.for_owner(caller).list().await?;
    Ok(HttpResponse::Ok().json(json!({ "success": true, "tasks": tasks })))
}

/// Creates a task owned by the caller.
///
/// ## Request Body:
/// - `title` (required)
/// - `description`, `priority`, `dueDate`, `completed` (optional)
///
/// `priority` is matched case-insensitively. `completed` is true only for the strings
/// `"True"` and `"Yes"`. An `owner` in the body is ignored.
///
/// ## Responses:
/// - `201 Created`: `{ "success": true, "task": {...} }`
/// - `400 Bad Request`: missing title, unknown priority or unparsable due date.
/// - `401 Unauthorized`
#[post("")]
pub async fn create_task(
    store: web::Data<TaskStore>,
    caller: AuthenticatedUser,
    task_data: web::Json<TaskInput>,
) -> Result<impl Responder, AppError> {
    let task = store.for_owner(caller).create(task_data.into_inner()).await?;
    Ok(HttpResponse::Created().json(json!({ "success": true, "task": task })))
}

/// Fetches one of the caller's tasks.
///
/// A task owned by someone else answers exactly like a missing one: `404 Not Found`.
#[get("/{id}")]
pub async fn get_task(
    store: web::Data<TaskStore>,
    caller: AuthenticatedUser,
    task_id: web::Path<String>,
) -> Result<impl Responder, AppError> {
    let id = parse_task_id(&task_id)?;
    let task = store.for_owner(caller).get(id).await?;
    Ok(HttpResponse::Ok().json(json!({ "success": true, "task": task })))
}

/// Applies a partial update to one of the caller's tasks.
///
/// Only the fields present in the body change. The owner cannot be changed.
#[put("/{id}")]
pub async fn update_task(
    store: web::Data<TaskStore>,
    caller: AuthenticatedUser,
    task_id: web::Path<String>,
    task_data: web::Json<TaskPatch>,
) -> Result<impl Responder, AppError> {
    let id = parse_task_id(&task_id)?;
    let task = store
        .for_owner(caller)
        .update(id, task_data.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(json!({ "success": true, "task": task })))
}

/// Deletes one of the caller's tasks.
///
/// ## Responses:
/// - `204 No Content`: on success.
/// - `401 Unauthorized`
/// - `404 Not Found`: missing or not owned by the caller.
#[delete("/{id}")]
pub async fn delete_task(
    store: web::Data<TaskStore>,
    caller: AuthenticatedUser,
    task_id: web::Path<String>,
) -> Result<impl Responder, AppError> {
    let id = parse_task_id(&task_id)?;
    store.for_owner(caller).delete(id).await?;
    Ok(HttpResponse::NoContent().finish())
}
