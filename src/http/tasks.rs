//! Handlers for `/tasks` CRUD routes.
//!
//! Body deserialization failures are caught via `JsonRejection` so that
//! malformed payloads produce a 422 with a `{"detail": ...}` body instead
//! of axum's default rejection.

use axum::{
    Json,
    extract::rejection::JsonRejection,
    extract::{Path, State},
    http::StatusCode,
};
use serde::Deserialize;

use crate::domain::{NewTask, Task, task};
use crate::store::TaskStore;

use super::{ApiError, AppState};

// ── Request types ─────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub(super) struct TaskCreate {
    title: String,
    #[serde(default)]
    description: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(super) struct TaskUpdate {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    description: Option<String>,
}

type BodyResult<T> = Result<Json<T>, JsonRejection>;

fn body<T>(payload: BodyResult<T>) -> Result<T, ApiError> {
    match payload {
        Ok(Json(value)) => Ok(value),
        Err(rejection) => Err(ApiError::Validation(rejection.body_text())),
    }
}

// ── Handlers ──────────────────────────────────────────────────────────────────

/// GET /tasks — all tasks in creation order.
pub(super) async fn list(State(state): State<AppState>) -> Result<Json<Vec<Task>>, ApiError> {
    Ok(Json(state.store.get_all()?))
}

/// POST /tasks — create, 201 on success.
pub(super) async fn create(
    State(state): State<AppState>,
    payload: BodyResult<TaskCreate>,
) -> Result<(StatusCode, Json<Task>), ApiError> {
    let req = body(payload)?;
    let new = NewTask::new(&req.title, req.description.as_deref())?;
    let created = state.store.add(new)?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// GET /tasks/{task_id}
pub(super) async fn get_one(
    State(state): State<AppState>,
    Path(task_id): Path<i64>,
) -> Result<Json<Task>, ApiError> {
    let found = state.store.get_by_id(task_id)?;
    found.map(Json).ok_or_else(|| not_found(task_id))
}

/// PUT /tasks/{task_id} — partial update; absent fields stay untouched.
pub(super) async fn update(
    State(state): State<AppState>,
    Path(task_id): Path<i64>,
    payload: BodyResult<TaskUpdate>,
) -> Result<Json<Task>, ApiError> {
    let req = body(payload)?;
    let Some(mut found) = state.store.get_by_id(task_id)? else {
        return Err(not_found(task_id));
    };

    if let Some(title) = req.title {
        found.title = task::validate_title(&title)?;
    }
    if let Some(description) = req.description {
        found.description = task::validate_description(Some(&description))?;
    }

    Ok(Json(state.store.update(&found)?))
}

/// DELETE /tasks/{task_id} — 204 on success.
pub(super) async fn remove(
    State(state): State<AppState>,
    Path(task_id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    if state.store.delete(task_id)? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(not_found(task_id))
    }
}

/// PATCH /tasks/{task_id}/complete
pub(super) async fn complete(
    State(state): State<AppState>,
    Path(task_id): Path<i64>,
) -> Result<Json<Task>, ApiError> {
    let Some(mut found) = state.store.get_by_id(task_id)? else {
        return Err(not_found(task_id));
    };
    found.mark_complete();
    Ok(Json(state.store.update(&found)?))
}

fn not_found(task_id: i64) -> ApiError {
    ApiError::NotFound(format!("Task with ID {task_id} not found"))
}
