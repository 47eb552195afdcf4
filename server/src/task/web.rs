use axum::{
    Router,
    extract::rejection::JsonRejection,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::{delete, get, patch, put},
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;

use crate::task::{Task, TaskDraft, TaskStore, TaskStoreError};

const DEFAULT_PRIORITY: &str = "medium";

/// Shared state for task routes.
#[derive(Clone)]
pub struct TaskState {
    pub store: Arc<dyn TaskStore>,
}

/// Incoming JSON payload for creating or updating a task.
///
/// All fields are optional at the deserialization stage so that validation
/// can name the offending field instead of surfacing a serde error.
#[derive(Debug, Deserialize, ToSchema)]
pub struct TaskPayload {
    /// Short title describing the task
    title: Option<String>,
    /// Optional longer description
    description: Option<String>,
    /// Free-form priority tag, defaults to "medium"
    priority: Option<String>,
}

impl TaskPayload {
    /// Validates the payload and produces a [`TaskDraft`].
    fn validate(self) -> Result<TaskDraft, ValidationError> {
        let title = self.title.ok_or(ValidationError::MissingField("title"))?;
        if title.is_empty() {
            return Err(ValidationError::EmptyField("title"));
        }

        Ok(TaskDraft {
            title,
            description: self.description,
            priority: self
                .priority
                .unwrap_or_else(|| DEFAULT_PRIORITY.to_string()),
        })
    }
}

/// Error type for payload validation failures.
#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    #[error("Field '{0}' is required")]
    MissingField(&'static str),
    #[error("Field '{0}' must not be empty")]
    EmptyField(&'static str),
    #[error("Malformed request body: {0}")]
    MalformedBody(String),
}

/// JSON representation of a Task for API responses.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct TaskJson {
    /// Unique identifier for the task
    id: i32,
    /// Short title describing the task
    title: String,
    /// Optional longer description
    description: Option<String>,
    /// Free-form priority tag
    priority: String,
    /// Whether the task has been completed
    completed: bool,
    /// Creation timestamp, assigned by the store
    created_at: chrono::DateTime<chrono::Utc>,
}

impl From<Task> for TaskJson {
    fn from(task: Task) -> Self {
        Self {
            id: task.id(),
            title: task.title().to_string(),
            description: task.description().map(|description| description.to_string()),
            priority: task.priority().to_string(),
            completed: task.completed(),
            created_at: task.created_at(),
        }
    }
}

/// JSON response carrying a human-readable confirmation message.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct MessageResponse {
    /// Confirmation message
    pub message: String,
}

/// JSON response for API errors.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    /// Machine-readable error code
    pub error: String,
    /// Human-readable description of the failure
    pub message: String,
}

/// Custom error type for task handler operations.
#[derive(Debug, thiserror::Error)]
pub enum TaskApiError {
    /// Represents a payload validation failure.
    #[error("{0}")]
    Validation(#[from] ValidationError),
    /// Represents an unknown task ID.
    #[error("Task not found")]
    NotFound,
    /// Represents a task store failure.
    #[error("Task store failure")]
    Store(TaskStoreError),
}

impl From<TaskStoreError> for TaskApiError {
    fn from(err: TaskStoreError) -> Self {
        match err {
            TaskStoreError::TaskNotFound(_) => TaskApiError::NotFound,
            other => TaskApiError::Store(other),
        }
    }
}

impl IntoResponse for TaskApiError {
    fn into_response(self) -> axum::response::Response {
        let (status_code, error, message) = match &self {
            TaskApiError::Validation(err) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "VALIDATION_ERROR",
                err.to_string(),
            ),
            TaskApiError::NotFound => {
                (StatusCode::NOT_FOUND, "NOT_FOUND", "Task not found".to_string())
            }
            TaskApiError::Store(err) => {
                tracing::error!("Task store failure: {}", err);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_SERVER_ERROR",
                    "An unexpected error occurred while processing your request. Please try again later."
                        .to_string(),
                )
            }
        };

        (
            status_code,
            Json(ErrorResponse {
                error: error.to_string(),
                message,
            }),
        )
            .into_response()
    }
}

/// Turns the raw extraction result into a validated draft, reporting
/// malformed bodies and missing fields as validation failures.
fn validated_draft(
    payload: Result<Json<TaskPayload>, JsonRejection>,
) -> Result<TaskDraft, ValidationError> {
    let Json(payload) =
        payload.map_err(|rejection| ValidationError::MalformedBody(rejection.body_text()))?;
    payload.validate()
}

/// Handler for GET /tasks - Returns all tasks in JSON format.
#[tracing::instrument(skip(state))]
#[utoipa::path(
    get,
    path = "/tasks",
    responses(
        (status = 200, description = "Successfully retrieved tasks", body = [TaskJson]),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "Tasks"
)]
pub async fn list_tasks_handler(
    State(state): State<Arc<TaskState>>,
) -> Result<Json<Vec<TaskJson>>, TaskApiError> {
    let tasks = state.store.list().await?;
    Ok(Json(tasks.into_iter().map(TaskJson::from).collect()))
}

/// Handler for POST /tasks - Creates a new task.
#[tracing::instrument(skip(state, payload))]
#[utoipa::path(
    post,
    path = "/tasks",
    request_body = TaskPayload,
    responses(
        (status = 201, description = "Task created", body = TaskJson),
        (status = 422, description = "Validation failure", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "Tasks"
)]
pub async fn create_task_handler(
    State(state): State<Arc<TaskState>>,
    payload: Result<Json<TaskPayload>, JsonRejection>,
) -> Result<(StatusCode, Json<TaskJson>), TaskApiError> {
    let draft = validated_draft(payload)?;
    let task = state.store.insert(draft).await?;
    Ok((StatusCode::CREATED, Json(TaskJson::from(task))))
}

/// Handler for PUT /task/{id} - Replaces the caller-supplied fields of a task.
#[tracing::instrument(skip(state, payload))]
#[utoipa::path(
    put,
    path = "/task/{id}",
    request_body = TaskPayload,
    params(
        ("id" = i32, Path, description = "ID of the task to update")
    ),
    responses(
        (status = 200, description = "Task updated", body = TaskJson),
        (status = 404, description = "Task not found", body = ErrorResponse),
        (status = 422, description = "Validation failure", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "Tasks"
)]
pub async fn update_task_handler(
    State(state): State<Arc<TaskState>>,
    Path(id): Path<i32>,
    payload: Result<Json<TaskPayload>, JsonRejection>,
) -> Result<Json<TaskJson>, TaskApiError> {
    let draft = validated_draft(payload)?;
    let task = state.store.update(id, draft).await?;
    Ok(Json(TaskJson::from(task)))
}

/// Handler for PATCH /tasks/{id}/complete - Flips the completion flag.
#[tracing::instrument(skip(state))]
#[utoipa::path(
    patch,
    path = "/tasks/{id}/complete",
    params(
        ("id" = i32, Path, description = "ID of the task to toggle")
    ),
    responses(
        (status = 200, description = "Completion flag toggled", body = TaskJson),
        (status = 404, description = "Task not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "Tasks"
)]
pub async fn toggle_task_handler(
    State(state): State<Arc<TaskState>>,
    Path(id): Path<i32>,
) -> Result<Json<TaskJson>, TaskApiError> {
    let task = state.store.toggle_completed(id).await?;
    Ok(Json(TaskJson::from(task)))
}

/// Handler for DELETE /tasks/{id} - Removes a task permanently.
#[tracing::instrument(skip(state))]
#[utoipa::path(
    delete,
    path = "/tasks/{id}",
    params(
        ("id" = i32, Path, description = "ID of the task to delete")
    ),
    responses(
        (status = 200, description = "Task deleted", body = MessageResponse),
        (status = 404, description = "Task not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "Tasks"
)]
pub async fn delete_task_handler(
    State(state): State<Arc<TaskState>>,
    Path(id): Path<i32>,
) -> Result<Json<MessageResponse>, TaskApiError> {
    state.store.delete(id).await?;
    Ok(Json(MessageResponse {
        message: "Task deleted successfully".to_string(),
    }))
}

/// Creates and returns the task API router.
pub fn create_task_router(state: TaskState) -> Router {
    Router::new()
        .route(
            "/tasks",
            get(list_tasks_handler).post(create_task_handler),
        )
        .route("/task/{id}", put(update_task_handler))
        .route("/tasks/{id}/complete", patch(toggle_task_handler))
        .route("/tasks/{id}", delete(delete_task_handler))
        .with_state(Arc::new(state))
}
