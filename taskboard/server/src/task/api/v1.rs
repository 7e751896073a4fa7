use crate::contracts::{Create, Delete, GetAll, GetById, GetByParams, Update};
use crate::convert::{datetime_to_iso, json_decode};
use crate::task::{Priority, Status, Task, TaskDraft, TaskState};
use crate::web::api::{ApiError, ErrorResponse, MessageResponse};
use crate::web::search::{SearchQuery, SearchTerm};
use axum::{
    Router,
    body::Bytes,
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
    routing::{get, post},
};
use serde::Serialize;
use std::sync::Arc;
use utoipa::ToSchema;
use uuid::Uuid;

const ENTITY: &str = "Task";

/// JSON representation of a Task for API responses.
#[derive(Debug, Serialize, ToSchema)]
pub struct TaskJson {
    /// Unique identifier for the task
    task_id: Uuid,
    /// Short title, 1 to 50 characters
    title: String,
    /// Free-form description
    description: String,
    /// Start time as `YYYY-MM-DDTHH:MM`
    start_time: Option<String>,
    /// End time as `YYYY-MM-DDTHH:MM`
    end_time: Option<String>,
    priority: Priority,
    status: Status,
}

impl From<Task> for TaskJson {
    fn from(task: Task) -> Self {
        Self {
            task_id: task.task_id(),
            title: task.title().to_string(),
            description: task.description().to_string(),
            start_time: task.start_time().as_ref().map(datetime_to_iso),
            end_time: task.end_time().as_ref().map(datetime_to_iso),
            priority: task.priority(),
            status: task.status(),
        }
    }
}

/// API response carrying a single task.
#[derive(Debug, Serialize, ToSchema)]
pub struct TaskResponse {
    success: bool,
    data: TaskJson,
}

impl From<Task> for TaskResponse {
    fn from(task: Task) -> Self {
        Self {
            success: true,
            data: TaskJson::from(task),
        }
    }
}

/// API response carrying a list of tasks.
#[derive(Debug, Serialize, ToSchema)]
pub struct TasksResponse {
    success: bool,
    data: Vec<TaskJson>,
}

impl From<Vec<Task>> for TasksResponse {
    fn from(tasks: Vec<Task>) -> Self {
        Self {
            success: true,
            data: tasks.into_iter().map(TaskJson::from).collect(),
        }
    }
}

/// Parses a path id. An id that is not a UUID cannot name a task.
fn parse_task_id(id: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(id).map_err(|_| ApiError::NotFound(ENTITY))
}

/// Handler for GET /tasks - Lists every task, or those matching `search`.
#[tracing::instrument(skip(get_all, get_by_params))]
#[utoipa::path(
    get,
    path = "/tasks",
    params(SearchQuery),
    responses(
        (status = 200, description = "Successfully retrieved tasks", body = TasksResponse),
        (status = 400, description = "Invalid search parameters", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "Tasks"
)]
pub async fn list_tasks_handler(
    State(get_all): State<Arc<dyn GetAll<Task>>>,
    State(get_by_params): State<Arc<dyn GetByParams<Task>>>,
    Query(query): Query<SearchQuery>,
) -> Result<Json<TasksResponse>, ApiError> {
    let tasks = match SearchTerm::from_query(&query)? {
        Some(term) => get_by_params.get_by_params(term.as_str()).await,
        None => get_all.get_all().await,
    }
    .map_err(|err| ApiError::from_record(err, ENTITY, "list tasks"))?;

    Ok(Json(TasksResponse::from(tasks)))
}

/// Handler for GET /tasks/{id} - Returns a single task.
#[tracing::instrument(skip(get_by_id))]
#[utoipa::path(
    get,
    path = "/tasks/{id}",
    params(("id" = String, Path, description = "Task identifier (UUID)")),
    responses(
        (status = 200, description = "Successfully retrieved task", body = TaskResponse),
        (status = 404, description = "Task not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "Tasks"
)]
pub async fn get_task_handler(
    State(get_by_id): State<Arc<dyn GetById<Task>>>,
    Path(id): Path<String>,
) -> Result<Json<TaskResponse>, ApiError> {
    let id = parse_task_id(&id)?;
    let task = get_by_id
        .get_by_id(id)
        .await
        .map_err(|err| ApiError::from_record(err, ENTITY, "get task"))?;

    Ok(Json(TaskResponse::from(task)))
}

/// Handler for POST /tasks/create - Creates a task from a JSON body.
#[tracing::instrument(skip(create, body))]
#[utoipa::path(
    post,
    path = "/tasks/create",
    request_body = TaskDraft,
    responses(
        (status = 201, description = "Task created", body = TaskResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "Tasks"
)]
pub async fn create_task_handler(
    State(create): State<Arc<dyn Create<Task, TaskDraft>>>,
    body: Bytes,
) -> Result<(StatusCode, Json<TaskResponse>), ApiError> {
    let data: TaskDraft = json_decode(&body)?;
    let task = create
        .create(data)
        .await
        .map_err(|err| ApiError::from_record(err, ENTITY, "create task"))?;

    Ok((StatusCode::CREATED, Json(TaskResponse::from(task))))
}

/// Handler for PUT /tasks/{id} - Replaces the fields of a task.
#[tracing::instrument(skip(update, body))]
#[utoipa::path(
    put,
    path = "/tasks/{id}",
    params(("id" = String, Path, description = "Task identifier (UUID)")),
    request_body = TaskDraft,
    responses(
        (status = 200, description = "Task updated", body = TaskResponse),
        (status = 404, description = "Task not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "Tasks"
)]
pub async fn update_task_handler(
    State(update): State<Arc<dyn Update<Task, TaskDraft>>>,
    Path(id): Path<String>,
    body: Bytes,
) -> Result<Json<TaskResponse>, ApiError> {
    let id = parse_task_id(&id)?;
    let data: TaskDraft = json_decode(&body)?;
    let task = update
        .update(id, data)
        .await
        .map_err(|err| ApiError::from_record(err, ENTITY, "update task"))?;

    Ok(Json(TaskResponse::from(task)))
}

/// Handler for DELETE /tasks/{id} - Deletes a task.
#[tracing::instrument(skip(delete))]
#[utoipa::path(
    delete,
    path = "/tasks/{id}",
    params(("id" = String, Path, description = "Task identifier (UUID)")),
    responses(
        (status = 204, description = "Task deleted", body = MessageResponse),
        (status = 404, description = "Task not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "Tasks"
)]
pub async fn delete_task_handler(
    State(delete): State<Arc<dyn Delete>>,
    Path(id): Path<String>,
) -> Result<(StatusCode, Json<MessageResponse>), ApiError> {
    let id = parse_task_id(&id)?;
    delete
        .delete(id)
        .await
        .map_err(|err| ApiError::from_record(err, ENTITY, "delete task"))?;

    Ok((StatusCode::NO_CONTENT, Json(MessageResponse::new("Task deleted"))))
}

/// Creates and returns the tasks API router.
pub fn create_api_router(state: TaskState) -> Router {
    Router::new()
        .route("/tasks", get(list_tasks_handler))
        .route("/tasks/create", post(create_task_handler))
        .route(
            "/tasks/{id}",
            get(get_task_handler)
                .put(update_task_handler)
                .delete(delete_task_handler),
        )
        .with_state(state)
}
