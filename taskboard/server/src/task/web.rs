use askama::Template;
use axum::{
    Router,
    extract::{Path, Query, State},
    response::Html,
    routing::get,
};
use sea_orm::ActiveEnum;
use std::sync::Arc;
use uuid::Uuid;

use crate::contracts::{GetAll, GetById, GetByParams};
use crate::convert::datetime_to_iso;
use crate::task::{Task, TaskState};
use crate::web::WebError;
use crate::web::search::{SearchQuery, SearchTerm};

const ENTITY: &str = "Task";

/// A task prepared for display.
#[derive(Debug)]
struct TaskRow {
    task_id: String,
    title: String,
    description: String,
    start_time: String,
    end_time: String,
    priority: String,
    status: String,
}

impl From<Task> for TaskRow {
    fn from(task: Task) -> Self {
        let format_time = |time: Option<chrono::DateTime<chrono::Utc>>| {
            time.as_ref().map(datetime_to_iso).unwrap_or_default()
        };
        Self {
            task_id: task.task_id().to_string(),
            title: task.title().to_string(),
            description: task.description().to_string(),
            start_time: format_time(task.start_time()),
            end_time: format_time(task.end_time()),
            priority: task.priority().to_value(),
            status: task.status().to_value(),
        }
    }
}

#[derive(Template)]
#[template(path = "tasks/index.html")]
struct TasksTemplate {
    tasks: Vec<TaskRow>,
    search: String,
}

impl TasksTemplate {
    pub fn new(tasks: Vec<Task>, search: String) -> Self {
        Self {
            tasks: tasks.into_iter().map(TaskRow::from).collect(),
            search,
        }
    }
}

#[derive(Template)]
#[template(path = "tasks/detail.html")]
struct TaskDetailTemplate {
    task: TaskRow,
}

impl TaskDetailTemplate {
    pub fn new(task: Task) -> Self {
        Self {
            task: TaskRow::from(task),
        }
    }
}

#[derive(Template)]
#[template(path = "tasks/new.html")]
struct NewTaskTemplate;

/// Handler for GET /web/tasks that renders the task table with a search form.
#[tracing::instrument(skip(get_all, get_by_params))]
async fn tasks_page_handler(
    State(get_all): State<Arc<dyn GetAll<Task>>>,
    State(get_by_params): State<Arc<dyn GetByParams<Task>>>,
    Query(query): Query<SearchQuery>,
) -> Result<Html<String>, WebError> {
    let tasks = match SearchTerm::from_query(&query)? {
        Some(term) => get_by_params.get_by_params(term.as_str()).await,
        None => get_all.get_all().await,
    }
    .map_err(|err| WebError::from_record(err, ENTITY))?;
    let template = TasksTemplate::new(tasks, query.search.unwrap_or_default());
    template.render().map(Html).map_err(WebError::from)
}

/// Handler for GET /web/tasks/new that renders the task creation form.
#[tracing::instrument]
async fn new_task_page_handler() -> Result<Html<String>, WebError> {
    let template = NewTaskTemplate;
    template.render().map(Html).map_err(WebError::from)
}

/// Handler for GET /web/tasks/{id} that renders a single task.
#[tracing::instrument(skip(get_by_id))]
async fn task_detail_page_handler(
    State(get_by_id): State<Arc<dyn GetById<Task>>>,
    Path(id): Path<String>,
) -> Result<Html<String>, WebError> {
    let id = Uuid::parse_str(&id).map_err(|_| WebError::NotFound(ENTITY))?;
    let task = get_by_id
        .get_by_id(id)
        .await
        .map_err(|err| WebError::from_record(err, ENTITY))?;
    let template = TaskDetailTemplate::new(task);
    template.render().map(Html).map_err(WebError::from)
}

/// Creates and returns the router with the browser-facing task pages.
pub fn create_task_page_router(state: TaskState) -> Router {
    Router::new()
        .route("/web/tasks", get(tasks_page_handler))
        .route("/web/tasks/new", get(new_task_page_handler))
        .route("/web/tasks/{id}", get(task_detail_page_handler))
        .with_state(state)
}
