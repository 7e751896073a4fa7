use askama::Template;
use axum::Router;
use axum::http::{Method, StatusCode, header};
use axum::response::{Html, IntoResponse, Redirect, Response};
use axum::routing::get;
use migration::MigratorTrait;
use sea_orm::{Database, DatabaseConnection};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::config::Config;
use crate::contracts::RecordError;
use crate::task::service::TaskService;
use crate::task::web::create_task_page_router;
use crate::task::{TaskState, TaskStore};
use crate::user::service::UserService;
use crate::user::web::create_user_page_router;
use crate::user::{UserState, UserStore};
use crate::web::search::InvalidSearchTerm;

pub mod api;
pub mod search;

/// Everything the handlers share, assembled once at start-up.
#[derive(Clone)]
pub struct AppState {
    pub tasks: TaskState,
    pub users: UserState,
}

impl AppState {
    /// Wires stores and services over one connection pool.
    pub fn from_db(db: DatabaseConnection) -> Self {
        let task_service = Arc::new(TaskService::new(TaskStore::new(db.clone())));
        let user_service = Arc::new(UserService::new(UserStore::new(db)));
        Self {
            tasks: TaskState::from_service(task_service),
            users: UserState::from_service(user_service),
        }
    }
}

/// Custom error type for HTML page handlers.
#[derive(Debug, thiserror::Error)]
pub enum WebError {
    /// Represents an error during template rendering.
    /// The specific `askama::Error` is captured as the source of this error.
    #[error("Template rendering failed")]
    Template(#[from] askama::Error),
    #[error("Invalid search parameters")]
    InvalidSearch(#[from] InvalidSearchTerm),
    #[error("{0} not found")]
    NotFound(&'static str),
    /// Any other failure reported by a service.
    #[error("Service error: {0}")]
    Service(RecordError),
}

impl WebError {
    pub fn from_record(err: RecordError, entity: &'static str) -> Self {
        if err.is_not_found() {
            WebError::NotFound(entity)
        } else {
            WebError::Service(err)
        }
    }
}

impl IntoResponse for WebError {
    fn into_response(self) -> Response {
        let (status_code, user_facing_error_message) = match &self {
            WebError::InvalidSearch(_) => (
                StatusCode::BAD_REQUEST,
                "Invalid search parameters. Use 3 to 50 letters, digits, spaces, '.', '-' or '_'."
                    .to_string(),
            ),
            WebError::NotFound(entity) => (
                StatusCode::NOT_FOUND,
                format!("{entity} not found. It may have been deleted."),
            ),
            WebError::Template(_) | WebError::Service(_) => {
                tracing::error!("Failed to render page: {}", self);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "An unexpected error occurred while processing your request. Please try again later."
                        .to_string(),
                )
            }
        };

        let error_template =
            ErrorPageTemplate::new(status_code.as_u16(), user_facing_error_message);
        let Ok(rendered) = error_template.render() else {
            return StatusCode::INTERNAL_SERVER_ERROR.into_response();
        };
        (status_code, Html(rendered)).into_response()
    }
}

#[derive(Template)]
#[template(path = "error.html")]
struct ErrorPageTemplate {
    status: u16,
    message: String,
}

impl ErrorPageTemplate {
    pub fn new(status: u16, message: String) -> Self {
        Self { status, message }
    }
}

/// Builds the complete application router.
pub fn create_app(state: AppState) -> Router {
    Router::new()
        .route("/", get(|| async { Redirect::to("/web/tasks") }))
        .route("/health", get(health_check_handler))
        .merge(api::create_api_router(state.tasks.clone(), state.users.clone()))
        .merge(create_task_page_router(state.tasks))
        .merge(create_user_page_router(state.users))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(
                    CorsLayer::new()
                        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
                        .allow_headers([header::CONTENT_TYPE]),
                ),
        )
}

#[tracing::instrument(skip(config))]
pub async fn start_web_server(config: Config) -> anyhow::Result<()> {
    let server_address = format!("0.0.0.0:{}", &config.port);
    let listener = tokio::net::TcpListener::bind(&server_address).await?;
    tracing::info!("Web server running on http://{}", server_address);

    let db = Database::connect(&config.db_url).await?;
    migration::Migrator::up(&db, None).await?;
    tracing::info!("Database migrations applied successfully");

    let app = create_app(AppState::from_db(db));

    axum::serve(listener, app).await?;
    Ok(())
}

#[tracing::instrument]
pub async fn health_check_handler() -> &'static str {
    "OK"
}
