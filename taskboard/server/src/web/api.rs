use axum::{
    Json, Router,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};
use serde::Serialize;
use utoipa::{OpenApi, ToSchema};

use crate::contracts::RecordError;
use crate::convert::ConversionError;
use crate::task::TaskState;
use crate::user::UserState;
use crate::web::search::InvalidSearchTerm;

/// Body of every failed JSON API response.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    /// Always `false`
    success: bool,
    /// Human-readable error message
    error: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            success: false,
            error: error.into(),
        }
    }
}

/// Body of a successful response that carries no record.
#[derive(Debug, Serialize, ToSchema)]
pub struct MessageResponse {
    /// Always `true`
    success: bool,
    /// Human-readable outcome
    message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
        }
    }
}

/// Error type for JSON API handlers.
///
/// The `Display` text of each variant is the exact message sent to the client.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The `search` query parameter did not match the search pattern.
    #[error("Invalid search parameters")]
    InvalidSearch(#[from] InvalidSearchTerm),
    /// The requested record does not exist.
    #[error("{0} not found")]
    NotFound(&'static str),
    /// Anything else. The cause has already been logged.
    #[error("Internal Server Error")]
    Internal,
}

impl ApiError {
    /// Maps a contract error to its client-facing form.
    ///
    /// `NotFound` keeps its meaning; every other error is logged and hidden.
    pub fn from_record(err: RecordError, entity: &'static str, operation: &str) -> Self {
        match err {
            RecordError::NotFound { .. } => ApiError::NotFound(entity),
            other => {
                tracing::error!("Failed to {}: {}", operation, other);
                ApiError::Internal
            }
        }
    }

    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::InvalidSearch(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<ConversionError> for ApiError {
    fn from(err: ConversionError) -> Self {
        tracing::error!("Failed to decode request body: {}", err);
        ApiError::Internal
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status_code(), Json(ErrorResponse::new(self.to_string()))).into_response()
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::task::api::v1::list_tasks_handler,
        crate::task::api::v1::get_task_handler,
        crate::task::api::v1::create_task_handler,
        crate::task::api::v1::update_task_handler,
        crate::task::api::v1::delete_task_handler,
        crate::user::api::v1::list_users_handler,
        crate::user::api::v1::get_user_handler,
        crate::user::api::v1::create_user_handler,
        crate::user::api::v1::update_user_handler,
        crate::user::api::v1::delete_user_handler,
    ),
    components(schemas(ErrorResponse, MessageResponse)),
    tags(
        (name = "Tasks", description = "Task management"),
        (name = "Users", description = "User management"),
    )
)]
pub struct ApiDoc;

async fn openapi_handler() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

/// Creates the JSON API routes for every resource plus the OpenAPI document.
pub fn create_api_router(task_state: TaskState, user_state: UserState) -> Router {
    Router::new()
        .merge(crate::task::api::v1::create_api_router(task_state))
        .merge(crate::user::api::v1::create_api_router(user_state))
        .route("/api-docs/openapi.json", get(openapi_handler))
}
