use crate::contracts::{Create, Delete, GetAll, GetById, GetByParams, Update};
use crate::convert::{datetime_to_iso, json_decode};
use crate::user::{Gender, User, UserDraft, UserState};
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

const ENTITY: &str = "User";

/// JSON representation of a User for API responses.
#[derive(Debug, Serialize, ToSchema)]
pub struct UserJson {
    user_id: Uuid,
    name: String,
    gender: Gender,
    age: i32,
    /// Join time as `YYYY-MM-DDTHH:MM`
    joined_at: Option<String>,
    is_active: bool,
    obs: String,
}

impl From<User> for UserJson {
    fn from(user: User) -> Self {
        Self {
            user_id: user.user_id(),
            name: user.name().to_string(),
            gender: user.gender(),
            age: user.age(),
            joined_at: user.joined_at().as_ref().map(datetime_to_iso),
            is_active: user.is_active(),
            obs: user.obs().to_string(),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct UserResponse {
    success: bool,
    data: UserJson,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            success: true,
            data: UserJson::from(user),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct UsersResponse {
    success: bool,
    data: Vec<UserJson>,
}

impl From<Vec<User>> for UsersResponse {
    fn from(users: Vec<User>) -> Self {
        Self {
            success: true,
            data: users.into_iter().map(UserJson::from).collect(),
        }
    }
}

fn parse_user_id(id: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(id).map_err(|_| ApiError::NotFound(ENTITY))
}

/// Handler for GET /users - Lists every user, or those matching `search`.
#[tracing::instrument(skip(get_all, get_by_params))]
#[utoipa::path(
    get,
    path = "/users",
    params(SearchQuery),
    responses(
        (status = 200, description = "Successfully retrieved users", body = UsersResponse),
        (status = 400, description = "Invalid search parameters", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "Users"
)]
pub async fn list_users_handler(
    State(get_all): State<Arc<dyn GetAll<User>>>,
    State(get_by_params): State<Arc<dyn GetByParams<User>>>,
    Query(query): Query<SearchQuery>,
) -> Result<Json<UsersResponse>, ApiError> {
    let users = match SearchTerm::from_query(&query)? {
        Some(term) => get_by_params.get_by_params(term.as_str()).await,
        None => get_all.get_all().await,
    }
    .map_err(|err| ApiError::from_record(err, ENTITY, "list users"))?;

    Ok(Json(UsersResponse::from(users)))
}

/// Handler for GET /users/{id}
#[tracing::instrument(skip(get_by_id))]
#[utoipa::path(
    get,
    path = "/users/{id}",
    params(("id" = String, Path, description = "User identifier (UUID)")),
    responses(
        (status = 200, description = "Successfully retrieved user", body = UserResponse),
        (status = 404, description = "User not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "Users"
)]
pub async fn get_user_handler(
    State(get_by_id): State<Arc<dyn GetById<User>>>,
    Path(id): Path<String>,
) -> Result<Json<UserResponse>, ApiError> {
    let id = parse_user_id(&id)?;
    let user = get_by_id
        .get_by_id(id)
        .await
        .map_err(|err| ApiError::from_record(err, ENTITY, "get user"))?;

    Ok(Json(UserResponse::from(user)))
}

/// Handler for POST /users/create
#[tracing::instrument(skip(create, body))]
#[utoipa::path(
    post,
    path = "/users/create",
    request_body = UserDraft,
    responses(
        (status = 201, description = "User created", body = UserResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "Users"
)]
pub async fn create_user_handler(
    State(create): State<Arc<dyn Create<User, UserDraft>>>,
    body: Bytes,
) -> Result<(StatusCode, Json<UserResponse>), ApiError> {
    let data: UserDraft = json_decode(&body)?;
    let user = create
        .create(data)
        .await
        .map_err(|err| ApiError::from_record(err, ENTITY, "create user"))?;

    Ok((StatusCode::CREATED, Json(UserResponse::from(user))))
}

/// Handler for PUT /users/{id}
#[tracing::instrument(skip(update, body))]
#[utoipa::path(
    put,
    path = "/users/{id}",
    params(("id" = String, Path, description = "User identifier (UUID)")),
    request_body = UserDraft,
    responses(
        (status = 200, description = "User updated", body = UserResponse),
        (status = 404, description = "User not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "Users"
)]
pub async fn update_user_handler(
    State(update): State<Arc<dyn Update<User, UserDraft>>>,
    Path(id): Path<String>,
    body: Bytes,
) -> Result<Json<UserResponse>, ApiError> {
    let id = parse_user_id(&id)?;
    let data: UserDraft = json_decode(&body)?;
    let user = update
        .update(id, data)
        .await
        .map_err(|err| ApiError::from_record(err, ENTITY, "update user"))?;

    Ok(Json(UserResponse::from(user)))
}

/// Handler for DELETE /users/{id}
#[tracing::instrument(skip(delete))]
#[utoipa::path(
    delete,
    path = "/users/{id}",
    params(("id" = String, Path, description = "User identifier (UUID)")),
    responses(
        (status = 204, description = "User deleted", body = MessageResponse),
        (status = 404, description = "User not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "Users"
)]
pub async fn delete_user_handler(
    State(delete): State<Arc<dyn Delete>>,
    Path(id): Path<String>,
) -> Result<(StatusCode, Json<MessageResponse>), ApiError> {
    let id = parse_user_id(&id)?;
    delete
        .delete(id)
        .await
        .map_err(|err| ApiError::from_record(err, ENTITY, "delete user"))?;

    Ok((StatusCode::NO_CONTENT, Json(MessageResponse::new("User deleted"))))
}

/// Creates and returns the users API router.
pub fn create_api_router(state: UserState) -> Router {
    Router::new()
        .route("/users", get(list_users_handler))
        .route("/users/create", post(create_user_handler))
        .route(
            "/users/{id}",
            get(get_user_handler)
                .put(update_user_handler)
                .delete(delete_user_handler),
        )
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contracts::{
        MockCreate, MockDelete, MockGetAll, MockGetById, MockGetByParams, MockUpdate, RecordError,
    };
    use axum::body::Body;
    use axum::http::{Method, Request};
    use tower::ServiceExt;

    #[derive(Default)]
    struct Mocks {
        get_all: MockGetAll<User>,
        get_by_params: MockGetByParams<User>,
        get_by_id: MockGetById<User>,
        create: MockCreate<User, UserDraft>,
        update: MockUpdate<User, UserDraft>,
        delete: MockDelete,
    }

    impl Mocks {
        fn into_router(self) -> Router {
            create_api_router(UserState {
                get_all: Arc::new(self.get_all),
                get_by_params: Arc::new(self.get_by_params),
                get_by_id: Arc::new(self.get_by_id),
                create: Arc::new(self.create),
                update: Arc::new(self.update),
                delete: Arc::new(self.delete),
            })
        }
    }

    async fn send(router: Router, method: Method, uri: &str) -> (StatusCode, serde_json::Value) {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .body(Body::empty())
            .unwrap();
        let response = router.oneshot(request).await.unwrap();
        let status = response.status();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&body).unwrap())
    }

    #[tokio::test]
    async fn invalid_search_is_rejected_without_calling_the_service() {
        let mut mocks = Mocks::default();
        mocks.get_by_params.expect_get_by_params().never();

        let (status, body) = send(mocks.into_router(), Method::GET, "/users?search=a%25").await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Invalid search parameters");
    }

    #[tokio::test]
    async fn missing_user_is_not_found() {
        let mut mocks = Mocks::default();
        mocks
            .delete
            .expect_delete()
            .times(1)
            .returning(|id| Err(RecordError::NotFound { entity: "User", id }));

        let uri = format!("/users/{}", Uuid::new_v4());
        let (status, body) = send(mocks.into_router(), Method::DELETE, &uri).await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(
            body,
            serde_json::json!({"success": false, "error": "User not found"})
        );
    }
}
