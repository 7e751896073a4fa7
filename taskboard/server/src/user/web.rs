use askama::Template;
use axum::{
    Router,
    extract::{Path, Query, State},
    response::Html,
    routing::get,
};
use std::sync::Arc;
use uuid::Uuid;

use crate::contracts::{GetAll, GetById, GetByParams};
use crate::convert::datetime_to_iso;
use crate::user::{User, UserState};
use crate::web::WebError;
use crate::web::search::{SearchQuery, SearchTerm};

const ENTITY: &str = "User";

#[derive(Debug)]
struct UserRow {
    user_id: String,
    name: String,
    gender: String,
    age: i32,
    joined_at: String,
    is_active: bool,
    obs: String,
}

impl From<User> for UserRow {
    fn from(user: User) -> Self {
        Self {
            user_id: user.user_id().to_string(),
            name: user.name().to_string(),
            gender: user.gender().as_str().to_string(),
            age: user.age(),
            joined_at: user
                .joined_at()
                .as_ref()
                .map(datetime_to_iso)
                .unwrap_or_default(),
            is_active: user.is_active(),
            obs: user.obs().to_string(),
        }
    }
}

#[derive(Template)]
#[template(path = "users/index.html")]
struct UsersTemplate {
    users: Vec<UserRow>,
    search: String,
}

impl UsersTemplate {
    pub fn new(users: Vec<User>, search: String) -> Self {
        Self {
            users: users.into_iter().map(UserRow::from).collect(),
            search,
        }
    }
}

#[derive(Template)]
#[template(path = "users/detail.html")]
struct UserDetailTemplate {
    user: UserRow,
}

#[derive(Template)]
#[template(path = "users/new.html")]
struct NewUserTemplate;

/// Handler for GET /web/users that renders the user table with a search form.
#[tracing::instrument(skip(get_all, get_by_params))]
async fn users_page_handler(
    State(get_all): State<Arc<dyn GetAll<User>>>,
    State(get_by_params): State<Arc<dyn GetByParams<User>>>,
    Query(query): Query<SearchQuery>,
) -> Result<Html<String>, WebError> {
    let users = match SearchTerm::from_query(&query)? {
        Some(term) => get_by_params.get_by_params(term.as_str()).await,
        None => get_all.get_all().await,
    }
    .map_err(|err| WebError::from_record(err, ENTITY))?;
    let template = UsersTemplate::new(users, query.search.unwrap_or_default());
    template.render().map(Html).map_err(WebError::from)
}

#[tracing::instrument]
async fn new_user_page_handler() -> Result<Html<String>, WebError> {
    NewUserTemplate.render().map(Html).map_err(WebError::from)
}

/// Handler for GET /web/users/{id} that renders a single user.
#[tracing::instrument(skip(get_by_id))]
async fn user_detail_page_handler(
    State(get_by_id): State<Arc<dyn GetById<User>>>,
    Path(id): Path<String>,
) -> Result<Html<String>, WebError> {
    let id = Uuid::parse_str(&id).map_err(|_| WebError::NotFound(ENTITY))?;
    let user = get_by_id
        .get_by_id(id)
        .await
        .map_err(|err| WebError::from_record(err, ENTITY))?;
    let template = UserDetailTemplate {
        user: UserRow::from(user),
    };
    template.render().map(Html).map_err(WebError::from)
}

/// Creates and returns the router with the browser-facing user pages.
pub fn create_user_page_router(state: UserState) -> Router {
    Router::new()
        .route("/web/users", get(users_page_handler))
        .route("/web/users/new", get(new_user_page_handler))
        .route("/web/users/{id}", get(user_detail_page_handler))
        .with_state(state)
}
