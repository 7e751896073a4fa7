use crate::contracts::{Create, Delete, GetAll, GetById, GetByParams, RecordError, Update};
use crate::convert::optional_iso_datetime;
use crate::entities::user;
use crate::query::contains_ignore_case;
use async_trait::async_trait;
use axum::extract::FromRef;
use chrono::{DateTime, Utc};
use sea_orm::sea_query::{Alias, Condition, Expr};
use sea_orm::{
    ActiveModelTrait, ActiveValue, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
    TransactionTrait,
};
use serde::{Deserialize, Deserializer, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;
use uuid::Uuid;

pub mod api {
    pub mod v1;
}
pub mod service;
pub mod web;

pub const NAME_MAX_LEN: usize = 50;
pub const OBS_MAX_LEN: usize = 1000;

const ENTITY: &str = "User";

/// Gender of a user. Stored as `MALE`, `FEMALE` or an empty string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, ToSchema)]
pub enum Gender {
    #[serde(rename = "MALE")]
    Male,
    #[serde(rename = "FEMALE")]
    Female,
    #[default]
    #[serde(rename = "")]
    Unspecified,
}

impl Gender {
    /// Returns the stored representation of the gender.
    pub fn as_str(&self) -> &'static str {
        match self {
            Gender::Male => "MALE",
            Gender::Female => "FEMALE",
            Gender::Unspecified => "",
        }
    }

    fn from_column(value: &str) -> Result<Self, RecordError> {
        match value {
            "MALE" => Ok(Gender::Male),
            "FEMALE" => Ok(Gender::Female),
            "" => Ok(Gender::Unspecified),
            other => Err(RecordError::Malformed(format!("Unknown gender '{other}'"))),
        }
    }
}

#[derive(Debug, PartialEq, Clone, Eq)]
pub struct User {
    user_id: Uuid,
    name: String,
    gender: Gender,
    age: i32,
    joined_at: Option<DateTime<Utc>>,
    is_active: bool,
    obs: String,
}

impl User {
    pub fn user_id(&self) -> Uuid {
        self.user_id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn gender(&self) -> Gender {
        self.gender
    }

    pub fn age(&self) -> i32 {
        self.age
    }

    pub fn joined_at(&self) -> Option<DateTime<Utc>> {
        self.joined_at
    }

    pub fn is_active(&self) -> bool {
        self.is_active
    }

    pub fn obs(&self) -> &str {
        &self.obs
    }
}

impl TryFrom<user::Model> for User {
    type Error = RecordError;

    fn try_from(model: user::Model) -> Result<Self, Self::Error> {
        Ok(Self {
            user_id: model.user_id,
            name: model.name,
            gender: Gender::from_column(&model.gender)?,
            age: model.age,
            joined_at: model.joined_at,
            is_active: model.is_active,
            obs: model.obs,
        })
    }
}

/// Field values supplied by a caller to create or update a user.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, ToSchema)]
pub struct UserDraft {
    pub name: String,
    #[serde(default)]
    pub gender: Gender,
    /// Accepts a number or a numeric string, as posted by HTML forms.
    #[serde(deserialize_with = "deserialize_age")]
    pub age: i32,
    #[serde(default, deserialize_with = "optional_iso_datetime::deserialize")]
    pub joined_at: Option<DateTime<Utc>>,
    /// Read by truthiness: `""`, `"false"`, `0` and `null` are false.
    #[serde(default, deserialize_with = "deserialize_is_active")]
    pub is_active: bool,
    #[serde(default)]
    pub obs: String,
}

impl UserDraft {
    pub fn new(name: impl Into<String>, age: i32) -> Self {
        Self {
            name: name.into(),
            gender: Gender::default(),
            age,
            joined_at: None,
            is_active: false,
            obs: String::new(),
        }
    }

    fn validate(&self) -> Result<(), RecordError> {
        if self.name.trim().is_empty() {
            return Err(RecordError::Malformed("User name is required".to_string()));
        }
        if self.name.chars().count() > NAME_MAX_LEN {
            return Err(RecordError::Malformed(format!(
                "User name exceeds {NAME_MAX_LEN} characters"
            )));
        }
        if self.obs.chars().count() > OBS_MAX_LEN {
            return Err(RecordError::Malformed(format!(
                "User obs exceeds {OBS_MAX_LEN} characters"
            )));
        }
        Ok(())
    }
}

fn deserialize_age<'de, D>(deserializer: D) -> Result<i32, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Age {
        Number(i32),
        Text(String),
    }

    match Age::deserialize(deserializer)? {
        Age::Number(age) => Ok(age),
        Age::Text(text) => text.trim().parse().map_err(serde::de::Error::custom),
    }
}

fn deserialize_is_active<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Flag {
        Bool(bool),
        Number(f64),
        Text(String),
    }

    Ok(match Option::<Flag>::deserialize(deserializer)? {
        None => false,
        Some(Flag::Bool(value)) => value,
        Some(Flag::Number(value)) => value != 0.0,
        Some(Flag::Text(text)) => {
            let text = text.trim();
            !(text.is_empty() || text.eq_ignore_ascii_case("false"))
        }
    })
}

fn users_from(models: Vec<user::Model>) -> Result<Vec<User>, RecordError> {
    models.into_iter().map(User::try_from).collect()
}

/// Data-access object for users.
#[derive(Clone, Debug)]
pub struct UserStore {
    db: DatabaseConnection,
}

impl UserStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl GetAll<User> for UserStore {
    #[tracing::instrument(skip(self))]
    async fn get_all(&self) -> Result<Vec<User>, RecordError> {
        let models = user::Entity::find()
            .order_by_asc(user::Column::Name)
            .all(&self.db)
            .await?;
        users_from(models)
    }
}

#[async_trait]
impl GetByParams<User> for UserStore {
    /// Matches `term` against name, gender and age, ignoring case.
    #[tracing::instrument(skip(self))]
    async fn get_by_params(&self, term: &str) -> Result<Vec<User>, RecordError> {
        let condition = Condition::any()
            .add(contains_ignore_case(Expr::col(user::Column::Name), term))
            .add(contains_ignore_case(Expr::col(user::Column::Gender), term))
            .add(contains_ignore_case(
                Expr::col(user::Column::Age).cast_as(Alias::new("text")),
                term,
            ));

        let models = user::Entity::find()
            .filter(condition)
            .order_by_asc(user::Column::Name)
            .all(&self.db)
            .await?;
        users_from(models)
    }
}

#[async_trait]
impl GetById<User> for UserStore {
    #[tracing::instrument(skip(self))]
    async fn get_by_id(&self, id: Uuid) -> Result<User, RecordError> {
        user::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(RecordError::NotFound { entity: ENTITY, id })
            .and_then(User::try_from)
    }
}

#[async_trait]
impl Create<User, UserDraft> for UserStore {
    #[tracing::instrument(skip(self))]
    async fn create(&self, data: UserDraft) -> Result<User, RecordError> {
        data.validate()?;

        let txn = self.db.begin().await?;
        let active_model = user::ActiveModel {
            user_id: ActiveValue::Set(Uuid::new_v4()),
            name: ActiveValue::Set(data.name),
            gender: ActiveValue::Set(data.gender.as_str().to_string()),
            age: ActiveValue::Set(data.age),
            joined_at: ActiveValue::Set(data.joined_at),
            is_active: ActiveValue::Set(data.is_active),
            obs: ActiveValue::Set(data.obs),
        };
        let created_model = active_model.insert(&txn).await?;
        txn.commit().await?;

        tracing::info!("Created user {}", created_model.user_id);
        User::try_from(created_model)
    }
}

#[async_trait]
impl Update<User, UserDraft> for UserStore {
    #[tracing::instrument(skip(self))]
    async fn update(&self, id: Uuid, data: UserDraft) -> Result<User, RecordError> {
        data.validate()?;

        let txn = self.db.begin().await?;
        let user_to_update = user::Entity::find_by_id(id)
            .one(&txn)
            .await?
            .ok_or(RecordError::NotFound { entity: ENTITY, id })?;

        let mut active_model: user::ActiveModel = user_to_update.into();
        active_model.name = ActiveValue::Set(data.name);
        active_model.gender = ActiveValue::Set(data.gender.as_str().to_string());
        active_model.age = ActiveValue::Set(data.age);
        active_model.joined_at = ActiveValue::Set(data.joined_at);
        active_model.is_active = ActiveValue::Set(data.is_active);
        active_model.obs = ActiveValue::Set(data.obs);
        let updated_model = active_model.update(&txn).await?;
        txn.commit().await?;

        User::try_from(updated_model)
    }
}

#[async_trait]
impl Delete for UserStore {
    #[tracing::instrument(skip(self))]
    async fn delete(&self, id: Uuid) -> Result<(), RecordError> {
        let txn = self.db.begin().await?;
        let result = user::Entity::delete_by_id(id).exec(&txn).await?;
        if result.rows_affected == 0 {
            return Err(RecordError::NotFound { entity: ENTITY, id });
        }
        txn.commit().await?;

        tracing::info!("Deleted user {}", id);
        Ok(())
    }
}

/// User capabilities available to the HTTP handlers.
#[derive(Clone, FromRef)]
pub struct UserState {
    pub get_all: Arc<dyn GetAll<User>>,
    pub get_by_params: Arc<dyn GetByParams<User>>,
    pub get_by_id: Arc<dyn GetById<User>>,
    pub create: Arc<dyn Create<User, UserDraft>>,
    pub update: Arc<dyn Update<User, UserDraft>>,
    pub delete: Arc<dyn Delete>,
}

impl UserState {
    pub fn from_service<S>(service: Arc<S>) -> Self
    where
        S: GetAll<User>
            + GetByParams<User>
            + GetById<User>
            + Create<User, UserDraft>
            + Update<User, UserDraft>
            + Delete
            + 'static,
    {
        Self {
            get_all: service.clone(),
            get_by_params: service.clone(),
            get_by_id: service.clone(),
            create: service.clone(),
            update: service.clone(),
            delete: service,
        }
    }
}
