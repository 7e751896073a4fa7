use crate::contracts::{Create, Delete, GetAll, GetById, GetByParams, RecordError, Update};
use crate::convert::optional_iso_datetime;
use crate::entities::task;
use crate::query::contains_ignore_case;
use async_trait::async_trait;
use axum::extract::FromRef;
use chrono::{DateTime, Utc};
use sea_orm::sea_query::{Condition, Expr};
use sea_orm::{
    ActiveModelTrait, ActiveValue, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
    Select, TransactionTrait,
};
use serde::Deserialize;
use std::sync::Arc;
use utoipa::ToSchema;
use uuid::Uuid;

pub use crate::entities::sea_orm_active_enums::{Priority, Status};

pub mod api {
    pub mod v1;
}
pub mod service;
pub mod web;

/// Maximum number of characters in a task title.
pub const TITLE_MAX_LEN: usize = 50;
/// Maximum number of characters in a task description.
pub const DESCRIPTION_MAX_LEN: usize = 1000;

const ENTITY: &str = "Task";

#[derive(Debug, PartialEq, Clone, Eq)]
pub struct Task {
    task_id: Uuid,
    title: String,
    description: String,
    start_time: Option<DateTime<Utc>>,
    end_time: Option<DateTime<Utc>>,
    priority: Priority,
    status: Status,
}

impl Task {
    /// Returns the ID of the task.
    pub fn task_id(&self) -> Uuid {
        self.task_id
    }

    /// Returns the title of the task.
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Returns the description of the task.
    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn start_time(&self) -> Option<DateTime<Utc>> {
        self.start_time
    }

    pub fn end_time(&self) -> Option<DateTime<Utc>> {
        self.end_time
    }

    pub fn priority(&self) -> Priority {
        self.priority
    }

    pub fn status(&self) -> Status {
        self.status
    }
}

impl From<task::Model> for Task {
    fn from(model: task::Model) -> Self {
        Self {
            task_id: model.task_id,
            title: model.title,
            description: model.description,
            start_time: model.start_time,
            end_time: model.end_time,
            priority: model.priority,
            status: model.status,
        }
    }
}

/// Field values supplied by a caller to create or update a task.
///
/// Decoded from a JSON request body. Any `task_id` in the body is ignored:
/// identifiers are generated on creation and taken from the path on update.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, ToSchema)]
pub struct TaskDraft {
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, deserialize_with = "optional_iso_datetime::deserialize")]
    pub start_time: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "optional_iso_datetime::deserialize")]
    pub end_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default)]
    pub status: Status,
}

impl TaskDraft {
    /// Creates a draft with the given title and every other field at its default.
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: String::new(),
            start_time: None,
            end_time: None,
            priority: Priority::default(),
            status: Status::default(),
        }
    }

    fn validate(&self) -> Result<(), RecordError> {
        if self.title.trim().is_empty() {
            return Err(RecordError::Malformed("Task title is required".to_string()));
        }
        if self.title.chars().count() > TITLE_MAX_LEN {
            return Err(RecordError::Malformed(format!(
                "Task title exceeds {TITLE_MAX_LEN} characters"
            )));
        }
        if self.description.chars().count() > DESCRIPTION_MAX_LEN {
            return Err(RecordError::Malformed(format!(
                "Task description exceeds {DESCRIPTION_MAX_LEN} characters"
            )));
        }
        Ok(())
    }
}

/// Data-access object for tasks.
///
/// Holds nothing but the connection pool; every mutation runs in its own
/// single-row transaction.
#[derive(Clone, Debug)]
pub struct TaskStore {
    db: DatabaseConnection,
}

impl TaskStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Listing order: newest start time first, then priority, then status.
    fn ordered(select: Select<task::Entity>) -> Select<task::Entity> {
        select
            .order_by_desc(task::Column::StartTime)
            .order_by_asc(task::Column::Priority)
            .order_by_asc(task::Column::Status)
    }
}

#[async_trait]
impl GetAll<Task> for TaskStore {
    #[tracing::instrument(skip(self))]
    async fn get_all(&self) -> Result<Vec<Task>, RecordError> {
        let tasks = Self::ordered(task::Entity::find())
            .all(&self.db)
            .await?
            .into_iter()
            .map(Task::from)
            .collect();
        Ok(tasks)
    }
}

#[async_trait]
impl GetByParams<Task> for TaskStore {
    /// Matches `term` against title, priority and status, ignoring case.
    #[tracing::instrument(skip(self))]
    async fn get_by_params(&self, term: &str) -> Result<Vec<Task>, RecordError> {
        let condition = [
            task::Column::Title,
            task::Column::Priority,
            task::Column::Status,
        ]
        .into_iter()
        .fold(Condition::any(), |condition, column| {
            condition.add(contains_ignore_case(Expr::col(column), term))
        });

        let tasks = Self::ordered(task::Entity::find().filter(condition))
            .all(&self.db)
            .await?
            .into_iter()
            .map(Task::from)
            .collect();
        Ok(tasks)
    }
}

#[async_trait]
impl GetById<Task> for TaskStore {
    #[tracing::instrument(skip(self))]
    async fn get_by_id(&self, id: Uuid) -> Result<Task, RecordError> {
        task::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .map(Task::from)
            .ok_or(RecordError::NotFound { entity: ENTITY, id })
    }
}

#[async_trait]
impl Create<Task, TaskDraft> for TaskStore {
    #[tracing::instrument(skip(self))]
    async fn create(&self, data: TaskDraft) -> Result<Task, RecordError> {
        data.validate()?;

        let txn = self.db.begin().await?;
        let active_model = task::ActiveModel {
            task_id: ActiveValue::Set(Uuid::new_v4()),
            title: ActiveValue::Set(data.title),
            description: ActiveValue::Set(data.description),
            start_time: ActiveValue::Set(data.start_time),
            end_time: ActiveValue::Set(data.end_time),
            priority: ActiveValue::Set(data.priority),
            status: ActiveValue::Set(data.status),
        };
        let created_model = active_model.insert(&txn).await?;
        txn.commit().await?;

        tracing::info!("Created task {}", created_model.task_id);
        Ok(Task::from(created_model))
    }
}

#[async_trait]
impl Update<Task, TaskDraft> for TaskStore {
    #[tracing::instrument(skip(self))]
    async fn update(&self, id: Uuid, data: TaskDraft) -> Result<Task, RecordError> {
        data.validate()?;

        let txn = self.db.begin().await?;
        let task_to_update = task::Entity::find_by_id(id)
            .one(&txn)
            .await?
            .ok_or(RecordError::NotFound { entity: ENTITY, id })?;

        let mut active_model: task::ActiveModel = task_to_update.into();
        active_model.title = ActiveValue::Set(data.title);
        active_model.description = ActiveValue::Set(data.description);
        active_model.start_time = ActiveValue::Set(data.start_time);
        active_model.end_time = ActiveValue::Set(data.end_time);
        active_model.priority = ActiveValue::Set(data.priority);
        active_model.status = ActiveValue::Set(data.status);
        let updated_model = active_model.update(&txn).await?;
        txn.commit().await?;

        Ok(Task::from(updated_model))
    }
}

#[async_trait]
impl Delete for TaskStore {
    #[tracing::instrument(skip(self))]
    async fn delete(&self, id: Uuid) -> Result<(), RecordError> {
        let txn = self.db.begin().await?;
        let result = task::Entity::delete_by_id(id).exec(&txn).await?;
        if result.rows_affected == 0 {
            return Err(RecordError::NotFound { entity: ENTITY, id });
        }
        txn.commit().await?;

        tracing::info!("Deleted task {}", id);
        Ok(())
    }
}

/// Task capabilities available to the HTTP handlers.
///
/// Each handler extracts only the capabilities it calls, e.g.
/// `State<Arc<dyn GetById<Task>>>`.
#[derive(Clone, FromRef)]
pub struct TaskState {
    pub get_all: Arc<dyn GetAll<Task>>,
    pub get_by_params: Arc<dyn GetByParams<Task>>,
    pub get_by_id: Arc<dyn GetById<Task>>,
    pub create: Arc<dyn Create<Task, TaskDraft>>,
    pub update: Arc<dyn Update<Task, TaskDraft>>,
    pub delete: Arc<dyn Delete>,
}

impl TaskState {
    /// Exposes every capability of `service` to the handlers.
    pub fn from_service<S>(service: Arc<S>) -> Self
    where
        S: GetAll<Task>
            + GetByParams<Task>
            + GetById<Task>
            + Create<Task, TaskDraft>
            + Update<Task, TaskDraft>
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
