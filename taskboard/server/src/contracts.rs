//! Capability contracts shared by the store, service and view layers.
//!
//! Every operation a collaborator may support is its own single-method trait.
//! A store or service implements only the capabilities it offers, and a
//! handler asks only for the capabilities it calls.
//!
//! All contracts follow one return convention: the full persisted record on
//! success, a [`RecordError`] on failure.

use async_trait::async_trait;
use uuid::Uuid;

/// Error type for every capability contract.
#[derive(Debug, thiserror::Error)]
pub enum RecordError {
    /// The identified record does not exist.
    #[error("{entity} with ID {id} not found")]
    NotFound { entity: &'static str, id: Uuid },
    /// The supplied data is missing required fields or violates a field constraint.
    #[error("Malformed data: {0}")]
    Malformed(String),
    /// Represents a database error.
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),
}

impl RecordError {
    /// Returns `true` if this error means the identified record does not exist.
    pub fn is_not_found(&self) -> bool {
        matches!(self, RecordError::NotFound { .. })
    }
}

/// Retrieves every record.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait GetAll<R: Send + Sync + 'static>: Send + Sync {
    async fn get_all(&self) -> Result<Vec<R>, RecordError>;
}

/// Retrieves the records whose searchable fields contain `term`, ignoring case.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait GetByParams<R: Send + Sync + 'static>: Send + Sync {
    async fn get_by_params(&self, term: &str) -> Result<Vec<R>, RecordError>;
}

/// Retrieves a single record by its identifier.
///
/// Fails with [`RecordError::NotFound`] if no record has that identifier.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait GetById<R: Send + Sync + 'static>: Send + Sync {
    async fn get_by_id(&self, id: Uuid) -> Result<R, RecordError>;
}

/// Creates a record from `data` and returns it as persisted.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Create<R: Send + Sync + 'static, D: Send + Sync + 'static>: Send + Sync {
    async fn create(&self, data: D) -> Result<R, RecordError>;
}

/// Replaces the fields of the record identified by `id` with `data`.
///
/// Fails with [`RecordError::NotFound`] if no record has that identifier.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Update<R: Send + Sync + 'static, D: Send + Sync + 'static>: Send + Sync {
    async fn update(&self, id: Uuid, data: D) -> Result<R, RecordError>;
}

/// Deletes the record identified by `id`.
///
/// Fails with [`RecordError::NotFound`] if no record has that identifier.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Delete: Send + Sync {
    async fn delete(&self, id: Uuid) -> Result<(), RecordError>;
}
