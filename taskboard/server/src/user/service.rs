use crate::contracts::{Create, Delete, GetAll, GetById, GetByParams, RecordError, Update};
use crate::user::{User, UserDraft};
use async_trait::async_trait;
use uuid::Uuid;

/// Service layer for users. Users carry no business rules, so every
/// operation is delegated to the wrapped model unchanged.
#[derive(Debug, Clone)]
pub struct UserService<M> {
    model: M,
}

impl<M> UserService<M> {
    pub fn new(model: M) -> Self {
        Self { model }
    }
}

#[async_trait]
impl<M: GetAll<User>> GetAll<User> for UserService<M> {
    async fn get_all(&self) -> Result<Vec<User>, RecordError> {
        self.model.get_all().await
    }
}

#[async_trait]
impl<M: GetByParams<User>> GetByParams<User> for UserService<M> {
    async fn get_by_params(&self, term: &str) -> Result<Vec<User>, RecordError> {
        self.model.get_by_params(term).await
    }
}

#[async_trait]
impl<M: GetById<User>> GetById<User> for UserService<M> {
    async fn get_by_id(&self, id: Uuid) -> Result<User, RecordError> {
        self.model.get_by_id(id).await
    }
}

#[async_trait]
impl<M: Create<User, UserDraft>> Create<User, UserDraft> for UserService<M> {
    async fn create(&self, data: UserDraft) -> Result<User, RecordError> {
        self.model.create(data).await
    }
}

#[async_trait]
impl<M: Update<User, UserDraft>> Update<User, UserDraft> for UserService<M> {
    async fn update(&self, id: Uuid, data: UserDraft) -> Result<User, RecordError> {
        self.model.update(id, data).await
    }
}

#[async_trait]
impl<M: Delete> Delete for UserService<M> {
    async fn delete(&self, id: Uuid) -> Result<(), RecordError> {
        self.model.delete(id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contracts::{MockCreate, MockUpdate};
    use mockall::predicate::{always, eq};

    #[tokio::test]
    async fn update_forwards_data_unchanged() {
        let id = Uuid::new_v4();
        let mut draft = UserDraft::new("Ada", 36);
        draft.is_active = true;

        let mut model = MockUpdate::<User, UserDraft>::new();
        model
            .expect_update()
            .with(eq(id), eq(draft.clone()))
            .times(1)
            .returning(|id, _| Err(RecordError::NotFound { entity: "User", id }));
        let service = UserService::new(model);

        let result = service.update(id, draft).await;

        assert!(result.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn create_passes_malformed_through() {
        let mut model = MockCreate::<User, UserDraft>::new();
        model
            .expect_create()
            .with(always())
            .times(1)
            .returning(|_| Err(RecordError::Malformed("User name is required".to_string())));
        let service = UserService::new(model);

        let result = service.create(UserDraft::new("", 1)).await;

        assert!(matches!(result, Err(RecordError::Malformed(_))));
    }
}
