use crate::contracts::{Create, Delete, GetAll, GetById, GetByParams, RecordError, Update};
use crate::task::{Status, Task, TaskDraft};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Business-rule layer between the task views and a task model.
///
/// `TaskService` implements a contract only when the wrapped model does. Every
/// operation is delegated unchanged except [`Update`], which stamps `end_time`
/// when a task moves to [`Status::Done`].
#[derive(Debug, Clone)]
pub struct TaskService<M> {
    model: M,
    clock: fn() -> DateTime<Utc>,
}

impl<M> TaskService<M> {
    /// Creates a new `TaskService` over `model`, reading time from the system clock.
    pub fn new(model: M) -> Self {
        Self::with_clock(model, Utc::now)
    }

    /// Creates a new `TaskService` that reads the current time from `clock`.
    pub fn with_clock(model: M, clock: fn() -> DateTime<Utc>) -> Self {
        Self { model, clock }
    }
}

#[async_trait]
impl<M: GetAll<Task>> GetAll<Task> for TaskService<M> {
    async fn get_all(&self) -> Result<Vec<Task>, RecordError> {
        self.model.get_all().await
    }
}

#[async_trait]
impl<M: GetByParams<Task>> GetByParams<Task> for TaskService<M> {
    async fn get_by_params(&self, term: &str) -> Result<Vec<Task>, RecordError> {
        self.model.get_by_params(term).await
    }
}

#[async_trait]
impl<M: GetById<Task>> GetById<Task> for TaskService<M> {
    async fn get_by_id(&self, id: Uuid) -> Result<Task, RecordError> {
        self.model.get_by_id(id).await
    }
}

#[async_trait]
impl<M: Create<Task, TaskDraft>> Create<Task, TaskDraft> for TaskService<M> {
    async fn create(&self, data: TaskDraft) -> Result<Task, RecordError> {
        self.model.create(data).await
    }
}

#[async_trait]
impl<M: Update<Task, TaskDraft>> Update<Task, TaskDraft> for TaskService<M> {
    /// Updates the task, setting `end_time` to now whenever the new status is DONE.
    ///
    /// The stamped time replaces any `end_time` sent by the caller.
    #[tracing::instrument(skip(self))]
    async fn update(&self, id: Uuid, mut data: TaskDraft) -> Result<Task, RecordError> {
        if data.status == Status::Done {
            let now = (self.clock)();
            tracing::info!("Task {} marked as done at {}", id, now);
            data.end_time = Some(now);
        }
        self.model.update(id, data).await
    }
}

#[async_trait]
impl<M: Delete> Delete for TaskService<M> {
    async fn delete(&self, id: Uuid) -> Result<(), RecordError> {
        self.model.delete(id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contracts::{MockDelete, MockGetById, MockGetByParams, MockUpdate};
    use crate::entities::task;
    use crate::task::Priority;
    use chrono::TimeZone;
    use mockall::predicate::{eq, function};

    fn fixed_clock() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 17, 12, 34, 0).unwrap()
    }

    fn task_from(id: Uuid, data: &TaskDraft) -> Task {
        Task::from(task::Model {
            task_id: id,
            title: data.title.clone(),
            description: data.description.clone(),
            start_time: data.start_time,
            end_time: data.end_time,
            priority: data.priority,
            status: data.status,
        })
    }

    #[tokio::test]
    async fn update_to_done_overrides_end_time_with_now() {
        let id = Uuid::new_v4();
        let mut model = MockUpdate::<Task, TaskDraft>::new();
        model
            .expect_update()
            .with(
                eq(id),
                function(|data: &TaskDraft| data.end_time == Some(fixed_clock())),
            )
            .times(1)
            .returning(|id, data| Ok(task_from(id, &data)));
        let service = TaskService::with_clock(model, fixed_clock);

        let mut draft = TaskDraft::new("Ship release");
        draft.status = Status::Done;
        draft.end_time = Some(Utc.with_ymd_and_hms(1999, 1, 1, 0, 0, 0).unwrap());

        let task = service.update(id, draft).await.unwrap();

        assert_eq!(task.end_time(), Some(fixed_clock()));
        assert_eq!(task.status(), Status::Done);
    }

    #[tokio::test]
    async fn update_to_other_status_keeps_end_time() {
        let id = Uuid::new_v4();
        let sent_end_time = Utc.with_ymd_and_hms(2025, 7, 1, 9, 0, 0).unwrap();
        let mut model = MockUpdate::<Task, TaskDraft>::new();
        model
            .expect_update()
            .with(
                eq(id),
                function(move |data: &TaskDraft| data.end_time == Some(sent_end_time)),
            )
            .times(1)
            .returning(|id, data| Ok(task_from(id, &data)));
        let service = TaskService::with_clock(model, fixed_clock);

        let mut draft = TaskDraft::new("Review pull request");
        draft.status = Status::Doing;
        draft.priority = Priority::High;
        draft.end_time = Some(sent_end_time);

        let task = service.update(id, draft).await.unwrap();

        assert_eq!(task.end_time(), Some(sent_end_time));
        assert_eq!(task.priority(), Priority::High);
    }

    #[tokio::test]
    async fn update_passes_not_found_through() {
        let id = Uuid::new_v4();
        let mut model = MockUpdate::<Task, TaskDraft>::new();
        model
            .expect_update()
            .times(1)
            .returning(|id, _| Err(RecordError::NotFound { entity: "Task", id }));
        let service = TaskService::new(model);

        let result = service.update(id, TaskDraft::new("Missing")).await;

        assert!(result.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn get_by_id_delegates_to_model() {
        let id = Uuid::new_v4();
        let expected = task_from(id, &TaskDraft::new("Existing"));
        let returned = expected.clone();
        let mut model = MockGetById::<Task>::new();
        model
            .expect_get_by_id()
            .with(eq(id))
            .times(1)
            .returning(move |_| Ok(returned.clone()));
        let service = TaskService::new(model);

        assert_eq!(service.get_by_id(id).await.unwrap(), expected);
    }

    #[tokio::test]
    async fn get_by_params_forwards_the_term_unchanged() {
        let mut model = MockGetByParams::<Task>::new();
        model
            .expect_get_by_params()
            .withf(|term: &str| term == "Test Task 2")
            .times(1)
            .returning(|_| Ok(vec![]));
        let service = TaskService::new(model);

        assert!(service.get_by_params("Test Task 2").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn delete_passes_not_found_through() {
        let mut model = MockDelete::new();
        model
            .expect_delete()
            .times(1)
            .returning(|id| Err(RecordError::NotFound { entity: "Task", id }));
        let service = TaskService::new(model);

        let result = service.delete(Uuid::new_v4()).await;

        assert!(matches!(result, Err(RecordError::NotFound { entity: "Task", .. })));
    }
}
