use chrono::{TimeZone, Utc};
use taskboard_server::contracts::{
    Create, Delete, GetAll, GetById, GetByParams, RecordError, Update,
};
use taskboard_server::user::service::UserService;
use taskboard_server::user::{Gender, UserDraft, UserStore};
use uuid::Uuid;

mod common;

async fn setup() -> UserService<UserStore> {
    let db = common::setup_sqlite_db()
        .await
        .expect("Failed to setup test database");
    UserService::new(UserStore::new(db))
}

async fn seed_users(service: &UserService<UserStore>) {
    let people = [
        ("Grace Hopper", Gender::Female, 85),
        ("Alan Turing", Gender::Male, 41),
        ("Margaret Hamilton", Gender::Female, 38),
    ];
    for (name, gender, age) in people {
        let mut draft = UserDraft::new(name, age);
        draft.gender = gender;
        service.create(draft).await.expect("Failed to create user");
    }
}

#[tokio::test]
async fn can_create_user_with_defaults() {
    let service = setup().await;

    let created = service.create(UserDraft::new("Ada Lovelace", 36)).await.unwrap();

    assert_ne!(created.user_id(), Uuid::nil());
    assert_eq!(created.name(), "Ada Lovelace");
    assert_eq!(created.gender(), Gender::Unspecified);
    assert!(!created.is_active());
    assert_eq!(created.joined_at(), None);
    assert_eq!(created.obs(), "");
    assert_eq!(service.get_by_id(created.user_id()).await.unwrap(), created);
}

#[tokio::test]
async fn get_all_orders_by_name() {
    let service = setup().await;
    seed_users(&service).await;

    let names: Vec<String> = service
        .get_all()
        .await
        .unwrap()
        .iter()
        .map(|user| user.name().to_string())
        .collect();

    assert_eq!(names, ["Alan Turing", "Grace Hopper", "Margaret Hamilton"]);
}

#[tokio::test]
async fn search_covers_name_gender_and_age() {
    let service = setup().await;
    seed_users(&service).await;

    let by_name = service.get_by_params("hopper").await.unwrap();
    assert_eq!(by_name.len(), 1);
    assert_eq!(by_name[0].name(), "Grace Hopper");

    let by_gender = service.get_by_params("female").await.unwrap();
    assert_eq!(by_gender.len(), 2);

    let by_age = service.get_by_params("41").await.unwrap();
    assert_eq!(by_age.len(), 1);
    assert_eq!(by_age[0].name(), "Alan Turing");
}

#[tokio::test]
async fn can_update_user() {
    let service = setup().await;
    let created = service.create(UserDraft::new("Linus", 20)).await.unwrap();
    let joined_at = Utc.with_ymd_and_hms(1991, 8, 25, 20, 57, 0).unwrap();

    let mut changes = UserDraft::new("Linus Torvalds", 21);
    changes.gender = Gender::Male;
    changes.is_active = true;
    changes.joined_at = Some(joined_at);
    changes.obs = "Just a hobby".to_string();
    let updated = service.update(created.user_id(), changes).await.unwrap();

    assert_eq!(updated.user_id(), created.user_id());
    assert_eq!(updated.name(), "Linus Torvalds");
    assert_eq!(updated.age(), 21);
    assert_eq!(updated.gender(), Gender::Male);
    assert!(updated.is_active());
    assert_eq!(updated.joined_at(), Some(joined_at));
    assert_eq!(updated.obs(), "Just a hobby");
}

#[tokio::test]
async fn missing_users_are_not_found() {
    let service = setup().await;
    let id = Uuid::new_v4();

    assert!(matches!(
        service.get_by_id(id).await,
        Err(RecordError::NotFound { entity: "User", .. })
    ));
    assert!(service.update(id, UserDraft::new("Nobody", 1)).await.unwrap_err().is_not_found());
    assert!(service.delete(id).await.unwrap_err().is_not_found());
}

#[tokio::test]
async fn can_delete_user() {
    let service = setup().await;
    seed_users(&service).await;
    let victim = service.get_by_params("Turing").await.unwrap().remove(0);

    service.delete(victim.user_id()).await.unwrap();

    assert_eq!(service.get_all().await.unwrap().len(), 2);
}

#[tokio::test]
async fn blank_name_is_malformed() {
    let service = setup().await;

    let result = service.create(UserDraft::new("", 30)).await;

    assert!(matches!(result, Err(RecordError::Malformed(_))));
}
