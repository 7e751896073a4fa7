use sea_orm_migration::prelude::*;
use sea_orm_migration::schema::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[derive(DeriveIden)]
enum Tasks {
    Table,
    TaskId,
    Title,
    Description,
    StartTime,
    EndTime,
    Priority,
    Status,
}

const IDX_TASKS_START_TIME: &str = "idx-tasks-start_time";

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Tasks::Table)
                    .if_not_exists()
                    .col(pk_uuid(Tasks::TaskId))
                    .col(string_len(Tasks::Title, 50))
                    .col(text(Tasks::Description).default(""))
                    .col(timestamp_with_time_zone_null(Tasks::StartTime))
                    .col(timestamp_with_time_zone_null(Tasks::EndTime))
                    .col(string_len(Tasks::Priority, 6).default("LOW"))
                    .col(string_len(Tasks::Status, 5).default("TODO"))
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name(IDX_TASKS_START_TIME)
                    .table(Tasks::Table)
                    .col(Tasks::StartTime)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(Index::drop().name(IDX_TASKS_START_TIME).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Tasks::Table).to_owned())
            .await
    }
}
