use sea_orm_migration::prelude::*;
use sea_orm_migration::schema::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[derive(DeriveIden)]
enum Users {
    Table,
    UserId,
    Name,
    Gender,
    Age,
    JoinedAt,
    IsActive,
    Obs,
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Users::Table)
                    .if_not_exists()
                    .col(pk_uuid(Users::UserId))
                    .col(string_len(Users::Name, 50))
                    .col(string_len(Users::Gender, 6).default(""))
                    .col(integer(Users::Age))
                    .col(timestamp_with_time_zone_null(Users::JoinedAt))
                    .col(boolean(Users::IsActive).default(false))
                    .col(text(Users::Obs).default(""))
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Users::Table).to_owned())
            .await
    }
}
