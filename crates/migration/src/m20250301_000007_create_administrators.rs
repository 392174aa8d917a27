//! Create `administrators` table for login credentials.
//!
//! Passwords are stored as argon2 hashes, never in clear.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Administrators::Table)
                    .if_not_exists()
                    .col(uuid(Administrators::Id).primary_key())
                    .col(string_len(Administrators::Login, 128).unique_key().not_null())
                    .col(string(Administrators::PasswordHash))
                    .col(timestamp_with_time_zone(Administrators::CreatedAt).not_null())
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Administrators::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Administrators {
    Table,
    Id,
    Login,
    PasswordHash,
    CreatedAt,
}
