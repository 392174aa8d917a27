//! Create `authors` table with a generated integer id.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Authors::Table)
                    .if_not_exists()
                    .col(pk_auto(Authors::Id))
                    .col(string(Authors::Fio))
                    .col(ColumnDef::new(Authors::BirthDate).string().null())
                    .col(ColumnDef::new(Authors::Country).string().null())
                    .col(ColumnDef::new(Authors::Nickname).string().null())
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Authors::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum Authors {
    Table,
    Id,
    Fio,
    BirthDate,
    Country,
    Nickname,
}
