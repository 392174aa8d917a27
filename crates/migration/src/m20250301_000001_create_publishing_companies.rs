//! Create `publishing_companies` table.
//!
//! The company name is the natural key; books reference it directly.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(PublishingCompanies::Table)
                    .if_not_exists()
                    .col(string_len(PublishingCompanies::Name, 255).primary_key())
                    .col(ColumnDef::new(PublishingCompanies::EstablishmentYear).date().null())
                    .col(ColumnDef::new(PublishingCompanies::ContactInfo).string().null())
                    .col(ColumnDef::new(PublishingCompanies::City).string().null())
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(PublishingCompanies::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum PublishingCompanies {
    Table,
    Name,
    EstablishmentYear,
    ContactInfo,
    City,
}
