//! Secondary indexes for the substring-search and sort paths.
use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_books_name")
                    .table(Books::Table)
                    .col(Books::Name)
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_books_publishing_company")
                    .table(Books::Table)
                    .col(Books::PublishingCompany)
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_authors_fio")
                    .table(Authors::Table)
                    .col(Authors::Fio)
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_styles_name")
                    .table(Styles::Table)
                    .col(Styles::Name)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(Index::drop().name("idx_books_name").table(Books::Table).to_owned())
            .await?;
        manager
            .drop_index(
                Index::drop()
                    .name("idx_books_publishing_company")
                    .table(Books::Table)
                    .to_owned(),
            )
            .await?;
        manager
            .drop_index(Index::drop().name("idx_authors_fio").table(Authors::Table).to_owned())
            .await?;
        manager
            .drop_index(Index::drop().name("idx_styles_name").table(Styles::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Books {
    Table,
    Name,
    PublishingCompany,
}

#[derive(DeriveIden)]
enum Authors {
    Table,
    Fio,
}

#[derive(DeriveIden)]
enum Styles {
    Table,
    Name,
}
