//! Create `books` table with FK to `publishing_companies`.
//!
//! ISBN is the natural key. Deleting a publishing company removes its books.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Books::Table)
                    .if_not_exists()
                    .col(string_len(Books::Isbn, 32).primary_key())
                    .col(string(Books::Name))
                    .col(ColumnDef::new(Books::PublicationYear).date().null())
                    .col(float(Books::AgeLimit))
                    .col(string_len(Books::PublishingCompany, 255).not_null())
                    .col(integer(Books::PageCount))
                    .col(ColumnDef::new(Books::Language).string().null())
                    .col(ColumnDef::new(Books::Cost).decimal().null())
                    .col(integer(Books::CountOfBooks))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_books_publishing_company")
                            .from(Books::Table, Books::PublishingCompany)
                            .to(PublishingCompanies::Table, PublishingCompanies::Name)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Books::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum Books {
    Table,
    Isbn,
    Name,
    PublicationYear,
    AgeLimit,
    PublishingCompany,
    PageCount,
    Language,
    Cost,
    CountOfBooks,
}

#[derive(DeriveIden)]
enum PublishingCompanies {
    Table,
    Name,
}
