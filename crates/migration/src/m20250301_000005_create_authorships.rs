//! Create `authorships` join table (book x author, composite key).
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Authorships::Table)
                    .if_not_exists()
                    .col(string_len(Authorships::BookIsbn, 32))
                    .col(integer(Authorships::AuthorId))
                    .primary_key(
                        Index::create()
                            .col(Authorships::BookIsbn)
                            .col(Authorships::AuthorId),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_authorships_book")
                            .from(Authorships::Table, Authorships::BookIsbn)
                            .to(Books::Table, Books::Isbn)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_authorships_author")
                            .from(Authorships::Table, Authorships::AuthorId)
                            .to(Authors::Table, Authors::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Authorships::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum Authorships {
    Table,
    BookIsbn,
    AuthorId,
}

#[derive(DeriveIden)]
enum Books {
    Table,
    Isbn,
}

#[derive(DeriveIden)]
enum Authors {
    Table,
    Id,
}
