//! Create `book_styles` join table (book x style, composite key).
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(BookStyles::Table)
                    .if_not_exists()
                    .col(string_len(BookStyles::BookIsbn, 32))
                    .col(big_integer(BookStyles::StyleId))
                    .primary_key(
                        Index::create().col(BookStyles::BookIsbn).col(BookStyles::StyleId),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_book_styles_book")
                            .from(BookStyles::Table, BookStyles::BookIsbn)
                            .to(Books::Table, Books::Isbn)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_book_styles_style")
                            .from(BookStyles::Table, BookStyles::StyleId)
                            .to(Styles::Table, Styles::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(BookStyles::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum BookStyles {
    Table,
    BookIsbn,
    StyleId,
}

#[derive(DeriveIden)]
enum Books {
    Table,
    Isbn,
}

#[derive(DeriveIden)]
enum Styles {
    Table,
    Id,
}
