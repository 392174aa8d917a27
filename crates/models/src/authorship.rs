use sea_orm::{entity::prelude::*, ConnectionTrait, Set};
use serde::{Deserialize, Serialize};

use crate::author;
use crate::book;
use crate::errors;

/// Join row linking one book to one author; the composite key is the pair.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "authorships")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub book_isbn: String,
    #[sea_orm(primary_key, auto_increment = false)]
    pub author_id: i32,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation {
    Book,
    Author,
}

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match self {
            Relation::Book => Entity::belongs_to(book::Entity)
                .from(Column::BookIsbn)
                .to(book::Column::Isbn)
                .into(),
            Relation::Author => Entity::belongs_to(author::Entity)
                .from(Column::AuthorId)
                .to(author::Column::Id)
                .into(),
        }
    }
}

impl ActiveModelBehavior for ActiveModel {}

pub async fn create<C: ConnectionTrait>(
    db: &C,
    book_isbn: &str,
    author_id: i32,
) -> Result<Model, errors::ModelError> {
    let am = ActiveModel { book_isbn: Set(book_isbn.to_string()), author_id: Set(author_id) };
    Ok(am.insert(db).await?)
}
