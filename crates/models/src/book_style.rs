use sea_orm::{entity::prelude::*, ConnectionTrait, Set};
use serde::{Deserialize, Serialize};

use crate::book;
use crate::errors;
use crate::style;

/// Join row linking one book to one style; the composite key is the pair.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "book_styles")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub book_isbn: String,
    #[sea_orm(primary_key, auto_increment = false)]
    pub style_id: i64,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation {
    Book,
    Style,
}

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match self {
            Relation::Book => Entity::belongs_to(book::Entity)
                .from(Column::BookIsbn)
                .to(book::Column::Isbn)
                .into(),
            Relation::Style => Entity::belongs_to(style::Entity)
                .from(Column::StyleId)
                .to(style::Column::Id)
                .into(),
        }
    }
}

impl ActiveModelBehavior for ActiveModel {}

pub async fn create<C: ConnectionTrait>(
    db: &C,
    book_isbn: &str,
    style_id: i64,
) -> Result<Model, errors::ModelError> {
    let am = ActiveModel { book_isbn: Set(book_isbn.to_string()), style_id: Set(style_id) };
    Ok(am.insert(db).await?)
}
