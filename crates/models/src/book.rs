use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use crate::errors;
use crate::publishing_company;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "books")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub isbn: String,
    pub name: String,
    pub publication_year: Option<Date>,
    pub age_limit: f32,
    pub publishing_company: String,
    pub page_count: i32,
    pub language: Option<String>,
    pub cost: Option<Decimal>,
    pub count_of_books: i32,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation {
    PublishingCompany,
}

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match self {
            Relation::PublishingCompany => Entity::belongs_to(publishing_company::Entity)
                .from(Column::PublishingCompany)
                .to(publishing_company::Column::Name)
                .into(),
        }
    }
}

impl ActiveModelBehavior for ActiveModel {}

pub fn validate_isbn(isbn: &str) -> Result<(), errors::ModelError> {
    if isbn.trim().is_empty() {
        return Err(errors::ModelError::required("book isbn"));
    }
    Ok(())
}

pub fn validate_name(name: &str) -> Result<(), errors::ModelError> {
    if name.trim().is_empty() {
        return Err(errors::ModelError::required("book name"));
    }
    Ok(())
}
