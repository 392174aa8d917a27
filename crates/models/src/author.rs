use sea_orm::{entity::prelude::*, ActiveValue::NotSet, ConnectionTrait, Set};
use serde::{Deserialize, Serialize};

use crate::errors;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "authors")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub fio: String,
    pub birth_date: Option<String>,
    pub country: Option<String>,
    pub nickname: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation {}

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        panic!("no relations defined here")
    }
}

impl ActiveModelBehavior for ActiveModel {}

pub fn validate_fio(fio: &str) -> Result<(), errors::ModelError> {
    if fio.trim().is_empty() {
        return Err(errors::ModelError::required("author fio"));
    }
    Ok(())
}

/// Insert a new author; the id is assigned by the database.
pub async fn create<C: ConnectionTrait>(
    db: &C,
    fio: &str,
    birth_date: Option<String>,
    country: Option<String>,
    nickname: Option<String>,
) -> Result<Model, errors::ModelError> {
    validate_fio(fio)?;
    let am = ActiveModel {
        id: NotSet,
        fio: Set(fio.to_string()),
        birth_date: Set(birth_date),
        country: Set(country),
        nickname: Set(nickname),
    };
    Ok(am.insert(db).await?)
}

#[cfg(test)]
mod tests {
    use super::validate_fio;

    #[test]
    fn blank_fio_is_rejected() {
        assert!(validate_fio("  ").is_err());
        assert!(validate_fio("A. Test").is_ok());
    }
}
