use chrono::Utc;
use sea_orm::{entity::prelude::*, ConnectionTrait, Set};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "administrators")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub login: String,
    pub password_hash: String,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation {}

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        panic!("no relations defined here")
    }
}

impl ActiveModelBehavior for ActiveModel {}

pub fn validate_login(login: &str) -> Result<(), errors::ModelError> {
    if login.trim().is_empty() {
        return Err(errors::ModelError::required("login"));
    }
    Ok(())
}

/// Insert a new administrator; the password must already be hashed.
pub async fn create<C: ConnectionTrait>(
    db: &C,
    login: &str,
    password_hash: &str,
) -> Result<Model, errors::ModelError> {
    validate_login(login)?;
    let am = ActiveModel {
        id: Set(Uuid::new_v4()),
        login: Set(login.to_string()),
        password_hash: Set(password_hash.to_string()),
        created_at: Set(Utc::now().into()),
    };
    Ok(am.insert(db).await?)
}
