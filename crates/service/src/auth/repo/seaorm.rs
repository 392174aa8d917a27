use async_trait::async_trait;
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter};

use crate::auth::domain::{AuthAdmin, Credentials};
use crate::auth::errors::AuthError;
use crate::auth::repository::AuthRepository;
use models::administrator;

/// SeaORM-backed repository over the `administrators` table.
pub struct SeaOrmAuthRepository {
    pub db: DatabaseConnection,
}

#[async_trait]
impl AuthRepository for SeaOrmAuthRepository {
    async fn find_credentials(&self, login: &str) -> Result<Option<Credentials>, AuthError> {
        let found = administrator::Entity::find()
            .filter(administrator::Column::Login.eq(login))
            .one(&self.db)
            .await
            .map_err(|e| AuthError::Repository(e.to_string()))?;
        Ok(found.map(|m| Credentials {
            admin: AuthAdmin { id: m.id, login: m.login },
            password_hash: m.password_hash,
        }))
    }

    async fn create_admin(&self, login: &str, password_hash: &str) -> Result<AuthAdmin, AuthError> {
        let created = administrator::create(&self.db, login, password_hash).await.map_err(
            |e| match e {
                models::errors::ModelError::Validation(msg) => AuthError::Validation(msg),
                models::errors::ModelError::Db(msg) => AuthError::Repository(msg),
            },
        )?;
        Ok(AuthAdmin { id: created.id, login: created.login })
    }
}
