use async_trait::async_trait;

use super::domain::{AuthAdmin, Credentials};
use super::errors::AuthError;

/// Repository abstraction for administrator persistence.
#[async_trait]
pub trait AuthRepository: Send + Sync {
    async fn find_credentials(&self, login: &str) -> Result<Option<Credentials>, AuthError>;
    async fn create_admin(&self, login: &str, password_hash: &str) -> Result<AuthAdmin, AuthError>;
}

/// Simple in-memory mock repository for tests
pub mod mock {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Mutex;
    use uuid::Uuid;

    #[derive(Default)]
    pub struct MockAuthRepository {
        admins: Mutex<HashMap<String, Credentials>>, // key: login
    }

    #[async_trait]
    impl AuthRepository for MockAuthRepository {
        async fn find_credentials(&self, login: &str) -> Result<Option<Credentials>, AuthError> {
            let admins = self.admins.lock().unwrap();
            Ok(admins.get(login).cloned())
        }

        async fn create_admin(
            &self,
            login: &str,
            password_hash: &str,
        ) -> Result<AuthAdmin, AuthError> {
            let mut admins = self.admins.lock().unwrap();
            if admins.contains_key(login) {
                return Err(AuthError::Conflict);
            }
            let admin = AuthAdmin { id: Uuid::new_v4(), login: login.to_string() };
            admins.insert(
                login.to_string(),
                Credentials { admin: admin.clone(), password_hash: password_hash.to_string() },
            );
            Ok(admin)
        }
    }
}
