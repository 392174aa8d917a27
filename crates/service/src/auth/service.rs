use std::sync::Arc;

use argon2::{
    password_hash::{PasswordHasher, PasswordVerifier, SaltString},
    Argon2, PasswordHash,
};
use jsonwebtoken::{encode, EncodingKey, Header as JwtHeader};
use rand::rngs::OsRng;
use tracing::{debug, info, instrument};

use super::domain::{AuthAdmin, AuthSession, Claims, LoginInput, RegisterInput};
use super::errors::AuthError;
use super::repository::AuthRepository;

/// Auth service configuration; both values come from the configs crate.
#[derive(Clone)]
pub struct AuthConfig {
    pub jwt_secret: String,
    pub token_ttl_secs: i64,
}

/// Auth business service independent of web framework
pub struct AuthService<R: AuthRepository> {
    repo: Arc<R>,
    cfg: AuthConfig,
}

impl<R: AuthRepository> AuthService<R> {
    pub fn new(repo: Arc<R>, cfg: AuthConfig) -> Self {
        Self { repo, cfg }
    }

    /// Register a new administrator with a hashed password.
    #[instrument(skip(self, input), fields(login = %input.username))]
    pub async fn register(&self, input: RegisterInput) -> Result<AuthAdmin, AuthError> {
        if input.username.trim().is_empty() {
            return Err(AuthError::Validation("username required".into()));
        }
        if input.password.len() < 8 {
            return Err(AuthError::Validation("password too short (>=8)".into()));
        }
        if let Some(existing) = self.repo.find_credentials(&input.username).await? {
            debug!("administrator exists: {}", existing.admin.login);
            return Err(AuthError::Conflict);
        }

        let salt = SaltString::generate(&mut OsRng);
        let hash = Argon2::default()
            .hash_password(input.password.as_bytes(), &salt)
            .map_err(|e| AuthError::HashError(e.to_string()))?
            .to_string();

        let admin = self.repo.create_admin(input.username.trim(), &hash).await?;
        info!(admin_id = %admin.id, login = %admin.login, "administrator_registered");
        Ok(admin)
    }

    /// Authenticate an administrator and issue a signed token with the login
    /// as subject and a fixed expiry window.
    #[instrument(skip(self, input), fields(login = %input.username))]
    pub async fn login(&self, input: LoginInput) -> Result<AuthSession, AuthError> {
        let cred = self
            .repo
            .find_credentials(&input.username)
            .await?
            .ok_or(AuthError::Unauthorized)?;

        let parsed =
            PasswordHash::new(&cred.password_hash).map_err(|e| AuthError::HashError(e.to_string()))?;
        if Argon2::default().verify_password(input.password.as_bytes(), &parsed).is_err() {
            return Err(AuthError::Unauthorized);
        }

        let now = chrono::Utc::now().timestamp();
        let claims = Claims {
            sub: cred.admin.login.clone(),
            iat: now as usize,
            exp: (now + self.cfg.token_ttl_secs) as usize,
        };
        let token = encode(
            &JwtHeader::default(),
            &claims,
            &EncodingKey::from_secret(self.cfg.jwt_secret.as_bytes()),
        )
        .map_err(|e| AuthError::TokenError(e.to_string()))?;

        info!(admin_id = %cred.admin.id, "administrator_logged_in");
        Ok(AuthSession { admin: cred.admin, token })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::repository::mock::MockAuthRepository;
    use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};

    fn service() -> AuthService<MockAuthRepository> {
        AuthService::new(
            Arc::new(MockAuthRepository::default()),
            AuthConfig { jwt_secret: "test-secret".into(), token_ttl_secs: 3600 },
        )
    }

    #[tokio::test]
    async fn register_then_login_issues_decodable_token() {
        let svc = service();
        let admin = svc
            .register(RegisterInput { username: "admin".into(), password: "S3curePass!".into() })
            .await
            .expect("register");
        assert_eq!(admin.login, "admin");

        let session = svc
            .login(LoginInput { username: "admin".into(), password: "S3curePass!".into() })
            .await
            .expect("login");

        let data = decode::<Claims>(
            &session.token,
            &DecodingKey::from_secret(b"test-secret"),
            &Validation::new(Algorithm::HS256),
        )
        .expect("decode");
        assert_eq!(data.claims.sub, "admin");
        assert!(data.claims.exp > data.claims.iat);
    }

    #[tokio::test]
    async fn wrong_password_is_unauthorized() {
        let svc = service();
        svc.register(RegisterInput { username: "admin".into(), password: "S3curePass!".into() })
            .await
            .expect("register");
        let result =
            svc.login(LoginInput { username: "admin".into(), password: "wrong-pass".into() }).await;
        assert!(matches!(result, Err(AuthError::Unauthorized)));
    }

    #[tokio::test]
    async fn unknown_login_is_unauthorized() {
        let svc = service();
        let result =
            svc.login(LoginInput { username: "nobody".into(), password: "whatever1".into() }).await;
        assert!(matches!(result, Err(AuthError::Unauthorized)));
    }

    #[tokio::test]
    async fn duplicate_register_is_conflict() {
        let svc = service();
        svc.register(RegisterInput { username: "admin".into(), password: "S3curePass!".into() })
            .await
            .expect("register");
        let result = svc
            .register(RegisterInput { username: "admin".into(), password: "An0therPass".into() })
            .await;
        assert!(matches!(result, Err(AuthError::Conflict)));
    }

    #[tokio::test]
    async fn short_password_is_rejected() {
        let svc = service();
        let result =
            svc.register(RegisterInput { username: "admin".into(), password: "short".into() }).await;
        assert!(matches!(result, Err(AuthError::Validation(_))));
    }
}
