use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Registration input
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterInput {
    pub username: String,
    pub password: String,
}

/// Login input
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginInput {
    pub username: String,
    pub password: String,
}

/// Domain administrator (business view, no secrets)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthAdmin {
    pub id: Uuid,
    pub login: String,
}

/// Stored credentials for one administrator
#[derive(Debug, Clone)]
pub struct Credentials {
    pub admin: AuthAdmin,
    pub password_hash: String,
}

/// Login result: the administrator plus a signed bearer token
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthSession {
    pub admin: AuthAdmin,
    pub token: String,
}

/// JWT claims carried by issued tokens. The subject is the login.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub iat: usize,
    pub exp: usize,
}
