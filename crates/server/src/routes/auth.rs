use std::path::PathBuf;
use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::Response,
    Json,
};
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use sea_orm::DatabaseConnection;
use serde::Serialize;
use uuid::Uuid;

use crate::errors::ApiError;
use service::auth::domain::{Claims, LoginInput, RegisterInput};
use service::auth::repo::seaorm::SeaOrmAuthRepository;
use service::auth::service::{AuthConfig, AuthService};

#[derive(Clone)]
pub struct ServerAuthConfig {
    pub jwt_secret: String,
    pub token_ttl_secs: i64,
}

#[derive(Clone)]
pub struct ServerState {
    pub db: DatabaseConnection,
    pub auth: ServerAuthConfig,
    pub csv_export_dir: PathBuf,
}

impl ServerState {
    fn auth_service(&self) -> AuthService<SeaOrmAuthRepository> {
        let repo = Arc::new(SeaOrmAuthRepository { db: self.db.clone() });
        AuthService::new(
            repo,
            AuthConfig {
                jwt_secret: self.auth.jwt_secret.clone(),
                token_ttl_secs: self.auth.token_ttl_secs,
            },
        )
    }
}

#[derive(Serialize)]
pub struct RegisterOutput {
    pub admin_id: Uuid,
    pub login: String,
}

#[derive(Serialize)]
pub struct LoginOutput {
    pub token: String,
}

#[utoipa::path(post, path = "/api/auth/register", tag = "auth", request_body = crate::openapi::RegisterRequest, responses((status = 201, description = "Registered"), (status = 400, description = "Bad Request"), (status = 409, description = "Conflict")))]
pub async fn register(
    State(state): State<ServerState>,
    Json(input): Json<RegisterInput>,
) -> Result<(StatusCode, Json<RegisterOutput>), ApiError> {
    let admin = state.auth_service().register(input).await?;
    Ok((StatusCode::CREATED, Json(RegisterOutput { admin_id: admin.id, login: admin.login })))
}

#[utoipa::path(post, path = "/api/auth/login", tag = "auth", request_body = crate::openapi::LoginRequest, responses((status = 200, description = "Logged In"), (status = 401, description = "Unauthorized")))]
pub async fn login(
    State(state): State<ServerState>,
    Json(input): Json<LoginInput>,
) -> Result<Json<LoginOutput>, ApiError> {
    let session = state.auth_service().login(input).await?;
    Ok(Json(LoginOutput { token: session.token }))
}

/// Global middleware: every `/api` route except auth requires
/// `Authorization: Bearer <token>`. A missing header is 400, an invalid or
/// expired token is 401; health check, docs and CORS preflight pass through.
pub async fn require_bearer_token(
    State(state): State<ServerState>,
    req: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    let path = req.uri().path();
    let method = req.method().clone();

    if path == "/health"
        || path.starts_with("/api/auth/")
        || path.starts_with("/docs")
        || path.starts_with("/api-docs")
        || method == axum::http::Method::OPTIONS
    {
        return Ok(next.run(req).await);
    }

    let authz = req
        .headers()
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok());

    let Some(header) = authz else {
        tracing::warn!(path = %path, "missing Authorization header");
        return Err(StatusCode::BAD_REQUEST);
    };
    let prefix = "Bearer ";
    if !header.starts_with(prefix) {
        tracing::warn!(path = %path, "invalid Authorization format (expect Bearer)");
        return Err(StatusCode::UNAUTHORIZED);
    }
    let token = &header[prefix.len()..];

    let key = DecodingKey::from_secret(state.auth.jwt_secret.as_bytes());
    let mut validation = Validation::new(Algorithm::HS256);
    validation.validate_exp = true;

    match decode::<Claims>(token, &key, &validation) {
        Ok(_data) => Ok(next.run(req).await),
        Err(e) => {
            tracing::warn!(path = %path, err = %e, "token validation failed");
            Err(StatusCode::UNAUTHORIZED)
        }
    }
}
