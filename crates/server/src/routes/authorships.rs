use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::errors::ApiError;
use crate::routes::auth::ServerState;
use models::authorship;
use service::authorship_service;

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AuthorshipDto {
    pub book_isbn: String,
    pub author_id: i32,
}

fn to_dto(model: &authorship::Model) -> AuthorshipDto {
    AuthorshipDto { book_isbn: model.book_isbn.clone(), author_id: model.author_id }
}

pub async fn create_authorship(
    State(state): State<ServerState>,
    Json(dto): Json<AuthorshipDto>,
) -> Result<(StatusCode, Json<AuthorshipDto>), ApiError> {
    let created =
        authorship_service::create_authorship(&state.db, &dto.book_isbn, dto.author_id).await?;
    Ok((StatusCode::CREATED, Json(to_dto(&created))))
}

pub async fn get_authorship(
    State(state): State<ServerState>,
    Path((isbn, author_id)): Path<(String, i32)>,
) -> Result<Json<AuthorshipDto>, StatusCode> {
    match authorship_service::get_authorship(&state.db, &isbn, author_id).await {
        Ok(Some(found)) => Ok(Json(to_dto(&found))),
        Ok(None) => Err(StatusCode::NOT_FOUND),
        Err(_) => Err(StatusCode::INTERNAL_SERVER_ERROR),
    }
}

pub async fn list_authorships(
    State(state): State<ServerState>,
) -> Result<Json<Vec<AuthorshipDto>>, ApiError> {
    let rows = authorship_service::get_all_authorships(&state.db).await?;
    Ok(Json(rows.iter().map(to_dto).collect()))
}

/// The body carries the new pair; the path identifies the current one.
pub async fn update_authorship(
    State(state): State<ServerState>,
    Path((isbn, author_id)): Path<(String, i32)>,
    Json(dto): Json<AuthorshipDto>,
) -> Result<Json<AuthorshipDto>, ApiError> {
    let updated = authorship_service::update_authorship(
        &state.db,
        &isbn,
        author_id,
        &dto.book_isbn,
        dto.author_id,
    )
    .await?;
    Ok(Json(to_dto(&updated)))
}

pub async fn delete_authorship(
    State(state): State<ServerState>,
    Path((isbn, author_id)): Path<(String, i32)>,
) -> Result<StatusCode, ApiError> {
    authorship_service::delete_authorship(&state.db, &isbn, author_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
