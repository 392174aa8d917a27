use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::errors::ApiError;
use crate::routes::auth::ServerState;
use models::book_style;
use service::book_styles_service;

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct BookStylesDto {
    pub book_isbn: String,
    pub style_id: i64,
}

fn to_dto(model: &book_style::Model) -> BookStylesDto {
    BookStylesDto { book_isbn: model.book_isbn.clone(), style_id: model.style_id }
}

pub async fn create_book_style(
    State(state): State<ServerState>,
    Json(dto): Json<BookStylesDto>,
) -> Result<(StatusCode, Json<BookStylesDto>), ApiError> {
    let created =
        book_styles_service::create_book_style(&state.db, &dto.book_isbn, dto.style_id).await?;
    Ok((StatusCode::CREATED, Json(to_dto(&created))))
}

pub async fn get_book_style(
    State(state): State<ServerState>,
    Path((isbn, style_id)): Path<(String, i64)>,
) -> Result<Json<BookStylesDto>, StatusCode> {
    match book_styles_service::get_book_style(&state.db, &isbn, style_id).await {
        Ok(Some(found)) => Ok(Json(to_dto(&found))),
        Ok(None) => Err(StatusCode::NOT_FOUND),
        Err(_) => Err(StatusCode::INTERNAL_SERVER_ERROR),
    }
}

pub async fn list_book_styles(
    State(state): State<ServerState>,
) -> Result<Json<Vec<BookStylesDto>>, ApiError> {
    let rows = book_styles_service::get_all_book_styles(&state.db).await?;
    Ok(Json(rows.iter().map(to_dto).collect()))
}

pub async fn update_book_style(
    State(state): State<ServerState>,
    Path((isbn, style_id)): Path<(String, i64)>,
    Json(dto): Json<BookStylesDto>,
) -> Result<Json<BookStylesDto>, ApiError> {
    let updated = book_styles_service::update_book_style(
        &state.db,
        &isbn,
        style_id,
        &dto.book_isbn,
        dto.style_id,
    )
    .await?;
    Ok(Json(to_dto(&updated)))
}

pub async fn delete_book_style(
    State(state): State<ServerState>,
    Path((isbn, style_id)): Path<(String, i64)>,
) -> Result<StatusCode, ApiError> {
    book_styles_service::delete_book_style(&state.db, &isbn, style_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
