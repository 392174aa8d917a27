use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::errors::ApiError;
use crate::routes::auth::ServerState;
use models::style;
use service::styles_service;

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct StylesDto {
    pub id: Option<i64>,
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    pub q: String,
}

fn to_dto(model: &style::Model) -> StylesDto {
    StylesDto { id: Some(model.id), name: model.name.clone() }
}

pub async fn create_style(
    State(state): State<ServerState>,
    Json(dto): Json<StylesDto>,
) -> Result<(StatusCode, Json<StylesDto>), ApiError> {
    let created = styles_service::create_style(&state.db, &dto.name).await?;
    Ok((StatusCode::CREATED, Json(to_dto(&created))))
}

pub async fn get_style(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> Result<Json<StylesDto>, StatusCode> {
    match styles_service::get_style(&state.db, id).await {
        Ok(Some(found)) => Ok(Json(to_dto(&found))),
        Ok(None) => Err(StatusCode::NOT_FOUND),
        Err(_) => Err(StatusCode::INTERNAL_SERVER_ERROR),
    }
}

pub async fn list_styles(
    State(state): State<ServerState>,
) -> Result<Json<Vec<StylesDto>>, ApiError> {
    let styles = styles_service::get_all_styles(&state.db).await?;
    Ok(Json(styles.iter().map(to_dto).collect()))
}

pub async fn search_styles(
    State(state): State<ServerState>,
    Query(params): Query<SearchQuery>,
) -> Result<Json<Vec<StylesDto>>, ApiError> {
    let styles = styles_service::search_styles(&state.db, &params.q).await?;
    Ok(Json(styles.iter().map(to_dto).collect()))
}

pub async fn update_style(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    Json(dto): Json<StylesDto>,
) -> Result<Json<StylesDto>, ApiError> {
    let updated = styles_service::update_style(&state.db, id, &dto.name).await?;
    Ok(Json(to_dto(&updated)))
}

pub async fn delete_style(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    styles_service::delete_style(&state.db, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
