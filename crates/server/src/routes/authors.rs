use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::errors::ApiError;
use crate::routes::auth::ServerState;
use models::author;
use service::author_service::{self, AuthorInput};

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AuthorDto {
    pub id: Option<i32>,
    pub fio: String,
    pub birth_date: Option<String>,
    pub country: Option<String>,
    pub nickname: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SortQuery {
    pub sort_column: Option<String>,
    pub sort_order: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    pub q: String,
    pub sort_column: Option<String>,
    pub sort_order: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct BulkDeleteQuery {
    #[serde(rename = "removeEverything", default)]
    pub remove_everything: bool,
}

pub(crate) fn to_dto(model: &author::Model) -> AuthorDto {
    AuthorDto {
        id: Some(model.id),
        fio: model.fio.clone(),
        birth_date: model.birth_date.clone(),
        country: model.country.clone(),
        nickname: model.nickname.clone(),
    }
}

fn to_input(dto: AuthorDto) -> AuthorInput {
    AuthorInput {
        fio: dto.fio,
        birth_date: dto.birth_date,
        country: dto.country,
        nickname: dto.nickname,
    }
}

pub async fn create_author(
    State(state): State<ServerState>,
    Json(dto): Json<AuthorDto>,
) -> Result<(StatusCode, Json<AuthorDto>), ApiError> {
    let created = author_service::create_author(&state.db, to_input(dto)).await?;
    Ok((StatusCode::CREATED, Json(to_dto(&created))))
}

pub async fn get_author(
    State(state): State<ServerState>,
    Path(id): Path<i32>,
) -> Result<Json<AuthorDto>, StatusCode> {
    match author_service::get_author(&state.db, id).await {
        Ok(Some(found)) => Ok(Json(to_dto(&found))),
        Ok(None) => Err(StatusCode::NOT_FOUND),
        Err(_) => Err(StatusCode::INTERNAL_SERVER_ERROR),
    }
}

pub async fn list_authors(
    State(state): State<ServerState>,
    Query(params): Query<SortQuery>,
) -> Result<Json<Vec<AuthorDto>>, ApiError> {
    let authors = author_service::get_all_authors(
        &state.db,
        params.sort_column.as_deref(),
        params.sort_order.as_deref(),
    )
    .await?;
    Ok(Json(authors.iter().map(to_dto).collect()))
}

pub async fn search_authors(
    State(state): State<ServerState>,
    Query(params): Query<SearchQuery>,
) -> Result<Json<Vec<AuthorDto>>, ApiError> {
    let mut authors = author_service::search_authors(&state.db, &params.q).await?;
    if let Some(column) = params.sort_column.as_deref() {
        author_service::sort_authors(&mut authors, column, params.sort_order.as_deref().unwrap_or(""));
    }
    Ok(Json(authors.iter().map(to_dto).collect()))
}

pub async fn update_author(
    State(state): State<ServerState>,
    Path(id): Path<i32>,
    Json(dto): Json<AuthorDto>,
) -> Result<Json<AuthorDto>, ApiError> {
    let updated = author_service::update_author(&state.db, id, to_input(dto)).await?;
    Ok(Json(to_dto(&updated)))
}

pub async fn delete_author(
    State(state): State<ServerState>,
    Path(id): Path<i32>,
) -> Result<StatusCode, ApiError> {
    author_service::delete_author(&state.db, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn bulk_delete_authors(
    State(state): State<ServerState>,
    Query(params): Query<BulkDeleteQuery>,
    Json(author_ids): Json<Vec<i32>>,
) -> Result<StatusCode, ApiError> {
    author_service::delete_authors(&state.db, author_ids, params.remove_everything).await?;
    Ok(StatusCode::NO_CONTENT)
}
