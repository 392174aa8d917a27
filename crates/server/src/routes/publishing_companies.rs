use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::errors::ApiError;
use crate::routes::auth::ServerState;
use models::publishing_company;
use service::publishing_company_service::{self, PublishingCompanyInput};

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct PublishingCompanyDto {
    pub name: String,
    pub establishment_year: Option<NaiveDate>,
    pub contact_info: Option<String>,
    pub city: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    pub q: String,
}

fn to_dto(model: &publishing_company::Model) -> PublishingCompanyDto {
    PublishingCompanyDto {
        name: model.name.clone(),
        establishment_year: model.establishment_year,
        contact_info: model.contact_info.clone(),
        city: model.city.clone(),
    }
}

fn to_input(dto: PublishingCompanyDto) -> PublishingCompanyInput {
    PublishingCompanyInput {
        name: dto.name,
        establishment_year: dto.establishment_year,
        contact_info: dto.contact_info,
        city: dto.city,
    }
}

pub async fn create_company(
    State(state): State<ServerState>,
    Json(dto): Json<PublishingCompanyDto>,
) -> Result<(StatusCode, Json<PublishingCompanyDto>), ApiError> {
    let created =
        publishing_company_service::create_publishing_company(&state.db, to_input(dto)).await?;
    Ok((StatusCode::CREATED, Json(to_dto(&created))))
}

pub async fn get_company(
    State(state): State<ServerState>,
    Path(name): Path<String>,
) -> Result<Json<PublishingCompanyDto>, StatusCode> {
    match publishing_company_service::get_publishing_company(&state.db, &name).await {
        Ok(Some(found)) => Ok(Json(to_dto(&found))),
        Ok(None) => Err(StatusCode::NOT_FOUND),
        Err(_) => Err(StatusCode::INTERNAL_SERVER_ERROR),
    }
}

pub async fn list_companies(
    State(state): State<ServerState>,
) -> Result<Json<Vec<PublishingCompanyDto>>, ApiError> {
    let companies = publishing_company_service::get_all_publishing_companies(&state.db).await?;
    Ok(Json(companies.iter().map(to_dto).collect()))
}

pub async fn search_companies(
    State(state): State<ServerState>,
    Query(params): Query<SearchQuery>,
) -> Result<Json<Vec<PublishingCompanyDto>>, ApiError> {
    let companies =
        publishing_company_service::search_publishing_companies(&state.db, &params.q).await?;
    Ok(Json(companies.iter().map(to_dto).collect()))
}

/// A changed name in the payload renames the company; its books follow.
pub async fn update_company(
    State(state): State<ServerState>,
    Path(name): Path<String>,
    Json(dto): Json<PublishingCompanyDto>,
) -> Result<Json<PublishingCompanyDto>, ApiError> {
    let updated =
        publishing_company_service::update_publishing_company(&state.db, &name, to_input(dto))
            .await?;
    Ok(Json(to_dto(&updated)))
}

pub async fn delete_company(
    State(state): State<ServerState>,
    Path(name): Path<String>,
) -> Result<StatusCode, ApiError> {
    publishing_company_service::delete_publishing_company(&state.db, &name).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn bulk_delete_companies(
    State(state): State<ServerState>,
    Json(names): Json<Vec<String>>,
) -> Result<StatusCode, ApiError> {
    publishing_company_service::delete_publishing_companies(&state.db, names).await?;
    Ok(StatusCode::NO_CONTENT)
}
