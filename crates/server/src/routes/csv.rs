use axum::{extract::State, Json};

use crate::errors::ApiError;
use crate::routes::auth::ServerState;
use service::csv_service::{self, CsvSummary};

#[utoipa::path(post, path = "/api/csv/export", tag = "csv", responses((status = 200, description = "Per-entity export counts"), (status = 500, description = "Export failed")))]
pub async fn export_csv(State(state): State<ServerState>) -> Result<Json<CsvSummary>, ApiError> {
    let summary = csv_service::export_data(&state.db, &state.csv_export_dir).await?;
    Ok(Json(summary))
}

#[utoipa::path(post, path = "/api/csv/import", tag = "csv", responses((status = 200, description = "Per-entity import counts"), (status = 500, description = "Import failed")))]
pub async fn import_csv(State(state): State<ServerState>) -> Result<Json<CsvSummary>, ApiError> {
    let summary = csv_service::import_data(&state.db, &state.csv_export_dir).await?;
    Ok(Json(summary))
}
