//! Handler for supplier catalog ingestion.

use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use medsupply_core::matching::RawCatalogItem;
use serde::Deserialize;

use crate::engine::catalog;
use crate::error::AppResult;
use crate::middleware::rbac::RequireSupplier;
use crate::response::DataResponse;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct IngestRequest {
    pub items: Vec<RawCatalogItem>,
}

/// POST /api/v1/supplier/catalog/ingest
///
/// Upsert the rows for the caller's supplier and match each one.
pub async fn ingest(
    RequireSupplier(scope): RequireSupplier,
    State(state): State<AppState>,
    Json(input): Json<IngestRequest>,
) -> AppResult<impl IntoResponse> {
    let summary = catalog::ingest(&state.pool, scope.supplier_id, &input.items).await?;
    Ok(Json(DataResponse { data: summary }))
}
