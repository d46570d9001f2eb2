//! Supplier-facing correction handlers.
//!
//! Every handler is scoped to the caller's supplier; records of other
//! suppliers read as not found.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use medsupply_core::correction::ProposedFields;
use medsupply_core::types::DbId;
use medsupply_db::repositories::CorrectionRepo;

use crate::engine::corrections;
use crate::error::{AppError, AppResult};
use crate::middleware::rbac::RequireSupplier;
use crate::response::DataResponse;
use crate::state::AppState;

/// PUT /api/v1/supplier/items/{id}/correction
///
/// Save (create, update, or discard) the draft correction for an item.
pub async fn save_draft(
    RequireSupplier(scope): RequireSupplier,
    State(state): State<AppState>,
    Path(item_id): Path<DbId>,
    Json(input): Json<ProposedFields>,
) -> AppResult<impl IntoResponse> {
    let outcome = corrections::save_draft(
        &state.pool,
        scope.supplier_id,
        item_id,
        &input,
        &scope.user.identity(),
    )
    .await?;
    Ok(Json(DataResponse { data: outcome }))
}

/// GET /api/v1/supplier/corrections/drafts
pub async fn list_drafts(
    RequireSupplier(scope): RequireSupplier,
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    let drafts = CorrectionRepo::find_drafts_by_supplier(&state.pool, scope.supplier_id).await?;
    Ok(Json(DataResponse { data: drafts }))
}

/// GET /api/v1/supplier/corrections/counts
pub async fn counts(
    RequireSupplier(scope): RequireSupplier,
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    let counts = CorrectionRepo::count_by_status(&state.pool, scope.supplier_id).await?;
    Ok(Json(DataResponse { data: counts }))
}

/// GET /api/v1/supplier/corrections/{id}
pub async fn get_correction(
    RequireSupplier(scope): RequireSupplier,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let correction = CorrectionRepo::find_for_supplier(&state.pool, scope.supplier_id, id)
        .await?
        .ok_or_else(|| AppError::not_found("Correction", id))?;
    Ok(Json(DataResponse { data: correction }))
}

/// DELETE /api/v1/supplier/corrections/{id}
///
/// Only drafts can be deleted.
pub async fn delete_draft(
    RequireSupplier(scope): RequireSupplier,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    corrections::delete_draft(&state.pool, scope.supplier_id, id, &scope.user.identity()).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/supplier/corrections/submit
///
/// Submit every draft of the supplier at once, or none.
pub async fn submit_all(
    RequireSupplier(scope): RequireSupplier,
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    let outcome =
        corrections::submit_all(&state.pool, scope.supplier_id, &scope.user.identity()).await?;
    Ok(Json(DataResponse { data: outcome }))
}
