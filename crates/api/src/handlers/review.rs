//! Reviewer-facing correction handlers.

use axum::extract::{Path, Query, State};
use axum::response::IntoResponse;
use axum::Json;
use medsupply_core::correction::{DEFAULT_REVIEW_LIMIT, MAX_REVIEW_LIMIT};
use medsupply_core::paging::clamp_limit;
use medsupply_core::types::DbId;
use medsupply_db::repositories::{CorrectionRepo, SupplierItemRepo};
use serde::Deserialize;

use crate::engine::corrections;
use crate::error::{AppError, AppResult};
use crate::middleware::rbac::RequireReviewer;
use crate::query::LimitParams;
use crate::response::DataResponse;
use crate::state::AppState;

/// Optional body of the reject endpoint.
#[derive(Debug, Deserialize)]
pub struct RejectRequest {
    pub notes: Option<String>,
}

/// GET /api/v1/review/corrections?limit=
///
/// Pending corrections, oldest submission first.
pub async fn list_pending(
    RequireReviewer(_user): RequireReviewer,
    State(state): State<AppState>,
    Query(params): Query<LimitParams>,
) -> AppResult<impl IntoResponse> {
    let limit = clamp_limit(params.limit, DEFAULT_REVIEW_LIMIT, MAX_REVIEW_LIMIT);
    let pending = CorrectionRepo::find_pending_for_review(&state.pool, limit).await?;
    Ok(Json(DataResponse { data: pending }))
}

/// POST /api/v1/review/corrections/{id}/approve
pub async fn approve(
    RequireReviewer(user): RequireReviewer,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let approved = corrections::approve(&state.pool, id, &user.identity()).await?;
    Ok(Json(DataResponse { data: approved }))
}

/// POST /api/v1/review/corrections/{id}/reject
pub async fn reject(
    RequireReviewer(user): RequireReviewer,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    input: Option<Json<RejectRequest>>,
) -> AppResult<impl IntoResponse> {
    let notes = input.and_then(|Json(body)| body.notes);
    let rejected = corrections::reject(&state.pool, id, &user.identity(), notes.as_deref()).await?;
    Ok(Json(DataResponse { data: rejected }))
}

/// GET /api/v1/review/items/{id}/corrections
///
/// Full correction history of one supplier item.
pub async fn list_for_item(
    RequireReviewer(_user): RequireReviewer,
    State(state): State<AppState>,
    Path(item_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    SupplierItemRepo::find_by_id(&state.pool, item_id)
        .await?
        .ok_or_else(|| AppError::not_found("SupplierItem", item_id))?;
    let history = CorrectionRepo::list_for_item(&state.pool, item_id).await?;
    Ok(Json(DataResponse { data: history }))
}
