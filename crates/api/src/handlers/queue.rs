//! Review queue handlers: listing, summary, navigation and triage actions.

use axum::extract::{Path, Query, State};
use axum::response::IntoResponse;
use axum::Json;
use medsupply_core::matching::ConfidenceBucket;
use medsupply_core::paging::{clamp_limit, clamp_offset};
use medsupply_core::triage::{CreateProductOverrides, DEFAULT_QUEUE_LIMIT, MAX_QUEUE_LIMIT};
use medsupply_core::types::DbId;
use medsupply_db::models::review_queue::ReviewQueueFilter;
use medsupply_db::repositories::{ReviewQueueRepo, SupplierItemRepo};
use serde::Deserialize;

use crate::engine::triage;
use crate::error::{AppError, AppResult};
use crate::middleware::rbac::RequireReviewer;
use crate::response::DataResponse;
use crate::state::AppState;

/* --------------------------------------------------------------------------
Request types
-------------------------------------------------------------------------- */

/// `?supplier_id=&bucket=&limit=&offset=` for the queue listing.
#[derive(Debug, Default, Deserialize)]
pub struct QueueListParams {
    pub supplier_id: Option<DbId>,
    pub bucket: Option<ConfidenceBucket>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

impl QueueListParams {
    fn filter(&self) -> ReviewQueueFilter {
        ReviewQueueFilter {
            supplier_id: self.supplier_id,
            bucket: self.bucket,
        }
    }
}

/// `?supplier_id=` for the summary endpoint.
#[derive(Debug, Default, Deserialize)]
pub struct SummaryParams {
    pub supplier_id: Option<DbId>,
}

#[derive(Debug, Deserialize)]
pub struct ReassignRequest {
    pub product_id: DbId,
}

#[derive(Debug, Deserialize)]
pub struct MergeRequest {
    pub target_product_id: DbId,
}

/* --------------------------------------------------------------------------
Reads
-------------------------------------------------------------------------- */

/// GET /api/v1/review/queue
///
/// Lowest confidence first; unmatched items lead.
pub async fn list_queue(
    RequireReviewer(_user): RequireReviewer,
    State(state): State<AppState>,
    Query(params): Query<QueueListParams>,
) -> AppResult<impl IntoResponse> {
    let limit = clamp_limit(params.limit, DEFAULT_QUEUE_LIMIT, MAX_QUEUE_LIMIT);
    let offset = clamp_offset(params.offset);
    let items = ReviewQueueRepo::list(&state.pool, &params.filter(), limit, offset).await?;
    Ok(Json(DataResponse { data: items }))
}

/// GET /api/v1/review/queue/summary
pub async fn summary(
    RequireReviewer(_user): RequireReviewer,
    State(state): State<AppState>,
    Query(params): Query<SummaryParams>,
) -> AppResult<impl IntoResponse> {
    let summary = ReviewQueueRepo::summary(&state.pool, params.supplier_id).await?;
    Ok(Json(DataResponse { data: summary }))
}

/// GET /api/v1/review/queue/{id}/navigation
///
/// Position of the item in the filtered queue with its neighbours.
pub async fn navigation(
    RequireReviewer(_user): RequireReviewer,
    State(state): State<AppState>,
    Path(item_id): Path<DbId>,
    Query(params): Query<QueueListParams>,
) -> AppResult<impl IntoResponse> {
    SupplierItemRepo::find_by_id(&state.pool, item_id)
        .await?
        .ok_or_else(|| AppError::not_found("SupplierItem", item_id))?;
    let nav = ReviewQueueRepo::navigation(&state.pool, &params.filter(), item_id).await?;
    Ok(Json(DataResponse { data: nav }))
}

/* --------------------------------------------------------------------------
Triage actions
-------------------------------------------------------------------------- */

/// POST /api/v1/review/queue/{id}/confirm
pub async fn confirm(
    RequireReviewer(user): RequireReviewer,
    State(state): State<AppState>,
    Path(item_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let result = triage::confirm(&state.pool, item_id, &user.identity()).await?;
    Ok(Json(DataResponse { data: result }))
}

/// POST /api/v1/review/queue/{id}/reassign
pub async fn reassign(
    RequireReviewer(user): RequireReviewer,
    State(state): State<AppState>,
    Path(item_id): Path<DbId>,
    Json(input): Json<ReassignRequest>,
) -> AppResult<impl IntoResponse> {
    let result = triage::reassign(&state.pool, item_id, input.product_id, &user.identity()).await?;
    Ok(Json(DataResponse { data: result }))
}

/// POST /api/v1/review/queue/{id}/create-product
///
/// The body is optional; without it the product is built from the item's
/// own name and GTIN.
pub async fn create_product(
    RequireReviewer(user): RequireReviewer,
    State(state): State<AppState>,
    Path(item_id): Path<DbId>,
    input: Option<Json<CreateProductOverrides>>,
) -> AppResult<impl IntoResponse> {
    let overrides = input.map(|Json(body)| body).unwrap_or_default();
    let result =
        triage::create_product(&state.pool, item_id, &overrides, &user.identity()).await?;
    Ok(Json(DataResponse { data: result }))
}

/// POST /api/v1/review/queue/{id}/merge
pub async fn merge(
    RequireReviewer(user): RequireReviewer,
    State(state): State<AppState>,
    Path(item_id): Path<DbId>,
    Json(input): Json<MergeRequest>,
) -> AppResult<impl IntoResponse> {
    let result =
        triage::merge(&state.pool, item_id, input.target_product_id, &user.identity()).await?;
    Ok(Json(DataResponse { data: result }))
}

/// POST /api/v1/review/queue/{id}/ignore
pub async fn ignore(
    RequireReviewer(user): RequireReviewer,
    State(state): State<AppState>,
    Path(item_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let result = triage::ignore(&state.pool, item_id, &user.identity()).await?;
    Ok(Json(DataResponse { data: result }))
}
