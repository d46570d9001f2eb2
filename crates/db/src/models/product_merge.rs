//! Product merge hand-off rows written by review-queue triage.

use medsupply_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `product_merge_requests` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ProductMergeRequest {
    pub id: DbId,
    pub supplier_item_id: DbId,
    pub source_product_id: DbId,
    pub target_product_id: DbId,
    pub requested_by: String,
    pub created_at: Timestamp,
}
