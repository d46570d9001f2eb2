//! Review queue read models.

use medsupply_core::matching::ConfidenceBucket;
use medsupply_core::status::StatusId;
use medsupply_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::supplier_item::serialize_match_method;

/// One queued supplier item with enough context to triage it.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ReviewQueueItem {
    pub id: DbId,
    pub supplier_id: DbId,
    pub supplier_name: String,
    pub supplier_sku: String,
    pub item_name: String,
    pub gtin: Option<String>,
    pub scanned_code: Option<String>,
    pub product_id: Option<DbId>,
    pub product_name: Option<String>,
    pub product_gtin: Option<String>,
    #[serde(rename = "match_method", serialize_with = "serialize_match_method")]
    pub match_method_id: Option<StatusId>,
    pub match_confidence: Option<f64>,
    pub matched_at: Option<Timestamp>,
}

impl ReviewQueueItem {
    pub fn bucket(&self) -> ConfidenceBucket {
        ConfidenceBucket::from_confidence(self.match_confidence)
    }
}

/// Filters accepted by the queue listing and navigation.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct ReviewQueueFilter {
    pub supplier_id: Option<DbId>,
    pub bucket: Option<ConfidenceBucket>,
}

/// Queue size broken down by confidence bucket.
#[derive(Debug, Clone, Default, FromRow, Serialize, PartialEq, Eq)]
pub struct ReviewQueueSummary {
    pub total: i64,
    pub unmatched: i64,
    pub low: i64,
    pub medium: i64,
    pub high: i64,
}

/// Position of one item within the filtered queue.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct QueueNavigation {
    pub item_id: DbId,
    /// 1-based position, `None` when the item is not in the filtered queue.
    pub position: Option<i64>,
    pub total: i64,
    pub previous_id: Option<DbId>,
    pub next_id: Option<DbId>,
}
