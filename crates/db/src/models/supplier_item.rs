//! Supplier catalog item model.

use medsupply_core::matching::{ConfidenceBucket, CurrentLink};
use medsupply_core::status::{MatchMethod, StatusId};
use medsupply_core::triage::QueueState;
use medsupply_core::types::{DbId, Timestamp};
use serde::{Serialize, Serializer};
use sqlx::FromRow;

/// A row from the `supplier_items` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct SupplierItem {
    pub id: DbId,
    pub supplier_id: DbId,
    pub product_id: Option<DbId>,
    pub supplier_sku: String,
    pub supplier_name: String,
    pub supplier_description: Option<String>,
    pub unit_price_cents: Option<i64>,
    pub min_order_qty: Option<i32>,
    pub currency: String,
    pub gtin: Option<String>,
    pub scanned_code: Option<String>,
    #[serde(rename = "match_method", serialize_with = "serialize_match_method")]
    pub match_method_id: Option<StatusId>,
    pub match_confidence: Option<f64>,
    pub matched_at: Option<Timestamp>,
    pub matched_by: Option<String>,
    pub needs_review: bool,
    pub is_active: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl SupplierItem {
    pub fn match_method(&self) -> Option<MatchMethod> {
        self.match_method_id.and_then(MatchMethod::from_id)
    }

    pub fn bucket(&self) -> ConfidenceBucket {
        ConfidenceBucket::from_confidence(self.match_confidence)
    }

    /// The stored link, as the re-match planner sees it.
    pub fn current_link(&self) -> CurrentLink {
        CurrentLink {
            product_id: self.product_id,
            method: self.match_method(),
            confidence: self.match_confidence,
            needs_review: self.needs_review,
            is_active: self.is_active,
        }
    }

    /// The queue-relevant fields, as the triage planner sees them.
    pub fn queue_state(&self) -> QueueState {
        QueueState {
            item_id: self.id,
            product_id: self.product_id,
            confidence: self.match_confidence,
            needs_review: self.needs_review,
            is_active: self.is_active,
        }
    }
}

/// Serialize a `match_method_id` column as its wire label.
pub(crate) fn serialize_match_method<S: Serializer>(
    id: &Option<StatusId>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    match id.and_then(MatchMethod::from_id) {
        Some(method) => method.serialize(serializer),
        None => serializer.serialize_none(),
    }
}
