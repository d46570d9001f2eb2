//! Supplier correction models.

use medsupply_core::correction::{CorrectionData, OpenCorrection};
use medsupply_core::error::CoreError;
use medsupply_core::status::{CorrectionStatus, StatusId};
use medsupply_core::types::{DbId, Timestamp};
use serde::{Serialize, Serializer};
use sqlx::types::Json;
use sqlx::FromRow;

/// A row from the `corrections` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Correction {
    pub id: DbId,
    pub supplier_item_id: DbId,
    pub supplier_id: DbId,
    #[serde(rename = "status", serialize_with = "serialize_correction_status")]
    pub status_id: StatusId,
    pub original_data: Json<CorrectionData>,
    pub proposed_data: Json<CorrectionData>,
    pub created_by: String,
    pub submitted_at: Option<Timestamp>,
    pub reviewed_at: Option<Timestamp>,
    pub reviewed_by: Option<String>,
    pub review_notes: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Correction {
    /// Decode the stored status id. An id outside the lookup table means the
    /// schema and the enum have drifted apart.
    pub fn status(&self) -> Result<CorrectionStatus, CoreError> {
        CorrectionStatus::from_id(self.status_id).ok_or_else(|| {
            CoreError::Internal(format!(
                "Correction {} has unknown status id {}",
                self.id, self.status_id
            ))
        })
    }

    pub fn as_open(&self) -> Result<OpenCorrection, CoreError> {
        Ok(OpenCorrection {
            id: self.id,
            status: self.status()?,
            original: self.original_data.0.clone(),
        })
    }
}

/// Per-status correction counts for one supplier.
#[derive(Debug, Clone, Default, FromRow, Serialize, PartialEq, Eq)]
pub struct CorrectionCounts {
    pub draft: i64,
    pub pending: i64,
    pub approved: i64,
    pub rejected: i64,
}

/// A pending correction joined with the item and supplier it belongs to.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct PendingCorrection {
    pub id: DbId,
    pub supplier_item_id: DbId,
    pub supplier_id: DbId,
    pub supplier_name: String,
    pub supplier_sku: String,
    pub item_name: String,
    pub product_id: Option<DbId>,
    pub original_data: Json<CorrectionData>,
    pub proposed_data: Json<CorrectionData>,
    pub created_by: String,
    pub submitted_at: Option<Timestamp>,
    pub created_at: Timestamp,
}

/// Serialize a `status_id` column as its wire label.
fn serialize_correction_status<S: Serializer>(
    id: &StatusId,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    match CorrectionStatus::from_id(*id) {
        Some(status) => status.serialize(serializer),
        None => serializer.serialize_i16(*id),
    }
}
