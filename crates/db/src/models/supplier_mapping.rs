//! Curated supplier SKU to product mappings.

use medsupply_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `supplier_mappings` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct SupplierMapping {
    pub id: DbId,
    pub supplier_id: DbId,
    pub supplier_sku: String,
    pub product_id: DbId,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating or replacing a mapping.
#[derive(Debug, Clone, Deserialize)]
pub struct UpsertSupplierMapping {
    pub supplier_id: DbId,
    pub supplier_sku: String,
    pub product_id: DbId,
}
