//! Repository for the `supplier_mappings` table.

use medsupply_core::types::DbId;
use sqlx::PgPool;

use crate::models::supplier_mapping::{SupplierMapping, UpsertSupplierMapping};

const COLUMNS: &str = "id, supplier_id, supplier_sku, product_id, created_at, updated_at";

/// Provides access to curated supplier SKU mappings.
pub struct SupplierMappingRepo;

impl SupplierMappingRepo {
    /// Create a mapping or repoint an existing one at a new product.
    pub async fn upsert(
        pool: &PgPool,
        input: &UpsertSupplierMapping,
    ) -> Result<SupplierMapping, sqlx::Error> {
        let query = format!(
            "INSERT INTO supplier_mappings (supplier_id, supplier_sku, product_id)
             VALUES ($1, $2, $3)
             ON CONFLICT ON CONSTRAINT uq_supplier_mappings_supplier_sku
             DO UPDATE SET product_id = EXCLUDED.product_id
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, SupplierMapping>(&query)
            .bind(input.supplier_id)
            .bind(&input.supplier_sku)
            .bind(input.product_id)
            .fetch_one(pool)
            .await
    }

    /// The product a supplier SKU is mapped to, if any.
    pub async fn find_product_id(
        pool: &PgPool,
        supplier_id: DbId,
        supplier_sku: &str,
    ) -> Result<Option<DbId>, sqlx::Error> {
        sqlx::query_scalar(
            "SELECT product_id FROM supplier_mappings
             WHERE supplier_id = $1 AND supplier_sku = $2",
        )
        .bind(supplier_id)
        .bind(supplier_sku)
        .fetch_optional(pool)
        .await
    }
}
