//! Repository for the `product_merge_requests` table.

use medsupply_core::types::DbId;
use sqlx::PgPool;

use crate::models::product_merge::ProductMergeRequest;
use crate::DbTransaction;

const COLUMNS: &str =
    "id, supplier_item_id, source_product_id, target_product_id, requested_by, created_at";

/// Records merge hand-offs for the product-merge subsystem.
pub struct ProductMergeRepo;

impl ProductMergeRepo {
    /// Record a merge request inside the triage transaction.
    pub async fn create_in_tx(
        tx: &mut DbTransaction<'_>,
        supplier_item_id: DbId,
        source_product_id: DbId,
        target_product_id: DbId,
        requested_by: &str,
    ) -> Result<ProductMergeRequest, sqlx::Error> {
        let query = format!(
            "INSERT INTO product_merge_requests
                (supplier_item_id, source_product_id, target_product_id, requested_by)
             VALUES ($1, $2, $3, $4)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, ProductMergeRequest>(&query)
            .bind(supplier_item_id)
            .bind(source_product_id)
            .bind(target_product_id)
            .bind(requested_by)
            .fetch_one(&mut **tx)
            .await
    }

    /// Merge requests raised from one supplier item, newest first.
    pub async fn list_for_item(
        pool: &PgPool,
        supplier_item_id: DbId,
    ) -> Result<Vec<ProductMergeRequest>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM product_merge_requests
             WHERE supplier_item_id = $1
             ORDER BY created_at DESC, id DESC"
        );
        sqlx::query_as::<_, ProductMergeRequest>(&query)
            .bind(supplier_item_id)
            .fetch_all(pool)
            .await
    }
}
