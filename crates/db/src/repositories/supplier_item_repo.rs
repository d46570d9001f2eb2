//! Repository for the `supplier_items` table.

use medsupply_core::correction::ApprovedChanges;
use medsupply_core::matching::{MatchResult, RawCatalogItem};
use medsupply_core::triage::LinkOutcome;
use medsupply_core::types::DbId;
use sqlx::PgPool;

use crate::models::supplier_item::SupplierItem;
use crate::DbTransaction;

/// Column list for supplier_items queries.
const COLUMNS: &str = "id, supplier_id, product_id, supplier_sku, supplier_name, \
    supplier_description, unit_price_cents, min_order_qty, currency, gtin, scanned_code, \
    match_method_id, match_confidence, matched_at, matched_by, needs_review, is_active, \
    created_at, updated_at";

/// Currency stored when a catalog row does not name one.
const DEFAULT_CURRENCY: &str = "USD";

/// Provides CRUD and link updates for supplier catalog items.
pub struct SupplierItemRepo;

impl SupplierItemRepo {
    /// Insert a catalog row or refresh the existing row for the same
    /// `(supplier_id, supplier_sku)`. Match columns are left untouched.
    pub async fn upsert_raw(
        pool: &PgPool,
        supplier_id: DbId,
        raw: &RawCatalogItem,
    ) -> Result<SupplierItem, sqlx::Error> {
        let query = format!(
            "INSERT INTO supplier_items
                (supplier_id, supplier_sku, supplier_name, supplier_description,
                 unit_price_cents, min_order_qty, currency, gtin, scanned_code)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
             ON CONFLICT ON CONSTRAINT uq_supplier_items_supplier_sku
             DO UPDATE SET
                supplier_name = EXCLUDED.supplier_name,
                supplier_description = EXCLUDED.supplier_description,
                unit_price_cents = EXCLUDED.unit_price_cents,
                min_order_qty = EXCLUDED.min_order_qty,
                currency = EXCLUDED.currency,
                gtin = EXCLUDED.gtin,
                scanned_code = EXCLUDED.scanned_code
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, SupplierItem>(&query)
            .bind(supplier_id)
            .bind(raw.supplier_sku.trim())
            .bind(raw.supplier_name.trim())
            .bind(raw.supplier_description.as_deref().map(str::trim))
            .bind(raw.unit_price_cents)
            .bind(raw.min_order_qty)
            .bind(raw.currency.as_deref().unwrap_or(DEFAULT_CURRENCY))
            .bind(raw.gtin.as_deref().map(str::trim).filter(|g| !g.is_empty()))
            .bind(raw.scanned_code.as_deref().map(str::trim).filter(|c| !c.is_empty()))
            .fetch_one(pool)
            .await
    }

    /// Find a supplier item by its ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<SupplierItem>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM supplier_items WHERE id = $1");
        sqlx::query_as::<_, SupplierItem>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find a supplier item scoped to its owning supplier.
    pub async fn find_for_supplier(
        pool: &PgPool,
        supplier_id: DbId,
        id: DbId,
    ) -> Result<Option<SupplierItem>, sqlx::Error> {
        let query =
            format!("SELECT {COLUMNS} FROM supplier_items WHERE id = $1 AND supplier_id = $2");
        sqlx::query_as::<_, SupplierItem>(&query)
            .bind(id)
            .bind(supplier_id)
            .fetch_optional(pool)
            .await
    }

    /// Lock an item row for the rest of the transaction.
    pub async fn lock(
        tx: &mut DbTransaction<'_>,
        id: DbId,
    ) -> Result<Option<SupplierItem>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM supplier_items WHERE id = $1 FOR UPDATE");
        sqlx::query_as::<_, SupplierItem>(&query)
            .bind(id)
            .fetch_optional(&mut **tx)
            .await
    }

    /// Lock an item row owned by `supplier_id`. Items of other suppliers
    /// read as absent.
    pub async fn lock_for_supplier(
        tx: &mut DbTransaction<'_>,
        supplier_id: DbId,
        id: DbId,
    ) -> Result<Option<SupplierItem>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM supplier_items
             WHERE id = $1 AND supplier_id = $2
             FOR UPDATE"
        );
        sqlx::query_as::<_, SupplierItem>(&query)
            .bind(id)
            .bind(supplier_id)
            .fetch_optional(&mut **tx)
            .await
    }

    /// Store a matcher result and stamp `matched_at`.
    pub async fn apply_match(
        tx: &mut DbTransaction<'_>,
        id: DbId,
        result: &MatchResult,
        matched_by: &str,
    ) -> Result<SupplierItem, sqlx::Error> {
        let query = format!(
            "UPDATE supplier_items SET
                product_id = $2,
                match_method_id = $3,
                match_confidence = $4,
                needs_review = $5,
                matched_at = NOW(),
                matched_by = $6
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, SupplierItem>(&query)
            .bind(id)
            .bind(result.product_id)
            .bind(result.method.id())
            .bind(result.confidence)
            .bind(result.needs_review)
            .bind(matched_by)
            .fetch_one(&mut **tx)
            .await
    }

    /// Store a triage outcome. `matched_by` records the reviewer.
    pub async fn apply_link(
        tx: &mut DbTransaction<'_>,
        id: DbId,
        outcome: &LinkOutcome,
        actor: &str,
    ) -> Result<SupplierItem, sqlx::Error> {
        let query = format!(
            "UPDATE supplier_items SET
                product_id = $2,
                match_method_id = $3,
                match_confidence = $4,
                needs_review = $5,
                is_active = $6,
                matched_at = NOW(),
                matched_by = $7
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, SupplierItem>(&query)
            .bind(id)
            .bind(outcome.product_id)
            .bind(outcome.method.id())
            .bind(outcome.confidence)
            .bind(outcome.needs_review)
            .bind(outcome.is_active)
            .bind(actor)
            .fetch_one(&mut **tx)
            .await
    }

    /// Take an item out of every queue. Link and review flag are kept.
    pub async fn deactivate(
        tx: &mut DbTransaction<'_>,
        id: DbId,
    ) -> Result<SupplierItem, sqlx::Error> {
        let query = format!(
            "UPDATE supplier_items SET is_active = FALSE
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, SupplierItem>(&query)
            .bind(id)
            .fetch_one(&mut **tx)
            .await
    }

    /// Write the fields of an approved correction. `None` keeps the column.
    pub async fn apply_approved_changes(
        tx: &mut DbTransaction<'_>,
        id: DbId,
        changes: &ApprovedChanges,
    ) -> Result<SupplierItem, sqlx::Error> {
        let query = format!(
            "UPDATE supplier_items SET
                unit_price_cents = COALESCE($2, unit_price_cents),
                min_order_qty = COALESCE($3, min_order_qty),
                supplier_description = COALESCE($4, supplier_description)
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, SupplierItem>(&query)
            .bind(id)
            .bind(changes.unit_price_cents)
            .bind(changes.min_order_qty)
            .bind(&changes.supplier_description)
            .fetch_one(&mut **tx)
            .await
    }
}
