//! Repository for the `corrections` table.
//!
//! Mutations take a caller-owned transaction: every state change is
//! preceded by a `FOR UPDATE` read of the row it depends on, and the status
//! guard is repeated in the `WHERE` clause of the write.

use medsupply_core::correction::CorrectionData;
use medsupply_core::status::{CorrectionStatus, StatusId};
use medsupply_core::types::DbId;
use sqlx::types::Json;
use sqlx::PgPool;

use crate::models::correction::{Correction, CorrectionCounts, PendingCorrection};
use crate::DbTransaction;

/// Column list for corrections queries.
const COLUMNS: &str = "id, supplier_item_id, supplier_id, status_id, original_data, \
    proposed_data, created_by, submitted_at, reviewed_at, reviewed_by, review_notes, \
    created_at, updated_at";

/// Provides workflow persistence for supplier corrections.
pub struct CorrectionRepo;

fn open_status_ids() -> Vec<StatusId> {
    CorrectionStatus::OPEN.iter().map(|s| s.id()).collect()
}

impl CorrectionRepo {
    // -----------------------------------------------------------------------
    // Transactional writes
    // -----------------------------------------------------------------------

    /// Lock the DRAFT or PENDING correction of an item, if one exists.
    pub async fn lock_open_for_item(
        tx: &mut DbTransaction<'_>,
        supplier_item_id: DbId,
    ) -> Result<Option<Correction>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM corrections
             WHERE supplier_item_id = $1 AND status_id = ANY($2)
             FOR UPDATE"
        );
        sqlx::query_as::<_, Correction>(&query)
            .bind(supplier_item_id)
            .bind(open_status_ids())
            .fetch_optional(&mut **tx)
            .await
    }

    /// Insert a new DRAFT correction.
    pub async fn insert_draft(
        tx: &mut DbTransaction<'_>,
        supplier_item_id: DbId,
        supplier_id: DbId,
        original: &CorrectionData,
        proposed: &CorrectionData,
        created_by: &str,
    ) -> Result<Correction, sqlx::Error> {
        let query = format!(
            "INSERT INTO corrections
                (supplier_item_id, supplier_id, status_id, original_data, proposed_data, created_by)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Correction>(&query)
            .bind(supplier_item_id)
            .bind(supplier_id)
            .bind(CorrectionStatus::Draft.id())
            .bind(Json(original))
            .bind(Json(proposed))
            .bind(created_by)
            .fetch_one(&mut **tx)
            .await
    }

    /// Replace the proposal of a DRAFT correction.
    pub async fn update_proposed(
        tx: &mut DbTransaction<'_>,
        id: DbId,
        proposed: &CorrectionData,
    ) -> Result<Option<Correction>, sqlx::Error> {
        let query = format!(
            "UPDATE corrections SET proposed_data = $2
             WHERE id = $1 AND status_id = $3
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Correction>(&query)
            .bind(id)
            .bind(Json(proposed))
            .bind(CorrectionStatus::Draft.id())
            .fetch_optional(&mut **tx)
            .await
    }

    /// Delete a DRAFT correction. Returns `true` if a row was removed.
    pub async fn delete_draft(tx: &mut DbTransaction<'_>, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM corrections WHERE id = $1 AND status_id = $2")
            .bind(id)
            .bind(CorrectionStatus::Draft.id())
            .execute(&mut **tx)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Lock one correction for the rest of the transaction.
    pub async fn lock_by_id(
        tx: &mut DbTransaction<'_>,
        id: DbId,
    ) -> Result<Option<Correction>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM corrections WHERE id = $1 FOR UPDATE");
        sqlx::query_as::<_, Correction>(&query)
            .bind(id)
            .fetch_optional(&mut **tx)
            .await
    }

    /// Lock every DRAFT of a supplier, in id order.
    pub async fn lock_drafts_for_supplier(
        tx: &mut DbTransaction<'_>,
        supplier_id: DbId,
    ) -> Result<Vec<Correction>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM corrections
             WHERE supplier_id = $1 AND status_id = $2
             ORDER BY id ASC
             FOR UPDATE"
        );
        sqlx::query_as::<_, Correction>(&query)
            .bind(supplier_id)
            .bind(CorrectionStatus::Draft.id())
            .fetch_all(&mut **tx)
            .await
    }

    /// Move the given DRAFTs to PENDING. Returns the number of rows moved;
    /// rows that are no longer DRAFT are skipped.
    pub async fn mark_submitted(
        tx: &mut DbTransaction<'_>,
        ids: &[DbId],
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE corrections SET status_id = $2, submitted_at = NOW()
             WHERE id = ANY($1) AND status_id = $3",
        )
        .bind(ids)
        .bind(CorrectionStatus::Pending.id())
        .bind(CorrectionStatus::Draft.id())
        .execute(&mut **tx)
        .await?;
        Ok(result.rows_affected())
    }

    /// Record a review decision on a PENDING correction. Returns `None` if
    /// the row was not PENDING.
    pub async fn mark_reviewed(
        tx: &mut DbTransaction<'_>,
        id: DbId,
        status: CorrectionStatus,
        reviewed_by: &str,
        notes: Option<&str>,
    ) -> Result<Option<Correction>, sqlx::Error> {
        let query = format!(
            "UPDATE corrections SET
                status_id = $2,
                reviewed_at = NOW(),
                reviewed_by = $3,
                review_notes = $4
             WHERE id = $1 AND status_id = $5
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Correction>(&query)
            .bind(id)
            .bind(status.id())
            .bind(reviewed_by)
            .bind(notes)
            .bind(CorrectionStatus::Pending.id())
            .fetch_optional(&mut **tx)
            .await
    }

    // -----------------------------------------------------------------------
    // Reads
    // -----------------------------------------------------------------------

    /// Find a correction by its ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Correction>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM corrections WHERE id = $1");
        sqlx::query_as::<_, Correction>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find a correction scoped to its owning supplier.
    pub async fn find_for_supplier(
        pool: &PgPool,
        supplier_id: DbId,
        id: DbId,
    ) -> Result<Option<Correction>, sqlx::Error> {
        let query =
            format!("SELECT {COLUMNS} FROM corrections WHERE id = $1 AND supplier_id = $2");
        sqlx::query_as::<_, Correction>(&query)
            .bind(id)
            .bind(supplier_id)
            .fetch_optional(pool)
            .await
    }

    /// All DRAFTs of a supplier, most recently edited first.
    pub async fn find_drafts_by_supplier(
        pool: &PgPool,
        supplier_id: DbId,
    ) -> Result<Vec<Correction>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM corrections
             WHERE supplier_id = $1 AND status_id = $2
             ORDER BY updated_at DESC, id DESC"
        );
        sqlx::query_as::<_, Correction>(&query)
            .bind(supplier_id)
            .bind(CorrectionStatus::Draft.id())
            .fetch_all(pool)
            .await
    }

    /// Per-status counts for one supplier. Statuses with no rows count zero.
    pub async fn count_by_status(
        pool: &PgPool,
        supplier_id: DbId,
    ) -> Result<CorrectionCounts, sqlx::Error> {
        sqlx::query_as::<_, CorrectionCounts>(
            "SELECT
                COUNT(*) FILTER (WHERE status_id = $2) AS draft,
                COUNT(*) FILTER (WHERE status_id = $3) AS pending,
                COUNT(*) FILTER (WHERE status_id = $4) AS approved,
                COUNT(*) FILTER (WHERE status_id = $5) AS rejected
             FROM corrections
             WHERE supplier_id = $1",
        )
        .bind(supplier_id)
        .bind(CorrectionStatus::Draft.id())
        .bind(CorrectionStatus::Pending.id())
        .bind(CorrectionStatus::Approved.id())
        .bind(CorrectionStatus::Rejected.id())
        .fetch_one(pool)
        .await
    }

    /// PENDING corrections on active items, oldest submission first.
    pub async fn find_pending_for_review(
        pool: &PgPool,
        limit: i64,
    ) -> Result<Vec<PendingCorrection>, sqlx::Error> {
        sqlx::query_as::<_, PendingCorrection>(
            "SELECT
                c.id,
                c.supplier_item_id,
                c.supplier_id,
                s.name AS supplier_name,
                si.supplier_sku,
                si.supplier_name AS item_name,
                si.product_id,
                c.original_data,
                c.proposed_data,
                c.created_by,
                c.submitted_at,
                c.created_at
             FROM corrections c
             JOIN supplier_items si ON si.id = c.supplier_item_id
             JOIN suppliers s ON s.id = c.supplier_id
             WHERE c.status_id = $1
               AND si.is_active
             ORDER BY c.submitted_at ASC NULLS LAST, c.id ASC
             LIMIT $2",
        )
        .bind(CorrectionStatus::Pending.id())
        .bind(limit)
        .fetch_all(pool)
        .await
    }

    /// Full correction history of one item, newest first.
    pub async fn list_for_item(
        pool: &PgPool,
        supplier_item_id: DbId,
    ) -> Result<Vec<Correction>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM corrections
             WHERE supplier_item_id = $1
             ORDER BY created_at DESC, id DESC"
        );
        sqlx::query_as::<_, Correction>(&query)
            .bind(supplier_item_id)
            .fetch_all(pool)
            .await
    }
}
