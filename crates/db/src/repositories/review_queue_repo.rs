//! Read-side repository for the supplier item review queue.
//!
//! The queue is every active supplier item flagged `needs_review`, ordered
//! unmatched first, then by ascending confidence, then oldest match.

use medsupply_core::matching::ConfidenceBucket;
use medsupply_core::types::DbId;
use sqlx::PgPool;

use crate::models::review_queue::{
    QueueNavigation, ReviewQueueFilter, ReviewQueueItem, ReviewQueueSummary,
};

/// Queue membership plus optional filters. Binds: `$1` supplier id,
/// `$2` unmatched-only flag, `$3`/`$4` confidence range.
const QUEUE_WHERE: &str = "si.needs_review AND si.is_active
    AND ($1::BIGINT IS NULL OR si.supplier_id = $1)
    AND (NOT $2::BOOLEAN OR si.match_confidence IS NULL)
    AND ($3::FLOAT8 IS NULL OR (si.match_confidence >= $3 AND si.match_confidence < $4::FLOAT8))";

const QUEUE_ORDER: &str =
    "si.match_confidence ASC NULLS FIRST, si.matched_at ASC NULLS LAST, si.id ASC";

/// Bind values for [`QUEUE_WHERE`].
struct FilterBinds {
    supplier_id: Option<DbId>,
    unmatched_only: bool,
    lower: Option<f64>,
    upper: Option<f64>,
}

impl From<&ReviewQueueFilter> for FilterBinds {
    fn from(filter: &ReviewQueueFilter) -> Self {
        let (unmatched_only, range) = match filter.bucket {
            None => (false, None),
            Some(ConfidenceBucket::Unmatched) => (true, None),
            Some(bucket) => (false, bucket.range()),
        };
        Self {
            supplier_id: filter.supplier_id,
            unmatched_only,
            lower: range.map(|(lo, _)| lo),
            upper: range.map(|(_, hi)| hi),
        }
    }
}

#[derive(sqlx::FromRow)]
struct NavigationRow {
    position: i64,
    previous_id: Option<DbId>,
    next_id: Option<DbId>,
    total: i64,
}

/// Provides review queue listings, summaries and navigation.
pub struct ReviewQueueRepo;

impl ReviewQueueRepo {
    /// One page of the filtered queue.
    pub async fn list(
        pool: &PgPool,
        filter: &ReviewQueueFilter,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<ReviewQueueItem>, sqlx::Error> {
        let binds = FilterBinds::from(filter);
        let query = format!(
            "SELECT
                si.id,
                si.supplier_id,
                s.name AS supplier_name,
                si.supplier_sku,
                si.supplier_name AS item_name,
                si.gtin,
                si.scanned_code,
                si.product_id,
                p.name AS product_name,
                p.gtin AS product_gtin,
                si.match_method_id,
                si.match_confidence,
                si.matched_at
             FROM supplier_items si
             JOIN suppliers s ON s.id = si.supplier_id
             LEFT JOIN canonical_products p ON p.id = si.product_id
             WHERE {QUEUE_WHERE}
             ORDER BY {QUEUE_ORDER}
             LIMIT $5 OFFSET $6"
        );
        sqlx::query_as::<_, ReviewQueueItem>(&query)
            .bind(binds.supplier_id)
            .bind(binds.unmatched_only)
            .bind(binds.lower)
            .bind(binds.upper)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    /// Queue size per confidence bucket, optionally for one supplier.
    pub async fn summary(
        pool: &PgPool,
        supplier_id: Option<DbId>,
    ) -> Result<ReviewQueueSummary, sqlx::Error> {
        sqlx::query_as::<_, ReviewQueueSummary>(
            "SELECT
                COUNT(*) AS total,
                COUNT(*) FILTER (WHERE si.match_confidence IS NULL) AS unmatched,
                COUNT(*) FILTER (WHERE si.match_confidence < $2) AS low,
                COUNT(*) FILTER (WHERE si.match_confidence >= $2 AND si.match_confidence < $3) AS medium,
                COUNT(*) FILTER (WHERE si.match_confidence >= $3) AS high
             FROM supplier_items si
             WHERE si.needs_review AND si.is_active
               AND ($1::BIGINT IS NULL OR si.supplier_id = $1)",
        )
        .bind(supplier_id)
        .bind(medsupply_core::matching::MEDIUM_CONFIDENCE_FLOOR)
        .bind(medsupply_core::matching::LOW_CONFIDENCE_THRESHOLD)
        .fetch_one(pool)
        .await
    }

    /// Where `item_id` sits in the filtered queue, with its neighbours.
    pub async fn navigation(
        pool: &PgPool,
        filter: &ReviewQueueFilter,
        item_id: DbId,
    ) -> Result<QueueNavigation, sqlx::Error> {
        let binds = FilterBinds::from(filter);
        let query = format!(
            "WITH queue AS (
                SELECT
                    si.id,
                    ROW_NUMBER() OVER w AS position,
                    LAG(si.id) OVER w AS previous_id,
                    LEAD(si.id) OVER w AS next_id,
                    COUNT(*) OVER () AS total
                FROM supplier_items si
                WHERE {QUEUE_WHERE}
                WINDOW w AS (ORDER BY {QUEUE_ORDER})
             )
             SELECT position, previous_id, next_id, total FROM queue WHERE id = $5"
        );
        let row = sqlx::query_as::<_, NavigationRow>(&query)
            .bind(binds.supplier_id)
            .bind(binds.unmatched_only)
            .bind(binds.lower)
            .bind(binds.upper)
            .bind(item_id)
            .fetch_optional(pool)
            .await?;

        if let Some(row) = row {
            return Ok(QueueNavigation {
                item_id,
                position: Some(row.position),
                total: row.total,
                previous_id: row.previous_id,
                next_id: row.next_id,
            });
        }

        // Not queued (or filtered out): report the queue size and the head.
        let count_query = format!(
            "SELECT COUNT(*) FROM supplier_items si WHERE {QUEUE_WHERE}"
        );
        let total: i64 = sqlx::query_scalar(&count_query)
            .bind(binds.supplier_id)
            .bind(binds.unmatched_only)
            .bind(binds.lower)
            .bind(binds.upper)
            .fetch_one(pool)
            .await?;
        let head_query = format!(
            "SELECT si.id FROM supplier_items si WHERE {QUEUE_WHERE} ORDER BY {QUEUE_ORDER} LIMIT 1"
        );
        let head: Option<DbId> = sqlx::query_scalar(&head_query)
            .bind(binds.supplier_id)
            .bind(binds.unmatched_only)
            .bind(binds.lower)
            .bind(binds.upper)
            .fetch_optional(pool)
            .await?;

        Ok(QueueNavigation {
            item_id,
            position: None,
            total,
            previous_id: None,
            next_id: head,
        })
    }
}
