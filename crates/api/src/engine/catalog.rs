//! Catalog ingestion: upsert supplier rows and run the identity matcher.

use medsupply_core::error::CoreError;
use medsupply_core::matching::{
    self, CandidateSet, KeepReason, MatchResult, RawCatalogItem, RematchPlan, MAX_INGEST_ROWS,
    MAX_NAME_CANDIDATES,
};
use medsupply_core::types::DbId;
use medsupply_db::models::product::CanonicalProduct;
use medsupply_db::repositories::{ProductRepo, SupplierItemRepo, SupplierMappingRepo};
use serde::Serialize;
use sqlx::PgPool;
use validator::Validate;

use crate::error::{AppError, AppResult};

/// `matched_by` value for links written by the automated matcher.
pub const MATCHER_ACTOR: &str = "system:matcher";

/// What happened to one ingested row.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum RowOutcome {
    /// The matcher result was written to the item.
    Applied,
    /// The stored link was left alone.
    Kept { reason: KeepReason },
}

#[derive(Debug, Clone, Serialize)]
pub struct IngestedItem {
    pub supplier_item_id: DbId,
    pub supplier_sku: String,
    /// The written result when applied, otherwise the matcher's verdict.
    pub result: MatchResult,
    #[serde(flatten)]
    pub outcome: RowOutcome,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct IngestSummary {
    pub processed: usize,
    /// Rows whose stored link is now confident (no review needed).
    pub linked: usize,
    /// Rows now waiting in the review queue.
    pub queued: usize,
    pub items: Vec<IngestedItem>,
}

/// Validate a whole batch before anything is written.
fn validate_rows(rows: &[RawCatalogItem]) -> Result<(), CoreError> {
    if rows.is_empty() {
        return Err(CoreError::Validation("At least one catalog row is required".into()));
    }
    if rows.len() > MAX_INGEST_ROWS {
        return Err(CoreError::Validation(format!(
            "At most {MAX_INGEST_ROWS} rows can be ingested per request, got {}",
            rows.len()
        )));
    }
    for (index, row) in rows.iter().enumerate() {
        row.validate().map_err(|e| {
            CoreError::Validation(format!("Row {index} (sku '{}'): {e}", row.supplier_sku))
        })?;
        if row.supplier_sku.trim().is_empty() || row.supplier_name.trim().is_empty() {
            return Err(CoreError::Validation(format!(
                "Row {index}: supplier_sku and supplier_name must not be blank"
            )));
        }
    }
    Ok(())
}

fn candidates(products: Vec<CanonicalProduct>) -> Vec<matching::ProductCandidate> {
    products.iter().map(CanonicalProduct::as_candidate).collect()
}

/// Gather everything the matcher may consult for one row.
pub async fn load_candidates(
    pool: &PgPool,
    supplier_id: DbId,
    raw: &RawCatalogItem,
) -> AppResult<CandidateSet> {
    let gtin_matches = match raw.gtin.as_deref().map(str::trim).filter(|g| !g.is_empty()) {
        Some(gtin) => candidates(ProductRepo::find_by_gtin(pool, gtin).await?),
        None => Vec::new(),
    };

    let mapped_product_id =
        SupplierMappingRepo::find_product_id(pool, supplier_id, raw.supplier_sku.trim()).await?;

    let scan_matches = match matching::scan_lookup_key(raw) {
        Some(key) => candidates(ProductRepo::find_by_gtin14(pool, &key).await?),
        None => Vec::new(),
    };

    let patterns = matching::name_search_patterns(&raw.supplier_name);
    let name_candidates = candidates(
        ProductRepo::search_by_name_patterns(
            pool,
            &patterns,
            raw.supplier_name.trim(),
            MAX_NAME_CANDIDATES,
        )
        .await?,
    );

    Ok(CandidateSet {
        gtin_matches,
        mapped_product_id,
        scan_matches,
        name_candidates,
    })
}

/// Upsert and match every row, one short transaction per row.
pub async fn ingest(
    pool: &PgPool,
    supplier_id: DbId,
    rows: &[RawCatalogItem],
) -> AppResult<IngestSummary> {
    validate_rows(rows)?;

    let mut summary = IngestSummary::default();

    for raw in rows {
        let item = SupplierItemRepo::upsert_raw(pool, supplier_id, raw).await?;
        let candidate_set = load_candidates(pool, supplier_id, raw).await?;
        let result = matching::resolve(raw, &candidate_set);

        let mut tx = pool.begin().await?;
        let locked = SupplierItemRepo::lock(&mut tx, item.id)
            .await?
            .ok_or_else(|| AppError::not_found("SupplierItem", item.id))?;

        let (stored, result, outcome) =
            match matching::plan_rematch(&locked.current_link(), result.clone()) {
                RematchPlan::Apply(applied) => {
                    let updated =
                        SupplierItemRepo::apply_match(&mut tx, locked.id, &applied, MATCHER_ACTOR)
                            .await?;
                    (updated, applied, RowOutcome::Applied)
                }
                RematchPlan::Keep(reason) => (locked, result, RowOutcome::Kept { reason }),
            };
        tx.commit().await?;

        tracing::debug!(
            supplier_id,
            supplier_item_id = stored.id,
            method = %result.method,
            confidence = ?result.confidence,
            product_id = ?result.product_id,
            outcome = ?outcome,
            "Catalog row matched"
        );

        if stored.is_active && stored.needs_review {
            summary.queued += 1;
        } else if stored.is_active && stored.product_id.is_some() {
            summary.linked += 1;
        }
        summary.processed += 1;
        summary.items.push(IngestedItem {
            supplier_item_id: stored.id,
            supplier_sku: stored.supplier_sku.clone(),
            result,
            outcome,
        });
    }

    tracing::info!(
        supplier_id,
        processed = summary.processed,
        linked = summary.linked,
        queued = summary.queued,
        "Catalog ingested"
    );

    Ok(summary)
}
