//! Integration tests for the repository layer.
//!
//! Exercises queries that carry workflow guarantees at the storage level:
//! - Supplier item upsert keyed by (supplier, sku)
//! - The one-open-correction-per-item partial unique index
//! - Status-guarded correction writes
//! - Review queue ordering, filtering and navigation

use medsupply_core::correction::CorrectionData;
use medsupply_core::matching::{ConfidenceBucket, MatchResult, RawCatalogItem};
use medsupply_core::status::{CorrectionStatus, MatchMethod};
use medsupply_core::types::DbId;
use medsupply_db::models::product::CreateProduct;
use medsupply_db::models::review_queue::ReviewQueueFilter;
use medsupply_db::models::supplier::CreateSupplier;
use medsupply_db::models::supplier_mapping::UpsertSupplierMapping;
use medsupply_db::repositories::{
    CorrectionRepo, ProductRepo, ReviewQueueRepo, SupplierItemRepo, SupplierMappingRepo,
    SupplierRepo,
};
use sqlx::PgPool;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn raw(sku: &str, name: &str) -> RawCatalogItem {
    RawCatalogItem {
        supplier_sku: sku.to_string(),
        supplier_name: name.to_string(),
        supplier_description: Some("Box of 100".to_string()),
        gtin: None,
        scanned_code: None,
        unit_price_cents: Some(1_250),
        min_order_qty: Some(10),
        currency: None,
    }
}

fn new_product(name: &str, gtin: Option<&str>) -> CreateProduct {
    CreateProduct {
        name: name.to_string(),
        brand: None,
        gtin: gtin.map(str::to_string),
    }
}

async fn new_supplier(pool: &PgPool, name: &str) -> DbId {
    SupplierRepo::create(pool, &CreateSupplier { name: name.to_string() })
        .await
        .unwrap()
        .id
}

async fn set_match(pool: &PgPool, item_id: DbId, result: MatchResult) {
    let mut tx = pool.begin().await.unwrap();
    SupplierItemRepo::apply_match(&mut tx, item_id, &result, "system:test")
        .await
        .unwrap();
    tx.commit().await.unwrap();
}

fn fuzzy(product_id: DbId, confidence: f64) -> MatchResult {
    MatchResult {
        method: MatchMethod::FuzzyName,
        confidence: Some(confidence),
        product_id: Some(product_id),
        needs_review: confidence < 0.9,
    }
}

fn unmatched() -> MatchResult {
    MatchResult {
        method: MatchMethod::Manual,
        confidence: None,
        product_id: None,
        needs_review: true,
    }
}

// ---------------------------------------------------------------------------
// Supplier items
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_upsert_keeps_one_row_per_supplier_sku(pool: PgPool) {
    let supplier = new_supplier(&pool, "Acme Medical").await;

    let first = SupplierItemRepo::upsert_raw(&pool, supplier, &raw("G-100", "Nitrile Gloves M"))
        .await
        .unwrap();
    assert_eq!(first.currency, "USD");
    assert!(first.needs_review);
    assert!(first.is_active);
    assert_eq!(first.match_method(), None);

    let mut changed = raw("G-100", "Nitrile Gloves Medium");
    changed.unit_price_cents = Some(1_300);
    let second = SupplierItemRepo::upsert_raw(&pool, supplier, &changed)
        .await
        .unwrap();

    assert_eq!(first.id, second.id);
    assert_eq!(second.supplier_name, "Nitrile Gloves Medium");
    assert_eq!(second.unit_price_cents, Some(1_300));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_find_for_supplier_is_scoped(pool: PgPool) {
    let acme = new_supplier(&pool, "Acme Medical").await;
    let other = new_supplier(&pool, "Other Medical").await;
    let item = SupplierItemRepo::upsert_raw(&pool, acme, &raw("G-100", "Gloves"))
        .await
        .unwrap();

    assert!(SupplierItemRepo::find_for_supplier(&pool, acme, item.id)
        .await
        .unwrap()
        .is_some());
    assert!(SupplierItemRepo::find_for_supplier(&pool, other, item.id)
        .await
        .unwrap()
        .is_none());
}

// ---------------------------------------------------------------------------
// Products and mappings
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_gtin14_lookup_matches_padded_forms(pool: PgPool) {
    let product = ProductRepo::create(&pool, &new_product("Saline 0.9%", Some("0036000291452")))
        .await
        .unwrap();

    let found = ProductRepo::find_by_gtin14(&pool, "00036000291452").await.unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].id, product.id);

    assert!(ProductRepo::find_by_gtin(&pool, "036000291452").await.unwrap().is_empty());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_duplicate_product_gtin_is_rejected(pool: PgPool) {
    ProductRepo::create(&pool, &new_product("A", Some("4006381333931")))
        .await
        .unwrap();
    let err = ProductRepo::create(&pool, &new_product("B", Some("4006381333931")))
        .await
        .unwrap_err();
    let db_err = err.as_database_error().unwrap();
    assert_eq!(db_err.constraint(), Some("uq_canonical_products_gtin"));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_name_prefilter_matches_tokens(pool: PgPool) {
    let gauze = ProductRepo::create(&pool, &new_product("Sterile Gauze Pad 4x4", None))
        .await
        .unwrap();
    ProductRepo::create(&pool, &new_product("Exam Table Paper", None))
        .await
        .unwrap();

    let patterns = vec!["%gauze%".to_string(), "%sterile%".to_string()];
    let found = ProductRepo::search_by_name_patterns(&pool, &patterns, "sterile gauze", 200)
        .await
        .unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].id, gauze.id);

    assert!(ProductRepo::search_by_name_patterns(&pool, &[], "gauze", 200)
        .await
        .unwrap()
        .is_empty());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_name_prefilter_ranks_before_capping(pool: PgPool) {
    for n in 0..5 {
        ProductRepo::create(&pool, &new_product(&format!("Gloves assorted variant {n} zz"), None))
            .await
            .unwrap();
    }
    let best = ProductRepo::create(&pool, &new_product("Nitrile Exam Gloves", None))
        .await
        .unwrap();

    let patterns = vec![
        "%exam%".to_string(),
        "%gloves%".to_string(),
        "%nitrile%".to_string(),
    ];
    let found = ProductRepo::search_by_name_patterns(&pool, &patterns, "Nitrile Exam Gloves", 2)
        .await
        .unwrap();
    assert_eq!(found.len(), 2);
    assert_eq!(found[0].id, best.id);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_mapping_upsert_repoints(pool: PgPool) {
    let supplier = new_supplier(&pool, "Acme Medical").await;
    let a = ProductRepo::create(&pool, &new_product("A", None)).await.unwrap();
    let b = ProductRepo::create(&pool, &new_product("B", None)).await.unwrap();

    for product_id in [a.id, b.id] {
        SupplierMappingRepo::upsert(
            &pool,
            &UpsertSupplierMapping {
                supplier_id: supplier,
                supplier_sku: "G-100".to_string(),
                product_id,
            },
        )
        .await
        .unwrap();
    }

    let mapped = SupplierMappingRepo::find_product_id(&pool, supplier, "G-100")
        .await
        .unwrap();
    assert_eq!(mapped, Some(b.id));
    assert_eq!(
        SupplierMappingRepo::find_product_id(&pool, supplier, "NOPE")
            .await
            .unwrap(),
        None
    );
}

// ---------------------------------------------------------------------------
// Corrections
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_second_open_correction_violates_partial_index(pool: PgPool) {
    let supplier = new_supplier(&pool, "Acme Medical").await;
    let item = SupplierItemRepo::upsert_raw(&pool, supplier, &raw("G-100", "Gloves"))
        .await
        .unwrap();
    let original = CorrectionData::snapshot(Some(1_250), Some(10), Some("Box of 100"), None);
    let mut proposed = original.clone();
    proposed.unit_price_cents = Some(999);

    let mut tx = pool.begin().await.unwrap();
    CorrectionRepo::insert_draft(&mut tx, item.id, supplier, &original, &proposed, "user:1")
        .await
        .unwrap();
    let err = CorrectionRepo::insert_draft(&mut tx, item.id, supplier, &original, &proposed, "user:1")
        .await
        .unwrap_err();
    assert_eq!(
        err.as_database_error().unwrap().constraint(),
        Some("uq_corrections_open_per_item")
    );
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_status_guards_and_counts(pool: PgPool) {
    let supplier = new_supplier(&pool, "Acme Medical").await;
    let item = SupplierItemRepo::upsert_raw(&pool, supplier, &raw("G-100", "Gloves"))
        .await
        .unwrap();
    let original = CorrectionData::snapshot(Some(1_250), Some(10), Some("Box of 100"), None);
    let mut proposed = original.clone();
    proposed.min_order_qty = Some(20);

    let mut tx = pool.begin().await.unwrap();
    let draft =
        CorrectionRepo::insert_draft(&mut tx, item.id, supplier, &original, &proposed, "user:1")
            .await
            .unwrap();
    assert_eq!(draft.status().unwrap(), CorrectionStatus::Draft);
    assert_eq!(draft.original_data.0, original);

    // A draft cannot be reviewed.
    let reviewed = CorrectionRepo::mark_reviewed(
        &mut tx,
        draft.id,
        CorrectionStatus::Approved,
        "user:9",
        None,
    )
    .await
    .unwrap();
    assert!(reviewed.is_none());

    assert_eq!(CorrectionRepo::mark_submitted(&mut tx, &[draft.id]).await.unwrap(), 1);
    // Already pending: nothing moves, and it can no longer be deleted.
    assert_eq!(CorrectionRepo::mark_submitted(&mut tx, &[draft.id]).await.unwrap(), 0);
    assert!(!CorrectionRepo::delete_draft(&mut tx, draft.id).await.unwrap());
    tx.commit().await.unwrap();

    let counts = CorrectionRepo::count_by_status(&pool, supplier).await.unwrap();
    assert_eq!(counts.draft, 0);
    assert_eq!(counts.pending, 1);
    assert_eq!(counts.approved, 0);

    let pending = CorrectionRepo::find_pending_for_review(&pool, 50).await.unwrap();
    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0].supplier_name, "Acme Medical");
    assert_eq!(pending[0].item_name, "Gloves");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_counts_are_zero_for_unknown_supplier(pool: PgPool) {
    let counts = CorrectionRepo::count_by_status(&pool, 999).await.unwrap();
    assert_eq!(counts, Default::default());
}

// ---------------------------------------------------------------------------
// Review queue
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_queue_order_filters_and_navigation(pool: PgPool) {
    let supplier = new_supplier(&pool, "Acme Medical").await;
    let product = ProductRepo::create(&pool, &new_product("Gloves", None)).await.unwrap();

    let mut ids = Vec::new();
    for sku in ["A", "B", "C", "D"] {
        let item = SupplierItemRepo::upsert_raw(&pool, supplier, &raw(sku, "Gloves"))
            .await
            .unwrap();
        ids.push(item.id);
    }
    set_match(&pool, ids[0], fuzzy(product.id, 0.85)).await;
    set_match(&pool, ids[1], unmatched()).await;
    set_match(&pool, ids[2], fuzzy(product.id, 0.65)).await;
    // Confident link: not queued.
    set_match(&pool, ids[3], fuzzy(product.id, 0.97)).await;

    let all = ReviewQueueFilter::default();
    let page = ReviewQueueRepo::list(&pool, &all, 50, 0).await.unwrap();
    let order: Vec<DbId> = page.iter().map(|i| i.id).collect();
    assert_eq!(order, vec![ids[1], ids[2], ids[0]]);
    assert_eq!(page[0].bucket(), ConfidenceBucket::Unmatched);
    assert_eq!(page[2].product_name.as_deref(), Some("Gloves"));

    let medium = ReviewQueueFilter {
        bucket: Some(ConfidenceBucket::Medium),
        ..Default::default()
    };
    let page = ReviewQueueRepo::list(&pool, &medium, 50, 0).await.unwrap();
    assert_eq!(page.iter().map(|i| i.id).collect::<Vec<_>>(), vec![ids[0]]);

    let summary = ReviewQueueRepo::summary(&pool, Some(supplier)).await.unwrap();
    assert_eq!(summary.total, 3);
    assert_eq!(summary.unmatched, 1);
    assert_eq!(summary.low, 1);
    assert_eq!(summary.medium, 1);
    assert_eq!(summary.high, 0);

    let nav = ReviewQueueRepo::navigation(&pool, &all, ids[2]).await.unwrap();
    assert_eq!(nav.position, Some(2));
    assert_eq!(nav.total, 3);
    assert_eq!(nav.previous_id, Some(ids[1]));
    assert_eq!(nav.next_id, Some(ids[0]));

    let outside = ReviewQueueRepo::navigation(&pool, &all, ids[3]).await.unwrap();
    assert_eq!(outside.position, None);
    assert_eq!(outside.total, 3);
    assert_eq!(outside.next_id, Some(ids[1]));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_deactivated_item_leaves_queue(pool: PgPool) {
    let supplier = new_supplier(&pool, "Acme Medical").await;
    let item = SupplierItemRepo::upsert_raw(&pool, supplier, &raw("A", "Gloves"))
        .await
        .unwrap();
    set_match(&pool, item.id, unmatched()).await;

    let mut tx = pool.begin().await.unwrap();
    let ignored = SupplierItemRepo::deactivate(&mut tx, item.id).await.unwrap();
    tx.commit().await.unwrap();
    assert!(!ignored.is_active);
    assert!(ignored.needs_review);

    let page = ReviewQueueRepo::list(&pool, &ReviewQueueFilter::default(), 50, 0)
        .await
        .unwrap();
    assert!(page.is_empty());
}
