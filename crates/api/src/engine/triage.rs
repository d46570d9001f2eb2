//! Review-queue triage actions.
//!
//! Every action locks the supplier item, re-checks that it is still queued,
//! and applies a single terminal transition. None of them re-runs the
//! matcher.

use medsupply_core::triage::{self, CreateProductOverrides, LinkOutcome, TriageAction};
use medsupply_core::types::DbId;
use medsupply_db::models::product::{CanonicalProduct, CreateProduct};
use medsupply_db::models::product_merge::ProductMergeRequest;
use medsupply_db::models::supplier_item::SupplierItem;
use medsupply_db::repositories::{ProductMergeRepo, ProductRepo, SupplierItemRepo};
use medsupply_db::DbTransaction;
use serde::Serialize;
use sqlx::PgPool;

use crate::error::{AppError, AppResult};

/// The item after triage, plus whatever the action created.
#[derive(Debug, Serialize)]
pub struct TriageResult {
    pub action: TriageAction,
    pub item: SupplierItem,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub product: Option<CanonicalProduct>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub merge_request: Option<ProductMergeRequest>,
}

impl TriageResult {
    fn item(action: TriageAction, item: SupplierItem) -> Self {
        Self {
            action,
            item,
            product: None,
            merge_request: None,
        }
    }
}

async fn lock_item(tx: &mut DbTransaction<'_>, item_id: DbId) -> AppResult<SupplierItem> {
    SupplierItemRepo::lock(tx, item_id)
        .await?
        .ok_or_else(|| AppError::not_found("SupplierItem", item_id))
}

async fn require_product(tx: &mut DbTransaction<'_>, product_id: DbId) -> AppResult<CanonicalProduct> {
    ProductRepo::find_by_id_in_tx(tx, product_id)
        .await?
        .ok_or_else(|| AppError::not_found("CanonicalProduct", product_id))
}

async fn write_link(
    tx: &mut DbTransaction<'_>,
    item_id: DbId,
    outcome: &LinkOutcome,
    actor: &str,
) -> AppResult<SupplierItem> {
    Ok(SupplierItemRepo::apply_link(tx, item_id, outcome, actor).await?)
}

fn log_action(result: &TriageResult, actor: &str) {
    tracing::info!(
        action = result.action.as_str(),
        supplier_item_id = result.item.id,
        product_id = ?result.item.product_id,
        is_active = result.item.is_active,
        actor,
        "Review queue item triaged"
    );
}

/// Accept the current link.
pub async fn confirm(pool: &PgPool, item_id: DbId, actor: &str) -> AppResult<TriageResult> {
    let mut tx = pool.begin().await?;
    let item = lock_item(&mut tx, item_id).await?;
    let outcome = triage::plan_confirm(&item.queue_state())?;
    let updated = write_link(&mut tx, item.id, &outcome, actor).await?;
    tx.commit().await?;

    let result = TriageResult::item(TriageAction::Confirm, updated);
    log_action(&result, actor);
    Ok(result)
}

/// Link the item to another existing product.
pub async fn reassign(
    pool: &PgPool,
    item_id: DbId,
    product_id: DbId,
    actor: &str,
) -> AppResult<TriageResult> {
    let mut tx = pool.begin().await?;
    let item = lock_item(&mut tx, item_id).await?;
    let outcome = triage::plan_reassign(&item.queue_state(), product_id)?;
    let product = require_product(&mut tx, product_id).await?;
    let updated = write_link(&mut tx, item.id, &outcome, actor).await?;
    tx.commit().await?;

    let result = TriageResult {
        product: Some(product),
        ..TriageResult::item(TriageAction::Reassign, updated)
    };
    log_action(&result, actor);
    Ok(result)
}

/// Create a canonical product from the item's raw data and link it.
pub async fn create_product(
    pool: &PgPool,
    item_id: DbId,
    overrides: &CreateProductOverrides,
    actor: &str,
) -> AppResult<TriageResult> {
    let mut tx = pool.begin().await?;
    let item = lock_item(&mut tx, item_id).await?;
    triage::ensure_queued(&item.queue_state(), TriageAction::CreateProduct)?;

    let new_product =
        triage::new_product_from_item(&item.supplier_name, item.gtin.as_deref(), overrides)?;
    let product = ProductRepo::create_in_tx(&mut tx, &CreateProduct::from(new_product)).await?;

    let outcome = triage::plan_create(&item.queue_state(), product.id)?;
    let updated = write_link(&mut tx, item.id, &outcome, actor).await?;
    tx.commit().await?;

    tracing::info!(product_id = product.id, gtin = ?product.gtin, actor, "Canonical product created from supplier item");

    let result = TriageResult {
        product: Some(product),
        ..TriageResult::item(TriageAction::CreateProduct, updated)
    };
    log_action(&result, actor);
    Ok(result)
}

/// Link the item to the surviving product and hand the merge of its current
/// product over to the product-merge subsystem.
pub async fn merge(
    pool: &PgPool,
    item_id: DbId,
    target_product_id: DbId,
    actor: &str,
) -> AppResult<TriageResult> {
    let mut tx = pool.begin().await?;
    let item = lock_item(&mut tx, item_id).await?;
    let (source_product_id, outcome) = triage::plan_merge(&item.queue_state(), target_product_id)?;
    let target = require_product(&mut tx, target_product_id).await?;

    let request = ProductMergeRepo::create_in_tx(
        &mut tx,
        item.id,
        source_product_id,
        target_product_id,
        actor,
    )
    .await?;
    let updated = write_link(&mut tx, item.id, &outcome, actor).await?;
    tx.commit().await?;

    tracing::info!(
        merge_request_id = request.id,
        source_product_id,
        target_product_id,
        actor,
        "Product merge requested"
    );

    let result = TriageResult {
        product: Some(target),
        merge_request: Some(request),
        ..TriageResult::item(TriageAction::Merge, updated)
    };
    log_action(&result, actor);
    Ok(result)
}

/// Deactivate the item so it never re-enters a queue.
pub async fn ignore(pool: &PgPool, item_id: DbId, actor: &str) -> AppResult<TriageResult> {
    let mut tx = pool.begin().await?;
    let item = lock_item(&mut tx, item_id).await?;
    triage::plan_ignore(&item.queue_state())?;
    let updated = SupplierItemRepo::deactivate(&mut tx, item.id).await?;
    tx.commit().await?;

    let result = TriageResult::item(TriageAction::Ignore, updated);
    log_action(&result, actor);
    Ok(result)
}
