//! Correction lifecycle: draft, submit, approve, reject.
//!
//! Lock order is supplier item before correction in every operation that
//! takes both, so concurrent drafts and approvals cannot deadlock.

use medsupply_core::correction::{
    self, CorrectionData, DraftForSubmission, DraftPlan, ProposedFields, ReviewDecision,
};
use medsupply_core::error::CoreError;
use medsupply_core::status::CorrectionStatus;
use medsupply_core::types::DbId;
use medsupply_db::models::correction::Correction;
use medsupply_db::repositories::{CorrectionRepo, ProductRepo, SupplierItemRepo};
use serde::Serialize;
use sqlx::PgPool;

use crate::error::{AppError, AppResult};

/// Result of [`save_draft`].
#[derive(Debug, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum SaveDraftOutcome {
    /// A draft was created or updated.
    Saved { correction: Correction },
    /// The proposal matched the snapshot; any existing draft was deleted.
    Discarded { deleted_correction_id: Option<DbId> },
}

/// Result of [`submit_all`].
#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct SubmitOutcome {
    pub submitted: usize,
    pub correction_ids: Vec<DbId>,
}

/// Create, update or discard the supplier's draft for one item.
pub async fn save_draft(
    pool: &PgPool,
    supplier_id: DbId,
    supplier_item_id: DbId,
    proposal: &ProposedFields,
    actor: &str,
) -> AppResult<SaveDraftOutcome> {
    let mut tx = pool.begin().await?;

    let item = SupplierItemRepo::lock_for_supplier(&mut tx, supplier_id, supplier_item_id)
        .await?
        .ok_or_else(|| AppError::not_found("SupplierItem", supplier_item_id))?;

    let existing = CorrectionRepo::lock_open_for_item(&mut tx, item.id).await?;
    let open = existing.as_ref().map(Correction::as_open).transpose()?;

    let product_gtin = match item.product_id {
        Some(product_id) => ProductRepo::gtin_in_tx(&mut tx, product_id).await?,
        None => None,
    };
    let current = CorrectionData::snapshot(
        item.unit_price_cents,
        item.min_order_qty,
        item.supplier_description.as_deref(),
        product_gtin.as_deref(),
    );

    let outcome = match correction::plan_save_draft(open.as_ref(), current, proposal)? {
        DraftPlan::Create { original, proposed } => {
            let created = CorrectionRepo::insert_draft(
                &mut tx,
                item.id,
                supplier_id,
                &original,
                &proposed,
                actor,
            )
            .await?;
            SaveDraftOutcome::Saved {
                correction: created,
            }
        }
        DraftPlan::Update { id, proposed } => {
            let updated = CorrectionRepo::update_proposed(&mut tx, id, &proposed)
                .await?
                .ok_or_else(|| {
                    CoreError::InvalidState(format!("Correction {id} is no longer a draft"))
                })?;
            SaveDraftOutcome::Saved {
                correction: updated,
            }
        }
        DraftPlan::Discard { existing_id } => {
            if let Some(id) = existing_id {
                CorrectionRepo::delete_draft(&mut tx, id).await?;
            }
            SaveDraftOutcome::Discarded {
                deleted_correction_id: existing_id,
            }
        }
    };

    tx.commit().await?;

    match &outcome {
        SaveDraftOutcome::Saved { correction } => tracing::info!(
            supplier_id,
            supplier_item_id,
            correction_id = correction.id,
            actor,
            "Correction draft saved"
        ),
        SaveDraftOutcome::Discarded {
            deleted_correction_id,
        } => tracing::info!(
            supplier_id,
            supplier_item_id,
            deleted_correction_id = ?deleted_correction_id,
            actor,
            "No-op correction draft discarded"
        ),
    }

    Ok(outcome)
}

/// Delete one of the supplier's drafts.
pub async fn delete_draft(
    pool: &PgPool,
    supplier_id: DbId,
    correction_id: DbId,
    actor: &str,
) -> AppResult<()> {
    let mut tx = pool.begin().await?;

    let locked = CorrectionRepo::lock_by_id(&mut tx, correction_id)
        .await?
        .filter(|c| c.supplier_id == supplier_id)
        .ok_or_else(|| AppError::not_found("Correction", correction_id))?;

    correction::ensure_deletable(locked.status()?)?;
    CorrectionRepo::delete_draft(&mut tx, locked.id).await?;
    tx.commit().await?;

    tracing::info!(supplier_id, correction_id, actor, "Correction draft deleted");
    Ok(())
}

fn as_submission(c: &Correction) -> Result<DraftForSubmission<'_>, CoreError> {
    Ok(DraftForSubmission {
        correction_id: c.id,
        supplier_item_id: c.supplier_item_id,
        status: c.status()?,
        original: &c.original_data.0,
        proposed: &c.proposed_data.0,
    })
}

/// Move every draft of the supplier to PENDING, or none of them.
pub async fn submit_all(pool: &PgPool, supplier_id: DbId, actor: &str) -> AppResult<SubmitOutcome> {
    let mut tx = pool.begin().await?;

    let drafts = CorrectionRepo::lock_drafts_for_supplier(&mut tx, supplier_id).await?;
    let batch = drafts
        .iter()
        .map(as_submission)
        .collect::<Result<Vec<_>, CoreError>>()?;

    correction::validate_submission(&batch)?;

    let ids: Vec<DbId> = drafts.iter().map(|c| c.id).collect();
    if !ids.is_empty() {
        let moved = CorrectionRepo::mark_submitted(&mut tx, &ids).await?;
        if moved != ids.len() as u64 {
            // Dropping the transaction rolls back the partial update.
            return Err(CoreError::InvalidState(format!(
                "Drafts changed during submission ({moved} of {} could be submitted)",
                ids.len()
            ))
            .into());
        }
    }
    tx.commit().await?;

    tracing::info!(supplier_id, submitted = ids.len(), actor, "Corrections submitted");

    Ok(SubmitOutcome {
        submitted: ids.len(),
        correction_ids: ids,
    })
}

/// Approve a PENDING correction and apply its changed fields to the item.
///
/// A GTIN change is never written to the canonical product. It is reported
/// once, after commit, under the `gtin_change` log target.
pub async fn approve(pool: &PgPool, correction_id: DbId, reviewer: &str) -> AppResult<Correction> {
    let supplier_item_id = CorrectionRepo::find_by_id(pool, correction_id)
        .await?
        .ok_or_else(|| AppError::not_found("Correction", correction_id))?
        .supplier_item_id;

    let mut tx = pool.begin().await?;

    let item = SupplierItemRepo::lock(&mut tx, supplier_item_id)
        .await?
        .ok_or_else(|| AppError::not_found("SupplierItem", supplier_item_id))?;
    let locked = CorrectionRepo::lock_by_id(&mut tx, correction_id)
        .await?
        .ok_or_else(|| AppError::not_found("Correction", correction_id))?;

    let changes = correction::plan_approval(
        locked.status()?,
        &locked.original_data.0,
        &locked.proposed_data.0,
    )?;

    if changes.touches_item() {
        SupplierItemRepo::apply_approved_changes(&mut tx, item.id, &changes).await?;
    }

    let approved = CorrectionRepo::mark_reviewed(
        &mut tx,
        correction_id,
        CorrectionStatus::Approved,
        reviewer,
        None,
    )
    .await?
    .ok_or_else(|| {
        CoreError::InvalidState(format!("Correction {correction_id} is no longer pending"))
    })?;

    tx.commit().await?;

    if let Some(change) = &changes.gtin_change {
        tracing::info!(
            target: "gtin_change",
            correction_id,
            supplier_item_id,
            product_id = ?item.product_id,
            old_gtin = ?change.old,
            new_gtin = %change.new,
            reviewed_by = reviewer,
            "Approved correction requests a product GTIN change"
        );
    }

    tracing::info!(
        correction_id,
        supplier_item_id,
        reviewed_by = reviewer,
        "Correction approved"
    );

    Ok(approved)
}

/// Reject a PENDING correction. The item is not touched.
pub async fn reject(
    pool: &PgPool,
    correction_id: DbId,
    reviewer: &str,
    notes: Option<&str>,
) -> AppResult<Correction> {
    correction::validate_review_notes(notes)?;

    let mut tx = pool.begin().await?;

    let locked = CorrectionRepo::lock_by_id(&mut tx, correction_id)
        .await?
        .ok_or_else(|| AppError::not_found("Correction", correction_id))?;
    correction::ensure_reviewable(locked.status()?, ReviewDecision::Reject)?;

    let rejected = CorrectionRepo::mark_reviewed(
        &mut tx,
        correction_id,
        ReviewDecision::Reject.target_status(),
        reviewer,
        notes,
    )
    .await?
    .ok_or_else(|| {
        CoreError::InvalidState(format!("Correction {correction_id} is no longer pending"))
    })?;

    tx.commit().await?;

    tracing::info!(
        correction_id,
        supplier_item_id = rejected.supplier_item_id,
        reviewed_by = reviewer,
        "Correction rejected"
    );

    Ok(rejected)
}
