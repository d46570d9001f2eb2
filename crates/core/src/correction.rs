//! Supplier correction rules: typed snapshots, draft planning, batch
//! submission gating, and review transitions.
//!
//! A correction moves DRAFT -> PENDING -> {APPROVED, REJECTED}. The database
//! layer runs these checks inside the same transaction as the mutation they
//! guard, so a plan computed here is either committed whole or not at all.

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::error::CoreError;
use crate::gtin;
use crate::status::CorrectionStatus;
use crate::types::DbId;

/* --------------------------------------------------------------------------
Constants
-------------------------------------------------------------------------- */

/// Version written into every snapshot. Bump when [`CorrectionData`] changes
/// shape; older snapshots are then refused instead of misread.
pub const CORRECTION_SCHEMA_VERSION: u16 = 1;

/// Maximum length of reviewer notes on a rejection or approval.
pub const MAX_REVIEW_NOTES_LENGTH: usize = 5_000;

/// Default page size for the pending-review listing.
pub const DEFAULT_REVIEW_LIMIT: i64 = 50;

/// Upper bound for the pending-review listing.
pub const MAX_REVIEW_LIMIT: i64 = 200;

/* --------------------------------------------------------------------------
Snapshot value object
-------------------------------------------------------------------------- */

/// The correctable field set of a supplier item plus its product's GTIN.
///
/// Used both for the immutable `original_data` snapshot and for the mutable
/// `proposed_data` of a draft.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CorrectionData {
    pub schema_version: u16,
    pub unit_price_cents: Option<i64>,
    pub min_order_qty: Option<i32>,
    pub supplier_description: Option<String>,
    pub gtin: Option<String>,
}

impl CorrectionData {
    /// Snapshot the current state of an item and its linked product.
    pub fn snapshot(
        unit_price_cents: Option<i64>,
        min_order_qty: Option<i32>,
        supplier_description: Option<&str>,
        product_gtin: Option<&str>,
    ) -> Self {
        Self {
            schema_version: CORRECTION_SCHEMA_VERSION,
            unit_price_cents,
            min_order_qty,
            supplier_description: supplier_description.map(str::to_string),
            gtin: product_gtin.map(str::to_string),
        }
    }

    /// Overlay a proposal on this snapshot. Fields the proposal leaves unset
    /// (or sets to a blank GTIN) keep their snapshot value.
    pub fn apply(&self, proposal: &ProposedFields) -> Self {
        Self {
            schema_version: CORRECTION_SCHEMA_VERSION,
            unit_price_cents: proposal.unit_price_cents.or(self.unit_price_cents),
            min_order_qty: proposal.min_order_qty.or(self.min_order_qty),
            supplier_description: proposal
                .supplier_description
                .as_deref()
                .map(|d| d.trim().to_string())
                .or_else(|| self.supplier_description.clone()),
            gtin: proposal
                .gtin
                .as_deref()
                .map(str::trim)
                .filter(|g| !g.is_empty())
                .map(str::to_string)
                .or_else(|| self.gtin.clone()),
        }
    }

    /// Refuse snapshots written by a different schema version.
    pub fn ensure_supported(&self) -> Result<(), CoreError> {
        if self.schema_version != CORRECTION_SCHEMA_VERSION {
            return Err(CoreError::Internal(format!(
                "Unsupported correction snapshot version {} (expected {CORRECTION_SCHEMA_VERSION})",
                self.schema_version
            )));
        }
        Ok(())
    }

    /// The GTIN this proposal changes to, if it changes it at all.
    pub fn gtin_change_from(&self, original: &CorrectionData) -> Option<GtinChange> {
        let new = self.gtin.as_deref()?.trim();
        if new.is_empty() || Some(new) == original.gtin.as_deref() {
            return None;
        }
        Some(GtinChange {
            old: original.gtin.clone(),
            new: new.to_string(),
        })
    }
}

/// Fields a supplier submits when editing an item. `None` leaves a field as
/// it was in the snapshot.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct ProposedFields {
    #[validate(range(min = 0, message = "unit_price_cents must not be negative"))]
    pub unit_price_cents: Option<i64>,
    #[validate(range(min = 1, message = "min_order_qty must be at least 1"))]
    pub min_order_qty: Option<i32>,
    #[validate(length(max = 2000, message = "supplier_description must be at most 2000 characters"))]
    pub supplier_description: Option<String>,
    pub gtin: Option<String>,
}

impl ProposedFields {
    /// Field-level checks, run before anything is written.
    pub fn check(&self) -> Result<(), CoreError> {
        self.validate()
            .map_err(|e| CoreError::Validation(e.to_string()))?;

        if let Some(description) = &self.supplier_description {
            if description.trim().is_empty() {
                return Err(CoreError::Validation(
                    "supplier_description must not be empty".to_string(),
                ));
            }
        }

        if let Some(code) = self.gtin.as_deref().filter(|g| !g.trim().is_empty()) {
            gtin::validate_gtin(code)?;
        }

        Ok(())
    }
}

/// A requested change to the linked product's GTIN. Recorded, never applied
/// automatically.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GtinChange {
    pub old: Option<String>,
    pub new: String,
}

/* --------------------------------------------------------------------------
Draft planning
-------------------------------------------------------------------------- */

/// The open correction already attached to an item, if any.
#[derive(Debug, Clone)]
pub struct OpenCorrection {
    pub id: DbId,
    pub status: CorrectionStatus,
    pub original: CorrectionData,
}

/// What `save_draft` must do, decided before any write.
#[derive(Debug, Clone, PartialEq)]
pub enum DraftPlan {
    Create {
        original: CorrectionData,
        proposed: CorrectionData,
    },
    Update {
        id: DbId,
        proposed: CorrectionData,
    },
    /// The proposal nets to no change. Delete the existing draft, if any.
    Discard { existing_id: Option<DbId> },
}

/// Decide how to persist a supplier's proposal.
///
/// `current` is the snapshot of the item as it is right now; it is only used
/// when no draft exists yet, since an existing draft keeps the snapshot it
/// was opened with.
pub fn plan_save_draft(
    existing: Option<&OpenCorrection>,
    current: CorrectionData,
    proposal: &ProposedFields,
) -> Result<DraftPlan, CoreError> {
    proposal.check()?;

    match existing {
        Some(open) if open.status != CorrectionStatus::Draft => Err(CoreError::InvalidState(
            format!(
                "Correction {} is {} and can no longer be edited",
                open.id, open.status
            ),
        )),
        Some(open) => {
            open.original.ensure_supported()?;
            let proposed = open.original.apply(proposal);
            if proposed == open.original {
                Ok(DraftPlan::Discard {
                    existing_id: Some(open.id),
                })
            } else {
                Ok(DraftPlan::Update {
                    id: open.id,
                    proposed,
                })
            }
        }
        None => {
            let proposed = current.apply(proposal);
            if proposed == current {
                Ok(DraftPlan::Discard { existing_id: None })
            } else {
                Ok(DraftPlan::Create {
                    original: current,
                    proposed,
                })
            }
        }
    }
}

/* --------------------------------------------------------------------------
Submission
-------------------------------------------------------------------------- */

/// One draft in a submission batch.
#[derive(Debug, Clone)]
pub struct DraftForSubmission<'a> {
    pub correction_id: DbId,
    pub supplier_item_id: DbId,
    pub status: CorrectionStatus,
    pub original: &'a CorrectionData,
    pub proposed: &'a CorrectionData,
}

/// Validate every draft in a batch before any of them moves.
///
/// The first failure aborts the whole batch and names the supplier item
/// whose correction is at fault.
pub fn validate_submission(batch: &[DraftForSubmission<'_>]) -> Result<(), CoreError> {
    for draft in batch {
        let at_fault = |msg: String| {
            CoreError::Validation(format!(
                "Correction {} for supplier item {}: {msg}",
                draft.correction_id, draft.supplier_item_id
            ))
        };

        if draft.status != CorrectionStatus::Draft {
            return Err(CoreError::InvalidState(format!(
                "Correction {} is {}, only drafts can be submitted",
                draft.correction_id, draft.status
            )));
        }

        draft.original.ensure_supported()?;
        draft.proposed.ensure_supported()?;

        if let Some(change) = draft.proposed.gtin_change_from(draft.original) {
            if let gtin::GtinValidation {
                valid: false,
                error,
            } = gtin::validate(&change.new)
            {
                return Err(at_fault(error.unwrap_or_else(|| "invalid GTIN".to_string())));
            }
        }
    }
    Ok(())
}

/* --------------------------------------------------------------------------
Review
-------------------------------------------------------------------------- */

/// The two reviewer decisions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReviewDecision {
    Approve,
    Reject,
}

impl ReviewDecision {
    fn verb(self) -> &'static str {
        match self {
            ReviewDecision::Approve => "approved",
            ReviewDecision::Reject => "rejected",
        }
    }

    pub fn target_status(self) -> CorrectionStatus {
        match self {
            ReviewDecision::Approve => CorrectionStatus::Approved,
            ReviewDecision::Reject => CorrectionStatus::Rejected,
        }
    }
}

/// Only PENDING corrections can be reviewed.
pub fn ensure_reviewable(status: CorrectionStatus, decision: ReviewDecision) -> Result<(), CoreError> {
    if status == CorrectionStatus::Pending {
        Ok(())
    } else {
        Err(CoreError::InvalidState(format!(
            "Only pending corrections can be {} (current status: {status})",
            decision.verb()
        )))
    }
}

/// Only DRAFT corrections can be deleted.
pub fn ensure_deletable(status: CorrectionStatus) -> Result<(), CoreError> {
    if status == CorrectionStatus::Draft {
        Ok(())
    } else {
        Err(CoreError::InvalidState(format!(
            "Only draft corrections can be deleted (current status: {status})"
        )))
    }
}

/// Validate optional reviewer notes.
pub fn validate_review_notes(notes: Option<&str>) -> Result<(), CoreError> {
    if let Some(notes) = notes {
        if notes.chars().count() > MAX_REVIEW_NOTES_LENGTH {
            return Err(CoreError::Validation(format!(
                "Review notes must be at most {MAX_REVIEW_NOTES_LENGTH} characters"
            )));
        }
    }
    Ok(())
}

/// Item fields to write on approval. `None` leaves the column untouched.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ApprovedChanges {
    pub unit_price_cents: Option<i64>,
    pub min_order_qty: Option<i32>,
    pub supplier_description: Option<String>,
    /// Logged for the canonical-product flow, never written to the product.
    pub gtin_change: Option<GtinChange>,
}

impl ApprovedChanges {
    pub fn touches_item(&self) -> bool {
        self.unit_price_cents.is_some()
            || self.min_order_qty.is_some()
            || self.supplier_description.is_some()
    }
}

/// Compute what an approval writes, re-checking status and GTIN.
///
/// Only fields the supplier actually changed relative to the snapshot are
/// applied, so values the item gained after the draft was opened are not
/// reverted by untouched fields.
pub fn plan_approval(
    status: CorrectionStatus,
    original: &CorrectionData,
    proposed: &CorrectionData,
) -> Result<ApprovedChanges, CoreError> {
    ensure_reviewable(status, ReviewDecision::Approve)?;
    original.ensure_supported()?;
    proposed.ensure_supported()?;

    let gtin_change = proposed.gtin_change_from(original);
    if let Some(change) = &gtin_change {
        gtin::validate_gtin(&change.new)?;
    }

    Ok(ApprovedChanges {
        unit_price_cents: proposed
            .unit_price_cents
            .filter(|_| proposed.unit_price_cents != original.unit_price_cents),
        min_order_qty: proposed
            .min_order_qty
            .filter(|_| proposed.min_order_qty != original.min_order_qty),
        supplier_description: proposed
            .supplier_description
            .clone()
            .filter(|_| proposed.supplier_description != original.supplier_description),
        gtin_change,
    })
}
