//! Review-queue triage rules.
//!
//! An item is in the queue while it is active and flagged `needs_review`.
//! Each triage action is a single terminal transition computed here as a
//! [`LinkOutcome`]; none of them re-runs the matcher.

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::error::CoreError;
use crate::gtin;
use crate::matching::ConfidenceBucket;
use crate::status::MatchMethod;
use crate::types::DbId;

/// Default page size for the review queue.
pub const DEFAULT_QUEUE_LIMIT: i64 = 50;

/// Upper bound for the review queue page size.
pub const MAX_QUEUE_LIMIT: i64 = 200;

/// The terminal actions that take an item out of the queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TriageAction {
    Confirm,
    Reassign,
    CreateProduct,
    Merge,
    Ignore,
}

impl TriageAction {
    pub fn as_str(self) -> &'static str {
        match self {
            TriageAction::Confirm => "confirm",
            TriageAction::Reassign => "reassign",
            TriageAction::CreateProduct => "create_product",
            TriageAction::Merge => "merge",
            TriageAction::Ignore => "ignore",
        }
    }
}

/// Queue-relevant state of a supplier item, read under lock.
#[derive(Debug, Clone, PartialEq)]
pub struct QueueState {
    pub item_id: DbId,
    pub product_id: Option<DbId>,
    pub confidence: Option<f64>,
    pub needs_review: bool,
    pub is_active: bool,
}

impl QueueState {
    pub fn is_queued(&self) -> bool {
        self.needs_review && self.is_active
    }

    pub fn bucket(&self) -> ConfidenceBucket {
        ConfidenceBucket::from_confidence(self.confidence)
    }
}

/// The link fields an action writes back to the item.
#[derive(Debug, Clone, PartialEq)]
pub struct LinkOutcome {
    pub product_id: Option<DbId>,
    pub method: MatchMethod,
    pub confidence: Option<f64>,
    pub needs_review: bool,
    pub is_active: bool,
}

/// Every action requires the item to be in the queue.
pub fn ensure_queued(state: &QueueState, action: TriageAction) -> Result<(), CoreError> {
    if !state.is_active {
        return Err(CoreError::InvalidState(format!(
            "Supplier item {} is inactive and cannot be triaged ({})",
            state.item_id,
            action.as_str()
        )));
    }
    if !state.needs_review {
        return Err(CoreError::InvalidState(format!(
            "Supplier item {} is not awaiting review ({})",
            state.item_id,
            action.as_str()
        )));
    }
    Ok(())
}

/// Accept the current link as correct.
pub fn plan_confirm(state: &QueueState) -> Result<LinkOutcome, CoreError> {
    ensure_queued(state, TriageAction::Confirm)?;
    let product_id = state.product_id.ok_or_else(|| {
        CoreError::InvalidState(format!(
            "Supplier item {} has no linked product to confirm",
            state.item_id
        ))
    })?;
    Ok(LinkOutcome {
        product_id: Some(product_id),
        method: MatchMethod::Manual,
        confidence: state.confidence,
        needs_review: false,
        is_active: true,
    })
}

/// Link the item to a different, reviewer-chosen product.
pub fn plan_reassign(state: &QueueState, product_id: DbId) -> Result<LinkOutcome, CoreError> {
    ensure_queued(state, TriageAction::Reassign)?;
    Ok(human_link(product_id))
}

/// Link the item to a product created from its own raw data.
pub fn plan_create(state: &QueueState, new_product_id: DbId) -> Result<LinkOutcome, CoreError> {
    ensure_queued(state, TriageAction::CreateProduct)?;
    Ok(human_link(new_product_id))
}

/// Fold the item's current product into `target_product_id`.
///
/// Returns the product being merged away together with the outcome. The
/// merge mechanics themselves belong to the product-merge subsystem.
pub fn plan_merge(
    state: &QueueState,
    target_product_id: DbId,
) -> Result<(DbId, LinkOutcome), CoreError> {
    ensure_queued(state, TriageAction::Merge)?;
    let source = state.product_id.ok_or_else(|| {
        CoreError::InvalidState(format!(
            "Supplier item {} has no linked product to merge",
            state.item_id
        ))
    })?;
    if source == target_product_id {
        return Err(CoreError::Validation(format!(
            "Product {source} cannot be merged into itself"
        )));
    }
    Ok((source, human_link(target_product_id)))
}

/// Deactivate the item. Link, method and review flag are left as they were;
/// the item is out of every queue because it is inactive.
pub fn plan_ignore(state: &QueueState) -> Result<(), CoreError> {
    ensure_queued(state, TriageAction::Ignore)
}

fn human_link(product_id: DbId) -> LinkOutcome {
    LinkOutcome {
        product_id: Some(product_id),
        method: MatchMethod::Manual,
        confidence: Some(1.0),
        needs_review: false,
        is_active: true,
    }
}

/* --------------------------------------------------------------------------
Create-product request
-------------------------------------------------------------------------- */

/// Optional overrides a reviewer may supply when creating a product from a
/// supplier row.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct CreateProductOverrides {
    #[validate(length(min = 1, max = 500))]
    pub name: Option<String>,
    #[validate(length(max = 200))]
    pub brand: Option<String>,
    pub gtin: Option<String>,
}

/// Fields of a canonical product about to be inserted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewProduct {
    pub name: String,
    pub brand: Option<String>,
    pub gtin: Option<String>,
}

/// Build the product to insert from the item's raw data plus overrides.
pub fn new_product_from_item(
    supplier_name: &str,
    item_gtin: Option<&str>,
    overrides: &CreateProductOverrides,
) -> Result<NewProduct, CoreError> {
    overrides
        .validate()
        .map_err(|e| CoreError::Validation(e.to_string()))?;

    let name = overrides
        .name
        .as_deref()
        .unwrap_or(supplier_name)
        .trim()
        .to_string();
    if name.is_empty() {
        return Err(CoreError::Validation(
            "Product name must not be empty".to_string(),
        ));
    }

    let gtin = match overrides.gtin.as_deref().map(str::trim).filter(|g| !g.is_empty()) {
        Some(explicit) => {
            gtin::validate_gtin(explicit)?;
            Some(explicit.to_string())
        }
        // The supplier's own GTIN is only carried over when it is valid.
        None => item_gtin
            .map(str::trim)
            .filter(|g| gtin::validate(g).valid)
            .map(str::to_string),
    };

    Ok(NewProduct {
        name,
        brand: overrides
            .brand
            .as_deref()
            .map(str::trim)
            .filter(|b| !b.is_empty())
            .map(str::to_string),
        gtin,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn queued(product_id: Option<DbId>, confidence: Option<f64>) -> QueueState {
        QueueState {
            item_id: 1,
            product_id,
            confidence,
            needs_review: true,
            is_active: true,
        }
    }

    #[test]
    fn confirm_keeps_link_and_clears_review() {
        let outcome = plan_confirm(&queued(Some(4), Some(0.82))).unwrap();
        assert_eq!(outcome.product_id, Some(4));
        assert_eq!(outcome.method, MatchMethod::Manual);
        assert_eq!(outcome.confidence, Some(0.82));
        assert!(!outcome.needs_review);
        assert!(outcome.is_active);
    }

    #[test]
    fn confirm_without_link_fails() {
        assert_matches!(plan_confirm(&queued(None, None)), Err(CoreError::InvalidState(_)));
    }

    #[test]
    fn reassign_links_new_product() {
        let outcome = plan_reassign(&queued(Some(4), Some(0.7)), 9).unwrap();
        assert_eq!(outcome.product_id, Some(9));
        assert_eq!(outcome.method, MatchMethod::Manual);
        assert!(!outcome.needs_review);
    }

    #[test]
    fn create_links_new_product_even_when_unmatched() {
        let outcome = plan_create(&queued(None, None), 12).unwrap();
        assert_eq!(outcome.product_id, Some(12));
        assert!(!outcome.needs_review);
    }

    #[test]
    fn merge_returns_source_and_links_target() {
        let (source, outcome) = plan_merge(&queued(Some(4), Some(0.75)), 2).unwrap();
        assert_eq!(source, 4);
        assert_eq!(outcome.product_id, Some(2));
        assert!(!outcome.needs_review);
    }

    #[test]
    fn merge_into_self_or_without_link_fails() {
        assert_matches!(plan_merge(&queued(Some(4), None), 4), Err(CoreError::Validation(_)));
        assert_matches!(plan_merge(&queued(None, None), 4), Err(CoreError::InvalidState(_)));
    }

    #[test]
    fn ignore_is_allowed_for_queued_items_with_or_without_link() {
        assert!(plan_ignore(&queued(Some(4), Some(0.5))).is_ok());
        assert!(plan_ignore(&queued(None, None)).is_ok());
    }

    #[test]
    fn actions_require_item_in_queue() {
        let mut resolved = queued(Some(4), Some(1.0));
        resolved.needs_review = false;
        assert_matches!(plan_confirm(&resolved), Err(CoreError::InvalidState(_)));
        assert_matches!(plan_ignore(&resolved), Err(CoreError::InvalidState(_)));

        let mut ignored = queued(Some(4), Some(0.5));
        ignored.is_active = false;
        assert!(!ignored.is_queued());
        assert_matches!(plan_reassign(&ignored, 9), Err(CoreError::InvalidState(_)));
        assert_matches!(plan_create(&ignored, 9), Err(CoreError::InvalidState(_)));
    }

    #[test]
    fn new_product_defaults_to_supplier_name() {
        let product = new_product_from_item(
            " Sterile Gauze 4x4 ",
            None,
            &CreateProductOverrides::default(),
        )
        .unwrap();
        assert_eq!(product.name, "Sterile Gauze 4x4");
        assert_eq!(product.brand, None);
        assert_eq!(product.gtin, None);
    }

    #[test]
    fn new_product_carries_valid_item_gtin_only() {
        let kept = new_product_from_item("x", Some("4006381333931"), &CreateProductOverrides::default())
            .unwrap();
        assert_eq!(kept.gtin.as_deref(), Some("4006381333931"));

        let dropped = new_product_from_item("x", Some("4006381333932"), &CreateProductOverrides::default())
            .unwrap();
        assert_eq!(dropped.gtin, None);
    }

    #[test]
    fn explicit_gtin_override_must_be_valid() {
        let overrides = CreateProductOverrides {
            gtin: Some("0000000000000".to_string()),
            ..Default::default()
        };
        assert_matches!(
            new_product_from_item("x", None, &overrides),
            Err(CoreError::Validation(_))
        );
    }

    #[test]
    fn blank_name_is_rejected() {
        assert_matches!(
            new_product_from_item("   ", None, &CreateProductOverrides::default()),
            Err(CoreError::Validation(_))
        );
    }

    #[test]
    fn bucket_follows_confidence() {
        assert_eq!(queued(None, None).bucket(), ConfidenceBucket::Unmatched);
        assert_eq!(queued(Some(1), Some(0.95)).bucket(), ConfidenceBucket::High);
    }
}
