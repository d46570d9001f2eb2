//! Identity matcher: resolve a raw supplier catalog row to a canonical
//! product.
//!
//! Strategies run in a fixed order and the first one that produces a link
//! wins: exact GTIN, curated supplier mapping, barcode scan, fuzzy name, and
//! finally the manual fallback. The database layer gathers the candidates
//! into a [`CandidateSet`]; everything here is deterministic over that set.

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::gtin;
use crate::status::MatchMethod;
use crate::types::DbId;

/* --------------------------------------------------------------------------
Constants
-------------------------------------------------------------------------- */

/// Platform-wide low-confidence threshold. Any link below it needs review,
/// whichever strategy produced it.
pub const LOW_CONFIDENCE_THRESHOLD: f64 = 0.90;

/// Fuzzy scores below this floor are not links at all (manual fallback).
pub const FUZZY_MATCH_FLOOR: f64 = 0.60;

/// Lower bound of the "medium" reporting bucket.
pub const MEDIUM_CONFIDENCE_FLOOR: f64 = 0.70;

/// Upper bound on name candidates loaded for one fuzzy pass.
pub const MAX_NAME_CANDIDATES: i64 = 200;

/// Upper bound on rows accepted by one ingestion call.
pub const MAX_INGEST_ROWS: usize = 500;

/// Tokens shorter than this are not used for the name prefilter.
const MIN_TOKEN_LEN: usize = 3;

/// At most this many tokens feed the name prefilter.
const MAX_PREFILTER_TOKENS: usize = 8;

/* --------------------------------------------------------------------------
Types
-------------------------------------------------------------------------- */

/// A supplier catalog row as received from ingestion.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct RawCatalogItem {
    #[validate(length(min = 1, max = 128, message = "supplier_sku must be 1-128 characters"))]
    pub supplier_sku: String,
    #[validate(length(min = 1, max = 500, message = "supplier_name must be 1-500 characters"))]
    pub supplier_name: String,
    #[validate(length(max = 2000))]
    pub supplier_description: Option<String>,
    /// GTIN printed in the supplier's catalog, if any.
    pub gtin: Option<String>,
    /// Code captured by a barcode scan during ingestion, if any.
    pub scanned_code: Option<String>,
    #[validate(range(min = 0))]
    pub unit_price_cents: Option<i64>,
    #[validate(range(min = 1))]
    pub min_order_qty: Option<i32>,
    #[validate(length(equal = 3, message = "currency must be an ISO 4217 code"))]
    pub currency: Option<String>,
}

/// The slice of a canonical product the matcher needs.
#[derive(Debug, Clone, PartialEq)]
pub struct ProductCandidate {
    pub id: DbId,
    pub name: String,
    pub brand: Option<String>,
    pub gtin: Option<String>,
}

/// Candidates gathered from storage for one raw row.
#[derive(Debug, Clone, Default)]
pub struct CandidateSet {
    /// Products whose `gtin` equals the row's GTIN exactly.
    pub gtin_matches: Vec<ProductCandidate>,
    /// Product named by a curated supplier SKU mapping.
    pub mapped_product_id: Option<DbId>,
    /// Products whose GTIN-14 form equals the scanned code's GTIN-14 form.
    pub scan_matches: Vec<ProductCandidate>,
    /// Prefiltered products for fuzzy scoring.
    pub name_candidates: Vec<ProductCandidate>,
}

/// Outcome of [`resolve`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchResult {
    pub method: MatchMethod,
    pub confidence: Option<f64>,
    pub product_id: Option<DbId>,
    pub needs_review: bool,
}

impl MatchResult {
    fn linked(method: MatchMethod, product_id: DbId, confidence: f64) -> Self {
        Self {
            method,
            confidence: Some(confidence),
            product_id: Some(product_id),
            needs_review: needs_review_for(Some(confidence)),
        }
    }

    fn manual_fallback() -> Self {
        Self {
            method: MatchMethod::Manual,
            confidence: None,
            product_id: None,
            needs_review: true,
        }
    }
}

/// Reporting bucket for a match confidence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConfidenceBucket {
    Unmatched,
    Low,
    Medium,
    High,
}

impl ConfidenceBucket {
    pub fn from_confidence(confidence: Option<f64>) -> Self {
        match confidence {
            None => ConfidenceBucket::Unmatched,
            Some(c) if c >= LOW_CONFIDENCE_THRESHOLD => ConfidenceBucket::High,
            Some(c) if c >= MEDIUM_CONFIDENCE_FLOOR => ConfidenceBucket::Medium,
            Some(_) => ConfidenceBucket::Low,
        }
    }

    /// Half-open confidence range `[lower, upper)` covered by the bucket, or
    /// `None` for the unmatched bucket.
    pub fn range(self) -> Option<(f64, f64)> {
        match self {
            ConfidenceBucket::Unmatched => None,
            ConfidenceBucket::Low => Some((0.0, MEDIUM_CONFIDENCE_FLOOR)),
            ConfidenceBucket::Medium => Some((MEDIUM_CONFIDENCE_FLOOR, LOW_CONFIDENCE_THRESHOLD)),
            // Upper bound above 1.0 so a perfect score is included.
            ConfidenceBucket::High => Some((LOW_CONFIDENCE_THRESHOLD, 1.000_001)),
        }
    }
}

/* --------------------------------------------------------------------------
Resolution
-------------------------------------------------------------------------- */

/// Whether a link with this confidence must go to the review queue.
pub fn needs_review_for(confidence: Option<f64>) -> bool {
    confidence.map_or(true, |c| c < LOW_CONFIDENCE_THRESHOLD)
}

/// Resolve a raw row against its candidates with the default name scorer.
pub fn resolve(raw: &RawCatalogItem, candidates: &CandidateSet) -> MatchResult {
    resolve_with(raw, candidates, name_similarity)
}

/// Resolve a raw row using `score` for every similarity comparison.
pub fn resolve_with<F>(raw: &RawCatalogItem, candidates: &CandidateSet, score: F) -> MatchResult
where
    F: Fn(&RawCatalogItem, &ProductCandidate) -> f64,
{
    // 1. Exact identifier. A GTIN is only an identity if it names one product.
    if has_text(raw.gtin.as_deref()) {
        if let [only] = distinct(&candidates.gtin_matches).as_slice() {
            return MatchResult::linked(MatchMethod::ExactGtin, only.id, 1.0);
        }
    }

    // 2. Curated supplier mapping.
    if let Some(product_id) = candidates.mapped_product_id {
        return MatchResult::linked(MatchMethod::SupplierMapped, product_id, 1.0);
    }

    // 3. Barcode scan.
    if has_text(raw.scanned_code.as_deref()) {
        match distinct(&candidates.scan_matches).as_slice() {
            [] => {}
            [only] => return MatchResult::linked(MatchMethod::BarcodeScan, only.id, 1.0),
            many => {
                if let Some((best, confidence)) = best_scored(raw, many.iter().copied(), &score) {
                    return MatchResult {
                        method: MatchMethod::BarcodeScan,
                        confidence: Some(confidence),
                        product_id: Some(best.id),
                        needs_review: true,
                    };
                }
            }
        }
    }

    // 4. Fuzzy name.
    if let Some((best, confidence)) =
        best_scored(raw, candidates.name_candidates.iter(), &score)
    {
        if confidence >= FUZZY_MATCH_FLOOR {
            return MatchResult::linked(MatchMethod::FuzzyName, best.id, confidence);
        }
    }

    // 5. Manual fallback.
    MatchResult::manual_fallback()
}

/// Highest-scoring candidate; ties go to the lowest product id.
fn best_scored<'a, I, F>(
    raw: &RawCatalogItem,
    candidates: I,
    score: &F,
) -> Option<(&'a ProductCandidate, f64)>
where
    I: Iterator<Item = &'a ProductCandidate>,
    F: Fn(&RawCatalogItem, &ProductCandidate) -> f64,
{
    candidates
        .map(|c| (c, round_score(score(raw, c).clamp(0.0, 1.0))))
        .fold(None, |best, (candidate, s)| match best {
            Some((b, bs)) if bs > s || (bs == s && b.id <= candidate.id) => Some((b, bs)),
            _ => Some((candidate, s)),
        })
}

/// De-duplicate candidates by product id, keeping id order.
fn distinct(candidates: &[ProductCandidate]) -> Vec<&ProductCandidate> {
    let mut out: Vec<&ProductCandidate> = candidates.iter().collect();
    out.sort_by_key(|c| c.id);
    out.dedup_by_key(|c| c.id);
    out
}

fn has_text(value: Option<&str>) -> bool {
    value.is_some_and(|v| !v.trim().is_empty())
}

fn round_score(score: f64) -> f64 {
    (score * 10_000.0).round() / 10_000.0
}

/* --------------------------------------------------------------------------
Name similarity
-------------------------------------------------------------------------- */

/// Lowercase, turn punctuation into spaces, collapse whitespace.
pub fn normalize_name(raw: &str) -> String {
    let replaced: String = raw
        .chars()
        .map(|c| {
            if c.is_alphanumeric() {
                c.to_ascii_lowercase()
            } else {
                ' '
            }
        })
        .collect();
    replaced.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Jaro-Winkler similarity between the row and a candidate.
///
/// The row side is the raw name, or the name followed by the description
/// when that scores higher. The candidate side is the bare product name or
/// "brand name", whichever scores higher.
pub fn name_similarity(raw: &RawCatalogItem, candidate: &ProductCandidate) -> f64 {
    let raw_name = normalize_name(&raw.supplier_name);
    if raw_name.is_empty() {
        return 0.0;
    }

    let mut row_texts = vec![raw_name];
    if let Some(description) = raw.supplier_description.as_deref() {
        let described = normalize_name(&format!("{} {description}", raw.supplier_name));
        if described != row_texts[0] {
            row_texts.push(described);
        }
    }

    let mut candidate_texts = vec![normalize_name(&candidate.name)];
    if let Some(brand) = candidate.brand.as_deref().filter(|b| !b.trim().is_empty()) {
        candidate_texts.push(normalize_name(&format!("{brand} {}", candidate.name)));
    }

    row_texts
        .iter()
        .flat_map(|row| {
            candidate_texts
                .iter()
                .map(move |text| strsim::jaro_winkler(row, text))
        })
        .fold(0.0, f64::max)
}

/// `ILIKE` patterns for the storage-side name prefilter.
pub fn name_search_patterns(raw_name: &str) -> Vec<String> {
    let mut tokens: Vec<String> = normalize_name(raw_name)
        .split(' ')
        .filter(|t| t.chars().count() >= MIN_TOKEN_LEN)
        .map(str::to_string)
        .collect();
    tokens.sort();
    tokens.dedup();
    tokens
        .into_iter()
        .take(MAX_PREFILTER_TOKENS)
        .map(|t| format!("%{t}%"))
        .collect()
}

/// GTIN-14 form of the row's scanned code, used for scan lookups.
pub fn scan_lookup_key(raw: &RawCatalogItem) -> Option<String> {
    raw.scanned_code.as_deref().and_then(gtin::normalize_gtin14)
}

/* --------------------------------------------------------------------------
Re-matching
-------------------------------------------------------------------------- */

/// The match state currently stored on a supplier item.
#[derive(Debug, Clone, PartialEq)]
pub struct CurrentLink {
    pub product_id: Option<DbId>,
    pub method: Option<MatchMethod>,
    pub confidence: Option<f64>,
    pub needs_review: bool,
    pub is_active: bool,
}

impl CurrentLink {
    /// A link a human settled through triage.
    pub fn is_human_confirmed(&self) -> bool {
        self.method == Some(MatchMethod::Manual) && !self.needs_review && self.product_id.is_some()
    }
}

/// Why a re-run left the stored link alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum KeepReason {
    Inactive,
    HumanConfirmed,
    Unchanged,
}

#[derive(Debug, Clone, PartialEq)]
pub enum RematchPlan {
    Apply(MatchResult),
    Keep(KeepReason),
}

/// Decide whether a fresh [`MatchResult`] replaces the stored link.
///
/// Ignored items stay out of the queue forever and triaged links are never
/// downgraded by automation. A queued item stays queued: the new method,
/// confidence and link are recorded but only a triage action clears
/// `needs_review`. An identical result is a no-op so `matched_at` is not
/// bumped on re-runs.
pub fn plan_rematch(current: &CurrentLink, mut result: MatchResult) -> RematchPlan {
    if !current.is_active {
        return RematchPlan::Keep(KeepReason::Inactive);
    }
    if current.is_human_confirmed() {
        return RematchPlan::Keep(KeepReason::HumanConfirmed);
    }
    if current.needs_review {
        result.needs_review = true;
    }
    let unchanged = current.method == Some(result.method)
        && current.product_id == result.product_id
        && current.confidence == result.confidence
        && current.needs_review == result.needs_review;
    if unchanged {
        return RematchPlan::Keep(KeepReason::Unchanged);
    }
    RematchPlan::Apply(result)
}
