//! Canonical product model.

use medsupply_core::matching::ProductCandidate;
use medsupply_core::triage::NewProduct;
use medsupply_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `canonical_products` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct CanonicalProduct {
    pub id: DbId,
    pub name: String,
    pub brand: Option<String>,
    pub gtin: Option<String>,
    pub quality_summary: Option<serde_json::Value>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl CanonicalProduct {
    pub fn as_candidate(&self) -> ProductCandidate {
        ProductCandidate {
            id: self.id,
            name: self.name.clone(),
            brand: self.brand.clone(),
            gtin: self.gtin.clone(),
        }
    }
}

/// DTO for inserting a canonical product.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateProduct {
    pub name: String,
    pub brand: Option<String>,
    pub gtin: Option<String>,
}

impl From<NewProduct> for CreateProduct {
    fn from(p: NewProduct) -> Self {
        Self {
            name: p.name,
            brand: p.brand,
            gtin: p.gtin,
        }
    }
}
