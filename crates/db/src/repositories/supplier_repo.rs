//! Repository for the `suppliers` table.

use medsupply_core::types::DbId;
use sqlx::PgPool;

use crate::models::supplier::{CreateSupplier, Supplier};

const COLUMNS: &str = "id, name, created_at, updated_at";

/// Provides CRUD operations for suppliers.
pub struct SupplierRepo;

impl SupplierRepo {
    /// Insert a new supplier, returning the created row.
    pub async fn create(pool: &PgPool, input: &CreateSupplier) -> Result<Supplier, sqlx::Error> {
        let query = format!("INSERT INTO suppliers (name) VALUES ($1) RETURNING {COLUMNS}");
        sqlx::query_as::<_, Supplier>(&query)
            .bind(input.name.trim())
            .fetch_one(pool)
            .await
    }

    /// Find a supplier by its ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Supplier>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM suppliers WHERE id = $1");
        sqlx::query_as::<_, Supplier>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }
}
