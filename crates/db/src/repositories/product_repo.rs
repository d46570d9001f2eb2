//! Repository for the `canonical_products` table.

use medsupply_core::types::DbId;
use sqlx::PgPool;

use crate::models::product::{CanonicalProduct, CreateProduct};
use crate::DbTransaction;

const COLUMNS: &str = "id, name, brand, gtin, quality_summary, created_at, updated_at";

/// Provides CRUD and matcher lookups for canonical products.
pub struct ProductRepo;

impl ProductRepo {
    /// Insert a new product, returning the created row.
    pub async fn create(
        pool: &PgPool,
        input: &CreateProduct,
    ) -> Result<CanonicalProduct, sqlx::Error> {
        let query = format!(
            "INSERT INTO canonical_products (name, brand, gtin)
             VALUES ($1, $2, $3)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, CanonicalProduct>(&query)
            .bind(&input.name)
            .bind(&input.brand)
            .bind(&input.gtin)
            .fetch_one(pool)
            .await
    }

    /// Insert a new product inside an open transaction.
    pub async fn create_in_tx(
        tx: &mut DbTransaction<'_>,
        input: &CreateProduct,
    ) -> Result<CanonicalProduct, sqlx::Error> {
        let query = format!(
            "INSERT INTO canonical_products (name, brand, gtin)
             VALUES ($1, $2, $3)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, CanonicalProduct>(&query)
            .bind(&input.name)
            .bind(&input.brand)
            .bind(&input.gtin)
            .fetch_one(&mut **tx)
            .await
    }

    /// Find a product by its ID.
    pub async fn find_by_id(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<CanonicalProduct>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM canonical_products WHERE id = $1");
        sqlx::query_as::<_, CanonicalProduct>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find a product by ID inside a transaction (`FOR SHARE`, so it cannot
    /// be deleted before the transaction links to it).
    pub async fn find_by_id_in_tx(
        tx: &mut DbTransaction<'_>,
        id: DbId,
    ) -> Result<Option<CanonicalProduct>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM canonical_products WHERE id = $1 FOR SHARE");
        sqlx::query_as::<_, CanonicalProduct>(&query)
            .bind(id)
            .fetch_optional(&mut **tx)
            .await
    }

    /// The GTIN of a product, used when snapshotting a correction.
    pub async fn gtin_in_tx(
        tx: &mut DbTransaction<'_>,
        id: DbId,
    ) -> Result<Option<String>, sqlx::Error> {
        let gtin: Option<Option<String>> =
            sqlx::query_scalar("SELECT gtin FROM canonical_products WHERE id = $1")
                .bind(id)
                .fetch_optional(&mut **tx)
                .await?;
        Ok(gtin.flatten())
    }

    /// Products whose GTIN equals `gtin` exactly.
    pub async fn find_by_gtin(
        pool: &PgPool,
        gtin: &str,
    ) -> Result<Vec<CanonicalProduct>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM canonical_products
             WHERE gtin = $1
             ORDER BY id ASC"
        );
        sqlx::query_as::<_, CanonicalProduct>(&query)
            .bind(gtin.trim())
            .fetch_all(pool)
            .await
    }

    /// Products whose zero-padded GTIN-14 form equals `gtin14`.
    pub async fn find_by_gtin14(
        pool: &PgPool,
        gtin14: &str,
    ) -> Result<Vec<CanonicalProduct>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM canonical_products
             WHERE gtin IS NOT NULL AND LPAD(gtin, 14, '0') = $1
             ORDER BY id ASC"
        );
        sqlx::query_as::<_, CanonicalProduct>(&query)
            .bind(gtin14)
            .fetch_all(pool)
            .await
    }

    /// Name prefilter for fuzzy matching: products whose name or brand
    /// contains any of the `ILIKE` patterns, capped at `limit`.
    ///
    /// Rows matching the most patterns come first, then names closest in
    /// length to `raw_name`, so the cap drops the weakest candidates rather
    /// than the newest ones.
    pub async fn search_by_name_patterns(
        pool: &PgPool,
        patterns: &[String],
        raw_name: &str,
        limit: i64,
    ) -> Result<Vec<CanonicalProduct>, sqlx::Error> {
        if patterns.is_empty() {
            return Ok(Vec::new());
        }
        let query = format!(
            "SELECT {COLUMNS} FROM canonical_products p
             WHERE p.name ILIKE ANY($1) OR p.brand ILIKE ANY($1)
             ORDER BY (
                 SELECT COUNT(*) FROM unnest($1::text[]) AS t(pattern)
                 WHERE p.name ILIKE t.pattern OR p.brand ILIKE t.pattern
             ) DESC,
             ABS(LENGTH(p.name) - LENGTH($2)) ASC,
             p.id ASC
             LIMIT $3"
        );
        sqlx::query_as::<_, CanonicalProduct>(&query)
            .bind(patterns)
            .bind(raw_name)
            .bind(limit)
            .fetch_all(pool)
            .await
    }
}
