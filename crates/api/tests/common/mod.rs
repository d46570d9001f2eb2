//! Shared helpers for the API integration tests.

#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Method, Request, Response};
use axum::Router;
use http_body_util::BodyExt;
use medsupply_api::auth::jwt::{generate_access_token, JwtConfig};
use medsupply_api::config::{ServerConfig, DEFAULT_BODY_LIMIT_BYTES};
use medsupply_api::router::build_app_router;
use medsupply_api::state::AppState;
use medsupply_core::matching::{MatchResult, RawCatalogItem};
use medsupply_core::roles::{ROLE_ADMIN, ROLE_REVIEWER, ROLE_SUPPLIER};
use medsupply_core::status::MatchMethod;
use medsupply_core::types::DbId;
use medsupply_db::models::product::CreateProduct;
use medsupply_db::models::supplier::CreateSupplier;
use medsupply_db::models::supplier_item::SupplierItem;
use medsupply_db::repositories::{ProductRepo, SupplierItemRepo, SupplierRepo};
use serde_json::Value;
use sqlx::PgPool;
use tower::ServiceExt;

/// Build a test `ServerConfig` with safe defaults.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        shutdown_timeout_secs: 30,
        body_limit_bytes: DEFAULT_BODY_LIMIT_BYTES,
        jwt: JwtConfig {
            secret: "test-secret-for-integration-tests".to_string(),
            access_token_expiry_mins: 15,
        },
    }
}

/// Build the full application router with all middleware layers, using the
/// given database pool.
pub fn build_test_app(pool: PgPool) -> Router {
    build_test_app_with(pool, test_config())
}

/// Same as [`build_test_app`] with a caller-supplied configuration.
pub fn build_test_app_with(pool: PgPool, config: ServerConfig) -> Router {
    let state = AppState {
        pool,
        config: Arc::new(config.clone()),
    };
    build_app_router(state, &config)
}

// ----- Tokens -----

pub fn token(user_id: DbId, role: &str, supplier_id: Option<DbId>) -> String {
    generate_access_token(user_id, role, supplier_id, &test_config().jwt)
        .expect("token generation should succeed")
}

pub fn supplier_token(supplier_id: DbId) -> String {
    token(100 + supplier_id, ROLE_SUPPLIER, Some(supplier_id))
}

pub fn reviewer_token() -> String {
    token(7, ROLE_REVIEWER, None)
}

pub fn admin_token() -> String {
    token(1, ROLE_ADMIN, None)
}

// ----- Requests -----

pub async fn send(
    app: Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> Response<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    let request = match body {
        Some(json) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    app.oneshot(request).await.unwrap()
}

pub async fn get(app: Router, uri: &str) -> Response<Body> {
    send(app, Method::GET, uri, None, None).await
}

pub async fn get_auth(app: Router, uri: &str, token: &str) -> Response<Body> {
    send(app, Method::GET, uri, Some(token), None).await
}

pub async fn post_json(app: Router, uri: &str, token: &str, body: Value) -> Response<Body> {
    send(app, Method::POST, uri, Some(token), Some(body)).await
}

pub async fn post_empty(app: Router, uri: &str, token: &str) -> Response<Body> {
    send(app, Method::POST, uri, Some(token), None).await
}

pub async fn put_json(app: Router, uri: &str, token: &str, body: Value) -> Response<Body> {
    send(app, Method::PUT, uri, Some(token), Some(body)).await
}

pub async fn delete(app: Router, uri: &str, token: &str) -> Response<Body> {
    send(app, Method::DELETE, uri, Some(token), None).await
}

pub async fn body_json(response: Response<Body>) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

// ----- Fixtures -----

pub async fn seed_supplier(pool: &PgPool, name: &str) -> DbId {
    SupplierRepo::create(
        pool,
        &CreateSupplier {
            name: name.to_string(),
        },
    )
    .await
    .unwrap()
    .id
}

pub async fn seed_product(pool: &PgPool, name: &str, gtin: Option<&str>) -> DbId {
    ProductRepo::create(
        pool,
        &CreateProduct {
            name: name.to_string(),
            brand: None,
            gtin: gtin.map(str::to_string),
        },
    )
    .await
    .unwrap()
    .id
}

pub fn raw_row(sku: &str, name: &str) -> RawCatalogItem {
    RawCatalogItem {
        supplier_sku: sku.to_string(),
        supplier_name: name.to_string(),
        supplier_description: Some("Box of 100".to_string()),
        gtin: None,
        scanned_code: None,
        unit_price_cents: Some(1_250),
        min_order_qty: Some(10),
        currency: Some("USD".to_string()),
    }
}

/// Insert a supplier item and store a fixed match on it, bypassing the
/// matcher so queue ordering is deterministic.
pub async fn seed_item(
    pool: &PgPool,
    supplier_id: DbId,
    sku: &str,
    product_id: Option<DbId>,
    confidence: Option<f64>,
) -> SupplierItem {
    let item = SupplierItemRepo::upsert_raw(pool, supplier_id, &raw_row(sku, sku))
        .await
        .unwrap();
    let result = MatchResult {
        method: if product_id.is_some() {
            MatchMethod::FuzzyName
        } else {
            MatchMethod::Manual
        },
        confidence,
        product_id,
        needs_review: confidence.map_or(true, |c| c < 0.90),
    };
    let mut tx = pool.begin().await.unwrap();
    let stored = SupplierItemRepo::apply_match(&mut tx, item.id, &result, "system:matcher")
        .await
        .unwrap();
    tx.commit().await.unwrap();
    stored
}
