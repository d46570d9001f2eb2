pub mod gtin;
pub mod health;
pub mod review;
pub mod supplier;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /gtin/validate                                   validate a code (any role)
///
/// /supplier/catalog/ingest                         ingest catalog rows (POST)
/// /supplier/items/{id}/correction                  save draft correction (PUT)
/// /supplier/corrections/drafts                     list own drafts
/// /supplier/corrections/counts                     counts per status
/// /supplier/corrections/submit                     submit all drafts (POST)
/// /supplier/corrections/{id}                       get, delete draft
///
/// /review/corrections                              pending corrections
/// /review/corrections/{id}/approve                 approve (POST)
/// /review/corrections/{id}/reject                  reject (POST)
/// /review/items/{id}/corrections                   correction history of an item
///
/// /review/queue                                    review queue page
/// /review/queue/summary                            counts per confidence bucket
/// /review/queue/{id}/navigation                    previous/next in queue
/// /review/queue/{id}/confirm                       confirm link (POST)
/// /review/queue/{id}/reassign                      link another product (POST)
/// /review/queue/{id}/create-product                create and link product (POST)
/// /review/queue/{id}/merge                         merge into product (POST)
/// /review/queue/{id}/ignore                        deactivate item (POST)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/gtin", gtin::router())
        // Supplier-scoped catalog and correction routes.
        .nest("/supplier", supplier::router())
        // Reviewer routes: corrections and the match review queue.
        .nest("/review", review::router())
}
