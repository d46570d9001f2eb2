//! Route definitions for reviewers: pending corrections and the match
//! review queue.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::{queue, review};
use crate::state::AppState;

/// Mounted at `/review`.
///
/// ```text
/// GET    /corrections                    list_pending
/// POST   /corrections/{id}/approve       approve
/// POST   /corrections/{id}/reject        reject
/// GET    /items/{id}/corrections         list_for_item
///
/// GET    /queue                          list_queue
/// GET    /queue/summary                  summary
/// GET    /queue/{id}/navigation          navigation
/// POST   /queue/{id}/confirm             confirm
/// POST   /queue/{id}/reassign            reassign
/// POST   /queue/{id}/create-product      create_product
/// POST   /queue/{id}/merge               merge
/// POST   /queue/{id}/ignore              ignore
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/corrections", get(review::list_pending))
        .route("/corrections/{id}/approve", post(review::approve))
        .route("/corrections/{id}/reject", post(review::reject))
        .route("/items/{id}/corrections", get(review::list_for_item))
        .route("/queue", get(queue::list_queue))
        .route("/queue/summary", get(queue::summary))
        .route("/queue/{id}/navigation", get(queue::navigation))
        .route("/queue/{id}/confirm", post(queue::confirm))
        .route("/queue/{id}/reassign", post(queue::reassign))
        .route("/queue/{id}/create-product", post(queue::create_product))
        .route("/queue/{id}/merge", post(queue::merge))
        .route("/queue/{id}/ignore", post(queue::ignore))
}
