//! Route definitions for the supplier portal.
//!
//! Every route requires a supplier-scoped token; the supplier is taken from
//! the token, never from the path.

use axum::routing::{get, post, put};
use axum::Router;

use crate::handlers::{catalog, corrections};
use crate::state::AppState;

/// Mounted at `/supplier`.
///
/// ```text
/// POST   /catalog/ingest             ingest
/// PUT    /items/{id}/correction      save_draft
/// GET    /corrections/drafts         list_drafts
/// GET    /corrections/counts         counts
/// POST   /corrections/submit         submit_all
/// GET    /corrections/{id}           get_correction
/// DELETE /corrections/{id}           delete_draft
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/catalog/ingest", post(catalog::ingest))
        .route("/items/{id}/correction", put(corrections::save_draft))
        .route("/corrections/drafts", get(corrections::list_drafts))
        .route("/corrections/counts", get(corrections::counts))
        .route("/corrections/submit", post(corrections::submit_all))
        .route(
            "/corrections/{id}",
            get(corrections::get_correction).delete(corrections::delete_draft),
        )
}
