//! Route definitions for GTIN utilities.

use axum::routing::get;
use axum::Router;

use crate::handlers::gtin;
use crate::state::AppState;

/// Mounted at `/gtin`.
///
/// ```text
/// GET    /validate?code=            validate
/// ```
pub fn router() -> Router<AppState> {
    Router::new().route("/validate", get(gtin::validate))
}
