//! Shared query parameter types for API handlers.

use serde::Deserialize;

/// A bare `?limit=` parameter, clamped in the handler via `clamp_limit`.
#[derive(Debug, Default, Deserialize)]
pub struct LimitParams {
    pub limit: Option<i64>,
}
