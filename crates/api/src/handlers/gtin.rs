//! Handler for ad-hoc GTIN validation.

use axum::extract::Query;
use axum::response::IntoResponse;
use axum::Json;
use medsupply_core::gtin::{self, GtinValidation};
use serde::{Deserialize, Serialize};

use crate::error::AppResult;
use crate::middleware::rbac::RequireAuth;
use crate::response::DataResponse;

#[derive(Debug, Deserialize)]
pub struct GtinQuery {
    #[serde(default)]
    pub code: String,
}

#[derive(Debug, Serialize)]
pub struct GtinCheck {
    pub code: String,
    pub likely_format: bool,
    /// GTIN-14 form, present when the code is plausibly a GTIN.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gtin14: Option<String>,
    #[serde(flatten)]
    pub validation: GtinValidation,
}

/// GET /api/v1/gtin/validate?code=
///
/// Full validation plus the cheap format pre-check. An invalid code is a
/// normal 200 response with `valid: false`.
pub async fn validate(
    RequireAuth(_user): RequireAuth,
    Query(params): Query<GtinQuery>,
) -> AppResult<impl IntoResponse> {
    let code = params.code.trim().to_string();
    let check = GtinCheck {
        likely_format: gtin::is_likely_format(&code),
        gtin14: gtin::normalize_gtin14(&code),
        validation: gtin::validate(&code),
        code,
    };
    Ok(Json(DataResponse { data: check }))
}
