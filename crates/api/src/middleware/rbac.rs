//! Role-based access control (RBAC) extractors.
//!
//! Each extractor wraps [`AuthUser`] and rejects requests whose role does not
//! meet the minimum requirement. Use these in route handlers to enforce
//! authorization at the type level.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use medsupply_core::error::CoreError;
use medsupply_core::roles::{ROLE_ADMIN, ROLE_REVIEWER, ROLE_SUPPLIER};
use medsupply_core::types::DbId;

use super::auth::AuthUser;
use crate::error::AppError;
use crate::state::AppState;

/// A caller acting for exactly one supplier.
#[derive(Debug, Clone)]
pub struct SupplierScope {
    pub user: AuthUser,
    pub supplier_id: DbId,
}

/// Requires the `supplier` role (or `admin`) and a `supplier_id` claim.
/// Rejects with 403 Forbidden otherwise.
///
/// ```ignore
/// async fn supplier_only(RequireSupplier(scope): RequireSupplier) -> AppResult<Json<()>> {
///     // every read and write is filtered by scope.supplier_id
///     Ok(Json(()))
/// }
/// ```
pub struct RequireSupplier(pub SupplierScope);

impl FromRequestParts<AppState> for RequireSupplier {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user = AuthUser::from_request_parts(parts, state).await?;
        if user.role != ROLE_SUPPLIER && user.role != ROLE_ADMIN {
            return Err(AppError::Core(CoreError::Forbidden(
                "Supplier role required".into(),
            )));
        }
        let supplier_id = user.supplier_id.ok_or_else(|| {
            AppError::Core(CoreError::Forbidden(
                "Token carries no supplier scope".into(),
            ))
        })?;
        Ok(RequireSupplier(SupplierScope { user, supplier_id }))
    }
}

/// Requires `reviewer` or `admin` role. Rejects with 403 Forbidden otherwise.
pub struct RequireReviewer(pub AuthUser);

impl FromRequestParts<AppState> for RequireReviewer {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user = AuthUser::from_request_parts(parts, state).await?;
        if user.role != ROLE_REVIEWER && user.role != ROLE_ADMIN {
            return Err(AppError::Core(CoreError::Forbidden(
                "Reviewer or Admin role required".into(),
            )));
        }
        Ok(RequireReviewer(user))
    }
}

/// Requires any authenticated user (any valid role).
///
/// Functionally equivalent to [`AuthUser`] but named explicitly for use in
/// route definitions where the intent "this route requires authentication"
/// should be self-documenting.
pub struct RequireAuth(pub AuthUser);

impl FromRequestParts<AppState> for RequireAuth {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user = AuthUser::from_request_parts(parts, state).await?;
        Ok(RequireAuth(user))
    }
}
