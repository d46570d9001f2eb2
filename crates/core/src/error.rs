use crate::types::DbId;

/// Expected business-rule outcomes of the matching, correction and triage
/// operations.
///
/// Scope violations are reported as [`CoreError::NotFound`] so callers cannot
/// discover another supplier's records.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: &'static str, id: DbId },

    #[error("Invalid state: {0}")]
    InvalidState(String),

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl CoreError {
    /// Whether this error is an expected business-rule outcome (logged at
    /// warn) rather than a fault (logged at error).
    pub fn is_expected(&self) -> bool {
        !matches!(self, CoreError::Internal(_))
    }
}
