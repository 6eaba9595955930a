use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use tracing::{debug, error, warn};

use crate::error::error_response;

/// Error types for tenant resolution and authorization
#[derive(Debug, thiserror::Error)]
pub enum TenantError {
    /// No tenant matches the requested slug. Terminal: callers must never
    /// fall back to "no tenant".
    #[error("Tenant with slug '{0}' not found")]
    TenantNotFound(String),

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Database error: {0}")]
    DatabaseError(String),
}

impl From<sqlx::Error> for TenantError {
    fn from(err: sqlx::Error) -> Self {
        TenantError::DatabaseError(err.to_string())
    }
}

impl IntoResponse for TenantError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            TenantError::TenantNotFound(slug) => {
                debug!("Tenant not found: {}", slug);
                (
                    StatusCode::NOT_FOUND,
                    "TENANT_NOT_FOUND",
                    format!("Tenant with slug '{}' not found", slug),
                )
            }
            TenantError::Unauthorized => {
                warn!("Unauthenticated request to tenant-scoped endpoint");
                (
                    StatusCode::UNAUTHORIZED,
                    "UNAUTHORIZED",
                    "Authentication required".to_string(),
                )
            }
            TenantError::Forbidden(msg) => {
                warn!("Forbidden tenant access attempt: {}", msg);
                (StatusCode::FORBIDDEN, "FORBIDDEN", msg.clone())
            }
            TenantError::DatabaseError(msg) => {
                error!("Database error in tenant layer: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal server error occurred".to_string(),
                )
            }
        };

        error_response(status, code, message)
    }
}
