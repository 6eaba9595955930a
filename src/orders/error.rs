use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use tracing::{debug, error, warn};

use crate::error::error_response;
use crate::tenants::TenantError;

/// Error types for order operations
#[derive(Debug, thiserror::Error)]
pub enum OrderError {
    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Order not found")]
    NotFound,

    #[error("Cart not found")]
    CartNotFound,

    #[error("Cart is empty")]
    CartEmpty,

    #[error("Cart has already been converted")]
    CartAlreadyConverted,

    #[error("Invalid status transition: {0}")]
    InvalidTransition(String),

    /// Transient conflict between concurrent transactions. The whole
    /// operation is safe to retry from scratch; nothing partial persists.
    #[error("Transaction conflict")]
    TransactionConflict,

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error(transparent)]
    Tenant(#[from] TenantError),
}

impl From<sqlx::Error> for OrderError {
    fn from(err: sqlx::Error) -> Self {
        // Serialization failures and unique violations are retryable
        // conflicts, not server faults.
        if let sqlx::Error::Database(ref db_err) = err {
            if let Some(code) = db_err.code() {
                if code == "40001" || code == "23505" {
                    return OrderError::TransactionConflict;
                }
            }
        }
        OrderError::DatabaseError(err.to_string())
    }
}

impl IntoResponse for OrderError {
    fn into_response(self) -> Response {
        if let OrderError::Tenant(inner) = self {
            return inner.into_response();
        }

        let (status, code, message) = match &self {
            OrderError::DatabaseError(msg) => {
                error!("Database error in order layer: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal server error occurred".to_string(),
                )
            }
            OrderError::NotFound => {
                debug!("Order not found");
                (
                    StatusCode::NOT_FOUND,
                    "ORDER_NOT_FOUND",
                    "Order not found".to_string(),
                )
            }
            OrderError::CartNotFound => {
                debug!("Cart not found for tenant");
                (
                    StatusCode::NOT_FOUND,
                    "CART_NOT_FOUND",
                    "Cart not found".to_string(),
                )
            }
            OrderError::CartEmpty => (
                StatusCode::BAD_REQUEST,
                "CART_EMPTY",
                "Cart has no items".to_string(),
            ),
            OrderError::CartAlreadyConverted => {
                warn!("Attempt to convert a non-open cart");
                (
                    StatusCode::CONFLICT,
                    "CART_ALREADY_CONVERTED",
                    "Cart has already been converted".to_string(),
                )
            }
            OrderError::InvalidTransition(msg) => (
                StatusCode::CONFLICT,
                "INVALID_STATUS_TRANSITION",
                msg.clone(),
            ),
            OrderError::TransactionConflict => {
                warn!("Transaction conflict; caller may retry");
                (
                    StatusCode::CONFLICT,
                    "TRANSACTION_CONFLICT",
                    "The operation conflicted with a concurrent request; retry".to_string(),
                )
            }
            OrderError::ValidationError(msg) => (
                StatusCode::BAD_REQUEST,
                "VALIDATION_ERROR",
                msg.clone(),
            ),
            // handled above
            OrderError::Tenant(_) => unreachable!(),
        };

        error_response(status, code, message)
    }
}
