// Authentication error types

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use tracing::{error, warn};

use crate::error::error_response;

/// Errors raised while establishing the caller's identity
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("Missing authentication token")]
    MissingToken,

    #[error("Invalid token")]
    InvalidToken,

    #[error("Token has expired")]
    ExpiredToken,

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AuthError::MissingToken => {
                warn!("Missing token in request");
                (
                    StatusCode::UNAUTHORIZED,
                    "UNAUTHORIZED",
                    "Missing authentication token".to_string(),
                )
            }
            AuthError::InvalidToken => {
                warn!("Invalid token attempt");
                (
                    StatusCode::UNAUTHORIZED,
                    "UNAUTHORIZED",
                    "Invalid token".to_string(),
                )
            }
            AuthError::ExpiredToken => {
                warn!("Expired token attempt");
                (
                    StatusCode::UNAUTHORIZED,
                    "UNAUTHORIZED",
                    "Token has expired".to_string(),
                )
            }
            AuthError::ConfigError(msg) => {
                error!("Auth configuration error: {}", msg);
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
