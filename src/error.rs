// Shared error response shape for the API
// Every module error converts into this body so clients always see
// {error, code, request_id} with a stable machine-readable code.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::Serialize;
use utoipa::ToSchema;

use crate::request_id;

/// Consistent error response structure
///
/// `code` is the machine-readable error code (e.g. "TENANT_NOT_FOUND"),
/// `error` the human-readable message, and `request_id` the correlation id
/// assigned by the request-id middleware so a client report can be matched
/// against server logs.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
}

/// Build a JSON error response with the current request's correlation id.
///
/// Internal detail must already have been stripped (and logged) by the
/// caller; this only shapes the client-facing body.
pub fn error_response(status: StatusCode, code: &str, message: String) -> Response {
    let body = ErrorResponse {
        error: message,
        code: code.to_string(),
        request_id: request_id::current(),
    };
    (status, Json(body)).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_response_serializes_code_and_message() {
        let body = ErrorResponse {
            error: "Tenant with slug acme not found".to_string(),
            code: "TENANT_NOT_FOUND".to_string(),
            request_id: Some("abc-123".to_string()),
        };

        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["error"], "Tenant with slug acme not found");
        assert_eq!(json["code"], "TENANT_NOT_FOUND");
        assert_eq!(json["request_id"], "abc-123");
    }

    #[test]
    fn test_error_response_omits_missing_request_id() {
        let body = ErrorResponse {
            error: "boom".to_string(),
            code: "INTERNAL_ERROR".to_string(),
            request_id: None,
        };

        let json = serde_json::to_value(&body).unwrap();
        assert!(json.get("request_id").is_none());
    }
}
