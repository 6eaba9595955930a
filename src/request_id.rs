// Per-request correlation id
// The id lives in a tokio task-local for the duration of one request, so
// each concurrent request sees its own value and nothing is written to
// process-wide state.

use axum::{
    body::Body,
    http::{HeaderValue, Request},
    middleware::Next,
    response::Response,
};
use tracing::Instrument;
use uuid::Uuid;

tokio::task_local! {
    static REQUEST_ID: String;
}

/// Header carrying the correlation id back to the client.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Returns the current request's correlation id, if one is in scope.
///
/// Outside of a request (e.g. in unit tests) this returns None; error
/// responses simply omit the field.
pub fn current() -> Option<String> {
    REQUEST_ID.try_with(|id| id.clone()).ok()
}

/// Middleware that assigns a correlation id to the request, scopes it into
/// the task-local, wraps the request in a tracing span, and echoes the id
/// in the response headers on every exit path.
pub async fn middleware(request: Request<Body>, next: Next) -> Response {
    let id = Uuid::new_v4().to_string();
    let span = tracing::info_span!("request", request_id = %id, path = %request.uri().path());

    let mut response = REQUEST_ID
        .scope(id.clone(), next.run(request).instrument(span))
        .await;

    if let Ok(value) = HeaderValue::from_str(&id) {
        response.headers_mut().insert(REQUEST_ID_HEADER, value);
    }
    response
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_current_is_none_outside_request_scope() {
        assert!(current().is_none());
    }

    #[tokio::test]
    async fn test_current_returns_scoped_id() {
        let seen = REQUEST_ID
            .scope("test-id".to_string(), async { current() })
            .await;
        assert_eq!(seen, Some("test-id".to_string()));
    }

    #[tokio::test]
    async fn test_concurrent_scopes_do_not_leak() {
        let a = REQUEST_ID.scope("id-a".to_string(), async {
            tokio::task::yield_now().await;
            current()
        });
        let b = REQUEST_ID.scope("id-b".to_string(), async {
            tokio::task::yield_now().await;
            current()
        });

        let (seen_a, seen_b) = tokio::join!(a, b);
        assert_eq!(seen_a, Some("id-a".to_string()));
        assert_eq!(seen_b, Some("id-b".to_string()));
    }
}
