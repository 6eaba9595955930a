// Caller identity extractors for protected routes

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header, request::Parts},
};
use uuid::Uuid;

use crate::auth::{error::AuthError, token::TokenService};

/// Authenticated caller extracted from a Bearer token
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    pub user_id: Uuid,
    pub email: String,
}

fn caller_from_parts(parts: &Parts) -> Result<AuthenticatedUser, AuthError> {
    let auth_header = parts
        .headers
        .get(header::AUTHORIZATION)
        .ok_or(AuthError::MissingToken)?
        .to_str()
        .map_err(|_| AuthError::InvalidToken)?;

    let token = auth_header
        .strip_prefix("Bearer ")
        .ok_or(AuthError::InvalidToken)?;

    let jwt_secret = std::env::var("JWT_SECRET")
        .map_err(|_| AuthError::ConfigError("JWT_SECRET not configured".to_string()))?;

    let token_service = TokenService::new(jwt_secret);
    let claims = token_service.validate_access_token(token)?;

    Ok(AuthenticatedUser {
        user_id: claims.sub,
        email: claims.email,
    })
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthenticatedUser
where
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        caller_from_parts(parts)
    }
}

/// Optional caller identity for routes that tolerate anonymous requests.
///
/// A missing Authorization header yields `None`; a present-but-invalid token
/// is still rejected so callers cannot downgrade themselves to anonymous by
/// sending garbage.
#[derive(Debug, Clone)]
pub struct MaybeAuthenticatedUser(pub Option<AuthenticatedUser>);

#[async_trait]
impl<S> FromRequestParts<S> for MaybeAuthenticatedUser
where
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        if parts.headers.get(header::AUTHORIZATION).is_none() {
            return Ok(MaybeAuthenticatedUser(None));
        }
        caller_from_parts(parts).map(|user| MaybeAuthenticatedUser(Some(user)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;
    use chrono::Utc;
    use jsonwebtoken::{encode, EncodingKey, Header};

    fn create_parts(auth_value: Option<&str>) -> Parts {
        let mut builder = Request::builder().uri("/");
        if let Some(value) = auth_value {
            builder = builder.header(header::AUTHORIZATION, value);
        }
        let (parts, _) = builder.body(()).unwrap().into_parts();
        parts
    }

    fn make_bearer(secret: &str, user_id: Uuid) -> String {
        let now = Utc::now().timestamp();
        let claims = crate::auth::token::Claims {
            sub: user_id,
            email: "test@example.com".to_string(),
            iat: now,
            exp: now + 900,
        };
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .unwrap();
        format!("Bearer {}", token)
    }

    #[tokio::test]
    async fn test_valid_token_is_accepted() {
        std::env::set_var("JWT_SECRET", "test_secret_key_for_testing_purposes");

        let user_id = Uuid::new_v4();
        let auth = make_bearer("test_secret_key_for_testing_purposes", user_id);
        let mut parts = create_parts(Some(&auth));

        let user = AuthenticatedUser::from_request_parts(&mut parts, &())
            .await
            .unwrap();
        assert_eq!(user.user_id, user_id);
    }

    #[tokio::test]
    async fn test_missing_header_is_rejected() {
        let mut parts = create_parts(None);
        let result = AuthenticatedUser::from_request_parts(&mut parts, &()).await;
        assert!(matches!(result.unwrap_err(), AuthError::MissingToken));
    }

    #[tokio::test]
    async fn test_non_bearer_header_is_rejected() {
        std::env::set_var("JWT_SECRET", "test_secret_key_for_testing_purposes");

        for value in ["Basic dXNlcjpwYXNz", "token_without_bearer"] {
            let mut parts = create_parts(Some(value));
            let result = AuthenticatedUser::from_request_parts(&mut parts, &()).await;
            assert!(result.is_err());
        }
    }

    #[tokio::test]
    async fn test_optional_extractor_allows_anonymous() {
        let mut parts = create_parts(None);
        let MaybeAuthenticatedUser(user) = MaybeAuthenticatedUser::from_request_parts(&mut parts, &())
            .await
            .unwrap();
        assert!(user.is_none());
    }

    #[tokio::test]
    async fn test_optional_extractor_rejects_garbage_token() {
        std::env::set_var("JWT_SECRET", "test_secret_key_for_testing_purposes");

        let mut parts = create_parts(Some("Bearer not.a.valid.jwt"));
        let result = MaybeAuthenticatedUser::from_request_parts(&mut parts, &()).await;
        assert!(result.is_err());
    }
}
