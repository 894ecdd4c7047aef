//! Authentication middleware for Axum
//!
//! Tokens arrive as `Authorization: Token <jwt>`; `Bearer <jwt>` is accepted too.
//! `optional_auth_middleware` runs on every API route and attaches the viewer
//! when a valid token is present. `auth_middleware` guards the routes that
//! require a user and rejects the request with 401 otherwise.

use axum::{
    body::Body,
    extract::{FromRequestParts, State},
    http::{header, request::Parts, Request},
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::convert::Infallible;

use crate::infrastructure::crypto::jwt::{verify_token, JwtConfig, TokenClaims};
use crate::interfaces::http::common::ApiError;

/// Authentication error types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthError {
    MissingToken,
    InvalidToken,
    ExpiredToken,
}

/// Authentication state containing the JWT config
#[derive(Clone)]
pub struct AuthState {
    pub jwt_config: JwtConfig,
}

/// The user a request was authenticated as
#[derive(Clone, Debug)]
pub struct AuthenticatedUser {
    pub user_id: i64,
    pub username: String,
    /// The raw token, echoed back in the current-user view
    pub token: String,
}

impl AuthenticatedUser {
    fn from_claims(claims: TokenClaims, token: &str) -> Option<Self> {
        Some(Self {
            user_id: claims.user_id()?,
            username: claims.username,
            token: token.to_string(),
        })
    }
}

/// Extractor for routes where authentication is optional.
///
/// Holds the user attached by `optional_auth_middleware`, if any.
#[derive(Clone, Debug, Default)]
pub struct Viewer(pub Option<AuthenticatedUser>);

impl Viewer {
    pub fn user_id(&self) -> Option<i64> {
        self.0.as_ref().map(|u| u.user_id)
    }
}

impl<S: Send + Sync> FromRequestParts<S> for Viewer {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Viewer(parts.extensions.get::<AuthenticatedUser>().cloned()))
    }
}

pub(crate) fn extract_token(auth_header: &str) -> Option<&str> {
    auth_header
        .strip_prefix("Token ")
        .or_else(|| auth_header.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

fn authenticate(request: &Request<Body>, config: &JwtConfig) -> Result<AuthenticatedUser, AuthError> {
    let auth_header = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .ok_or(AuthError::MissingToken)?;

    let token = extract_token(auth_header).ok_or(AuthError::InvalidToken)?;
    let claims = verify_token(token, config).map_err(|e| match e.kind() {
        jsonwebtoken::errors::ErrorKind::ExpiredSignature => AuthError::ExpiredToken,
        _ => AuthError::InvalidToken,
    })?;
    if claims.is_expired() {
        return Err(AuthError::ExpiredToken);
    }

    AuthenticatedUser::from_claims(claims, token).ok_or(AuthError::InvalidToken)
}

/// JWT authentication middleware for routes that require a user
pub async fn auth_middleware(
    State(auth_state): State<AuthState>,
    mut request: Request<Body>,
    next: Next,
) -> Response {
    match authenticate(&request, &auth_state.jwt_config) {
        Ok(user) => {
            request.extensions_mut().insert(user);
            next.run(request).await
        }
        Err(e) => auth_error_response(e),
    }
}

/// Optional authentication middleware; invalid or missing tokens are ignored
pub async fn optional_auth_middleware(
    State(auth_state): State<AuthState>,
    mut request: Request<Body>,
    next: Next,
) -> Response {
    if let Ok(user) = authenticate(&request, &auth_state.jwt_config) {
        request.extensions_mut().insert(user);
    }
    next.run(request).await
}

fn auth_error_response(error: AuthError) -> Response {
    let message = match error {
        AuthError::MissingToken => "missing authorization token",
        AuthError::InvalidToken => "invalid authorization token",
        AuthError::ExpiredToken => "token has expired",
    };
    ApiError::unauthorized(message).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::crypto::jwt::create_token;

    fn config() -> JwtConfig {
        JwtConfig {
            secret: "test-secret".into(),
            expiration_hours: 1,
            issuer: "conduit".into(),
        }
    }

    fn request(auth: Option<&str>) -> Request<Body> {
        let mut builder = Request::builder().uri("/");
        if let Some(value) = auth {
            builder = builder.header(header::AUTHORIZATION, value);
        }
        builder.body(Body::empty()).unwrap()
    }

    #[test]
    fn both_prefixes_are_accepted() {
        assert_eq!(extract_token("Token abc"), Some("abc"));
        assert_eq!(extract_token("Bearer abc"), Some("abc"));
        assert_eq!(extract_token("Basic abc"), None);
        assert_eq!(extract_token("Token "), None);
    }

    #[test]
    fn valid_token_yields_the_user() {
        let cfg = config();
        let token = create_token(7, "alice", &cfg).unwrap();
        let user = authenticate(&request(Some(&format!("Token {}", token))), &cfg).unwrap();

        assert_eq!(user.user_id, 7);
        assert_eq!(user.username, "alice");
        assert_eq!(user.token, token);
    }

    #[test]
    fn missing_and_forged_tokens_are_rejected() {
        let cfg = config();
        assert_eq!(
            authenticate(&request(None), &cfg).unwrap_err(),
            AuthError::MissingToken
        );

        let other = JwtConfig {
            secret: "other".into(),
            ..config()
        };
        let forged = create_token(7, "alice", &other).unwrap();
        assert_eq!(
            authenticate(&request(Some(&format!("Token {}", forged))), &cfg).unwrap_err(),
            AuthError::InvalidToken
        );
    }
}
