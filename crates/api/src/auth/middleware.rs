//! Authentication extractors for Axum
//!
//! Your app state must implement `HasAuthProvider`:
//!
//! ```ignore
//! impl HasAuthProvider for AppState {
//!     fn auth_provider(&self) -> Arc<dyn AuthProvider> {
//!         Arc::clone(&self.auth) as Arc<dyn AuthProvider>
//!     }
//! }
//! ```
//!
//! Tokens are read from the `Authorization` header first (`Bearer gsk_...`
//! or the raw token), then from the `auth_token` cookie.

use std::sync::Arc;

use axum::{
    Json,
    extract::FromRequestParts,
    http::{HeaderMap, StatusCode, header::AUTHORIZATION, header::COOKIE, request::Parts},
    response::{IntoResponse, Response},
};

use gitadora_auth::{AuthError as GitadoraAuthError, AuthProvider, UserInfo};

/// Name of the session cookie
pub const AUTH_COOKIE: &str = "auth_token";

/// Maximum token size (8KB)
const MAX_TOKEN_SIZE: usize = 8 * 1024;

/// Maximum cookie header size (16KB)
const MAX_COOKIE_SIZE: usize = 16 * 1024;

/// Trait for app state that provides an auth provider
pub trait HasAuthProvider: Send + Sync {
    /// Get the auth provider
    fn auth_provider(&self) -> Arc<dyn AuthProvider>;
}

/// Error returned when authentication fails
#[derive(Debug)]
pub enum AuthError {
    /// No token provided
    MissingToken,
    /// Token or session is not valid
    InvalidToken,
    /// Token or session has expired
    TokenExpired,
    /// Token could not be checked
    Internal,
}

impl From<GitadoraAuthError> for AuthError {
    fn from(e: GitadoraAuthError) -> Self {
        match e {
            GitadoraAuthError::MissingToken => Self::MissingToken,
            GitadoraAuthError::TokenExpired | GitadoraAuthError::SessionExpired => {
                Self::TokenExpired
            }
            GitadoraAuthError::Store(ref err) => {
                tracing::error!(error = %err, "Token validation failed");
                Self::Internal
            }
            _ => Self::InvalidToken,
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let (status, code, message) = match self {
            Self::MissingToken => (
                StatusCode::UNAUTHORIZED,
                "AUTH_REQUIRED",
                "Authentication required",
            ),
            Self::InvalidToken => (
                StatusCode::UNAUTHORIZED,
                "INVALID_TOKEN",
                "Invalid authentication token",
            ),
            Self::TokenExpired => (
                StatusCode::UNAUTHORIZED,
                "TOKEN_EXPIRED",
                "Authentication token has expired",
            ),
            Self::Internal => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_ERROR",
                "Authentication is unavailable",
            ),
        };

        let body = serde_json::json!({
            "error": code,
            "message": message,
        });

        (status, Json(body)).into_response()
    }
}

/// Extract the session token from request headers
///
/// Returns None when no token is present or it exceeds `MAX_TOKEN_SIZE`.
pub fn extract_token(headers: &HeaderMap) -> Option<String> {
    extract_from_auth_header(headers)
        .or_else(|| extract_from_cookie(headers))
        .filter(|token| token.len() <= MAX_TOKEN_SIZE)
}

fn extract_from_auth_header(headers: &HeaderMap) -> Option<String> {
    let auth_header = headers.get(AUTHORIZATION)?;

    // "Bearer " = 7 chars
    if auth_header.len() > MAX_TOKEN_SIZE + 7 {
        return None;
    }

    let auth_str = auth_header.to_str().ok()?;
    let token = auth_str.strip_prefix("Bearer ").unwrap_or(auth_str).trim();

    if token.is_empty() {
        None
    } else {
        Some(token.to_string())
    }
}

fn extract_from_cookie(headers: &HeaderMap) -> Option<String> {
    let cookie_header = headers.get(COOKIE)?;

    if cookie_header.len() > MAX_COOKIE_SIZE {
        return None;
    }

    let cookies = cookie_header.to_str().ok()?;

    cookies
        .split(';')
        .filter_map(|cookie| cookie.trim().strip_prefix(AUTH_COOKIE)?.strip_prefix('='))
        .map(|value| value.trim().trim_matches('"'))
        .find(|value| !value.is_empty())
        .map(String::from)
}

async fn authenticate<S>(parts: &Parts, state: &S) -> Result<UserInfo, AuthError>
where
    S: HasAuthProvider + Send + Sync,
{
    let token = extract_token(&parts.headers).ok_or(AuthError::MissingToken)?;
    let provider = state.auth_provider();
    Ok(provider.validate(&token).await?)
}

/// Authenticated user extractor
///
/// ```ignore
/// async fn handler(user: AuthUser) -> impl IntoResponse {
///     format!("Hello, {}!", user.display_name)
/// }
/// ```
#[derive(Debug, Clone)]
pub struct AuthUser(pub UserInfo);

impl std::ops::Deref for AuthUser {
    type Target = UserInfo;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<S> FromRequestParts<S> for AuthUser
where
    S: HasAuthProvider + Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        authenticate(parts, state).await.map(AuthUser)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_token_from_bearer_header() {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer gsk_abc"));
        assert_eq!(extract_token(&headers).as_deref(), Some("gsk_abc"));
    }

    #[test]
    fn test_header_takes_precedence_over_cookie() {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_static("gsk_header"));
        headers.insert(COOKIE, HeaderValue::from_static("auth_token=gsk_cookie"));
        assert_eq!(extract_token(&headers).as_deref(), Some("gsk_header"));
    }

    #[test]
    fn test_token_from_cookie() {
        let mut headers = HeaderMap::new();
        headers.insert(
            COOKIE,
            HeaderValue::from_static("theme=dark; auth_token=\"gsk_xyz\"; lang=ja"),
        );
        assert_eq!(extract_token(&headers).as_deref(), Some("gsk_xyz"));
    }

    #[test]
    fn test_similar_cookie_name_ignored() {
        let mut headers = HeaderMap::new();
        headers.insert(COOKIE, HeaderValue::from_static("auth_token_old=gsk_stale"));
        assert_eq!(extract_token(&headers), None);
    }

    #[test]
    fn test_oversized_token_rejected() {
        let mut headers = HeaderMap::new();
        let big = format!("Bearer {}", "a".repeat(MAX_TOKEN_SIZE + 1));
        headers.insert(AUTHORIZATION, HeaderValue::from_str(&big).unwrap());
        assert_eq!(extract_token(&headers), None);
    }

    #[test]
    fn test_session_expiry_maps_to_token_expired() {
        assert!(matches!(
            AuthError::from(GitadoraAuthError::SessionExpired),
            AuthError::TokenExpired
        ));
        assert!(matches!(
            AuthError::from(GitadoraAuthError::SessionNotFound),
            AuthError::InvalidToken
        ));
    }
}
