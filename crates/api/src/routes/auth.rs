//! Authentication routes
//!
//! # Routes
//!
//! - `POST /api/v1/auth/setup` - Create the first admin
//! - `GET /api/v1/auth/setup/status` - Whether setup is still required
//! - `POST /api/v1/auth/register` - Create a player account
//! - `POST /api/v1/auth/login` - Start a session
//! - `POST /api/v1/auth/logout` - End the current session
//! - `GET /api/v1/auth/me` - Current user
//!
//! Setup, registration and login are rate limited per client IP.

use axum::{
    Json, Router,
    extract::State,
    http::{
        HeaderMap, HeaderValue, StatusCode,
        header::{SET_COOKIE, USER_AGENT},
    },
    response::{AppendHeaders, IntoResponse},
    routing::{get, post},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use gitadora_auth::{Role, UserInfo};

use crate::audit::AuditAction;
use crate::auth::{AUTH_COOKIE, AuthUser, extract_token};
use crate::error::{ApiError, Result};
use crate::ratelimit::{RateLimitConfig, RateLimitLayer, client_ip};
use crate::state::AppState;

/// Auth routes
pub fn routes(rate_limit: Option<RateLimitConfig>) -> Router<AppState> {
    let limited = Router::new()
        .route("/setup", post(setup))
        .route("/register", post(register))
        .route("/login", post(login));

    let limited = match rate_limit {
        Some(config) => limited.layer(RateLimitLayer::new(config)),
        None => limited,
    };

    Router::new()
        .route("/setup/status", get(setup_status))
        .route("/logout", post(logout))
        .route("/me", get(me))
        .merge(limited)
}

// =============================================================================
// Request/Response types
// =============================================================================

/// Account creation request (setup and registration)
#[derive(Debug, Deserialize)]
pub struct AccountRequest {
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub display_name: String,
}

/// Login request
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Login response
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: UserInfo,
    pub expires_at: DateTime<Utc>,
}

/// Setup status response
#[derive(Debug, Serialize)]
pub struct SetupStatusResponse {
    /// No user exists yet
    pub setup_required: bool,
    pub registration_enabled: bool,
}

// =============================================================================
// Handlers
// =============================================================================

/// First-run setup
///
/// POST /api/v1/auth/setup
///
/// Creates the initial admin. Only works when no users exist.
async fn setup(
    State(state): State<AppState>,
    Json(req): Json<AccountRequest>,
) -> Result<(StatusCode, Json<UserInfo>)> {
    let user = state
        .auth
        .setup_admin(&req.email, &req.display_name, &req.password)
        .await?;

    crate::audit!(AuditAction::Setup, user_id = user.id);
    Ok((StatusCode::CREATED, Json(user)))
}

/// GET /api/v1/auth/setup/status
async fn setup_status(State(state): State<AppState>) -> Result<Json<SetupStatusResponse>> {
    Ok(Json(SetupStatusResponse {
        setup_required: state.auth.needs_setup().await?,
        registration_enabled: state.settings.allow_registration,
    }))
}

/// Self-service player registration
///
/// POST /api/v1/auth/register
async fn register(
    State(state): State<AppState>,
    Json(req): Json<AccountRequest>,
) -> Result<(StatusCode, Json<UserInfo>)> {
    if !state.settings.allow_registration {
        return Err(ApiError::forbidden("registration is disabled"));
    }

    let user = state
        .auth
        .create_user(&req.email, &req.display_name, &req.password, Role::User)
        .await?;

    crate::audit!(AuditAction::Register, user_id = user.id);
    Ok((StatusCode::CREATED, Json(user)))
}

/// Login endpoint
///
/// POST /api/v1/auth/login
///
/// Returns the token and also sets it as the `auth_token` cookie.
async fn login(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<LoginRequest>,
) -> Result<impl IntoResponse> {
    let ip = client_ip(&headers).map(|ip| ip.to_string());
    let user_agent = headers.get(USER_AGENT).and_then(|v| v.to_str().ok());

    let response = match state
        .auth
        .login(&req.email, &req.password, ip.as_deref(), user_agent)
        .await
    {
        Ok(response) => response,
        Err(e) => {
            let reason = if e.is_unauthenticated() {
                "invalid_credentials"
            } else {
                "error"
            };
            crate::audit_fail!(AuditAction::LoginFailure, reason, email = %req.email);
            return Err(e.into());
        }
    };

    crate::audit!(AuditAction::LoginSuccess, user_id = response.user.id);

    let max_age = (response.expires_at - Utc::now()).num_seconds().max(0);
    let cookie = session_cookie(&response.token, max_age, state.settings.secure_cookies)?;

    Ok((
        AppendHeaders([(SET_COOKIE, cookie)]),
        Json(LoginResponse {
            token: response.token,
            user: response.user,
            expires_at: response.expires_at,
        }),
    ))
}

/// Logout endpoint
///
/// POST /api/v1/auth/logout
///
/// Deletes the session behind the presented token and clears the cookie.
async fn logout(State(state): State<AppState>, headers: HeaderMap) -> Result<impl IntoResponse> {
    let token = extract_token(&headers)
        .ok_or_else(|| ApiError::Unauthorized("authentication required".to_string()))?;

    if state.auth.logout(&token).await? {
        crate::audit!(AuditAction::Logout, "session ended");
    }

    let cookie = session_cookie("", 0, state.settings.secure_cookies)?;
    Ok((StatusCode::NO_CONTENT, AppendHeaders([(SET_COOKIE, cookie)])))
}

/// GET /api/v1/auth/me
async fn me(AuthUser(user): AuthUser) -> Json<UserInfo> {
    Json(user)
}

fn session_cookie(token: &str, max_age: i64, secure: bool) -> Result<HeaderValue> {
    let mut cookie = format!(
        "{}={}; Path=/; HttpOnly; SameSite=Lax; Max-Age={}",
        AUTH_COOKIE, token, max_age
    );
    if secure {
        cookie.push_str("; Secure");
    }
    HeaderValue::from_str(&cookie).map_err(|e| ApiError::internal(format!("invalid cookie: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_cookie() {
        let cookie = session_cookie("gsk_abc", 3600, false).unwrap();
        let cookie = cookie.to_str().unwrap();
        assert!(cookie.starts_with("auth_token=gsk_abc;"));
        assert!(cookie.contains("HttpOnly"));
        assert!(cookie.contains("Max-Age=3600"));
        assert!(!cookie.contains("Secure"));
    }

    #[test]
    fn test_cleared_cookie_is_secure_when_configured() {
        let cookie = session_cookie("", 0, true).unwrap();
        let cookie = cookie.to_str().unwrap();
        assert!(cookie.starts_with("auth_token=;"));
        assert!(cookie.ends_with("; Secure"));
    }
}
