//! Type-safe authentication extractors
//!
//! `Auth<P>` enforces a permission level at extraction time, before the
//! handler runs.
//!
//! ```ignore
//! use gitadora_api::auth::{Auth, CanAdmin};
//!
//! // Any authenticated user
//! async fn list_songs(auth: Auth) -> impl IntoResponse { }
//!
//! // Admins only
//! async fn create_song(auth: Auth<CanAdmin>) -> impl IntoResponse { }
//! ```

use std::marker::PhantomData;

use axum::{
    Json,
    extract::FromRequestParts,
    http::{StatusCode, request::Parts},
    response::{IntoResponse, Response},
};

use gitadora_auth::{Permission, Role, UserInfo};

use super::middleware::{AuthError, AuthUser, HasAuthProvider};

// ============================================================================
// Permission Level Markers
// ============================================================================

/// Trait for permission level markers
pub trait PermissionLevel: Send + Sync + 'static {
    /// The permission required, or None for any authenticated user
    const REQUIRED: Option<Permission>;
}

/// Any authenticated user
pub struct AnyUser;

/// Requires Submit permission
pub struct CanSubmit;

/// Requires Admin permission
pub struct CanAdmin;

impl PermissionLevel for AnyUser {
    const REQUIRED: Option<Permission> = None;
}

impl PermissionLevel for CanSubmit {
    const REQUIRED: Option<Permission> = Some(Permission::Submit);
}

impl PermissionLevel for CanAdmin {
    const REQUIRED: Option<Permission> = Some(Permission::Admin);
}

// ============================================================================
// Error Types
// ============================================================================

/// Error returned by typed auth extractors
#[derive(Debug)]
pub enum TypedAuthError {
    /// Authentication failed
    Unauthenticated(AuthError),
    /// Insufficient permission
    InsufficientPermission(Permission),
}

impl IntoResponse for TypedAuthError {
    fn into_response(self) -> Response {
        match self {
            Self::Unauthenticated(e) => e.into_response(),
            Self::InsufficientPermission(p) => {
                let body = serde_json::json!({
                    "error": "INSUFFICIENT_PERMISSION",
                    "message": format!("This action requires {} permission", p.as_str()),
                });
                (StatusCode::FORBIDDEN, Json(body)).into_response()
            }
        }
    }
}

// ============================================================================
// Auth<P> Extractor
// ============================================================================

/// Type-safe authentication extractor
///
/// - `AnyUser` - Any authenticated user (default)
/// - `CanSubmit` - May submit own plays
/// - `CanAdmin` - Admin role
#[derive(Debug, Clone)]
pub struct Auth<P: PermissionLevel = AnyUser> {
    pub user: UserInfo,
    _level: PhantomData<P>,
}

impl<P: PermissionLevel> Auth<P> {
    pub fn user(&self) -> &UserInfo {
        &self.user
    }

    /// User id, which is also the player id
    pub fn user_id(&self) -> i64 {
        self.user.id
    }

    pub fn role(&self) -> Role {
        self.user.parsed_role()
    }
}

impl<P: PermissionLevel> std::ops::Deref for Auth<P> {
    type Target = UserInfo;

    fn deref(&self) -> &Self::Target {
        &self.user
    }
}

impl<S, P> FromRequestParts<S> for Auth<P>
where
    S: HasAuthProvider + Send + Sync,
    P: PermissionLevel,
{
    type Rejection = TypedAuthError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let AuthUser(user) = AuthUser::from_request_parts(parts, state)
            .await
            .map_err(TypedAuthError::Unauthenticated)?;

        if let Some(required) = P::REQUIRED
            && !user.has_permission(required)
        {
            return Err(TypedAuthError::InsufficientPermission(required));
        }

        Ok(Auth {
            user,
            _level: PhantomData,
        })
    }
}
