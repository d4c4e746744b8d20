//! Authentication and authorization
//!
//! Two roles and two permissions.
//!
//! # Roles
//!
//! - `User` - Read catalog and rankings, submit own plays
//! - `Admin` - Manage catalog, users, and any player's data
//!
//! # Usage
//!
//! ```ignore
//! use gitadora_api::auth::{Auth, CanAdmin};
//!
//! // Any authenticated user
//! async fn ranking(auth: Auth) -> impl IntoResponse { }
//!
//! // Must be Admin
//! async fn create_song(auth: Auth<CanAdmin>) -> impl IntoResponse { }
//! ```

pub mod middleware;
pub mod typed_extractors;

pub use gitadora_auth::{AuthProvider, Permission, Role, UserInfo};

pub use middleware::{
    AUTH_COOKIE, AuthError, AuthUser, HasAuthProvider, extract_token,
};
pub use typed_extractors::{AnyUser, Auth, CanAdmin, CanSubmit, PermissionLevel, TypedAuthError};
