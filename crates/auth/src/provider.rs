//! Authentication providers
//!
//! The `AuthProvider` trait is what the HTTP layer uses to turn a bearer
//! token into a user.

use async_trait::async_trait;

use crate::error::Result;
use crate::user::UserInfo;

/// Authentication provider trait
#[async_trait]
pub trait AuthProvider: Send + Sync {
    /// Validate a token and return user information
    ///
    /// # Errors
    ///
    /// Returns `AuthError` if the token is malformed, badly signed, expired,
    /// or no longer backed by a live session.
    async fn validate(&self, token: &str) -> Result<UserInfo>;

    /// Provider name for logging/debugging
    fn name(&self) -> &'static str;
}
