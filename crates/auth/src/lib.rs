//! GITADORA skill tracker - Authentication
//!
//! Session-backed token authentication and a two-role access model.
//!
//! | Role | Capabilities |
//! |------|--------------|
//! | `User` | Read catalog and rankings, submit own plays |
//! | `Admin` | Manage catalog content, users, and any player's data |
//!
//! # Tokens
//!
//! ```text
//! gsk_eyJhbGciOiJIUzI1NiIsInR5cCI6IkpXVCJ9...
//! ```
//! - HS256 JWT carrying user ID and role
//! - Only valid while its session row exists and is unexpired

mod claims;
mod error;
pub mod password;
mod provider;
mod roles;
mod service;
mod user;

/// Test utilities for building services and tokens
pub mod test_utils;

pub use claims::{TOKEN_PREFIX, TokenClaims, extract_jwt, is_api_token_format};
pub use error::{AuthError, Result};
pub use provider::AuthProvider;
pub use roles::{Permission, Role};
pub use service::{AuthResponse, AuthService, AuthServiceConfig, MIN_SECRET_LEN};
pub use user::UserInfo;
