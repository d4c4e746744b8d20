//! Test utilities
//!
//! Helpers for building an auth service over an in-memory database and for
//! minting signed tokens directly. They exercise the real validation path.

use chrono::{Duration, Utc};
use gitadora_control::Database;
use jsonwebtoken::{EncodingKey, Header, encode};

use crate::Role;
use crate::claims::{TOKEN_PREFIX, TokenClaims};
use crate::service::{AuthService, AuthServiceConfig};

/// Test secret for JWT signing (32 bytes for HS256)
pub const TEST_SECRET: &[u8] = b"test-secret-key-32-bytes-long!!!";

/// Auth service over a fresh in-memory database, signing with `TEST_SECRET`
pub async fn test_service() -> AuthService {
    let db = Database::in_memory()
        .await
        .expect("failed to open in-memory database");
    AuthService::new(db, AuthServiceConfig::new(TEST_SECRET)).expect("invalid test config")
}

/// Mint a signed token without creating a session
pub fn create_test_token_with_options(
    user_id: i64,
    role: Role,
    secret: &[u8],
    expires_in: Duration,
) -> String {
    let now = Utc::now();

    let claims = TokenClaims {
        token_id: format!("test-token-{}", user_id),
        user_id,
        email: format!("user{}@example.com", user_id),
        role: role.as_str().to_string(),
        subject: Some(user_id.to_string()),
        expires_at: (now + expires_in).timestamp(),
        issued_at: now.timestamp(),
        not_before: None,
        issuer: Some("gitadora".to_string()),
    };

    let jwt = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret),
    )
    .expect("failed to encode test JWT");

    format!("{}{}", TOKEN_PREFIX, jwt)
}
