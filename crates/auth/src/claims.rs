//! JWT token claims
//!
//! Tokens are handed out as `gsk_<jwt>`; the JWT is HS256-signed and carries
//! these claims.

use serde::{Deserialize, Serialize};

/// JWT claims for session tokens
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenClaims {
    /// Token ID
    #[serde(rename = "tid")]
    pub token_id: String,

    /// User ID (also the player ID)
    #[serde(rename = "uid")]
    pub user_id: i64,

    #[serde(rename = "email", default)]
    pub email: String,

    /// Role at issue time; the stored role wins on verification
    #[serde(rename = "role", default = "default_role")]
    pub role: String,

    /// Subject (user ID)
    #[serde(rename = "sub", skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,

    /// Expiration time (Unix timestamp)
    #[serde(rename = "exp")]
    pub expires_at: i64,

    /// Issued at (Unix timestamp)
    #[serde(rename = "iat")]
    pub issued_at: i64,

    /// Not before (Unix timestamp)
    #[serde(rename = "nbf", skip_serializing_if = "Option::is_none")]
    pub not_before: Option<i64>,

    #[serde(rename = "iss", skip_serializing_if = "Option::is_none")]
    pub issuer: Option<String>,
}

fn default_role() -> String {
    "user".to_string()
}

impl TokenClaims {
    pub fn is_expired(&self) -> bool {
        self.expires_at < chrono::Utc::now().timestamp()
    }
}

/// Token prefix for skill tracker tokens
pub const TOKEN_PREFIX: &str = "gsk_";

/// Check if a string looks like one of our tokens
pub fn is_api_token_format(token: &str) -> bool {
    token.starts_with(TOKEN_PREFIX) && token.len() > TOKEN_PREFIX.len() + 10
}

/// Extract JWT from prefixed token (removes "gsk_" prefix)
pub fn extract_jwt(token: &str) -> Option<&str> {
    if is_api_token_format(token) {
        Some(&token[TOKEN_PREFIX.len()..])
    } else {
        None
    }
}
