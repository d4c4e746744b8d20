//! Authentication configuration

use std::time::Duration;

use serde::Deserialize;

/// Minimum JWT secret length in bytes
pub const MIN_JWT_SECRET_LEN: usize = 32;

/// Authentication configuration
///
/// ```toml
/// [auth]
/// jwt_secret = "your-secret-key-at-least-32-characters-long"
/// session_ttl = "24h"         # default
/// allow_registration = true   # default
/// cleanup_interval = "1h"     # default
/// ```
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    /// JWT signing secret; required to serve
    pub jwt_secret: Option<String>,

    /// Session and token lifetime
    #[serde(with = "humantime_serde")]
    pub session_ttl: Duration,

    /// Allow self-service registration of USER accounts
    pub allow_registration: bool,

    /// How often expired sessions are purged
    #[serde(with = "humantime_serde")]
    pub cleanup_interval: Duration,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: None,
            session_ttl: Duration::from_secs(24 * 60 * 60),
            allow_registration: true,
            cleanup_interval: Duration::from_secs(60 * 60),
        }
    }
}

impl AuthConfig {
    /// The JWT secret, if configured
    pub fn jwt_secret_bytes(&self) -> Option<&[u8]> {
        self.jwt_secret.as_ref().map(|s| s.as_bytes())
    }
}
