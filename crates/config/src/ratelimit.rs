//! Rate limit configuration

use std::time::Duration;

use serde::Deserialize;

/// Per-IP rate limit on the authentication endpoints
///
/// ```toml
/// [ratelimit]
/// enabled = true     # default
/// requests = 10      # default, per window
/// window = "1m"      # default
/// trust_proxy_headers = false   # default
/// ```
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RateLimitConfig {
    pub enabled: bool,
    pub requests: u32,
    #[serde(with = "humantime_serde")]
    pub window: Duration,

    /// Count clients by `X-Forwarded-For`/`X-Real-IP` rather than the peer
    /// address. Enable only behind a reverse proxy that sets them.
    pub trust_proxy_headers: bool,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            requests: 10,
            window: Duration::from_secs(60),
            trust_proxy_headers: false,
        }
    }
}
