//! HTTP server configuration

use serde::Deserialize;

/// HTTP server configuration
///
/// ```toml
/// [server]
/// host = "0.0.0.0"        # default
/// port = 3000             # default
/// audit_logging = false   # default
/// secure_cookies = false  # default; set when served over HTTPS
/// cors_origins = ["https://skill.example.com"]
/// ```
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,

    /// Log auth events and admin mutations to the `audit` target
    pub audit_logging: bool,

    /// Mark the session cookie `Secure`
    pub secure_cookies: bool,

    /// Origins allowed by CORS; empty disables the CORS layer
    pub cors_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            audit_logging: false,
            secure_cookies: false,
            cors_origins: Vec::new(),
        }
    }
}

impl ServerConfig {
    /// `host:port` to bind
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
