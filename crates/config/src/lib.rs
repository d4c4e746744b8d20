//! GITADORA Skill Tracker Configuration
//!
//! TOML-based configuration loading with sensible defaults.
//! Minimal config should just work - only specify what you need to change.
//!
//! # Parsing
//!
//! ```
//! use gitadora_config::Config;
//! use std::str::FromStr;
//!
//! let config = Config::from_str("[server]\nport = 8080").unwrap();
//! assert_eq!(config.server.port, 8080);
//! ```
//!
//! # Example Config
//!
//! ```toml
//! [server]
//! port = 3000
//!
//! [database]
//! path = "~/.gitadora/gitadora.db"
//!
//! [auth]
//! jwt_secret = "your-secret-key-at-least-32-characters-long"
//! session_ttl = "24h"
//! ```

mod auth;
mod database;
mod error;
mod logging;
mod ratelimit;
mod server;
mod validation;

use std::fs;
use std::path::Path;
use std::str::FromStr;

pub use auth::{AuthConfig, MIN_JWT_SECRET_LEN};
pub use database::DatabaseConfig;
pub use error::{ConfigError, Result};
pub use logging::{LogConfig, LogFormat, LogLevel, LogOutput};
pub use ratelimit::RateLimitConfig;
pub use server::ServerConfig;

use serde::Deserialize;

/// Main configuration structure
///
/// All sections are optional with sensible defaults.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Logging configuration
    pub log: LogConfig,

    /// HTTP server
    pub server: ServerConfig,

    /// SQLite storage
    pub database: DatabaseConfig,

    /// Sessions and tokens
    pub auth: AuthConfig,

    /// Rate limiting of login and registration
    pub ratelimit: RateLimitConfig,
}

impl Config {
    /// Load configuration from a TOML file
    ///
    /// # Errors
    ///
    /// Returns error if file cannot be read, contains invalid TOML, or fails
    /// validation.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|e| ConfigError::IoError {
            path: path.display().to_string(),
            source: e,
        })?;

        Self::from_str(&contents)
    }

    /// Load from a file when one is given, otherwise use defaults
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None => Ok(Self::default()),
        }
    }

    fn parse(s: &str) -> Result<Self> {
        let config: Config = toml::from_str(s).map_err(ConfigError::ParseError)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        validation::validate_config(self)
    }

    /// JWT secret required to serve
    ///
    /// # Errors
    ///
    /// Returns `MissingField` when `[auth] jwt_secret` is not set.
    pub fn require_jwt_secret(&self) -> Result<&str> {
        self.auth
            .jwt_secret
            .as_deref()
            .ok_or_else(|| ConfigError::missing_field("auth", "jwt_secret"))
    }
}

impl FromStr for Config {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}
