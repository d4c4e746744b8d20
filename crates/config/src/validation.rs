//! Configuration validation
//!
//! Checks values that parse but cannot work:
//! - Server port is non-zero
//! - JWT secret, when given, is long enough to sign tokens
//! - Pool and rate limit sizes are positive

use crate::Config;
use crate::auth::MIN_JWT_SECRET_LEN;
use crate::error::{ConfigError, Result};

/// Validate the entire configuration
pub fn validate_config(config: &Config) -> Result<()> {
    validate_server(config)?;
    validate_database(config)?;
    validate_auth(config)?;
    validate_ratelimit(config)?;
    Ok(())
}

fn validate_server(config: &Config) -> Result<()> {
    if config.server.port == 0 {
        return Err(ConfigError::invalid_value("server", "port", "must not be 0"));
    }
    if config.server.host.trim().is_empty() {
        return Err(ConfigError::invalid_value("server", "host", "must not be empty"));
    }
    Ok(())
}

fn validate_database(config: &Config) -> Result<()> {
    if config.database.max_connections == 0 {
        return Err(ConfigError::invalid_value(
            "database",
            "max_connections",
            "must be at least 1",
        ));
    }
    Ok(())
}

fn validate_auth(config: &Config) -> Result<()> {
    if let Some(ref secret) = config.auth.jwt_secret
        && secret.len() < MIN_JWT_SECRET_LEN
    {
        return Err(ConfigError::invalid_value(
            "auth",
            "jwt_secret",
            format!("must be at least {MIN_JWT_SECRET_LEN} bytes"),
        ));
    }
    if config.auth.session_ttl.is_zero() {
        return Err(ConfigError::invalid_value("auth", "session_ttl", "must be positive"));
    }
    if config.auth.cleanup_interval.is_zero() {
        return Err(ConfigError::invalid_value(
            "auth",
            "cleanup_interval",
            "must be positive",
        ));
    }
    Ok(())
}

fn validate_ratelimit(config: &Config) -> Result<()> {
    if !config.ratelimit.enabled {
        return Ok(());
    }
    if config.ratelimit.requests == 0 {
        return Err(ConfigError::invalid_value("ratelimit", "requests", "must be at least 1"));
    }
    if config.ratelimit.window.is_zero() {
        return Err(ConfigError::invalid_value("ratelimit", "window", "must be positive"));
    }
    Ok(())
}
