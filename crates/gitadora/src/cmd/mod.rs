//! CLI commands

pub mod serve;
pub mod snapshot;
pub mod user;

use anyhow::{Context, Result};
use gitadora_auth::{AuthService, AuthServiceConfig};
use gitadora_config::Config;
use gitadora_control::Database;
use tracing::info;

/// Open the configured database
pub(crate) async fn open_database(config: &Config) -> Result<Database> {
    let path = config.database.resolved_path();
    info!(path = %path.display(), "Opening database");

    Database::open(&path, config.database.max_connections)
        .await
        .with_context(|| format!("failed to open database at {}", path.display()))
}

/// Build the auth service over an open database
pub(crate) fn auth_service(config: &Config, db: Database) -> Result<AuthService> {
    let secret = config
        .require_jwt_secret()
        .context("set [auth] jwt_secret (at least 32 bytes)")?;

    let auth_config = AuthServiceConfig::new(secret.as_bytes()).with_ttl(config.auth.session_ttl);
    AuthService::new(db, auth_config).context("failed to initialize auth")
}
