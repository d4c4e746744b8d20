//! Serve command - Run the API server

use std::sync::Arc;

use anyhow::{Context, Result};
use axum::http::{HeaderValue, Method, header};
use clap::Args;
use gitadora_api::{ApiSettings, AppState, RateLimitConfig, RouterOptions, build_router_with_options};
use gitadora_config::Config;
use tokio::net::TcpListener;
use tokio::signal;
use tokio_util::sync::CancellationToken;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

/// Serve command arguments
#[derive(Args, Debug, Default)]
pub struct ServeArgs {
    /// Bind host (overrides [server] host)
    #[arg(long)]
    pub host: Option<String>,

    /// Bind port (overrides [server] port)
    #[arg(short, long)]
    pub port: Option<u16>,
}

/// Run the serve command
pub async fn run(mut config: Config, args: ServeArgs) -> Result<()> {
    if let Some(host) = args.host {
        config.server.host = host;
    }
    if let Some(port) = args.port {
        config.server.port = port;
    }

    info!(
        version = env!("CARGO_PKG_VERSION"),
        platform = std::env::consts::OS,
        arch = std::env::consts::ARCH,
        "GITADORA skill tracker starting"
    );

    let db = super::open_database(&config).await?;
    let auth = Arc::new(super::auth_service(&config, db.clone())?);

    let (cleanup_tx, cleanup_handle) = auth.start_cleanup_task(config.auth.cleanup_interval);

    let state = AppState::new(Arc::clone(&auth)).with_settings(ApiSettings {
        allow_registration: config.auth.allow_registration,
        secure_cookies: config.server.secure_cookies,
    });

    let options = RouterOptions {
        audit_logging: config.server.audit_logging,
        rate_limit: config.ratelimit.enabled.then(|| {
            RateLimitConfig::new(config.ratelimit.requests, config.ratelimit.window)
                .with_trust_proxy_headers(config.ratelimit.trust_proxy_headers)
        }),
    };

    let mut app = build_router_with_options(state, options).layer(TraceLayer::new_for_http());
    if let Some(cors) = cors_layer(&config.server.cors_origins)? {
        app = app.layer(cors);
    }

    let addr = config.server.bind_address();
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;

    info!(
        addr = %addr,
        audit_logging = config.server.audit_logging,
        registration = config.auth.allow_registration,
        rate_limit = config.ratelimit.enabled,
        "API server listening"
    );

    let cancel = CancellationToken::new();
    let shutdown = cancel.clone();
    tokio::spawn(async move {
        wait_for_shutdown().await;
        info!("shutdown signal received, stopping server...");
        shutdown.cancel();
    });

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<std::net::SocketAddr>(),
    )
    .with_graceful_shutdown(async move { cancel.cancelled().await })
    .await
    .context("API server error")?;

    // Stop the cleanup task before closing the pool it uses
    let _ = cleanup_tx.send(());
    if let Err(e) = cleanup_handle.await {
        warn!(error = %e, "session cleanup task panicked");
    }
    db.close().await;

    info!("shutdown complete");
    Ok(())
}

/// CORS for the configured origins
///
/// No origins means no CORS layer. `"*"` allows any origin without
/// credentials; explicit origins may send the session cookie.
fn cors_layer(origins: &[String]) -> Result<Option<CorsLayer>> {
    if origins.is_empty() {
        return Ok(None);
    }

    if origins.iter().any(|o| o == "*") {
        return Ok(Some(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        ));
    }

    let origins = origins
        .iter()
        .map(|o| HeaderValue::from_str(o).with_context(|| format!("invalid CORS origin: {}", o)))
        .collect::<Result<Vec<_>>>()?;

    Ok(Some(
        CorsLayer::new()
            .allow_origin(AllowOrigin::list(origins))
            .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
            .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
            .allow_credentials(true),
    ))
}

/// Wait for Ctrl+C or SIGTERM
async fn wait_for_shutdown() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!(error = %e, "failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
