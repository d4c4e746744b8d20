//! Operations routes
//!
//! Health check for load balancers and probes. No authentication.

use axum::{Json, Router, extract::State, routing::get};
use serde::Serialize;
use tracing::warn;

use crate::state::AppState;

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// "ok", or "degraded" when the database does not answer
    pub status: &'static str,
    pub version: &'static str,
}

pub fn routes() -> Router<AppState> {
    Router::new().route("/health", get(health_handler))
}

/// GET /health
///
/// Always 200 while the process is serving; the body reports database
/// reachability.
async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    let status = match state.db.users().count().await {
        Ok(_) => "ok",
        Err(e) => {
            warn!(error = %e, "Health check could not reach the database");
            "degraded"
        }
    };

    Json(HealthResponse {
        status,
        version: env!("CARGO_PKG_VERSION"),
    })
}
