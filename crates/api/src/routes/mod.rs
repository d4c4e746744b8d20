//! API routes
//!
//! Domain-grouped HTTP route handlers.

pub mod admin;
pub mod auth;
pub mod catalog;
pub mod ops;
pub mod players;
pub mod ranking;

use axum::{Router, middleware};

use crate::audit::audit_layer;
use crate::ratelimit::RateLimitConfig;
use crate::state::AppState;

/// Options for building the router
#[derive(Debug, Clone, Default)]
pub struct RouterOptions {
    /// Enable audit logging middleware
    pub audit_logging: bool,
    /// Per-IP limit on setup, register and login; `None` disables it
    pub rate_limit: Option<RateLimitConfig>,
}

/// Build the complete API router with default options
pub fn build_router(state: AppState) -> Router {
    build_router_with_options(state, RouterOptions::default())
}

/// Build the complete API router with options
pub fn build_router_with_options(state: AppState, options: RouterOptions) -> Router {
    let router = Router::new()
        // Operations routes (health - no auth)
        .merge(ops::routes())
        // Auth routes (setup, register, login, logout, me)
        .nest("/api/v1/auth", auth::routes(options.rate_limit))
        // Player skill data
        .nest("/api/v1/players", players::routes())
        // Ranking and catalog
        .nest("/api/v1", ranking::routes().merge(catalog::routes()))
        // Account management
        .nest("/api/v1/admin", admin::routes());

    let router = if options.audit_logging {
        router.layer(middleware::from_fn(audit_layer))
    } else {
        router
    };

    router.with_state(state)
}
