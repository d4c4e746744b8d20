//! GITADORA skill tracker API
//!
//! HTTP API for skill aggregation, the ranking list, the song catalog and
//! account management.
//!
//! # Usage
//!
//! ```ignore
//! use gitadora_api::{AppState, build_router};
//!
//! let auth = Arc::new(AuthService::new(db, AuthServiceConfig::new(secret))?);
//! let app = build_router(AppState::new(auth));
//!
//! let listener = tokio::net::TcpListener::bind("0.0.0.0:3000").await?;
//! axum::serve(listener, app).await?;
//! ```
//!
//! # Endpoints
//!
//! ## Auth
//! - `GET /api/v1/auth/setup/status` - Whether the first admin is missing
//! - `POST /api/v1/auth/setup` - Create the first admin
//! - `POST /api/v1/auth/register` - Create a player account
//! - `POST /api/v1/auth/login` - Exchange credentials for a session token
//! - `POST /api/v1/auth/logout` - End the current session
//! - `GET /api/v1/auth/me` - Current user
//!
//! ## Skill
//! - `GET /api/v1/players/{playerId}/skills` - Aggregated skill
//! - `GET /api/v1/players/{playerId}/skills/history` - Snapshot history
//! - `POST /api/v1/players/{playerId}/records` - Append plays
//! - `POST /api/v1/players/{playerId}/snapshots` - Record current totals
//! - `GET /api/v1/ranking` - Players ordered by latest total skill
//!
//! ## Catalog
//! - `/api/v1/{artists,versions,tags,songs,events}` - List and create
//! - `/api/v1/{artists,versions,tags,songs,events}/{id}` - Get, replace, delete
//! - `PUT /api/v1/songs/{id}/tags` - Replace a song's tags
//!
//! ## Admin
//! - `GET|POST /api/v1/admin/users` - List and create users
//! - `PUT /api/v1/admin/users/{id}/role` - Change a role
//! - `DELETE /api/v1/admin/users/{id}` - Delete a user
//!
//! ## Operations
//! - `GET /health` - Liveness and database reachability
//!
//! # Query Parameters
//!
//! Skill and ranking endpoints accept:
//! - `instrument` - `guitar`, `bass` or `drum` (default guitar)
//! - `version` - Only plays recorded under this game version
//! - `history_id` - Compute skill as of a stored snapshot

pub mod audit;
pub mod auth;
pub mod error;
pub mod ratelimit;
pub mod routes;
pub mod state;
pub mod types;

// Re-exports
pub use audit::{AuditAction, audit_layer};
pub use auth::{Auth, AuthUser, CanAdmin, CanSubmit, Permission, Role, UserInfo};
pub use error::{ApiError, Result};
pub use ratelimit::{RateLimitConfig, RateLimitLayer};
pub use routes::{RouterOptions, build_router, build_router_with_options};
pub use state::{ApiSettings, AppState};
pub use types::ListResponse;
