//! Admin routes
//!
//! Account management for administrators. Catalog writes live with the
//! catalog routes and are guarded there.

pub mod users;

use axum::Router;

use crate::state::AppState;

/// All admin routes, to be nested under `/api/v1/admin`
pub fn routes() -> Router<AppState> {
    Router::new().merge(users::routes())
}
