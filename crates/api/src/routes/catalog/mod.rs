//! Catalog routes
//!
//! Reads are open to any signed-in user; writes require the admin role.
//!
//! | Resource | Base path |
//! |----------|-----------|
//! | Artists | `/api/v1/artists` |
//! | Game versions | `/api/v1/versions` |
//! | Tags | `/api/v1/tags` |
//! | Songs | `/api/v1/songs` |
//! | Events | `/api/v1/events` |

pub mod artists;
pub mod events;
pub mod songs;
pub mod tags;
pub mod versions;

use axum::Router;
use axum::http::StatusCode;
use serde::Deserialize;

use crate::error::{ApiError, Result};
use crate::state::AppState;

/// All catalog routes, to be nested under `/api/v1`
pub fn routes() -> Router<AppState> {
    Router::new()
        .nest("/artists", artists::routes())
        .nest("/versions", versions::routes())
        .nest("/tags", tags::routes())
        .nest("/songs", songs::routes())
        .nest("/events", events::routes())
}

/// Body for entities that are just a name
#[derive(Debug, Deserialize)]
pub struct NameRequest {
    pub name: String,
}

/// 204 when a row was deleted, 404 otherwise
pub(crate) fn deleted(entity: &str, id: i64, deleted: bool) -> Result<StatusCode> {
    if deleted {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::not_found(entity, id))
    }
}
