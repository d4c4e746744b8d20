//! Artist endpoints

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::get,
};
use gitadora_control::Artist;

use super::{NameRequest, deleted};
use crate::audit::AuditAction;
use crate::auth::{Auth, CanAdmin};
use crate::error::{ApiError, Result};
use crate::state::AppState;
use crate::types::{ListResponse, parse_id};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_artists).post(create_artist))
        .route(
            "/{id}",
            get(get_artist).put(update_artist).delete(delete_artist),
        )
}

/// GET /api/v1/artists
async fn list_artists(_auth: Auth, State(state): State<AppState>) -> Result<Json<ListResponse<Artist>>> {
    Ok(Json(ListResponse::new(state.db.artists().list().await?)))
}

/// GET /api/v1/artists/{id}
async fn get_artist(
    _auth: Auth,
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
) -> Result<Json<Artist>> {
    let id = parse_id("id", &raw_id)?;
    state
        .db
        .artists()
        .get_by_id(id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found("artist", id))
}

/// POST /api/v1/artists
async fn create_artist(
    auth: Auth<CanAdmin>,
    State(state): State<AppState>,
    Json(req): Json<NameRequest>,
) -> Result<(StatusCode, Json<Artist>)> {
    let artist = state.db.artists().create(&req.name).await?;
    crate::audit!(AuditAction::Create, user_id = auth.user_id(), resource = "artist", resource_id = artist.id);
    Ok((StatusCode::CREATED, Json(artist)))
}

/// PUT /api/v1/artists/{id}
async fn update_artist(
    auth: Auth<CanAdmin>,
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
    Json(req): Json<NameRequest>,
) -> Result<Json<Artist>> {
    let id = parse_id("id", &raw_id)?;
    let artist = state.db.artists().update(id, &req.name).await?;
    crate::audit!(AuditAction::Update, user_id = auth.user_id(), resource = "artist", resource_id = id);
    Ok(Json(artist))
}

/// DELETE /api/v1/artists/{id}
///
/// Songs by the artist are kept without an artist.
async fn delete_artist(
    auth: Auth<CanAdmin>,
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
) -> Result<StatusCode> {
    let id = parse_id("id", &raw_id)?;
    let removed = state.db.artists().delete(id).await?;
    if removed {
        crate::audit!(AuditAction::Delete, user_id = auth.user_id(), resource = "artist", resource_id = id);
    }
    deleted("artist", id, removed)
}
