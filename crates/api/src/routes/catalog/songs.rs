//! Song endpoints
//!
//! # Routes
//!
//! - `GET /api/v1/songs?version_id=&tag_id=&hot=` - List, filtered
//! - `GET /api/v1/songs/{id}` - Get one song
//! - `POST /api/v1/songs` - Create (admin)
//! - `PUT /api/v1/songs/{id}` - Replace (admin)
//! - `DELETE /api/v1/songs/{id}` - Delete (admin)
//! - `PUT /api/v1/songs/{id}/tags` - Replace the tag set (admin)

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, put},
};
use gitadora_control::{Song, SongFilter, SongInput};
use serde::Deserialize;

use super::deleted;
use crate::audit::AuditAction;
use crate::auth::{Auth, CanAdmin};
use crate::error::{ApiError, Result};
use crate::state::AppState;
use crate::types::{ListResponse, parse_id};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_songs).post(create_song))
        .route("/{id}", get(get_song).put(update_song).delete(delete_song))
        .route("/{id}/tags", put(set_song_tags))
}

// =============================================================================
// Request types
// =============================================================================

/// Song list filters
#[derive(Debug, Default, Deserialize)]
pub struct SongQuery {
    pub version_id: Option<i64>,
    pub tag_id: Option<i64>,
    pub hot: Option<bool>,
}

impl From<SongQuery> for SongFilter {
    fn from(query: SongQuery) -> Self {
        Self {
            version_id: query.version_id,
            tag_id: query.tag_id,
            is_hot: query.hot,
        }
    }
}

/// Create or replace a song
#[derive(Debug, Deserialize)]
pub struct SongRequest {
    pub title: String,
    #[serde(default)]
    pub artist_id: Option<i64>,
    #[serde(default)]
    pub version_id: Option<i64>,
    #[serde(default)]
    pub bpm: Option<String>,
    #[serde(default)]
    pub is_hot: bool,
}

impl From<SongRequest> for SongInput {
    fn from(req: SongRequest) -> Self {
        Self {
            title: req.title,
            artist_id: req.artist_id,
            version_id: req.version_id,
            bpm: req.bpm,
            is_hot: req.is_hot,
        }
    }
}

/// Replace a song's tags
#[derive(Debug, Deserialize)]
pub struct SongTagsRequest {
    pub tag_ids: Vec<i64>,
}

// =============================================================================
// Handlers
// =============================================================================

/// GET /api/v1/songs
async fn list_songs(
    _auth: Auth,
    State(state): State<AppState>,
    Query(query): Query<SongQuery>,
) -> Result<Json<ListResponse<Song>>> {
    let songs = state.db.songs().list(&query.into()).await?;
    Ok(Json(ListResponse::new(songs)))
}

/// GET /api/v1/songs/{id}
async fn get_song(
    _auth: Auth,
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
) -> Result<Json<Song>> {
    let id = parse_id("id", &raw_id)?;
    state
        .db
        .songs()
        .get_by_id(id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found("song", id))
}

/// POST /api/v1/songs
async fn create_song(
    auth: Auth<CanAdmin>,
    State(state): State<AppState>,
    Json(req): Json<SongRequest>,
) -> Result<(StatusCode, Json<Song>)> {
    let song = state.db.songs().create(&req.into()).await?;
    crate::audit!(AuditAction::Create, user_id = auth.user_id(), resource = "song", resource_id = song.id);
    Ok((StatusCode::CREATED, Json(song)))
}

/// PUT /api/v1/songs/{id}
async fn update_song(
    auth: Auth<CanAdmin>,
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
    Json(req): Json<SongRequest>,
) -> Result<Json<Song>> {
    let id = parse_id("id", &raw_id)?;
    let song = state.db.songs().update(id, &req.into()).await?;
    crate::audit!(AuditAction::Update, user_id = auth.user_id(), resource = "song", resource_id = id);
    Ok(Json(song))
}

/// DELETE /api/v1/songs/{id}
async fn delete_song(
    auth: Auth<CanAdmin>,
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
) -> Result<StatusCode> {
    let id = parse_id("id", &raw_id)?;
    let removed = state.db.songs().delete(id).await?;
    if removed {
        crate::audit!(AuditAction::Delete, user_id = auth.user_id(), resource = "song", resource_id = id);
    }
    deleted("song", id, removed)
}

/// PUT /api/v1/songs/{id}/tags
///
/// Duplicate ids are ignored; unknown tag ids are rejected.
async fn set_song_tags(
    auth: Auth<CanAdmin>,
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
    Json(req): Json<SongTagsRequest>,
) -> Result<Json<Song>> {
    let id = parse_id("id", &raw_id)?;
    let song = state.db.songs().set_tags(id, &req.tag_ids).await?;
    crate::audit!(AuditAction::Update, user_id = auth.user_id(), resource = "song_tags", resource_id = id);
    Ok(Json(song))
}
