//! Tag endpoints
//!
//! Tags group songs (e.g. "long", "anime"); songs attach them through
//! `PUT /api/v1/songs/{id}/tags`.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::get,
};
use gitadora_control::Tag;

use super::{NameRequest, deleted};
use crate::audit::AuditAction;
use crate::auth::{Auth, CanAdmin};
use crate::error::{ApiError, Result};
use crate::state::AppState;
use crate::types::{ListResponse, parse_id};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_tags).post(create_tag))
        .route(
            "/{id}",
            get(get_tag).put(update_tag).delete(delete_tag),
        )
}

/// GET /api/v1/tags
async fn list_tags(_auth: Auth, State(state): State<AppState>) -> Result<Json<ListResponse<Tag>>> {
    Ok(Json(ListResponse::new(state.db.tags().list().await?)))
}

/// GET /api/v1/tags/{id}
async fn get_tag(
    _auth: Auth,
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
) -> Result<Json<Tag>> {
    let id = parse_id("id", &raw_id)?;
    state
        .db
        .tags()
        .get_by_id(id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found("tag", id))
}

/// POST /api/v1/tags
async fn create_tag(
    auth: Auth<CanAdmin>,
    State(state): State<AppState>,
    Json(req): Json<NameRequest>,
) -> Result<(StatusCode, Json<Tag>)> {
    let tag = state.db.tags().create(&req.name).await?;
    crate::audit!(AuditAction::Create, user_id = auth.user_id(), resource = "tag", resource_id = tag.id);
    Ok((StatusCode::CREATED, Json(tag)))
}

/// PUT /api/v1/tags/{id}
async fn update_tag(
    auth: Auth<CanAdmin>,
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
    Json(req): Json<NameRequest>,
) -> Result<Json<Tag>> {
    let id = parse_id("id", &raw_id)?;
    let tag = state.db.tags().update(id, &req.name).await?;
    crate::audit!(AuditAction::Update, user_id = auth.user_id(), resource = "tag", resource_id = id);
    Ok(Json(tag))
}

/// DELETE /api/v1/tags/{id}
///
/// The tag is detached from every song.
async fn delete_tag(
    auth: Auth<CanAdmin>,
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
) -> Result<StatusCode> {
    let id = parse_id("id", &raw_id)?;
    let removed = state.db.tags().delete(id).await?;
    if removed {
        crate::audit!(AuditAction::Delete, user_id = auth.user_id(), resource = "tag", resource_id = id);
    }
    deleted("tag", id, removed)
}
