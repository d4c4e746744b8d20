//! Game version endpoints

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::get,
};
use chrono::NaiveDate;
use gitadora_control::GameVersion;
use serde::Deserialize;

use super::deleted;
use crate::audit::AuditAction;
use crate::auth::{Auth, CanAdmin};
use crate::error::{ApiError, Result};
use crate::state::AppState;
use crate::types::{ListResponse, parse_id};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_versions).post(create_version))
        .route(
            "/{id}",
            get(get_version).put(update_version).delete(delete_version),
        )
}

/// Create or replace a version
#[derive(Debug, Deserialize)]
pub struct VersionRequest {
    pub name: String,
    /// `YYYY-MM-DD`
    #[serde(default)]
    pub released_on: Option<NaiveDate>,
}

/// GET /api/v1/versions
///
/// Newest release first.
async fn list_versions(
    _auth: Auth,
    State(state): State<AppState>,
) -> Result<Json<ListResponse<GameVersion>>> {
    Ok(Json(ListResponse::new(state.db.versions().list().await?)))
}

/// GET /api/v1/versions/{id}
async fn get_version(
    _auth: Auth,
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
) -> Result<Json<GameVersion>> {
    let id = parse_id("id", &raw_id)?;
    state
        .db
        .versions()
        .get_by_id(id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found("version", id))
}

/// POST /api/v1/versions
async fn create_version(
    auth: Auth<CanAdmin>,
    State(state): State<AppState>,
    Json(req): Json<VersionRequest>,
) -> Result<(StatusCode, Json<GameVersion>)> {
    let version = state
        .db
        .versions()
        .create(&req.name, req.released_on)
        .await?;
    crate::audit!(AuditAction::Create, user_id = auth.user_id(), resource = "version", resource_id = version.id);
    Ok((StatusCode::CREATED, Json(version)))
}

/// PUT /api/v1/versions/{id}
async fn update_version(
    auth: Auth<CanAdmin>,
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
    Json(req): Json<VersionRequest>,
) -> Result<Json<GameVersion>> {
    let id = parse_id("id", &raw_id)?;
    let version = state
        .db
        .versions()
        .update(id, &req.name, req.released_on)
        .await?;
    crate::audit!(AuditAction::Update, user_id = auth.user_id(), resource = "version", resource_id = id);
    Ok(Json(version))
}

/// DELETE /api/v1/versions/{id}
async fn delete_version(
    auth: Auth<CanAdmin>,
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
) -> Result<StatusCode> {
    let id = parse_id("id", &raw_id)?;
    let removed = state.db.versions().delete(id).await?;
    if removed {
        crate::audit!(AuditAction::Delete, user_id = auth.user_id(), resource = "version", resource_id = id);
    }
    deleted("version", id, removed)
}
