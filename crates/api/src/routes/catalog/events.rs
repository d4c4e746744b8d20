//! Event endpoints

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
};
use chrono::{DateTime, Utc};
use gitadora_control::{Event, EventInput};
use serde::Deserialize;

use super::deleted;
use crate::audit::AuditAction;
use crate::auth::{Auth, CanAdmin};
use crate::error::{ApiError, Result};
use crate::state::AppState;
use crate::types::{ListResponse, parse_id};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_events).post(create_event))
        .route("/{id}", get(get_event).put(update_event).delete(delete_event))
}

#[derive(Debug, Default, Deserialize)]
pub struct EventQuery {
    /// Only events running now
    #[serde(default)]
    pub active: bool,
}

/// Create or replace an event
#[derive(Debug, Deserialize)]
pub struct EventRequest {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub version_id: Option<i64>,
    pub starts_at: DateTime<Utc>,
    pub ends_at: DateTime<Utc>,
}

impl From<EventRequest> for EventInput {
    fn from(req: EventRequest) -> Self {
        Self {
            title: req.title,
            description: req.description,
            version_id: req.version_id,
            starts_at: req.starts_at,
            ends_at: req.ends_at,
        }
    }
}

/// GET /api/v1/events?active=
async fn list_events(
    _auth: Auth,
    State(state): State<AppState>,
    Query(query): Query<EventQuery>,
) -> Result<Json<ListResponse<Event>>> {
    let events = state.db.events();
    let events = if query.active {
        events.list_active(Utc::now()).await?
    } else {
        events.list().await?
    };
    Ok(Json(ListResponse::new(events)))
}

/// GET /api/v1/events/{id}
async fn get_event(
    _auth: Auth,
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
) -> Result<Json<Event>> {
    let id = parse_id("id", &raw_id)?;
    state
        .db
        .events()
        .get_by_id(id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found("event", id))
}

/// POST /api/v1/events
async fn create_event(
    auth: Auth<CanAdmin>,
    State(state): State<AppState>,
    Json(req): Json<EventRequest>,
) -> Result<(StatusCode, Json<Event>)> {
    let event = state.db.events().create(&req.into()).await?;
    crate::audit!(AuditAction::Create, user_id = auth.user_id(), resource = "event", resource_id = event.id);
    Ok((StatusCode::CREATED, Json(event)))
}

/// PUT /api/v1/events/{id}
async fn update_event(
    auth: Auth<CanAdmin>,
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
    Json(req): Json<EventRequest>,
) -> Result<Json<Event>> {
    let id = parse_id("id", &raw_id)?;
    let event = state.db.events().update(id, &req.into()).await?;
    crate::audit!(AuditAction::Update, user_id = auth.user_id(), resource = "event", resource_id = id);
    Ok(Json(event))
}

/// DELETE /api/v1/events/{id}
async fn delete_event(
    auth: Auth<CanAdmin>,
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
) -> Result<StatusCode> {
    let id = parse_id("id", &raw_id)?;
    let removed = state.db.events().delete(id).await?;
    if removed {
        crate::audit!(AuditAction::Delete, user_id = auth.user_id(), resource = "event", resource_id = id);
    }
    deleted("event", id, removed)
}
