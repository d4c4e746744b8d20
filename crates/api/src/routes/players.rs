//! Player skill endpoints
//!
//! # Routes
//!
//! - `GET /api/v1/players/{playerId}/skills` - Aggregated skill
//! - `GET /api/v1/players/{playerId}/skills/history` - Snapshot history
//! - `POST /api/v1/players/{playerId}/records` - Append plays
//! - `POST /api/v1/players/{playerId}/snapshots` - Record current totals

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
};
use chrono::{DateTime, Utc};
use gitadora_control::{Database, NewSkillRecord, RecordFilter};
use gitadora_skill::{Difficulty, InstrumentType, SkillRecord, SkillSnapshot, SkillSummary};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::audit::AuditAction;
use crate::auth::{Auth, CanSubmit};
use crate::error::{ApiError, Result};
use crate::state::AppState;
use crate::types::{InstrumentParams, parse_id, parse_instrument};

/// Most records accepted in one submission
pub const MAX_RECORDS_PER_REQUEST: usize = 1000;

// =============================================================================
// Routes
// =============================================================================

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/{player_id}/skills", get(get_skills))
        .route("/{player_id}/skills/history", get(get_history))
        .route("/{player_id}/records", post(submit_records))
        .route("/{player_id}/snapshots", post(create_snapshot))
}

// =============================================================================
// Request/Response types
// =============================================================================

/// Skill query parameters
#[derive(Debug, Default, Deserialize)]
pub struct SkillQuery {
    pub instrument: Option<String>,
    /// Only plays recorded under this game version
    pub version: Option<String>,
    /// Compute skill as of this snapshot's time
    pub history_id: Option<String>,
}

/// Aggregated skill with the player's snapshot history
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SkillResponse {
    pub total_skill: f64,
    pub hot_skill: f64,
    pub other_skill: f64,
    pub instrument_type: InstrumentType,
    pub hot_records: Vec<SkillRecord>,
    pub other_records: Vec<SkillRecord>,
    /// Snapshots for this player and instrument, newest first
    pub history: Vec<SkillSnapshot>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cutoff: Option<DateTime<Utc>>,
}

impl SkillResponse {
    fn new(
        instrument_type: InstrumentType,
        summary: SkillSummary,
        history: Vec<SkillSnapshot>,
    ) -> Self {
        Self {
            total_skill: summary.total_skill,
            hot_skill: summary.hot_skill,
            other_skill: summary.other_skill,
            instrument_type,
            hot_records: summary.hot_records,
            other_records: summary.other_records,
            history,
            cutoff: summary.cutoff,
        }
    }
}

/// One play in a submission
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordInput {
    pub song_title: String,
    pub instrument_type: String,
    pub difficulty: String,
    pub achievement_rate: f64,
    pub skill_score: f64,
    #[serde(default)]
    pub is_hot: bool,
    #[serde(default)]
    pub version: Option<String>,
    /// Defaults to the time of submission
    #[serde(default)]
    pub played_at: Option<DateTime<Utc>>,
}

impl RecordInput {
    fn into_new_record(self, now: DateTime<Utc>) -> Result<NewSkillRecord> {
        let instrument_type = InstrumentType::parse(&self.instrument_type)
            .map_err(|e| ApiError::validation("instrumentType", e.to_string()))?;
        let difficulty = Difficulty::parse(&self.difficulty)
            .map_err(|e| ApiError::validation("difficulty", e.to_string()))?;

        Ok(NewSkillRecord {
            song_title: self.song_title,
            instrument_type,
            difficulty,
            achievement_rate: self.achievement_rate,
            skill_score: self.skill_score,
            is_hot: self.is_hot,
            version: self.version,
            played_at: self.played_at.unwrap_or(now),
        })
    }
}

/// Submission request
#[derive(Debug, Deserialize)]
pub struct SubmitRecordsRequest {
    pub records: Vec<RecordInput>,
}

/// Submission response
#[derive(Debug, Serialize)]
pub struct SubmitRecordsResponse {
    pub inserted: usize,
    pub records: Vec<SkillRecord>,
}

// =============================================================================
// Handlers
// =============================================================================

/// Aggregated skill for a player and instrument
///
/// GET /api/v1/players/{playerId}/skills?instrument=&version=&history_id=
async fn get_skills(
    _auth: Auth,
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
    Query(query): Query<SkillQuery>,
) -> Result<Json<SkillResponse>> {
    let player_id = parse_id("playerId", &raw_id)?;
    let instrument = parse_instrument(query.instrument.as_deref())?;
    let history_id = query
        .history_id
        .as_deref()
        .filter(|s| !s.trim().is_empty())
        .map(|raw| parse_id("history_id", raw))
        .transpose()?;

    ensure_player(&state.db, player_id).await?;

    let skills = state.db.skills();

    let cutoff = match history_id {
        Some(id) => {
            let snapshot = skills
                .get_snapshot(id)
                .await?
                .filter(|s| s.player_id == player_id)
                .ok_or_else(|| ApiError::not_found("snapshot", id))?;
            Some(snapshot.recorded_at)
        }
        None => None,
    };

    let version = query
        .version
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty());

    let filter = RecordFilter::new(player_id, instrument)
        .version(version)
        .cutoff(cutoff);
    let records = skills.list_records(&filter).await?;
    debug!(player_id, count = records.len(), "Aggregating skill records");

    let summary = state.aggregator.aggregate(records, cutoff);
    let history = skills.list_snapshots(player_id, instrument).await?;

    Ok(Json(SkillResponse::new(instrument, summary, history)))
}

/// Snapshot history, newest first
///
/// GET /api/v1/players/{playerId}/skills/history?instrument=
async fn get_history(
    _auth: Auth,
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
    Query(params): Query<InstrumentParams>,
) -> Result<Json<Vec<SkillSnapshot>>> {
    let player_id = parse_id("playerId", &raw_id)?;
    let instrument = params.instrument()?;
    ensure_player(&state.db, player_id).await?;

    let history = state
        .db
        .skills()
        .list_snapshots(player_id, instrument)
        .await?;
    Ok(Json(history))
}

/// Append plays for a player (the player themself or an admin)
///
/// POST /api/v1/players/{playerId}/records
async fn submit_records(
    auth: Auth<CanSubmit>,
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
    Json(req): Json<SubmitRecordsRequest>,
) -> Result<(StatusCode, Json<SubmitRecordsResponse>)> {
    let player_id = parse_id("playerId", &raw_id)?;
    if !auth.can_act_for(player_id) {
        return Err(ApiError::forbidden("cannot submit records for another player"));
    }
    ensure_player(&state.db, player_id).await?;

    if req.records.is_empty() {
        return Err(ApiError::validation("records", "must not be empty"));
    }
    if req.records.len() > MAX_RECORDS_PER_REQUEST {
        return Err(ApiError::validation(
            "records",
            format!("at most {} records per request", MAX_RECORDS_PER_REQUEST),
        ));
    }

    let now = Utc::now();
    let records = req
        .records
        .into_iter()
        .map(|r| r.into_new_record(now))
        .collect::<Result<Vec<_>>>()?;

    let stored = state.db.skills().insert_records(player_id, &records).await?;

    crate::audit!(
        AuditAction::RecordsSubmit,
        user_id = auth.user_id(),
        player_id,
        count = stored.len()
    );

    Ok((
        StatusCode::CREATED,
        Json(SubmitRecordsResponse {
            inserted: stored.len(),
            records: stored,
        }),
    ))
}

/// Aggregate current records and store a snapshot
///
/// POST /api/v1/players/{playerId}/snapshots?instrument=
async fn create_snapshot(
    auth: Auth<CanSubmit>,
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
    Query(params): Query<InstrumentParams>,
) -> Result<(StatusCode, Json<SkillSnapshot>)> {
    let player_id = parse_id("playerId", &raw_id)?;
    if !auth.can_act_for(player_id) {
        return Err(ApiError::forbidden("cannot create snapshots for another player"));
    }
    let instrument = params.instrument()?;
    ensure_player(&state.db, player_id).await?;

    let snapshot = state
        .db
        .skills()
        .take_snapshot(player_id, instrument, &state.aggregator, Utc::now())
        .await?;

    crate::audit!(
        AuditAction::SnapshotCreate,
        user_id = auth.user_id(),
        player_id,
        snapshot_id = snapshot.id
    );

    Ok((StatusCode::CREATED, Json(snapshot)))
}

async fn ensure_player(db: &Database, player_id: i64) -> Result<()> {
    match db.users().get_by_id(player_id).await? {
        Some(_) => Ok(()),
        None => Err(ApiError::not_found("player", player_id)),
    }
}
