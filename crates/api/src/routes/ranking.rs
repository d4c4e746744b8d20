//! Ranking list
//!
//! `GET /api/v1/ranking?instrument=` ranks players by their latest snapshot.

use std::collections::HashMap;

use axum::{
    Json, Router,
    extract::{Query, State},
    routing::get,
};
use gitadora_skill::{InstrumentType, PlayerSkill, RankingEntry, latest_per_player, rank};
use serde::Serialize;

use crate::auth::Auth;
use crate::error::Result;
use crate::state::AppState;
use crate::types::InstrumentParams;

pub fn routes() -> Router<AppState> {
    Router::new().route("/ranking", get(get_ranking))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RankingResponse {
    pub instrument_type: InstrumentType,
    pub entries: Vec<RankingEntry>,
}

/// GET /api/v1/ranking?instrument=
async fn get_ranking(
    _auth: Auth,
    State(state): State<AppState>,
    Query(params): Query<InstrumentParams>,
) -> Result<Json<RankingResponse>> {
    let instrument = params.instrument()?;

    let snapshots = state
        .db
        .skills()
        .list_snapshots_for_instrument(instrument)
        .await?;

    let names: HashMap<i64, String> = state
        .db
        .users()
        .list()
        .await?
        .into_iter()
        .map(|u| (u.id, u.display_name))
        .collect();

    let players = latest_per_player(snapshots)
        .into_iter()
        .filter_map(|s| {
            names.get(&s.player_id).map(|name| PlayerSkill {
                player_id: s.player_id,
                player_name: name.clone(),
                total_skill: s.total_skill,
                recorded_at: s.recorded_at,
            })
        })
        .collect::<Vec<_>>();

    Ok(Json(RankingResponse {
        instrument_type: instrument,
        entries: rank(players),
    }))
}
