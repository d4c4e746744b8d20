//! Player ranking list
//!
//! Ranks players by the total skill of their latest snapshot.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::snapshot::SkillSnapshot;

/// A player's current total skill (input to ranking)
#[derive(Debug, Clone, PartialEq)]
pub struct PlayerSkill {
    pub player_id: i64,
    pub player_name: String,
    pub total_skill: f64,
    pub recorded_at: DateTime<Utc>,
}

/// One row of the leaderboard
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RankingEntry {
    /// 1-based position
    pub rank: u32,
    pub player_id: i64,
    pub player_name: String,
    pub total_skill: f64,
    pub recorded_at: DateTime<Utc>,
}

/// Pick each player's latest snapshot
///
/// Snapshots with equal `recorded_at` resolve to the higher id.
pub fn latest_per_player(snapshots: impl IntoIterator<Item = SkillSnapshot>) -> Vec<SkillSnapshot> {
    let mut latest: HashMap<i64, SkillSnapshot> = HashMap::new();

    for snapshot in snapshots {
        match latest.get(&snapshot.player_id) {
            Some(current)
                if (current.recorded_at, current.id) >= (snapshot.recorded_at, snapshot.id) => {}
            _ => {
                latest.insert(snapshot.player_id, snapshot);
            }
        }
    }

    let mut result: Vec<SkillSnapshot> = latest.into_values().collect();
    result.sort_by_key(|s| s.player_id);
    result
}

/// Rank players by total skill, descending
///
/// Players with zero skill are left out. Ties keep ascending player id order;
/// ranks run 1..N without gaps.
pub fn rank(players: impl IntoIterator<Item = PlayerSkill>) -> Vec<RankingEntry> {
    let mut players: Vec<PlayerSkill> = players
        .into_iter()
        .filter(|p| p.total_skill > 0.0)
        .collect();

    players.sort_by(|a, b| {
        b.total_skill
            .total_cmp(&a.total_skill)
            .then(a.player_id.cmp(&b.player_id))
    });

    players
        .into_iter()
        .enumerate()
        .map(|(i, p)| RankingEntry {
            rank: i as u32 + 1,
            player_id: p.player_id,
            player_name: p.player_name,
            total_skill: p.total_skill,
            recorded_at: p.recorded_at,
        })
        .collect()
}
