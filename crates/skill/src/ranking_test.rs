//! Tests for the ranking list

use chrono::{DateTime, Duration, TimeZone, Utc};

use crate::ranking::{PlayerSkill, latest_per_player, rank};
use crate::record::InstrumentType;
use crate::snapshot::SkillSnapshot;

fn at(hours: i64) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap() + Duration::hours(hours)
}

fn player(id: i64, total: f64) -> PlayerSkill {
    PlayerSkill {
        player_id: id,
        player_name: format!("player-{id}"),
        total_skill: total,
        recorded_at: at(0),
    }
}

fn snapshot(id: i64, player_id: i64, total: f64, hours: i64) -> SkillSnapshot {
    SkillSnapshot {
        id,
        player_id,
        instrument_type: InstrumentType::Guitar,
        total_skill: total,
        hot_skill: total,
        other_skill: 0.0,
        recorded_at: at(hours),
    }
}

#[test]
fn test_rank_sorts_descending() {
    let entries = rank(vec![player(1, 3000.0), player(2, 5000.0), player(3, 4000.0)]);

    let order: Vec<(u32, i64)> = entries.iter().map(|e| (e.rank, e.player_id)).collect();
    assert_eq!(order, vec![(1, 2), (2, 3), (3, 1)]);
}

#[test]
fn test_rank_drops_zero_skill() {
    let entries = rank(vec![player(1, 0.0), player(2, 1200.5)]);

    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].player_id, 2);
    assert_eq!(entries[0].rank, 1);
}

#[test]
fn test_rank_ties_ordered_by_player_id() {
    let entries = rank(vec![player(9, 2000.0), player(4, 2000.0), player(6, 2500.0)]);

    let order: Vec<i64> = entries.iter().map(|e| e.player_id).collect();
    assert_eq!(order, vec![6, 4, 9]);
    let ranks: Vec<u32> = entries.iter().map(|e| e.rank).collect();
    assert_eq!(ranks, vec![1, 2, 3]);
}

#[test]
fn test_rank_empty() {
    assert!(rank(Vec::new()).is_empty());
}

#[test]
fn test_latest_per_player() {
    let latest = latest_per_player(vec![
        snapshot(1, 1, 1000.0, 0),
        snapshot(2, 1, 1500.0, 5),
        snapshot(3, 2, 800.0, 3),
        snapshot(4, 1, 1200.0, 2),
    ]);

    assert_eq!(latest.len(), 2);
    assert_eq!(latest[0].player_id, 1);
    assert_eq!(latest[0].total_skill, 1500.0);
    assert_eq!(latest[1].player_id, 2);
    assert_eq!(latest[1].total_skill, 800.0);
}

#[test]
fn test_latest_per_player_same_time_prefers_higher_id() {
    let latest = latest_per_player(vec![snapshot(7, 1, 900.0, 1), snapshot(3, 1, 100.0, 1)]);

    assert_eq!(latest.len(), 1);
    assert_eq!(latest[0].id, 7);
}

#[test]
fn test_ranking_serialization() {
    let entries = rank(vec![player(1, 100.0)]);
    let json = serde_json::to_value(&entries[0]).unwrap();

    assert_eq!(json["rank"], 1);
    assert_eq!(json["playerId"], 1);
    assert_eq!(json["playerName"], "player-1");
    assert_eq!(json["totalSkill"], 100.0);
}
