//! Skill history snapshots
//!
//! Periodic materialized totals for one player and instrument.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::aggregate::SkillSummary;
use crate::record::InstrumentType;

/// Materialized skill totals at a point in time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SkillSnapshot {
    pub id: i64,
    pub player_id: i64,
    pub instrument_type: InstrumentType,
    pub total_skill: f64,
    pub hot_skill: f64,
    pub other_skill: f64,
    pub recorded_at: DateTime<Utc>,
}

impl SkillSnapshot {
    /// Build an unsaved snapshot (id 0) from an aggregated summary
    pub fn from_summary(
        player_id: i64,
        instrument_type: InstrumentType,
        summary: &SkillSummary,
        recorded_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: 0,
            player_id,
            instrument_type,
            total_skill: summary.total_skill,
            hot_skill: summary.hot_skill,
            other_skill: summary.other_skill,
            recorded_at,
        }
    }
}
