//! Skill record ingestion models

use chrono::{DateTime, Utc};
use gitadora_skill::{Difficulty, InstrumentType};

use crate::error::{ControlError, Result};

/// A play to append to a player's records
#[derive(Debug, Clone)]
pub struct NewSkillRecord {
    pub song_title: String,
    pub instrument_type: InstrumentType,
    pub difficulty: Difficulty,
    pub achievement_rate: f64,
    pub skill_score: f64,
    pub is_hot: bool,
    pub version: Option<String>,
    pub played_at: DateTime<Utc>,
}

impl NewSkillRecord {
    /// Check ranges and trim the title
    pub fn validated(&self) -> Result<Self> {
        let song_title = self.song_title.trim();
        if song_title.is_empty() {
            return Err(ControlError::invalid("songTitle", "must not be empty"));
        }
        if !(0.0..=100.0).contains(&self.achievement_rate) {
            return Err(ControlError::invalid(
                "achievementRate",
                format!("{} is outside 0..=100", self.achievement_rate),
            ));
        }
        if !self.skill_score.is_finite() || self.skill_score < 0.0 {
            return Err(ControlError::invalid(
                "skillScore",
                format!("{} is not a non-negative number", self.skill_score),
            ));
        }

        Ok(Self {
            song_title: song_title.to_string(),
            version: self
                .version
                .as_deref()
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(String::from),
            ..self.clone()
        })
    }
}

/// Which records to fetch for aggregation
#[derive(Debug, Clone)]
pub struct RecordFilter {
    pub player_id: i64,
    pub instrument_type: InstrumentType,
    /// Exact match on the recorded game version
    pub version: Option<String>,
    /// Only plays at or before this instant
    pub cutoff: Option<DateTime<Utc>>,
}

impl RecordFilter {
    pub fn new(player_id: i64, instrument_type: InstrumentType) -> Self {
        Self {
            player_id,
            instrument_type,
            version: None,
            cutoff: None,
        }
    }

    pub fn version(mut self, version: Option<String>) -> Self {
        self.version = version;
        self
    }

    pub fn cutoff(mut self, cutoff: Option<DateTime<Utc>>) -> Self {
        self.cutoff = cutoff;
        self
    }
}
