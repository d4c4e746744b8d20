//! Skill records
//!
//! One `SkillRecord` per recorded play. Records are append-only: a better
//! play is stored as a new row with a later `played_at`.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Result, SkillError};

/// Instrument a play was recorded on
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum InstrumentType {
    #[default]
    Guitar,
    Bass,
    Drum,
    Open,
}

impl InstrumentType {
    /// All instruments, in display order
    pub const ALL: [InstrumentType; 4] = [Self::Guitar, Self::Bass, Self::Drum, Self::Open];

    /// Parse instrument from string (case-insensitive)
    pub fn parse(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "guitar" | "g" => Ok(Self::Guitar),
            "bass" | "b" => Ok(Self::Bass),
            "drum" | "drums" | "d" => Ok(Self::Drum),
            "open" => Ok(Self::Open),
            _ => Err(SkillError::InvalidInstrument(s.to_string())),
        }
    }

    /// Convert to string (stored form)
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Guitar => "GUITAR",
            Self::Bass => "BASS",
            Self::Drum => "DRUM",
            Self::Open => "OPEN",
        }
    }
}

impl fmt::Display for InstrumentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for InstrumentType {
    type Err = SkillError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

/// Chart difficulty
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Difficulty {
    Basic,
    Advanced,
    Extreme,
    Master,
}

impl Difficulty {
    /// Parse difficulty from string (case-insensitive, accepts short forms)
    pub fn parse(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "basic" | "bsc" => Ok(Self::Basic),
            "advanced" | "adv" => Ok(Self::Advanced),
            "extreme" | "ext" => Ok(Self::Extreme),
            "master" | "mas" => Ok(Self::Master),
            _ => Err(SkillError::InvalidDifficulty(s.to_string())),
        }
    }

    /// Convert to string (stored form)
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Basic => "BASIC",
            Self::Advanced => "ADVANCED",
            Self::Extreme => "EXTREME",
            Self::Master => "MASTER",
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Difficulty {
    type Err = SkillError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

/// A single recorded play
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SkillRecord {
    pub id: i64,
    pub player_id: i64,
    pub song_title: String,
    pub instrument_type: InstrumentType,
    pub difficulty: Difficulty,
    /// Percentage, 0-100
    pub achievement_rate: f64,
    pub skill_score: f64,
    pub is_hot: bool,
    /// Game version the play was recorded under
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    pub played_at: DateTime<Utc>,
}

impl SkillRecord {
    /// The scoring slot this record occupies
    pub fn dedup_key(&self) -> DedupKey {
        DedupKey {
            song_title: self.song_title.clone(),
            instrument_type: self.instrument_type,
            difficulty: self.difficulty,
            is_hot: self.is_hot,
        }
    }
}

/// Identifies one scoring slot; at most one record per slot counts
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DedupKey {
    pub song_title: String,
    pub instrument_type: InstrumentType,
    pub difficulty: Difficulty,
    pub is_hot: bool,
}
