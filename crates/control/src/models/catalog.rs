//! Song catalog models
//!
//! Artists, game versions and tags are simple named entities; songs reference
//! them by id.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{ControlError, Result};

/// Longest accepted name or title
pub const MAX_NAME_LEN: usize = 200;

/// Trim a required name and check its length
pub fn validate_name(field: &'static str, name: &str) -> Result<String> {
    let name = name.trim();
    if name.is_empty() {
        return Err(ControlError::invalid(field, "must not be empty"));
    }
    if name.chars().count() > MAX_NAME_LEN {
        return Err(ControlError::invalid(
            field,
            format!("must be at most {} characters", MAX_NAME_LEN),
        ));
    }
    Ok(name.to_string())
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Artist {
    pub id: i64,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tag {
    pub id: i64,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A game release (e.g. "GALAXY WAVE")
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameVersion {
    pub id: i64,
    pub name: String,
    pub released_on: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Song {
    pub id: i64,
    pub title: String,
    pub artist_id: Option<i64>,
    pub version_id: Option<i64>,
    /// Free-form BPM, e.g. "150" or "120-180"
    pub bpm: Option<String>,
    /// Whether the song is in the current hot pool
    pub is_hot: bool,
    /// Attached tag ids, ascending
    pub tag_ids: Vec<i64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Writable song fields
#[derive(Debug, Clone, Default)]
pub struct SongInput {
    pub title: String,
    pub artist_id: Option<i64>,
    pub version_id: Option<i64>,
    pub bpm: Option<String>,
    pub is_hot: bool,
}

impl SongInput {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Default::default()
        }
    }

    /// Normalize and validate
    pub fn validated(&self) -> Result<Self> {
        let bpm = self
            .bpm
            .as_deref()
            .map(str::trim)
            .filter(|b| !b.is_empty())
            .map(String::from);

        Ok(Self {
            title: validate_name("title", &self.title)?,
            artist_id: self.artist_id,
            version_id: self.version_id,
            bpm,
            is_hot: self.is_hot,
        })
    }
}

/// Song list filters
#[derive(Debug, Clone, Default)]
pub struct SongFilter {
    pub version_id: Option<i64>,
    pub tag_id: Option<i64>,
    pub is_hot: Option<bool>,
}

/// An in-game event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub id: i64,
    pub title: String,
    pub description: Option<String>,
    pub version_id: Option<i64>,
    pub starts_at: DateTime<Utc>,
    pub ends_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Writable event fields
#[derive(Debug, Clone)]
pub struct EventInput {
    pub title: String,
    pub description: Option<String>,
    pub version_id: Option<i64>,
    pub starts_at: DateTime<Utc>,
    pub ends_at: DateTime<Utc>,
}

impl EventInput {
    /// Normalize and validate; an event may not end before it starts
    pub fn validated(&self) -> Result<Self> {
        if self.ends_at < self.starts_at {
            return Err(ControlError::invalid("ends_at", "must not be before starts_at"));
        }

        Ok(Self {
            title: validate_name("title", &self.title)?,
            description: self
                .description
                .as_deref()
                .map(str::trim)
                .filter(|d| !d.is_empty())
                .map(String::from),
            version_id: self.version_id,
            starts_at: self.starts_at,
            ends_at: self.ends_at,
        })
    }
}
