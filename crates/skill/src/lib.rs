//! GITADORA Skill
//!
//! Skill records, the skill aggregator, and the player ranking list.
//!
//! # Overview
//!
//! A player's skill for one instrument is computed from their recorded plays:
//!
//! - **Deduplicate**: one record per (song, instrument, difficulty, hot) slot,
//!   keeping the best achievement rate
//! - **Partition**: split into "hot" (current bonus rotation) and "other"
//! - **Rank**: sort each pool by skill score, keep the top 25
//! - **Sum**: hot skill + other skill = total skill
//!
//! # Usage
//!
//! ```
//! use gitadora_skill::{SkillAggregator, SkillSummary};
//!
//! let summary: SkillSummary = SkillAggregator::new().aggregate(Vec::new(), None);
//! assert_eq!(summary.total_skill, 0.0);
//! assert!(summary.hot_records.is_empty());
//! ```
//!
//! The aggregator performs no I/O. Callers fetch records for a single player
//! and instrument (optionally restricted by version and cutoff time) and hand
//! them over as an owned list.

pub mod aggregate;
pub mod error;
pub mod ranking;
pub mod record;
pub mod snapshot;

#[cfg(test)]
mod ranking_test;

// Re-exports for convenience
pub use aggregate::{SKILL_POOL_SIZE, SkillAggregator, SkillSummary};
pub use error::{Result, SkillError};
pub use ranking::{PlayerSkill, RankingEntry, latest_per_player, rank};
pub use record::{DedupKey, Difficulty, InstrumentType, SkillRecord};
pub use snapshot::SkillSnapshot;
