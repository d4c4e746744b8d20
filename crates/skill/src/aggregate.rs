//! Skill aggregation
//!
//! Turns a player's raw play records for one instrument into hot/other/total
//! skill. Records beyond the pool size neither count towards the totals nor
//! appear in the output.

use std::collections::HashMap;
use std::collections::hash_map::Entry;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::record::{DedupKey, SkillRecord};

/// Number of records counted per pool (hot and other)
pub const SKILL_POOL_SIZE: usize = 25;

/// Aggregated skill for one player and instrument
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SkillSummary {
    pub total_skill: f64,
    pub hot_skill: f64,
    pub other_skill: f64,
    /// Top hot records, descending by skill score
    pub hot_records: Vec<SkillRecord>,
    /// Top other records, descending by skill score
    pub other_records: Vec<SkillRecord>,
    /// Cutoff the input was restricted to, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cutoff: Option<DateTime<Utc>>,
}

impl SkillSummary {
    /// Summary of a player with no records
    pub fn empty() -> Self {
        Self {
            total_skill: 0.0,
            hot_skill: 0.0,
            other_skill: 0.0,
            hot_records: Vec::new(),
            other_records: Vec::new(),
            cutoff: None,
        }
    }
}

/// Computes skill summaries from play records
#[derive(Debug, Clone, Copy)]
pub struct SkillAggregator {
    pool_size: usize,
}

impl Default for SkillAggregator {
    fn default() -> Self {
        Self::new()
    }
}

impl SkillAggregator {
    /// Aggregator with the game's pool size of 25
    pub fn new() -> Self {
        Self {
            pool_size: SKILL_POOL_SIZE,
        }
    }

    /// Aggregator with a custom pool size
    pub fn with_pool_size(pool_size: usize) -> Self {
        Self { pool_size }
    }

    /// Aggregate records into a summary
    ///
    /// `records` must already be restricted to one player and instrument and,
    /// when `cutoff` is given, to plays at or before the cutoff. Neither is
    /// re-checked here.
    pub fn aggregate<I>(&self, records: I, cutoff: Option<DateTime<Utc>>) -> SkillSummary
    where
        I: IntoIterator<Item = SkillRecord>,
    {
        let best = deduplicate(records);

        let (mut hot_records, mut other_records): (Vec<_>, Vec<_>) =
            best.into_iter().partition(|r| r.is_hot);

        self.rank(&mut hot_records);
        self.rank(&mut other_records);

        let hot_skill = pool_sum(&hot_records);
        let other_skill = pool_sum(&other_records);

        SkillSummary {
            total_skill: hot_skill + other_skill,
            hot_skill,
            other_skill,
            hot_records,
            other_records,
            cutoff,
        }
    }

    /// Stable sort descending by skill score, then cut to the pool size
    fn rank(&self, pool: &mut Vec<SkillRecord>) {
        pool.sort_by(|a, b| b.skill_score.total_cmp(&a.skill_score));
        pool.truncate(self.pool_size);
    }
}

/// Keep one record per slot, in first-seen order
///
/// A later record only replaces the kept one when its achievement rate is
/// strictly greater.
fn deduplicate<I>(records: I) -> Vec<SkillRecord>
where
    I: IntoIterator<Item = SkillRecord>,
{
    let mut slots: Vec<SkillRecord> = Vec::new();
    let mut index: HashMap<DedupKey, usize> = HashMap::new();

    for record in records {
        match index.entry(record.dedup_key()) {
            Entry::Occupied(entry) => {
                let kept = &mut slots[*entry.get()];
                if record.achievement_rate > kept.achievement_rate {
                    *kept = record;
                }
            }
            Entry::Vacant(entry) => {
                entry.insert(slots.len());
                slots.push(record);
            }
        }
    }

    slots
}

// Empty pools sum to +0.0 (`Sum for f64` starts at -0.0)
fn pool_sum(pool: &[SkillRecord]) -> f64 {
    pool.iter().fold(0.0, |acc, r| acc + r.skill_score)
}
