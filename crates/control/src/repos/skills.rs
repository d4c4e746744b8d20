//! Skill repository
//!
//! Append-only play records and materialized skill snapshots. Records are
//! never updated or deleted here; they go away only with their player.

use chrono::{DateTime, Utc};
use gitadora_skill::{Difficulty, InstrumentType, SkillAggregator, SkillRecord, SkillSnapshot};
use sqlx::sqlite::{SqlitePool, SqliteRow};
use sqlx::Row;
use tracing::{debug, info};

use crate::db::{decode_time, encode_time};
use crate::error::{ControlError, Result};
use crate::models::{NewSkillRecord, RecordFilter};

const RECORD_COLUMNS: &str = "id, player_id, song_title, instrument_type, difficulty, \
     achievement_rate, skill_score, is_hot, version, played_at";
const SNAPSHOT_COLUMNS: &str =
    "id, player_id, instrument_type, total_skill, hot_skill, other_skill, recorded_at";

/// Skill repository
pub struct SkillRepo<'a> {
    pool: &'a SqlitePool,
}

impl<'a> SkillRepo<'a> {
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    // =========================================================================
    // Records
    // =========================================================================

    /// Append plays for a player
    ///
    /// All records are validated first; the batch is written atomically.
    pub async fn insert_records(
        &self,
        player_id: i64,
        records: &[NewSkillRecord],
    ) -> Result<Vec<SkillRecord>> {
        let records = records
            .iter()
            .map(NewSkillRecord::validated)
            .collect::<Result<Vec<_>>>()?;

        let mut tx = self.pool.begin().await?;
        let mut stored = Vec::with_capacity(records.len());

        for record in records {
            let result = sqlx::query(
                r#"
                INSERT INTO skill_records (player_id, song_title, instrument_type, difficulty,
                    achievement_rate, skill_score, is_hot, version, played_at)
                VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
                "#,
            )
            .bind(player_id)
            .bind(&record.song_title)
            .bind(record.instrument_type.as_str())
            .bind(record.difficulty.as_str())
            .bind(record.achievement_rate)
            .bind(record.skill_score)
            .bind(record.is_hot)
            .bind(record.version.as_deref())
            .bind(encode_time(&record.played_at))
            .execute(&mut *tx)
            .await
            .map_err(|e| ControlError::from_write(e, "skill record", player_id, "player_id"))?;

            stored.push(SkillRecord {
                id: result.last_insert_rowid(),
                player_id,
                song_title: record.song_title,
                instrument_type: record.instrument_type,
                difficulty: record.difficulty,
                achievement_rate: record.achievement_rate,
                skill_score: record.skill_score,
                is_hot: record.is_hot,
                version: record.version,
                played_at: record.played_at,
            });
        }

        tx.commit().await?;
        info!(player_id, count = stored.len(), "Stored skill records");
        Ok(stored)
    }

    /// Fetch the records an aggregation runs over, newest play first
    pub async fn list_records(&self, filter: &RecordFilter) -> Result<Vec<SkillRecord>> {
        let cutoff = filter.cutoff.as_ref().map(encode_time);

        let rows = sqlx::query(&format!(
            r#"
            SELECT {RECORD_COLUMNS} FROM skill_records
            WHERE player_id = ? AND instrument_type = ?
              AND (? IS NULL OR version = ?)
              AND (? IS NULL OR played_at <= ?)
            ORDER BY played_at DESC, id DESC
            "#
        ))
        .bind(filter.player_id)
        .bind(filter.instrument_type.as_str())
        .bind(filter.version.as_deref())
        .bind(filter.version.as_deref())
        .bind(cutoff.as_deref())
        .bind(cutoff.as_deref())
        .fetch_all(self.pool)
        .await?;

        debug!(
            player_id = filter.player_id,
            instrument = %filter.instrument_type,
            count = rows.len(),
            "Fetched skill records"
        );

        rows.iter().map(row_to_record).collect()
    }

    // =========================================================================
    // Snapshots
    // =========================================================================

    /// Persist a snapshot and return it with its assigned id
    pub async fn insert_snapshot(&self, snapshot: &SkillSnapshot) -> Result<SkillSnapshot> {
        let result = sqlx::query(
            r#"
            INSERT INTO skill_snapshots (player_id, instrument_type, total_skill, hot_skill,
                other_skill, recorded_at)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(snapshot.player_id)
        .bind(snapshot.instrument_type.as_str())
        .bind(snapshot.total_skill)
        .bind(snapshot.hot_skill)
        .bind(snapshot.other_skill)
        .bind(encode_time(&snapshot.recorded_at))
        .execute(self.pool)
        .await
        .map_err(|e| {
            ControlError::from_write(e, "skill snapshot", snapshot.player_id, "player_id")
        })?;

        let stored = SkillSnapshot {
            id: result.last_insert_rowid(),
            ..snapshot.clone()
        };
        debug!(
            player_id = stored.player_id,
            snapshot_id = stored.id,
            total_skill = stored.total_skill,
            "Stored skill snapshot"
        );
        Ok(stored)
    }

    /// Aggregate a player's records up to `recorded_at` and persist the totals
    ///
    /// Plays dated after `recorded_at` are left out, so the snapshot matches
    /// the skills view cut off at the same moment.
    pub async fn take_snapshot(
        &self,
        player_id: i64,
        instrument_type: InstrumentType,
        aggregator: &SkillAggregator,
        recorded_at: DateTime<Utc>,
    ) -> Result<SkillSnapshot> {
        let records = self
            .list_records(&RecordFilter::new(player_id, instrument_type).cutoff(Some(recorded_at)))
            .await?;
        let summary = aggregator.aggregate(records, Some(recorded_at));

        self.insert_snapshot(&SkillSnapshot::from_summary(
            player_id,
            instrument_type,
            &summary,
            recorded_at,
        ))
        .await
    }

    pub async fn get_snapshot(&self, id: i64) -> Result<Option<SkillSnapshot>> {
        let row = sqlx::query(&format!(
            "SELECT {SNAPSHOT_COLUMNS} FROM skill_snapshots WHERE id = ?"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        row.as_ref().map(row_to_snapshot).transpose()
    }

    /// A player's history for one instrument, newest first
    pub async fn list_snapshots(
        &self,
        player_id: i64,
        instrument_type: InstrumentType,
    ) -> Result<Vec<SkillSnapshot>> {
        let rows = sqlx::query(&format!(
            r#"
            SELECT {SNAPSHOT_COLUMNS} FROM skill_snapshots
            WHERE player_id = ? AND instrument_type = ?
            ORDER BY recorded_at DESC, id DESC
            "#
        ))
        .bind(player_id)
        .bind(instrument_type.as_str())
        .fetch_all(self.pool)
        .await?;

        rows.iter().map(row_to_snapshot).collect()
    }

    /// Every player's snapshots for one instrument
    pub async fn list_snapshots_for_instrument(
        &self,
        instrument_type: InstrumentType,
    ) -> Result<Vec<SkillSnapshot>> {
        let rows = sqlx::query(&format!(
            "SELECT {SNAPSHOT_COLUMNS} FROM skill_snapshots WHERE instrument_type = ? ORDER BY player_id, recorded_at"
        ))
        .bind(instrument_type.as_str())
        .fetch_all(self.pool)
        .await?;

        rows.iter().map(row_to_snapshot).collect()
    }
}

fn decode_instrument(raw: &str) -> Result<InstrumentType> {
    InstrumentType::parse(raw).map_err(|e| ControlError::invalid("instrument_type", e.to_string()))
}

fn row_to_record(row: &SqliteRow) -> Result<SkillRecord> {
    let instrument: String = row.try_get("instrument_type")?;
    let difficulty: String = row.try_get("difficulty")?;
    let played_at: String = row.try_get("played_at")?;

    Ok(SkillRecord {
        id: row.try_get("id")?,
        player_id: row.try_get("player_id")?,
        song_title: row.try_get("song_title")?,
        instrument_type: decode_instrument(&instrument)?,
        difficulty: Difficulty::parse(&difficulty)
            .map_err(|e| ControlError::invalid("difficulty", e.to_string()))?,
        achievement_rate: row.try_get("achievement_rate")?,
        skill_score: row.try_get("skill_score")?,
        is_hot: row.try_get("is_hot")?,
        version: row.try_get("version")?,
        played_at: decode_time("played_at", &played_at)?,
    })
}

fn row_to_snapshot(row: &SqliteRow) -> Result<SkillSnapshot> {
    let instrument: String = row.try_get("instrument_type")?;
    let recorded_at: String = row.try_get("recorded_at")?;

    Ok(SkillSnapshot {
        id: row.try_get("id")?,
        player_id: row.try_get("player_id")?,
        instrument_type: decode_instrument(&instrument)?,
        total_skill: row.try_get("total_skill")?,
        hot_skill: row.try_get("hot_skill")?,
        other_skill: row.try_get("other_skill")?,
        recorded_at: decode_time("recorded_at", &recorded_at)?,
    })
}
