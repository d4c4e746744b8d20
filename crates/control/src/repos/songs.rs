//! Song repository
//!
//! Songs and their tag assignments.

use std::collections::{BTreeSet, HashMap};

use chrono::Utc;
use sqlx::sqlite::{SqlitePool, SqliteRow};
use sqlx::Row;
use tracing::{debug, info};

use crate::db::{decode_time, encode_time};
use crate::error::{ControlError, Result};
use crate::models::{Song, SongFilter, SongInput};

const COLUMNS: &str = "id, title, artist_id, version_id, bpm, is_hot, created_at, updated_at";

/// Song repository
pub struct SongRepo<'a> {
    pool: &'a SqlitePool,
}

impl<'a> SongRepo<'a> {
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    // =========================================================================
    // Song CRUD
    // =========================================================================

    /// Create a song with no tags
    pub async fn create(&self, input: &SongInput) -> Result<Song> {
        let input = input.validated()?;
        let now = Utc::now();

        let result = sqlx::query(
            r#"
            INSERT INTO songs (title, artist_id, version_id, bpm, is_hot, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&input.title)
        .bind(input.artist_id)
        .bind(input.version_id)
        .bind(input.bpm.as_deref())
        .bind(input.is_hot)
        .bind(encode_time(&now))
        .bind(encode_time(&now))
        .execute(self.pool)
        .await
        .map_err(|e| ControlError::from_write(e, "song", &input.title, "artist_id/version_id"))?;

        let id = result.last_insert_rowid();
        info!(song_id = id, title = %input.title, "Created song");

        Ok(Song {
            id,
            title: input.title,
            artist_id: input.artist_id,
            version_id: input.version_id,
            bpm: input.bpm,
            is_hot: input.is_hot,
            tag_ids: Vec::new(),
            created_at: now,
            updated_at: now,
        })
    }

    pub async fn get_by_id(&self, id: i64) -> Result<Option<Song>> {
        let row = sqlx::query(&format!("SELECT {COLUMNS} FROM songs WHERE id = ?"))
            .bind(id)
            .fetch_optional(self.pool)
            .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let tag_ids: Vec<i64> =
            sqlx::query_scalar("SELECT tag_id FROM song_tags WHERE song_id = ? ORDER BY tag_id")
                .bind(id)
                .fetch_all(self.pool)
                .await?;

        row_to_song(&row, tag_ids).map(Some)
    }

    /// List songs by title, narrowed by the given filters
    pub async fn list(&self, filter: &SongFilter) -> Result<Vec<Song>> {
        let rows = sqlx::query(&format!(
            r#"
            SELECT {COLUMNS} FROM songs
            WHERE (? IS NULL OR version_id = ?)
              AND (? IS NULL OR is_hot = ?)
              AND (? IS NULL OR id IN (SELECT song_id FROM song_tags WHERE tag_id = ?))
            ORDER BY title, id
            "#
        ))
        .bind(filter.version_id)
        .bind(filter.version_id)
        .bind(filter.is_hot)
        .bind(filter.is_hot)
        .bind(filter.tag_id)
        .bind(filter.tag_id)
        .fetch_all(self.pool)
        .await?;

        let mut tags = self.all_tag_ids().await?;

        rows.iter()
            .map(|row| {
                let id: i64 = row.try_get("id")?;
                row_to_song(row, tags.remove(&id).unwrap_or_default())
            })
            .collect()
    }

    /// Replace a song's writable fields; tags are left alone
    pub async fn update(&self, id: i64, input: &SongInput) -> Result<Song> {
        let input = input.validated()?;

        let result = sqlx::query(
            r#"
            UPDATE songs
            SET title = ?, artist_id = ?, version_id = ?, bpm = ?, is_hot = ?, updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(&input.title)
        .bind(input.artist_id)
        .bind(input.version_id)
        .bind(input.bpm.as_deref())
        .bind(input.is_hot)
        .bind(encode_time(&Utc::now()))
        .bind(id)
        .execute(self.pool)
        .await
        .map_err(|e| ControlError::from_write(e, "song", &input.title, "artist_id/version_id"))?;

        if result.rows_affected() == 0 {
            return Err(ControlError::not_found("song", id));
        }

        self.get_by_id(id)
            .await?
            .ok_or_else(|| ControlError::not_found("song", id))
    }

    pub async fn delete(&self, id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM songs WHERE id = ?")
            .bind(id)
            .execute(self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    // =========================================================================
    // Tags
    // =========================================================================

    /// Replace the song's tag set
    ///
    /// Duplicate ids collapse; an unknown tag id rejects the whole set.
    pub async fn set_tags(&self, id: i64, tag_ids: &[i64]) -> Result<Song> {
        let tag_ids: BTreeSet<i64> = tag_ids.iter().copied().collect();
        let mut tx = self.pool.begin().await?;

        let exists: Option<i64> = sqlx::query_scalar("SELECT id FROM songs WHERE id = ?")
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?;
        if exists.is_none() {
            return Err(ControlError::not_found("song", id));
        }

        sqlx::query("DELETE FROM song_tags WHERE song_id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        for tag_id in &tag_ids {
            sqlx::query("INSERT INTO song_tags (song_id, tag_id) VALUES (?, ?)")
                .bind(id)
                .bind(tag_id)
                .execute(&mut *tx)
                .await
                .map_err(|e| ControlError::from_write(e, "song tag", tag_id, "tag_ids"))?;
        }

        sqlx::query("UPDATE songs SET updated_at = ? WHERE id = ?")
            .bind(encode_time(&Utc::now()))
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        debug!(song_id = id, count = tag_ids.len(), "Replaced song tags");

        self.get_by_id(id)
            .await?
            .ok_or_else(|| ControlError::not_found("song", id))
    }

    async fn all_tag_ids(&self) -> Result<HashMap<i64, Vec<i64>>> {
        let rows = sqlx::query("SELECT song_id, tag_id FROM song_tags ORDER BY song_id, tag_id")
            .fetch_all(self.pool)
            .await?;

        let mut tags: HashMap<i64, Vec<i64>> = HashMap::new();
        for row in &rows {
            tags.entry(row.try_get("song_id")?)
                .or_default()
                .push(row.try_get("tag_id")?);
        }
        Ok(tags)
    }
}

fn row_to_song(row: &SqliteRow, tag_ids: Vec<i64>) -> Result<Song> {
    let created_at: String = row.try_get("created_at")?;
    let updated_at: String = row.try_get("updated_at")?;

    Ok(Song {
        id: row.try_get("id")?,
        title: row.try_get("title")?,
        artist_id: row.try_get("artist_id")?,
        version_id: row.try_get("version_id")?,
        bpm: row.try_get("bpm")?,
        is_hot: row.try_get("is_hot")?,
        tag_ids,
        created_at: decode_time("created_at", &created_at)?,
        updated_at: decode_time("updated_at", &updated_at)?,
    })
}
