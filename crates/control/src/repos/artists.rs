//! Artist repository

use chrono::Utc;
use sqlx::sqlite::{SqlitePool, SqliteRow};
use sqlx::Row;
use tracing::info;

use crate::db::{decode_time, encode_time};
use crate::error::{ControlError, Result};
use crate::models::{Artist, validate_name};

/// Artist repository
pub struct ArtistRepo<'a> {
    pool: &'a SqlitePool,
}

impl<'a> ArtistRepo<'a> {
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Create an artist
    pub async fn create(&self, name: &str) -> Result<Artist> {
        let name = validate_name("name", name)?;
        let now = Utc::now();

        let result = sqlx::query("INSERT INTO artists (name, created_at, updated_at) VALUES (?, ?, ?)")
            .bind(&name)
            .bind(encode_time(&now))
            .bind(encode_time(&now))
            .execute(self.pool)
            .await
            .map_err(|e| ControlError::from_write(e, "artist", &name, "name"))?;

        let id = result.last_insert_rowid();
        info!(artist_id = id, name = %name, "Created artist");

        Ok(Artist {
            id,
            name,
            created_at: now,
            updated_at: now,
        })
    }

    pub async fn get_by_id(&self, id: i64) -> Result<Option<Artist>> {
        let row = sqlx::query("SELECT id, name, created_at, updated_at FROM artists WHERE id = ?")
            .bind(id)
            .fetch_optional(self.pool)
            .await?;

        row.as_ref().map(row_to_artist).transpose()
    }

    /// List artists by name
    pub async fn list(&self) -> Result<Vec<Artist>> {
        let rows = sqlx::query("SELECT id, name, created_at, updated_at FROM artists ORDER BY name, id")
            .fetch_all(self.pool)
            .await?;

        rows.iter().map(row_to_artist).collect()
    }

    /// Rename an artist
    pub async fn update(&self, id: i64, name: &str) -> Result<Artist> {
        let name = validate_name("name", name)?;

        let result = sqlx::query("UPDATE artists SET name = ?, updated_at = ? WHERE id = ?")
            .bind(&name)
            .bind(encode_time(&Utc::now()))
            .bind(id)
            .execute(self.pool)
            .await
            .map_err(|e| ControlError::from_write(e, "artist", &name, "name"))?;

        if result.rows_affected() == 0 {
            return Err(ControlError::not_found("artist", id));
        }

        self.get_by_id(id)
            .await?
            .ok_or_else(|| ControlError::not_found("artist", id))
    }

    /// Delete an artist; songs keep their row with no artist
    pub async fn delete(&self, id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM artists WHERE id = ?")
            .bind(id)
            .execute(self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

fn row_to_artist(row: &SqliteRow) -> Result<Artist> {
    let created_at: String = row.try_get("created_at")?;
    let updated_at: String = row.try_get("updated_at")?;

    Ok(Artist {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        created_at: decode_time("created_at", &created_at)?,
        updated_at: decode_time("updated_at", &updated_at)?,
    })
}
