//! Game version repository

use chrono::{NaiveDate, Utc};
use sqlx::sqlite::{SqlitePool, SqliteRow};
use sqlx::Row;
use tracing::info;

use crate::db::{decode_date, decode_time, encode_time};
use crate::error::{ControlError, Result};
use crate::models::{GameVersion, validate_name};

const COLUMNS: &str = "id, name, released_on, created_at, updated_at";

/// Game version repository
pub struct VersionRepo<'a> {
    pool: &'a SqlitePool,
}

impl<'a> VersionRepo<'a> {
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Create a game version
    pub async fn create(&self, name: &str, released_on: Option<NaiveDate>) -> Result<GameVersion> {
        let name = validate_name("name", name)?;
        let now = Utc::now();

        let result = sqlx::query(
            "INSERT INTO game_versions (name, released_on, created_at, updated_at) VALUES (?, ?, ?, ?)",
        )
        .bind(&name)
        .bind(released_on.map(|d| d.to_string()))
        .bind(encode_time(&now))
        .bind(encode_time(&now))
        .execute(self.pool)
        .await
        .map_err(|e| ControlError::from_write(e, "version", &name, "name"))?;

        let id = result.last_insert_rowid();
        info!(version_id = id, name = %name, "Created game version");

        Ok(GameVersion {
            id,
            name,
            released_on,
            created_at: now,
            updated_at: now,
        })
    }

    pub async fn get_by_id(&self, id: i64) -> Result<Option<GameVersion>> {
        let row = sqlx::query(&format!("SELECT {COLUMNS} FROM game_versions WHERE id = ?"))
            .bind(id)
            .fetch_optional(self.pool)
            .await?;

        row.as_ref().map(row_to_version).transpose()
    }

    /// List versions, newest release first; undated versions last
    pub async fn list(&self) -> Result<Vec<GameVersion>> {
        let rows = sqlx::query(&format!(
            "SELECT {COLUMNS} FROM game_versions ORDER BY released_on IS NULL, released_on DESC, id DESC"
        ))
        .fetch_all(self.pool)
        .await?;

        rows.iter().map(row_to_version).collect()
    }

    pub async fn update(
        &self,
        id: i64,
        name: &str,
        released_on: Option<NaiveDate>,
    ) -> Result<GameVersion> {
        let name = validate_name("name", name)?;

        let result = sqlx::query(
            "UPDATE game_versions SET name = ?, released_on = ?, updated_at = ? WHERE id = ?",
        )
        .bind(&name)
        .bind(released_on.map(|d| d.to_string()))
        .bind(encode_time(&Utc::now()))
        .bind(id)
        .execute(self.pool)
        .await
        .map_err(|e| ControlError::from_write(e, "version", &name, "name"))?;

        if result.rows_affected() == 0 {
            return Err(ControlError::not_found("version", id));
        }

        self.get_by_id(id)
            .await?
            .ok_or_else(|| ControlError::not_found("version", id))
    }

    /// Delete a version; songs and events referencing it keep their row
    pub async fn delete(&self, id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM game_versions WHERE id = ?")
            .bind(id)
            .execute(self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

fn row_to_version(row: &SqliteRow) -> Result<GameVersion> {
    let released_on: Option<String> = row.try_get("released_on")?;
    let created_at: String = row.try_get("created_at")?;
    let updated_at: String = row.try_get("updated_at")?;

    Ok(GameVersion {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        released_on: released_on
            .as_deref()
            .map(|d| decode_date("released_on", d))
            .transpose()?,
        created_at: decode_time("created_at", &created_at)?,
        updated_at: decode_time("updated_at", &updated_at)?,
    })
}
