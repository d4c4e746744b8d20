//! Tag repository

use chrono::Utc;
use sqlx::sqlite::{SqlitePool, SqliteRow};
use sqlx::Row;
use tracing::info;

use crate::db::{decode_time, encode_time};
use crate::error::{ControlError, Result};
use crate::models::{Tag, validate_name};

/// Tag repository
pub struct TagRepo<'a> {
    pool: &'a SqlitePool,
}

impl<'a> TagRepo<'a> {
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Create a tag
    pub async fn create(&self, name: &str) -> Result<Tag> {
        let name = validate_name("name", name)?;
        let now = Utc::now();

        let result = sqlx::query("INSERT INTO tags (name, created_at, updated_at) VALUES (?, ?, ?)")
            .bind(&name)
            .bind(encode_time(&now))
            .bind(encode_time(&now))
            .execute(self.pool)
            .await
            .map_err(|e| ControlError::from_write(e, "tag", &name, "name"))?;

        let id = result.last_insert_rowid();
        info!(tag_id = id, name = %name, "Created tag");

        Ok(Tag {
            id,
            name,
            created_at: now,
            updated_at: now,
        })
    }

    pub async fn get_by_id(&self, id: i64) -> Result<Option<Tag>> {
        let row = sqlx::query("SELECT id, name, created_at, updated_at FROM tags WHERE id = ?")
            .bind(id)
            .fetch_optional(self.pool)
            .await?;

        row.as_ref().map(row_to_tag).transpose()
    }

    /// List tags by name
    pub async fn list(&self) -> Result<Vec<Tag>> {
        let rows = sqlx::query("SELECT id, name, created_at, updated_at FROM tags ORDER BY name, id")
            .fetch_all(self.pool)
            .await?;

        rows.iter().map(row_to_tag).collect()
    }

    /// Rename a tag
    pub async fn update(&self, id: i64, name: &str) -> Result<Tag> {
        let name = validate_name("name", name)?;

        let result = sqlx::query("UPDATE tags SET name = ?, updated_at = ? WHERE id = ?")
            .bind(&name)
            .bind(encode_time(&Utc::now()))
            .bind(id)
            .execute(self.pool)
            .await
            .map_err(|e| ControlError::from_write(e, "tag", &name, "name"))?;

        if result.rows_affected() == 0 {
            return Err(ControlError::not_found("tag", id));
        }

        self.get_by_id(id)
            .await?
            .ok_or_else(|| ControlError::not_found("tag", id))
    }

    /// Delete a tag and detach it from all songs
    pub async fn delete(&self, id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM tags WHERE id = ?")
            .bind(id)
            .execute(self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

fn row_to_tag(row: &SqliteRow) -> Result<Tag> {
    let created_at: String = row.try_get("created_at")?;
    let updated_at: String = row.try_get("updated_at")?;

    Ok(Tag {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        created_at: decode_time("created_at", &created_at)?,
        updated_at: decode_time("updated_at", &updated_at)?,
    })
}
