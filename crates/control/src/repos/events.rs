//! Event repository

use chrono::{DateTime, Utc};
use sqlx::sqlite::{SqlitePool, SqliteRow};
use sqlx::Row;
use tracing::info;

use crate::db::{decode_time, encode_time};
use crate::error::{ControlError, Result};
use crate::models::{Event, EventInput};

const COLUMNS: &str =
    "id, title, description, version_id, starts_at, ends_at, created_at, updated_at";

/// Event repository
pub struct EventRepo<'a> {
    pool: &'a SqlitePool,
}

impl<'a> EventRepo<'a> {
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Create an event
    pub async fn create(&self, input: &EventInput) -> Result<Event> {
        let input = input.validated()?;
        let now = Utc::now();

        let result = sqlx::query(
            r#"
            INSERT INTO events (title, description, version_id, starts_at, ends_at, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&input.title)
        .bind(input.description.as_deref())
        .bind(input.version_id)
        .bind(encode_time(&input.starts_at))
        .bind(encode_time(&input.ends_at))
        .bind(encode_time(&now))
        .bind(encode_time(&now))
        .execute(self.pool)
        .await
        .map_err(|e| ControlError::from_write(e, "event", &input.title, "version_id"))?;

        let id = result.last_insert_rowid();
        info!(event_id = id, title = %input.title, "Created event");

        Ok(Event {
            id,
            title: input.title,
            description: input.description,
            version_id: input.version_id,
            starts_at: input.starts_at,
            ends_at: input.ends_at,
            created_at: now,
            updated_at: now,
        })
    }

    pub async fn get_by_id(&self, id: i64) -> Result<Option<Event>> {
        let row = sqlx::query(&format!("SELECT {COLUMNS} FROM events WHERE id = ?"))
            .bind(id)
            .fetch_optional(self.pool)
            .await?;

        row.as_ref().map(row_to_event).transpose()
    }

    /// List events, latest start first
    pub async fn list(&self) -> Result<Vec<Event>> {
        let rows = sqlx::query(&format!(
            "SELECT {COLUMNS} FROM events ORDER BY starts_at DESC, id DESC"
        ))
        .fetch_all(self.pool)
        .await?;

        rows.iter().map(row_to_event).collect()
    }

    /// Events running at `at` (start and end inclusive)
    pub async fn list_active(&self, at: DateTime<Utc>) -> Result<Vec<Event>> {
        let at = encode_time(&at);
        let rows = sqlx::query(&format!(
            "SELECT {COLUMNS} FROM events WHERE starts_at <= ? AND ends_at >= ? ORDER BY starts_at DESC, id DESC"
        ))
        .bind(&at)
        .bind(&at)
        .fetch_all(self.pool)
        .await?;

        rows.iter().map(row_to_event).collect()
    }

    pub async fn update(&self, id: i64, input: &EventInput) -> Result<Event> {
        let input = input.validated()?;

        let result = sqlx::query(
            r#"
            UPDATE events
            SET title = ?, description = ?, version_id = ?, starts_at = ?, ends_at = ?, updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(&input.title)
        .bind(input.description.as_deref())
        .bind(input.version_id)
        .bind(encode_time(&input.starts_at))
        .bind(encode_time(&input.ends_at))
        .bind(encode_time(&Utc::now()))
        .bind(id)
        .execute(self.pool)
        .await
        .map_err(|e| ControlError::from_write(e, "event", &input.title, "version_id"))?;

        if result.rows_affected() == 0 {
            return Err(ControlError::not_found("event", id));
        }

        self.get_by_id(id)
            .await?
            .ok_or_else(|| ControlError::not_found("event", id))
    }

    pub async fn delete(&self, id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM events WHERE id = ?")
            .bind(id)
            .execute(self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

fn row_to_event(row: &SqliteRow) -> Result<Event> {
    let starts_at: String = row.try_get("starts_at")?;
    let ends_at: String = row.try_get("ends_at")?;
    let created_at: String = row.try_get("created_at")?;
    let updated_at: String = row.try_get("updated_at")?;

    Ok(Event {
        id: row.try_get("id")?,
        title: row.try_get("title")?,
        description: row.try_get("description")?,
        version_id: row.try_get("version_id")?,
        starts_at: decode_time("starts_at", &starts_at)?,
        ends_at: decode_time("ends_at", &ends_at)?,
        created_at: decode_time("created_at", &created_at)?,
        updated_at: decode_time("updated_at", &updated_at)?,
    })
}
