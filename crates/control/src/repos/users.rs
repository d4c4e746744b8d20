//! User repository
//!
//! Users and their login sessions.

use chrono::Utc;
use sqlx::sqlite::{SqlitePool, SqliteRow};
use sqlx::Row;
use tracing::{debug, info};

use crate::db::{decode_time, encode_time};
use crate::error::{ControlError, Result};
use crate::models::{NewUser, Session, User};

const USER_COLUMNS: &str = "id, email, display_name, password_hash, role, created_at, last_login";
const SESSION_COLUMNS: &str = "id, user_id, token, expires_at, created_at, ip_address, user_agent";

/// Role string that the admin guards protect
const ADMIN_ROLE: &str = "admin";

/// Outcome of a write that must leave at least one admin behind
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdminGuarded {
    Applied,
    NotFound,
    /// Refused: the target is the only remaining admin
    LastAdmin,
}

/// User repository
pub struct UserRepo<'a> {
    pool: &'a SqlitePool,
}

impl<'a> UserRepo<'a> {
    /// Create a new user repository
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    // =========================================================================
    // User CRUD
    // =========================================================================

    /// Insert a user and return it with its assigned id
    pub async fn create(&self, user: &NewUser) -> Result<User> {
        let now = Utc::now();

        let result = sqlx::query(
            r#"
            INSERT INTO users (email, display_name, password_hash, role, created_at)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(&user.email)
        .bind(&user.display_name)
        .bind(&user.password_hash)
        .bind(&user.role)
        .bind(encode_time(&now))
        .execute(self.pool)
        .await
        .map_err(|e| ControlError::from_write(e, "user", &user.email, "email"))?;

        let id = result.last_insert_rowid();
        info!(user_id = id, role = %user.role, "Created user");

        Ok(User {
            id,
            email: user.email.clone(),
            display_name: user.display_name.clone(),
            password_hash: user.password_hash.clone(),
            role: user.role.clone(),
            created_at: now,
            last_login: None,
        })
    }

    /// Insert a user only if the table is empty
    ///
    /// The emptiness check and the insert are one statement, so concurrent
    /// callers cannot both succeed. Returns `None` when a user already exists.
    pub async fn create_first(&self, user: &NewUser) -> Result<Option<User>> {
        let now = Utc::now();

        let result = sqlx::query(
            r#"
            INSERT INTO users (email, display_name, password_hash, role, created_at)
            SELECT ?, ?, ?, ?, ?
            WHERE NOT EXISTS (SELECT 1 FROM users)
            "#,
        )
        .bind(&user.email)
        .bind(&user.display_name)
        .bind(&user.password_hash)
        .bind(&user.role)
        .bind(encode_time(&now))
        .execute(self.pool)
        .await
        .map_err(|e| ControlError::from_write(e, "user", &user.email, "email"))?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }

        let id = result.last_insert_rowid();
        info!(user_id = id, role = %user.role, "Created first user");

        Ok(Some(User {
            id,
            email: user.email.clone(),
            display_name: user.display_name.clone(),
            password_hash: user.password_hash.clone(),
            role: user.role.clone(),
            created_at: now,
            last_login: None,
        }))
    }

    /// Get a user by id
    pub async fn get_by_id(&self, id: i64) -> Result<Option<User>> {
        let row = sqlx::query(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?"))
            .bind(id)
            .fetch_optional(self.pool)
            .await?;

        row.as_ref().map(row_to_user).transpose()
    }

    /// Get a user by email
    pub async fn get_by_email(&self, email: &str) -> Result<Option<User>> {
        let row = sqlx::query(&format!("SELECT {USER_COLUMNS} FROM users WHERE email = ?"))
            .bind(email)
            .fetch_optional(self.pool)
            .await?;

        row.as_ref().map(row_to_user).transpose()
    }

    /// List all users, oldest first
    pub async fn list(&self) -> Result<Vec<User>> {
        let rows = sqlx::query(&format!("SELECT {USER_COLUMNS} FROM users ORDER BY id"))
            .fetch_all(self.pool)
            .await?;

        rows.iter().map(row_to_user).collect()
    }

    /// Count users
    pub async fn count(&self) -> Result<u64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
            .fetch_one(self.pool)
            .await?;
        Ok(count as u64)
    }

    /// Count users with a given role
    pub async fn count_with_role(&self, role: &str) -> Result<u64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE role = ?")
            .bind(role)
            .fetch_one(self.pool)
            .await?;
        Ok(count as u64)
    }

    /// Change a user's role
    ///
    /// Returns `false` when the user does not exist.
    pub async fn update_role(&self, id: i64, role: &str) -> Result<bool> {
        let result = sqlx::query("UPDATE users SET role = ? WHERE id = ?")
            .bind(role)
            .bind(id)
            .execute(self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Change a user's role unless that would leave no admin
    pub async fn update_role_keeping_admin(&self, id: i64, role: &str) -> Result<AdminGuarded> {
        let result = sqlx::query(
            r#"
            UPDATE users SET role = ?1
            WHERE id = ?2
              AND (?1 = ?3 OR role != ?3
                   OR (SELECT COUNT(*) FROM users WHERE role = ?3) > 1)
            "#,
        )
        .bind(role)
        .bind(id)
        .bind(ADMIN_ROLE)
        .execute(self.pool)
        .await?;

        self.guarded_outcome(id, result.rows_affected()).await
    }

    /// Stamp the last login time
    pub async fn touch_last_login(&self, id: i64) -> Result<()> {
        sqlx::query("UPDATE users SET last_login = ? WHERE id = ?")
            .bind(encode_time(&Utc::now()))
            .bind(id)
            .execute(self.pool)
            .await?;
        Ok(())
    }

    /// Delete a user together with their sessions and skill data
    ///
    /// Returns `false` when the user does not exist.
    pub async fn delete(&self, id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM users WHERE id = ?")
            .bind(id)
            .execute(self.pool)
            .await?;

        let deleted = result.rows_affected() > 0;
        if deleted {
            info!(user_id = id, "Deleted user");
        }
        Ok(deleted)
    }

    /// Delete a user unless they are the only admin
    pub async fn delete_keeping_admin(&self, id: i64) -> Result<AdminGuarded> {
        let result = sqlx::query(
            r#"
            DELETE FROM users
            WHERE id = ?1
              AND (role != ?2 OR (SELECT COUNT(*) FROM users WHERE role = ?2) > 1)
            "#,
        )
        .bind(id)
        .bind(ADMIN_ROLE)
        .execute(self.pool)
        .await?;

        let outcome = self.guarded_outcome(id, result.rows_affected()).await?;
        if outcome == AdminGuarded::Applied {
            info!(user_id = id, "Deleted user");
        }
        Ok(outcome)
    }

    async fn guarded_outcome(&self, id: i64, rows_affected: u64) -> Result<AdminGuarded> {
        if rows_affected > 0 {
            return Ok(AdminGuarded::Applied);
        }
        let exists: Option<i64> = sqlx::query_scalar("SELECT id FROM users WHERE id = ?")
            .bind(id)
            .fetch_optional(self.pool)
            .await?;
        Ok(match exists {
            Some(_) => AdminGuarded::LastAdmin,
            None => AdminGuarded::NotFound,
        })
    }

    // =========================================================================
    // Session Management
    // =========================================================================

    /// Store a new session
    pub async fn create_session(&self, session: &Session) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO auth_sessions (id, user_id, token, expires_at, created_at, ip_address, user_agent)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&session.id)
        .bind(session.user_id)
        .bind(&session.token)
        .bind(encode_time(&session.expires_at))
        .bind(encode_time(&session.created_at))
        .bind(session.ip_address.as_deref())
        .bind(session.user_agent.as_deref())
        .execute(self.pool)
        .await
        .map_err(|e| ControlError::from_write(e, "session", &session.id, "user_id"))?;

        debug!(user_id = session.user_id, "Created session");
        Ok(())
    }

    /// Get session by token
    pub async fn get_session_by_token(&self, token: &str) -> Result<Option<Session>> {
        let row = sqlx::query(&format!(
            "SELECT {SESSION_COLUMNS} FROM auth_sessions WHERE token = ?"
        ))
        .bind(token)
        .fetch_optional(self.pool)
        .await?;

        row.as_ref().map(row_to_session).transpose()
    }

    /// Delete session by token
    pub async fn delete_session(&self, token: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM auth_sessions WHERE token = ?")
            .bind(token)
            .execute(self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Delete all sessions for a user
    pub async fn delete_sessions_for_user(&self, user_id: i64) -> Result<u64> {
        let result = sqlx::query("DELETE FROM auth_sessions WHERE user_id = ?")
            .bind(user_id)
            .execute(self.pool)
            .await?;

        Ok(result.rows_affected())
    }

    /// Remove sessions past their expiry
    pub async fn cleanup_expired_sessions(&self) -> Result<u64> {
        let result = sqlx::query("DELETE FROM auth_sessions WHERE expires_at < ?")
            .bind(encode_time(&Utc::now()))
            .execute(self.pool)
            .await?;

        let count = result.rows_affected();
        if count > 0 {
            debug!(count, "Cleaned up expired sessions");
        }
        Ok(count)
    }
}

fn row_to_user(row: &SqliteRow) -> Result<User> {
    let created_at: String = row.try_get("created_at")?;
    let last_login: Option<String> = row.try_get("last_login")?;

    Ok(User {
        id: row.try_get("id")?,
        email: row.try_get("email")?,
        display_name: row.try_get("display_name")?,
        password_hash: row.try_get("password_hash")?,
        role: row.try_get("role")?,
        created_at: decode_time("created_at", &created_at)?,
        last_login: last_login
            .as_deref()
            .map(|s| decode_time("last_login", s))
            .transpose()?,
    })
}

fn row_to_session(row: &SqliteRow) -> Result<Session> {
    let expires_at: String = row.try_get("expires_at")?;
    let created_at: String = row.try_get("created_at")?;

    Ok(Session {
        id: row.try_get("id")?,
        user_id: row.try_get("user_id")?,
        token: row.try_get("token")?,
        expires_at: decode_time("expires_at", &expires_at)?,
        created_at: decode_time("created_at", &created_at)?,
        ip_address: row.try_get("ip_address")?,
        user_agent: row.try_get("user_agent")?,
    })
}
