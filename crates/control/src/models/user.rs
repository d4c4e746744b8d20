//! User and session models

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

/// Stored user record
///
/// The user id doubles as the player id on skill data.
#[derive(Debug, Clone, Serialize)]
pub struct User {
    pub id: i64,
    /// Email address (unique)
    pub email: String,
    /// Name shown on the ranking list
    pub display_name: String,
    /// Argon2 password hash
    #[serde(skip_serializing)]
    pub password_hash: String,
    /// Global role ("admin" or "user")
    pub role: String,
    pub created_at: DateTime<Utc>,
    pub last_login: Option<DateTime<Utc>>,
}

/// Fields needed to create a user
#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub display_name: String,
    pub password_hash: String,
    pub role: String,
}

/// Login session
#[derive(Debug, Clone)]
pub struct Session {
    /// Session ID (UUID)
    pub id: String,
    pub user_id: i64,
    /// Token handed to the client
    pub token: String,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
}

impl Session {
    /// Create a session that expires after `ttl`
    pub fn new(user_id: i64, token: impl Into<String>, ttl: Duration) -> Self {
        let now = Utc::now();
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            user_id,
            token: token.into(),
            expires_at: now + ttl,
            created_at: now,
            ip_address: None,
            user_agent: None,
        }
    }

    /// Attach client metadata
    pub fn with_client(mut self, ip_address: Option<String>, user_agent: Option<String>) -> Self {
        self.ip_address = ip_address;
        self.user_agent = user_agent;
        self
    }

    pub fn is_expired(&self) -> bool {
        self.expires_at <= Utc::now()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_expiry() {
        let live = Session::new(1, "t", Duration::hours(1));
        assert!(!live.is_expired());

        let dead = Session::new(1, "t", Duration::seconds(-1));
        assert!(dead.is_expired());
    }

    #[test]
    fn test_password_hash_not_serialized() {
        let user = User {
            id: 1,
            email: "a@example.com".into(),
            display_name: "A".into(),
            password_hash: "$argon2id$secret".into(),
            role: "user".into(),
            created_at: Utc::now(),
            last_login: None,
        };
        let json = serde_json::to_string(&user).unwrap();
        assert!(!json.contains("argon2"));
    }
}
