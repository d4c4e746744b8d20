//! Authentication service with session management
//!
//! Orchestrates account creation, login, token verification and logout.
//! Every issued token is backed by a session row; a token without a live
//! session is rejected even when its JWT is still valid.

use std::sync::Arc;
use std::time::Duration as StdDuration;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use gitadora_control::{Database, NewUser, Session, User};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::claims::{TOKEN_PREFIX, TokenClaims, extract_jwt};
use crate::error::{AuthError, Result};
use crate::password::{hash_password, validate_password, verify_password};
use crate::provider::AuthProvider;
use crate::roles::Role;
use crate::user::UserInfo;

/// Minimum JWT secret length in bytes
pub const MIN_SECRET_LEN: usize = 32;

/// Longest accepted display name, in characters
pub const MAX_DISPLAY_NAME_LEN: usize = 64;

/// Authentication response with token and user info
#[derive(Debug, Clone)]
pub struct AuthResponse {
    /// Session token (gsk_<jwt>)
    pub token: String,
    pub user: UserInfo,
    pub expires_at: DateTime<Utc>,
    pub session_id: String,
}

/// Configuration for the auth service
#[derive(Debug, Clone)]
pub struct AuthServiceConfig {
    /// JWT signing secret (at least 32 bytes)
    pub jwt_secret: Vec<u8>,
    /// Session and token lifetime
    pub session_ttl: StdDuration,
    /// Issuer claim for tokens
    pub issuer: Option<String>,
}

impl Default for AuthServiceConfig {
    fn default() -> Self {
        Self {
            jwt_secret: vec![],
            session_ttl: StdDuration::from_secs(24 * 60 * 60),
            issuer: Some("gitadora".to_string()),
        }
    }
}

impl AuthServiceConfig {
    /// Create a new config with the given secret
    pub fn new(secret: impl Into<Vec<u8>>) -> Self {
        Self {
            jwt_secret: secret.into(),
            ..Default::default()
        }
    }

    pub fn with_ttl(mut self, ttl: StdDuration) -> Self {
        self.session_ttl = ttl;
        self
    }
}

/// Authentication service with session management
///
/// ```ignore
/// let db = Database::open("data/gitadora.db", 5).await?;
/// let auth = AuthService::new(db, AuthServiceConfig::new(secret))?;
///
/// let response = auth.login("user@example.com", "password", None, None).await?;
/// let user = auth.verify_token(&response.token).await?;
/// auth.logout(&response.token).await?;
/// ```
pub struct AuthService {
    db: Database,
    session_ttl: Duration,
    issuer: Option<String>,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
}

impl std::fmt::Debug for AuthService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthService")
            .field("session_ttl", &self.session_ttl)
            .field("issuer", &self.issuer)
            .finish()
    }
}

impl AuthService {
    /// Create a new auth service
    pub fn new(db: Database, config: AuthServiceConfig) -> Result<Self> {
        if config.jwt_secret.len() < MIN_SECRET_LEN {
            return Err(AuthError::Config(format!(
                "JWT secret must be at least {} bytes",
                MIN_SECRET_LEN
            )));
        }

        let session_ttl = Duration::from_std(config.session_ttl)
            .map_err(|e| AuthError::Config(format!("session ttl out of range: {}", e)))?;

        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        validation.validate_nbf = true;
        validation.required_spec_claims.clear();
        if let Some(ref issuer) = config.issuer {
            validation.set_issuer(&[issuer]);
        }

        Ok(Self {
            db,
            session_ttl,
            issuer: config.issuer,
            encoding_key: EncodingKey::from_secret(&config.jwt_secret),
            decoding_key: DecodingKey::from_secret(&config.jwt_secret),
            validation,
        })
    }

    /// The database this service stores users and sessions in
    pub fn database(&self) -> &Database {
        &self.db
    }

    // =========================================================================
    // Accounts
    // =========================================================================

    /// Whether no user exists yet
    pub async fn needs_setup(&self) -> Result<bool> {
        Ok(self.db.users().count().await? == 0)
    }

    /// Create the first admin account
    ///
    /// Fails with `SetupCompleted` once any user exists.
    pub async fn setup_admin(
        &self,
        email: &str,
        display_name: &str,
        password: &str,
    ) -> Result<UserInfo> {
        // Skips hashing once setup is done
        if !self.needs_setup().await? {
            return Err(AuthError::SetupCompleted);
        }
        let new_user = new_account(email, display_name, password, Role::Admin)?;

        // Emptiness is checked by the insert itself; a separate count would
        // race with concurrent setup requests.
        let user = self
            .db
            .users()
            .create_first(&new_user)
            .await?
            .ok_or(AuthError::SetupCompleted)?;

        Ok(UserInfo::from(&user))
    }

    /// Create an account
    ///
    /// The email is trimmed and lowercased. A blank display name falls back
    /// to the local part of the email.
    pub async fn create_user(
        &self,
        email: &str,
        display_name: &str,
        password: &str,
        role: Role,
    ) -> Result<UserInfo> {
        let new_user = new_account(email, display_name, password, role)?;
        let user = self.db.users().create(&new_user).await?;

        Ok(UserInfo::from(&user))
    }

    // =========================================================================
    // Sessions
    // =========================================================================

    /// Login with email and password
    ///
    /// Verifies credentials, creates a session, and returns its token.
    pub async fn login(
        &self,
        email: &str,
        password: &str,
        ip_address: Option<&str>,
        user_agent: Option<&str>,
    ) -> Result<AuthResponse> {
        let email = email.trim().to_lowercase();
        let users = self.db.users();

        let user = users
            .get_by_email(&email)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        if !verify_password(password, &user.password_hash)? {
            debug!(user_id = user.id, "Password mismatch");
            return Err(AuthError::InvalidCredentials);
        }

        let (token, claims) = self.generate_token(&user)?;

        let session = Session::new(user.id, &token, self.session_ttl)
            .with_client(ip_address.map(String::from), user_agent.map(String::from));
        users.create_session(&session).await?;
        users.touch_last_login(user.id).await?;

        info!(user_id = user.id, session_id = %session.id, "User logged in");

        Ok(AuthResponse {
            token,
            user: UserInfo::from(&user),
            expires_at: DateTime::from_timestamp(claims.expires_at, 0)
                .unwrap_or(session.expires_at),
            session_id: session.id,
        })
    }

    /// Verify a token and return the current user
    ///
    /// Checks the token format, the JWT signature and timing, then that the
    /// session still exists and is unexpired. Role and name come from the
    /// stored user, not from the token.
    pub async fn verify_token(&self, token: &str) -> Result<UserInfo> {
        if token.is_empty() {
            return Err(AuthError::MissingToken);
        }

        let jwt = extract_jwt(token).ok_or(AuthError::InvalidTokenFormat)?;
        let claims = self.validate_jwt(jwt)?;
        let users = self.db.users();

        let session = users
            .get_session_by_token(token)
            .await?
            .ok_or(AuthError::SessionNotFound)?;

        if session.is_expired() {
            users.delete_session(token).await?;
            return Err(AuthError::SessionExpired);
        }

        if session.user_id != claims.user_id {
            return Err(AuthError::InvalidClaims("session belongs to another user".into()));
        }

        let user = users
            .get_by_id(claims.user_id)
            .await?
            .ok_or(AuthError::UserNotFound)?;

        Ok(UserInfo::from(&user))
    }

    /// Logout: delete the session behind a token
    ///
    /// Returns `false` when there was no such session.
    pub async fn logout(&self, token: &str) -> Result<bool> {
        let deleted = self.db.users().delete_session(token).await?;
        if deleted {
            info!("User logged out");
        }
        Ok(deleted)
    }

    /// Delete every session of a user
    pub async fn logout_all(&self, user_id: i64) -> Result<u64> {
        let count = self.db.users().delete_sessions_for_user(user_id).await?;
        info!(user_id, sessions = count, "Logged out from all devices");
        Ok(count)
    }

    /// Remove expired sessions
    pub async fn cleanup(&self) -> Result<u64> {
        Ok(self.db.users().cleanup_expired_sessions().await?)
    }

    /// Start a background cleanup task
    ///
    /// Returns a shutdown sender; send on it or drop it to stop the task.
    pub fn start_cleanup_task(
        self: &Arc<Self>,
        interval: StdDuration,
    ) -> (watch::Sender<()>, tokio::task::JoinHandle<()>) {
        let (shutdown_tx, mut shutdown_rx) = watch::channel(());
        let service = Arc::clone(self);

        let handle = tokio::spawn(async move {
            info!("Session cleanup task started (interval: {:?})", interval);

            loop {
                tokio::select! {
                    _ = tokio::time::sleep(interval) => {
                        match service.cleanup().await {
                            Ok(count) => debug!(count, "Session cleanup completed"),
                            Err(e) => warn!("Session cleanup failed: {}", e),
                        }
                    }
                    _ = shutdown_rx.changed() => {
                        info!("Session cleanup task shutting down");
                        break;
                    }
                }
            }
        });

        (shutdown_tx, handle)
    }

    // =========================================================================
    // Internal methods
    // =========================================================================

    fn generate_token(&self, user: &User) -> Result<(String, TokenClaims)> {
        let now = Utc::now();
        let expires_at = now + self.session_ttl;

        let claims = TokenClaims {
            token_id: uuid::Uuid::new_v4().to_string(),
            user_id: user.id,
            email: user.email.clone(),
            role: user.role.clone(),
            subject: Some(user.id.to_string()),
            expires_at: expires_at.timestamp(),
            issued_at: now.timestamp(),
            not_before: Some(now.timestamp()),
            issuer: self.issuer.clone(),
        };

        let jwt = encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| AuthError::InvalidClaims(format!("failed to encode JWT: {}", e)))?;

        Ok((format!("{}{}", TOKEN_PREFIX, jwt), claims))
    }

    fn validate_jwt(&self, jwt: &str) -> Result<TokenClaims> {
        let token_data =
            decode::<TokenClaims>(jwt, &self.decoding_key, &self.validation).map_err(|e| {
                debug!("JWT validation failed: {:?}", e);
                match e.kind() {
                    jsonwebtoken::errors::ErrorKind::ExpiredSignature => AuthError::TokenExpired,
                    jsonwebtoken::errors::ErrorKind::ImmatureSignature => {
                        AuthError::TokenNotYetValid
                    }
                    jsonwebtoken::errors::ErrorKind::InvalidSignature => {
                        AuthError::InvalidSignature
                    }
                    _ => AuthError::InvalidClaims(e.to_string()),
                }
            })?;

        Ok(token_data.claims)
    }
}

#[async_trait]
impl AuthProvider for AuthService {
    async fn validate(&self, token: &str) -> Result<UserInfo> {
        self.verify_token(token).await
    }

    fn name(&self) -> &'static str {
        "session"
    }
}

/// Validate account input and hash the password
fn new_account(email: &str, display_name: &str, password: &str, role: Role) -> Result<NewUser> {
    let email = normalize_email(email)?;
    let display_name = normalize_display_name(display_name, &email)?;
    validate_password(password)?;

    Ok(NewUser {
        email,
        display_name,
        password_hash: hash_password(password)?,
        role: role.as_str().to_string(),
    })
}

fn normalize_email(email: &str) -> Result<String> {
    let email = email.trim().to_lowercase();

    let valid = email.len() <= 254
        && email
            .split_once('@')
            .is_some_and(|(local, domain)| !local.is_empty() && !domain.is_empty() && !domain.contains('@'));

    if !valid {
        return Err(AuthError::invalid_input("email", "must look like name@host"));
    }
    Ok(email)
}

fn normalize_display_name(display_name: &str, email: &str) -> Result<String> {
    let name = match display_name.trim() {
        "" => email.split('@').next().unwrap_or(email),
        name => name,
    };

    if name.chars().count() > MAX_DISPLAY_NAME_LEN {
        return Err(AuthError::invalid_input(
            "display_name",
            format!("must be at most {} characters", MAX_DISPLAY_NAME_LEN),
        ));
    }
    Ok(name.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{TEST_SECRET, create_test_token_with_options, test_service};
    use gitadora_control::ControlError;

    #[tokio::test]
    async fn test_login_and_verify() {
        let service = test_service().await;
        service
            .create_user("Test@Example.com ", "Tester", "password123", Role::User)
            .await
            .unwrap();

        let response = service
            .login("test@example.com", "password123", Some("127.0.0.1"), None)
            .await
            .unwrap();

        assert!(response.token.starts_with("gsk_"));
        assert_eq!(response.user.email, "test@example.com");
        assert_eq!(response.user.parsed_role(), Role::User);
        assert!(response.expires_at > Utc::now());

        let user = service.verify_token(&response.token).await.unwrap();
        assert_eq!(user.display_name, "Tester");

        let stored = service.database().users().get_by_id(user.id).await.unwrap().unwrap();
        assert!(stored.last_login.is_some());
    }

    #[tokio::test]
    async fn test_login_invalid_credentials() {
        let service = test_service().await;
        service
            .create_user("test@example.com", "", "password123", Role::User)
            .await
            .unwrap();

        let wrong = service.login("test@example.com", "wrong_password", None, None).await;
        assert!(matches!(wrong, Err(AuthError::InvalidCredentials)));

        let missing = service.login("nobody@example.com", "password123", None, None).await;
        assert!(matches!(missing, Err(AuthError::InvalidCredentials)));
    }

    #[tokio::test]
    async fn test_logout() {
        let service = test_service().await;
        service
            .create_user("test@example.com", "", "password123", Role::User)
            .await
            .unwrap();
        let response = service
            .login("test@example.com", "password123", None, None)
            .await
            .unwrap();

        assert!(service.logout(&response.token).await.unwrap());
        assert!(!service.logout(&response.token).await.unwrap());

        let result = service.verify_token(&response.token).await;
        assert!(matches!(result, Err(AuthError::SessionNotFound)));
    }

    #[tokio::test]
    async fn test_logout_all() {
        let service = test_service().await;
        let user = service
            .create_user("test@example.com", "", "password123", Role::User)
            .await
            .unwrap();
        let first = service.login("test@example.com", "password123", None, None).await.unwrap();
        let second = service.login("test@example.com", "password123", None, None).await.unwrap();

        assert_eq!(service.logout_all(user.id).await.unwrap(), 2);
        assert!(service.verify_token(&first.token).await.is_err());
        assert!(service.verify_token(&second.token).await.is_err());
    }

    #[tokio::test]
    async fn test_role_change_applies_to_live_session() {
        let service = test_service().await;
        let user = service
            .create_user("test@example.com", "", "password123", Role::User)
            .await
            .unwrap();
        let response = service.login("test@example.com", "password123", None, None).await.unwrap();

        service
            .database()
            .users()
            .update_role(user.id, Role::Admin.as_str())
            .await
            .unwrap();

        let verified = service.verify_token(&response.token).await.unwrap();
        assert!(verified.is_admin());
    }

    #[tokio::test]
    async fn test_deleted_user_token_rejected() {
        let service = test_service().await;
        let user = service
            .create_user("test@example.com", "", "password123", Role::User)
            .await
            .unwrap();
        let response = service.login("test@example.com", "password123", None, None).await.unwrap();

        service.database().users().delete(user.id).await.unwrap();

        assert!(service.verify_token(&response.token).await.is_err());
    }

    #[tokio::test]
    async fn test_setup_only_once() {
        let service = test_service().await;
        assert!(service.needs_setup().await.unwrap());

        let admin = service
            .setup_admin("admin@example.com", "Admin", "password123")
            .await
            .unwrap();
        assert!(admin.is_admin());
        assert!(!service.needs_setup().await.unwrap());

        let again = service
            .setup_admin("other@example.com", "Other", "password123")
            .await;
        assert!(matches!(again, Err(AuthError::SetupCompleted)));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_setup_creates_one_admin() {
        let dir = tempfile::tempdir().unwrap();
        let db = Database::open(dir.path().join("gitadora.db"), 5).await.unwrap();
        let service = Arc::new(AuthService::new(db, AuthServiceConfig::new(TEST_SECRET)).unwrap());

        let mut handles = Vec::new();
        for i in 0..4 {
            let service = Arc::clone(&service);
            handles.push(tokio::spawn(async move {
                service
                    .setup_admin(&format!("admin{i}@example.com"), "", "password123")
                    .await
            }));
        }

        let mut created = 0;
        for handle in handles {
            match handle.await.unwrap() {
                Ok(_) => created += 1,
                Err(e) => assert!(matches!(e, AuthError::SetupCompleted), "{e}"),
            }
        }

        assert_eq!(created, 1);
        let users = service.database().users();
        assert_eq!(users.count().await.unwrap(), 1);
        assert_eq!(users.count_with_role("admin").await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_create_user_validation() {
        let service = test_service().await;

        let bad_email = service.create_user("not-an-email", "", "password123", Role::User).await;
        assert!(matches!(bad_email, Err(AuthError::InvalidInput { field: "email", .. })));

        let short = service.create_user("a@example.com", "", "short", Role::User).await;
        assert!(matches!(short, Err(AuthError::InvalidInput { field: "password", .. })));

        let user = service
            .create_user("a@example.com", "  ", "password123", Role::User)
            .await
            .unwrap();
        assert_eq!(user.display_name, "a");

        let dup = service.create_user("A@example.com", "", "password123", Role::User).await;
        assert!(matches!(
            dup,
            Err(AuthError::Store(ControlError::AlreadyExists { .. }))
        ));
    }

    #[tokio::test]
    async fn test_malformed_tokens() {
        let service = test_service().await;

        assert!(matches!(service.verify_token("").await, Err(AuthError::MissingToken)));
        assert!(matches!(
            service.verify_token("not_a_gsk_token").await,
            Err(AuthError::InvalidTokenFormat)
        ));
        assert!(matches!(
            service.verify_token("gsk_garbage.garbage.garbage").await,
            Err(AuthError::InvalidClaims(_))
        ));
    }

    #[tokio::test]
    async fn test_foreign_signature_rejected() {
        let service = test_service().await;
        let token = create_test_token_with_options(
            1,
            Role::Admin,
            b"another-secret-key-that-is-32-bytes!",
            Duration::hours(1),
        );

        let result = service.verify_token(&token).await;
        assert!(matches!(result, Err(AuthError::InvalidSignature)));
    }

    #[tokio::test]
    async fn test_expired_token_rejected() {
        let service = test_service().await;
        let token = create_test_token_with_options(1, Role::User, TEST_SECRET, Duration::hours(-2));

        let result = service.verify_token(&token).await;
        assert!(matches!(result, Err(AuthError::TokenExpired)));
    }

    #[tokio::test]
    async fn test_signed_token_without_session_rejected() {
        let service = test_service().await;
        let user = service
            .create_user("test@example.com", "", "password123", Role::User)
            .await
            .unwrap();
        let token = create_test_token_with_options(user.id, Role::User, TEST_SECRET, Duration::hours(1));

        let result = service.verify_token(&token).await;
        assert!(matches!(result, Err(AuthError::SessionNotFound)));
    }

    #[tokio::test]
    async fn test_short_secret_rejected() {
        let db = Database::in_memory().await.unwrap();
        let result = AuthService::new(db, AuthServiceConfig::new(b"short".to_vec()));
        assert!(matches!(result, Err(AuthError::Config(_))));
    }

    #[tokio::test]
    async fn test_cleanup_removes_expired_sessions() {
        let service = test_service().await;
        let user = service
            .create_user("test@example.com", "", "password123", Role::User)
            .await
            .unwrap();
        service
            .database()
            .users()
            .create_session(&Session::new(user.id, "gsk_stale", Duration::hours(-1)))
            .await
            .unwrap();

        assert_eq!(service.cleanup().await.unwrap(), 1);
    }

    #[test]
    fn test_normalize_email() {
        assert_eq!(normalize_email(" Foo@Bar.COM ").unwrap(), "foo@bar.com");
        assert!(normalize_email("@bar.com").is_err());
        assert!(normalize_email("foo@").is_err());
        assert!(normalize_email("a@b@c").is_err());
    }
}
