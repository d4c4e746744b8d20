//! Application state
//!
//! Shared state for API handlers: the database, the auth service, and the
//! settings that change handler behavior. Everything is injected; handlers
//! never reach for globals.

use std::sync::Arc;

use gitadora_auth::{AuthProvider, AuthService};
use gitadora_control::Database;
use gitadora_skill::SkillAggregator;

use crate::auth::HasAuthProvider;

/// Handler-visible settings
#[derive(Debug, Clone)]
pub struct ApiSettings {
    /// Allow `POST /api/v1/auth/register`
    pub allow_registration: bool,
    /// Mark the session cookie `Secure`
    pub secure_cookies: bool,
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self {
            allow_registration: true,
            secure_cookies: false,
        }
    }
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Users, catalog and skill data
    pub db: Database,
    /// Login, logout and token verification
    pub auth: Arc<AuthService>,
    /// Skill computation for players
    pub aggregator: SkillAggregator,
    pub settings: ApiSettings,
}

impl AppState {
    /// Create state over the auth service's database
    pub fn new(auth: Arc<AuthService>) -> Self {
        Self {
            db: auth.database().clone(),
            auth,
            aggregator: SkillAggregator::new(),
            settings: ApiSettings::default(),
        }
    }

    /// Replace the handler settings
    pub fn with_settings(mut self, settings: ApiSettings) -> Self {
        self.settings = settings;
        self
    }
}

impl HasAuthProvider for AppState {
    fn auth_provider(&self) -> Arc<dyn AuthProvider> {
        Arc::clone(&self.auth) as Arc<dyn AuthProvider>
    }
}
