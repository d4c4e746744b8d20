//! Audit logging
//!
//! Security-relevant operations are logged to the `audit` tracing target:
//! logins, account changes, catalog mutations and play submissions.
//!
//! # Example log entry
//!
//! ```json
//! {
//!   "level": "INFO",
//!   "target": "audit",
//!   "action": "catalog.create",
//!   "user_id": 1,
//!   "resource": "song",
//!   "resource_id": 42
//! }
//! ```

use axum::{body::Body, extract::Request, middleware::Next, response::Response};
use tracing::{Instrument, warn};

use crate::ratelimit::client_ip;

/// Audit event action types
#[derive(Debug, Clone, Copy)]
pub enum AuditAction {
    // Auth
    Setup,
    Register,
    LoginSuccess,
    LoginFailure,
    Logout,

    // Catalog
    Create,
    Update,
    Delete,

    // Skill data
    RecordsSubmit,
    SnapshotCreate,

    // Admin
    UserCreate,
    UserDelete,
    RoleChange,
}

impl AuditAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Setup => "auth.setup",
            Self::Register => "auth.register",
            Self::LoginSuccess => "auth.login.success",
            Self::LoginFailure => "auth.login.failure",
            Self::Logout => "auth.logout",
            Self::Create => "catalog.create",
            Self::Update => "catalog.update",
            Self::Delete => "catalog.delete",
            Self::RecordsSubmit => "skill.records.submit",
            Self::SnapshotCreate => "skill.snapshot.create",
            Self::UserCreate => "user.create",
            Self::UserDelete => "user.delete",
            Self::RoleChange => "user.role_change",
        }
    }
}

/// Log an audit event (call from handlers for business-level events)
#[macro_export]
macro_rules! audit {
    ($action:expr, $($field:tt)*) => {
        tracing::info!(
            target: "audit",
            action = $action.as_str(),
            $($field)*
        )
    };
}

/// Log a failed audit event
#[macro_export]
macro_rules! audit_fail {
    ($action:expr, $reason:expr, $($field:tt)*) => {
        tracing::warn!(
            target: "audit",
            action = $action.as_str(),
            status = "failure",
            reason = $reason,
            $($field)*
        )
    };
}

/// Middleware that wraps every request in an audit span
///
/// The span carries method, path and client IP; handlers add events with
/// the `audit!` macro. Error responses are logged when the request ends.
pub async fn audit_layer(request: Request<Body>, next: Next) -> Response {
    let client_ip = client_ip(request.headers())
        .map(|ip| ip.to_string())
        .unwrap_or_else(|| "unknown".to_string());

    let span = tracing::info_span!(
        target: "audit",
        "request",
        method = %request.method(),
        path = %request.uri().path(),
        client_ip = %client_ip,
    );

    async move {
        let response = next.run(request).await;

        let status = response.status();
        if status.is_client_error() || status.is_server_error() {
            warn!(
                target: "audit",
                status = %status.as_u16(),
                "request_completed"
            );
        }

        response
    }
    .instrument(span)
    .await
}
