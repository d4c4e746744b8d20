//! User management endpoints
//!
//! # Routes
//!
//! - `GET /api/v1/admin/users` - List all users
//! - `POST /api/v1/admin/users` - Create a user with a chosen role
//! - `PUT /api/v1/admin/users/{id}/role` - Change a user's role
//! - `DELETE /api/v1/admin/users/{id}` - Delete a user and their skill data

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::{delete, get, put},
};
use chrono::{DateTime, Utc};
use gitadora_auth::Role;
use gitadora_control::{AdminGuarded, User};
use serde::{Deserialize, Serialize};

use crate::audit::AuditAction;
use crate::auth::{Auth, CanAdmin};
use crate::error::{ApiError, Result};
use crate::state::AppState;
use crate::types::{ListResponse, parse_id};

// =============================================================================
// Routes
// =============================================================================

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/users", get(list_users).post(create_user))
        .route("/users/{id}", delete(delete_user))
        .route("/users/{id}/role", put(update_role))
}

// =============================================================================
// Request/Response types
// =============================================================================

/// User as seen by administrators
#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub id: i64,
    pub email: String,
    pub display_name: String,
    pub role: String,
    pub created_at: DateTime<Utc>,
    pub last_login: Option<DateTime<Utc>>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            email: user.email,
            display_name: user.display_name,
            role: user.role,
            created_at: user.created_at,
            last_login: user.last_login,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct CreateUserRequest {
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub display_name: String,
    #[serde(default = "default_role")]
    pub role: String,
}

fn default_role() -> String {
    Role::User.as_str().to_string()
}

#[derive(Debug, Deserialize)]
pub struct UpdateRoleRequest {
    pub role: String,
}

// =============================================================================
// Handlers
// =============================================================================

/// GET /api/v1/admin/users
async fn list_users(
    _auth: Auth<CanAdmin>,
    State(state): State<AppState>,
) -> Result<Json<ListResponse<UserResponse>>> {
    let users = state.db.users().list().await?;
    Ok(Json(ListResponse::new(
        users.into_iter().map(UserResponse::from).collect(),
    )))
}

/// POST /api/v1/admin/users
async fn create_user(
    auth: Auth<CanAdmin>,
    State(state): State<AppState>,
    Json(req): Json<CreateUserRequest>,
) -> Result<(StatusCode, Json<UserResponse>)> {
    let role = parse_role(&req.role)?;
    let info = state
        .auth
        .create_user(&req.email, &req.display_name, &req.password, role)
        .await?;

    let user = state
        .db
        .users()
        .get_by_id(info.id)
        .await?
        .ok_or_else(|| ApiError::internal("created user vanished"))?;

    crate::audit!(AuditAction::UserCreate, user_id = auth.user_id(), target_user_id = user.id, role = %user.role);
    Ok((StatusCode::CREATED, Json(user.into())))
}

/// PUT /api/v1/admin/users/{id}/role
///
/// Demoting the last admin is refused.
async fn update_role(
    auth: Auth<CanAdmin>,
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
    Json(req): Json<UpdateRoleRequest>,
) -> Result<Json<UserResponse>> {
    let id = parse_id("id", &raw_id)?;
    let role = parse_role(&req.role)?;
    let users = state.db.users();

    match users.update_role_keeping_admin(id, role.as_str()).await? {
        AdminGuarded::Applied => {}
        AdminGuarded::NotFound => return Err(ApiError::not_found("user", id)),
        AdminGuarded::LastAdmin => {
            return Err(ApiError::validation("role", "cannot demote the last admin"));
        }
    }

    let user = users
        .get_by_id(id)
        .await?
        .ok_or_else(|| ApiError::not_found("user", id))?;

    crate::audit!(AuditAction::RoleChange, user_id = auth.user_id(), target_user_id = id, role = role.as_str());
    Ok(Json(user.into()))
}

/// DELETE /api/v1/admin/users/{id}
///
/// Sessions, skill records and snapshots go with the user. Admins cannot
/// delete themselves, and the last admin is kept.
async fn delete_user(
    auth: Auth<CanAdmin>,
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
) -> Result<StatusCode> {
    let id = parse_id("id", &raw_id)?;
    if id == auth.user_id() {
        return Err(ApiError::validation("id", "cannot delete your own account"));
    }

    match state.db.users().delete_keeping_admin(id).await? {
        AdminGuarded::Applied => {}
        AdminGuarded::NotFound => return Err(ApiError::not_found("user", id)),
        AdminGuarded::LastAdmin => {
            return Err(ApiError::validation("id", "cannot delete the last admin"));
        }
    }

    crate::audit!(AuditAction::UserDelete, user_id = auth.user_id(), target_user_id = id);
    Ok(StatusCode::NO_CONTENT)
}

// =============================================================================
// Helpers
// =============================================================================

fn parse_role(raw: &str) -> Result<Role> {
    Role::parse(raw).ok_or_else(|| ApiError::validation("role", "must be one of: user, admin"))
}
