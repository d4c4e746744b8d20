//! Authenticated user information
//!
//! UserInfo represents the authenticated user in a request context.

use gitadora_control::User;
use serde::{Deserialize, Serialize};

use crate::roles::{Permission, Role};

/// Authenticated user information
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserInfo {
    /// User ID (also the player ID)
    pub id: i64,
    pub email: String,
    pub display_name: String,
    /// Role as stored ("user" or "admin")
    pub role: String,
}

impl UserInfo {
    /// Create a user with a specific role
    pub fn with_role(id: i64, email: impl Into<String>, role: Role) -> Self {
        let email = email.into();
        Self {
            id,
            display_name: email.clone(),
            email,
            role: role.as_str().to_string(),
        }
    }

    /// Get parsed role (unknown roles get the least privilege)
    pub fn parsed_role(&self) -> Role {
        Role::parse(&self.role).unwrap_or(Role::User)
    }

    pub fn has_permission(&self, permission: Permission) -> bool {
        self.parsed_role().has_permission(permission)
    }

    pub fn is_admin(&self) -> bool {
        self.has_permission(Permission::Admin)
    }

    /// Whether this user may write data owned by `player_id`
    pub fn can_act_for(&self, player_id: i64) -> bool {
        self.is_admin() || (self.id == player_id && self.has_permission(Permission::Submit))
    }
}

impl From<&User> for UserInfo {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            email: user.email.clone(),
            display_name: user.display_name.clone(),
            role: user.role.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_role_is_user() {
        let mut user = UserInfo::with_role(1, "a@example.com", Role::Admin);
        assert!(user.is_admin());

        user.role = "superuser".into();
        assert_eq!(user.parsed_role(), Role::User);
        assert!(!user.is_admin());
    }

    #[test]
    fn test_can_act_for() {
        let player = UserInfo::with_role(1, "a@example.com", Role::User);
        assert!(player.can_act_for(1));
        assert!(!player.can_act_for(2));

        let admin = UserInfo::with_role(9, "admin@example.com", Role::Admin);
        assert!(admin.can_act_for(1));
    }
}
