//! Roles and permissions for access control
//!
//! Two roles. Every signed-in user may read the catalog and rankings and
//! submit their own plays; admins also manage the catalog and other users.

use std::fmt;

/// User role (ordered hierarchy)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Role {
    /// Regular player
    User = 0,
    /// Manages catalog content and users
    Admin = 1,
}

impl Role {
    /// Parse role from string
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "user" | "player" => Some(Self::User),
            "admin" | "administrator" => Some(Self::Admin),
            _ => None,
        }
    }

    /// Convert to string
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Admin => "admin",
        }
    }

    /// Check if this role has a permission
    pub fn has_permission(&self, permission: Permission) -> bool {
        *self >= permission.min_role()
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Permission for a specific capability
///
/// Reading is implicit for every signed-in user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Permission {
    /// Submit plays and snapshots for oneself
    Submit,
    /// Manage catalog, users, and other players' data
    Admin,
}

impl Permission {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Submit => "submit",
            Self::Admin => "admin",
        }
    }

    /// Minimum role required for this permission
    pub fn min_role(&self) -> Role {
        match self {
            Self::Submit => Role::User,
            Self::Admin => Role::Admin,
        }
    }
}

impl fmt::Display for Permission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
