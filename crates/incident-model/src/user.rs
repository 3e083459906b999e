//! User domain models
//!
//! Tracker accounts, their compact summaries as embedded in incident and
//! audit views, and the patch payload used for bans and role changes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::roles::Role;

/// A tracker account.
///
/// # Examples
///
/// ```
/// use incident_model::{Role, User};
///
/// let user = User::new(7, "erin@test.com", "Erin Player", Role::Player);
/// assert!(!user.banned);
/// assert_eq!(user.summary().name, "Erin Player");
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Unique user ID
    pub id: i64,

    /// Email address (unique)
    pub email: String,

    /// Display name
    pub name: String,

    /// Tracker role
    pub role: Role,

    /// Whether the account is banned
    pub banned: bool,

    /// When the account was created
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Creates a new, unbanned account.
    ///
    /// # Arguments
    ///
    /// * `id` - The user ID
    /// * `email` - The email address
    /// * `name` - The display name
    /// * `role` - The tracker role
    pub fn new(id: i64, email: impl Into<String>, name: impl Into<String>, role: Role) -> Self {
        Self {
            id,
            email: email.into(),
            name: name.into(),
            role,
            banned: false,
            created_at: Utc::now(),
        }
    }

    /// Mark the account as banned.
    pub fn with_banned(mut self, banned: bool) -> Self {
        self.banned = banned;
        self
    }

    /// Get the compact summary embedded in other views.
    pub fn summary(&self) -> UserSummary {
        UserSummary {
            id: self.id,
            name: self.name.clone(),
            email: self.email.clone(),
            banned: self.banned,
        }
    }

    /// JSON snapshot used for ability conditions and audit metadata.
    pub fn snapshot(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }
}

/// Compact user reference (`{id, name, email, banned}`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserSummary {
    /// User ID
    pub id: i64,
    /// Display name
    pub name: String,
    /// Email address
    pub email: String,
    /// Ban status, so a reopened report can tell whether to lift a ban
    pub banned: bool,
}

/// Partial update of an account.
///
/// Only the ban flag and the role can be changed after creation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserPatch {
    /// New ban status
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub banned: Option<bool>,

    /// New role
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
}

impl UserPatch {
    /// Patch that bans the account.
    pub fn ban() -> Self {
        Self {
            banned: Some(true),
            role: None,
        }
    }

    /// Patch that lifts a ban.
    pub fn unban() -> Self {
        Self {
            banned: Some(false),
            role: None,
        }
    }

    /// Patch that changes the role.
    pub fn role(role: Role) -> Self {
        Self {
            banned: None,
            role: Some(role),
        }
    }

    /// Field names this patch wants to change, in wire form.
    pub fn requested_fields(&self) -> Vec<&'static str> {
        let mut fields = Vec::new();
        if self.banned.is_some() {
            fields.push("banned");
        }
        if self.role.is_some() {
            fields.push("role");
        }
        fields
    }

    /// Check if the patch changes nothing.
    pub fn is_empty(&self) -> bool {
        self.banned.is_none() && self.role.is_none()
    }
}
