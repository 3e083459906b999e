//! Tracker roles
//!
//! This module defines the roles a tracker account can hold. The role,
//! together with the account's ban status, decides which ability rules
//! apply to the account.

use serde::{Deserialize, Serialize};

/// Role of a tracker account.
///
/// Roles are ordered: Player < Moderator < Admin. The ordering is only a
/// convenience for display and sorting; access decisions are made by the
/// ability rules, not by comparing roles.
///
/// # Permission Model
///
/// - **Player**: Files reports and follows their own reports
/// - **Moderator**: Triages and resolves open reports, bans players
/// - **Admin**: Full control, including reopening reports and role changes
///
/// # Examples
///
/// ```
/// use incident_model::Role;
///
/// assert_eq!(Role::parse("moderator"), Some(Role::Moderator));
/// assert!(Role::Admin.is_staff());
/// assert!(!Role::Player.is_staff());
/// ```
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Role {
    /// Regular player
    Player = 0,

    /// Report triage and player bans
    Moderator = 1,

    /// Full control
    Admin = 2,
}

impl Role {
    /// Check if this role belongs to the moderation staff.
    ///
    /// # Returns
    ///
    /// `true` for Moderator and Admin roles
    pub fn is_staff(&self) -> bool {
        *self >= Role::Moderator
    }

    /// Check if this role is the admin role.
    pub fn is_admin(&self) -> bool {
        matches!(self, Role::Admin)
    }

    /// Parse role from string representation.
    ///
    /// # Arguments
    ///
    /// * `s` - String to parse (case-insensitive)
    ///
    /// # Returns
    ///
    /// `Some(Role)` if valid, `None` otherwise
    ///
    /// # Examples
    ///
    /// ```
    /// use incident_model::Role;
    ///
    /// assert_eq!(Role::parse("Admin"), Some(Role::Admin));
    /// assert_eq!(Role::parse("PLAYER"), Some(Role::Player));
    /// assert_eq!(Role::parse("owner"), None);
    /// ```
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "player" => Some(Self::Player),
            "moderator" => Some(Self::Moderator),
            "admin" => Some(Self::Admin),
            _ => None,
        }
    }

    /// Get string representation of the role.
    ///
    /// This is the form used on the wire and in ability conditions.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Player => "Player",
            Self::Moderator => "Moderator",
            Self::Admin => "Admin",
        }
    }
}

impl Default for Role {
    fn default() -> Self {
        Self::Player
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
