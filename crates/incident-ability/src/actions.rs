//! # Actions
//!
//! Defines the actions an ability rule can grant or deny.

use serde::{Deserialize, Serialize};

/// Actions that can be performed on resources.
///
/// - **Read**: View resource data
/// - **Create**: Create new resource instances
/// - **Update**: Modify existing resource data
/// - **Delete**: Remove resource instances
/// - **Manage**: Wildcard; a rule for `Manage` covers every action
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    /// Read/view resource.
    Read,

    /// Create new resource.
    Create,

    /// Update existing resource.
    Update,

    /// Delete resource.
    Delete,

    /// Any action.
    ///
    /// Only meaningful inside a rule; checks are always made for a
    /// concrete action.
    Manage,
}

impl Action {
    /// Get the string representation of the action.
    pub fn as_str(&self) -> &'static str {
        match self {
            Action::Read => "read",
            Action::Create => "create",
            Action::Update => "update",
            Action::Delete => "delete",
            Action::Manage => "manage",
        }
    }

    /// Parse action from string representation.
    ///
    /// # Arguments
    ///
    /// * `s` - String to parse (case-insensitive, supports HTTP-ish aliases)
    ///
    /// # Returns
    ///
    /// `Some(Action)` if valid, `None` otherwise
    ///
    /// # Example
    ///
    /// ```
    /// use incident_ability::actions::Action;
    ///
    /// assert_eq!(Action::parse("read"), Some(Action::Read));
    /// assert_eq!(Action::parse("patch"), Some(Action::Update));
    /// assert_eq!(Action::parse("invalid"), None);
    /// ```
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "read" | "get" => Some(Action::Read),
            "create" | "post" => Some(Action::Create),
            "update" | "patch" | "put" => Some(Action::Update),
            "delete" | "remove" => Some(Action::Delete),
            "manage" => Some(Action::Manage),
            _ => None,
        }
    }

    /// Get all actions.
    pub fn all() -> Vec<Self> {
        vec![
            Action::Read,
            Action::Create,
            Action::Update,
            Action::Delete,
            Action::Manage,
        ]
    }

    /// Check if a rule declared for this action covers a check for `other`.
    ///
    /// # Example
    ///
    /// ```
    /// use incident_ability::actions::Action;
    ///
    /// assert!(Action::Manage.covers(Action::Delete));
    /// assert!(Action::Update.covers(Action::Update));
    /// assert!(!Action::Update.covers(Action::Read));
    /// ```
    pub fn covers(&self, other: Action) -> bool {
        *self == Action::Manage || *self == other
    }
}

impl std::fmt::Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
