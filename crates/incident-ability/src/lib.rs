//! # Incident Ability
//!
//! Declarative, role-scoped ability rules for the incident tracker.
//!
//! ## Overview
//!
//! The incident-ability crate handles:
//! - **Actions**: read, create, update, delete, and the `manage` wildcard
//! - **Resource Types**: Incident, User, ReportReason, AuditLog, and the `all` wildcard
//! - **Rules**: allow/deny + action + resource type [+ fields] [+ conditions]
//! - **Abilities**: ordered rule lists answering permit/deny questions
//! - **Policy**: the rule table each role receives
//!
//! ## Architecture
//!
//! ```text
//! Rule = Effect + Action + ResourceType [+ Fields] [+ Conditions]
//!
//! Examples:
//!   allow manage all                                   - Admin
//!   allow update Incident when {resolved: false}       - Moderator
//!   allow update User fields [banned] when {role: Player}
//! ```
//!
//! ## Usage
//!
//! ```rust
//! use incident_ability::{define_ability, Action, ResourceType};
//! use incident_model::{Role, User};
//! use serde_json::json;
//!
//! let alice = User::new(1, "alice.player@test.com", "Alice Player", Role::Player);
//! let ability = define_ability(&alice);
//!
//! // Players see their own reports only
//! assert!(ability.can_on(Action::Read, ResourceType::Incident, &json!({ "reporterId": 1 }), &[]));
//! assert!(!ability.can_on(Action::Read, ResourceType::Incident, &json!({ "reporterId": 2 }), &[]));
//!
//! // and never delete them
//! assert!(ability.cannot(Action::Delete, ResourceType::Incident));
//! ```
//!
//! ## Resolution
//!
//! - Most recently declared matching rule wins
//! - No matching rule denies
//! - Field lists must cover every requested field (no partial grants)

pub mod ability;
pub mod actions;
pub mod policy;
pub mod resources;
pub mod rules;

// Re-export main types for convenience
pub use ability::{Ability, AbilityBuilder, RuleHandle};
pub use actions::Action;
pub use policy::{define_ability, define_ability_for, define_ability_for_role_name};
pub use resources::ResourceType;
pub use rules::{Effect, Rule};
