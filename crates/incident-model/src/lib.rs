//! # Incident Model
//!
//! Domain types for the player incident-report tracker.
//!
//! ## Overview
//!
//! The incident-model crate handles:
//! - **Roles**: Player, Moderator, Admin
//! - **Users**: Accounts with a role and a ban flag
//! - **Incidents**: Player reports and their resolution state machine
//! - **Report Reasons**: The catalog a report picks its reason from
//!
//! ## Architecture
//!
//! ```text
//! User (reporter) ──files──▶ Incident ──about──▶ User (reported, optional)
//!                               │
//!                               ├─ ReportReason
//!                               └─ resolved ⇔ resolver (User)
//! ```
//!
//! ## Usage
//!
//! ```rust
//! use incident_model::{Incident, IncidentChange, IncidentPatch, Role, User};
//!
//! let moderator = User::new(3, "bob.moderator@test.com", "Bob Moderator", Role::Moderator);
//! let mut incident = Incident::new(1, 1, 2, "Griefing my base", Some(2));
//!
//! let change = incident.apply(&IncidentPatch::resolve(), moderator.id);
//! assert_eq!(change, IncidentChange::Resolved);
//! assert_eq!(incident.resolver_id(), Some(3));
//! ```
//!
//! All types serialize with camelCase field names, which is the JSON shape
//! of the tracker's REST bodies.

pub mod incident;
pub mod report_reason;
pub mod roles;
pub mod user;

// Re-export main types for convenience
pub use incident::{Incident, IncidentChange, IncidentPatch, NewIncident, TransitionError, ValidationError};
pub use report_reason::{NewReportReason, ReportReason, DEFAULT_REPORT_REASONS};
pub use roles::Role;
pub use user::{User, UserPatch, UserSummary};
