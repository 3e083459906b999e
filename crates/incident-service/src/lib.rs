//! # Incident Service
//!
//! Transport-agnostic request handling for the incident tracker.
//!
//! ## Overview
//!
//! The incident-service crate handles:
//! - **Identification**: The acting user of a request (`x-user-id` / `userId`)
//! - **Authorization**: Every handler consults the acting user's ability
//! - **Handlers**: Incidents, users, report reasons, audit logs, health
//! - **Workflows**: Resolve-then-ban and reopen-then-unban
//! - **Auditing**: Every mutation appends an audit record, fire-and-forget
//!
//! ## Error Mapping
//!
//! | Error             | Status |
//! |-------------------|--------|
//! | `Unauthenticated` | 401    |
//! | `Forbidden`       | 403    |
//! | `NotFound`        | 404    |
//! | `Validation`      | 400    |
//! | `Unexpected`      | 500    |
//!
//! ## Usage
//!
//! ```rust,no_run
//! use incident_model::NewIncident;
//! use incident_service::{RequestContext, ServiceConfig, TrackerService};
//!
//! async fn moderation_example() -> Result<(), Box<dyn std::error::Error>> {
//!     let (service, _audit_log) = TrackerService::in_memory(ServiceConfig::from_env()?)?;
//!
//!     // Alice reports Dave
//!     let report = service
//!         .create_incident(&RequestContext::as_user(1), NewIncident::new(2, "Griefing my base", Some(2)))
//!         .await?;
//!
//!     // Bob resolves the report and bans Dave
//!     let outcome = service
//!         .resolve_incident(&RequestContext::as_user(3), report.id(), true)
//!         .await?;
//!     println!("{}", outcome.message());
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod handlers;
pub mod request;
pub mod service;
pub mod store;
pub mod views;
pub mod workflow;

// Re-export main types
pub use config::{ConfigError, ServiceConfig};
pub use error::{ServiceError, ServiceResult};
pub use handlers::AuditLogParams;
pub use request::{ActorResolver, HeaderActorResolver, RequestContext, USER_ID_HEADER, USER_ID_PARAM};
pub use service::TrackerService;
pub use store::{MemoryStore, Store, StoreError, StoreResult};
pub use views::{AuditLogView, HealthStatus, IncidentView};
pub use workflow::{BanOutcome, ReopenOutcome, ResolutionOutcome, UnbanOutcome};
