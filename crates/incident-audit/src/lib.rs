//! # Incident Audit
//!
//! This crate provides the append-only audit trail of the incident
//! tracker. Every mutating action (bans, role changes, report lifecycle,
//! catalog changes) appends one immutable record.
//!
//! ## Overview
//!
//! The incident-audit crate handles:
//! - **Audit Actions**: The closed set of audited action tags
//! - **Audit Records**: Actor, action, target entity, metadata, requester details
//! - **Audit Sinks**: Append-only storage with a filtered, newest-first listing
//! - **Recorder**: Fire-and-forget appends that never fail the caller
//!
//! ## Usage
//!
//! ### Recording
//!
//! ```rust,no_run
//! use incident_audit::{AuditAction, AuditEntry, AuditRecorder, MemoryAuditLog};
//! use serde_json::json;
//! use std::sync::Arc;
//!
//! async fn record_example() {
//!     let recorder = AuditRecorder::new(Arc::new(MemoryAuditLog::new()));
//!
//!     recorder
//!         .record(
//!             AuditEntry::new(AuditAction::UserBanned, 3, 2)
//!                 .with_metadata(json!({ "before": { "banned": false }, "after": { "banned": true } })),
//!         )
//!         .await;
//! }
//! ```
//!
//! ### Listing
//!
//! ```rust,no_run
//! use incident_ability::ResourceType;
//! use incident_audit::{AuditQuery, AuditSink, MemoryAuditLog};
//!
//! async fn list_example(log: &MemoryAuditLog) {
//!     let query = AuditQuery::new().for_entity(ResourceType::Incident, 12).with_limit(20);
//!     for record in log.query(&query).await.unwrap() {
//!         println!("{} by {}", record.action, record.actor_id);
//!     }
//! }
//! ```

pub mod recorder;
pub mod sink;
pub mod types;

// Re-export main types
pub use recorder::AuditRecorder;
pub use sink::{
    AuditError, AuditLogStats, AuditQuery, AuditResult, AuditSink, AuditSubscription, MemoryAuditLog,
    DEFAULT_QUERY_LIMIT,
};
pub use types::{AuditAction, AuditEntry, AuditRecord};
