//! Audit record types
//!
//! This module defines the closed set of audited actions, the entry a
//! handler submits, and the immutable record the log stores.

use chrono::{DateTime, Utc};
use incident_ability::ResourceType;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Audited mutating actions.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AuditAction {
    /// A user was banned
    UserBanned,
    /// A ban was lifted
    UserUnbanned,
    /// A user's role changed
    UserRoleChanged,
    /// A user became a moderator
    ModeratorAdded,
    /// A user stopped being a moderator
    ModeratorRemoved,
    /// A report was filed
    IncidentCreated,
    /// A report was resolved
    IncidentResolved,
    /// A resolved report was reopened
    IncidentReopened,
    /// A report was edited without a resolution change
    IncidentUpdated,
    /// A report was deleted
    IncidentDeleted,
    /// A reason was added to the catalog
    ReportReasonCreated,
    /// A reason was removed from the catalog
    ReportReasonDeleted,
}

impl AuditAction {
    /// Get the wire tag (e.g. `INCIDENT_RESOLVED`).
    pub fn as_str(&self) -> &'static str {
        match self {
            AuditAction::UserBanned => "USER_BANNED",
            AuditAction::UserUnbanned => "USER_UNBANNED",
            AuditAction::UserRoleChanged => "USER_ROLE_CHANGED",
            AuditAction::ModeratorAdded => "MODERATOR_ADDED",
            AuditAction::ModeratorRemoved => "MODERATOR_REMOVED",
            AuditAction::IncidentCreated => "INCIDENT_CREATED",
            AuditAction::IncidentResolved => "INCIDENT_RESOLVED",
            AuditAction::IncidentReopened => "INCIDENT_REOPENED",
            AuditAction::IncidentUpdated => "INCIDENT_UPDATED",
            AuditAction::IncidentDeleted => "INCIDENT_DELETED",
            AuditAction::ReportReasonCreated => "REPORT_REASON_CREATED",
            AuditAction::ReportReasonDeleted => "REPORT_REASON_DELETED",
        }
    }

    /// Parse from the wire tag.
    pub fn parse(s: &str) -> Option<Self> {
        Self::all().into_iter().find(|action| action.as_str() == s)
    }

    /// Get all audited actions.
    pub fn all() -> Vec<Self> {
        vec![
            AuditAction::UserBanned,
            AuditAction::UserUnbanned,
            AuditAction::UserRoleChanged,
            AuditAction::ModeratorAdded,
            AuditAction::ModeratorRemoved,
            AuditAction::IncidentCreated,
            AuditAction::IncidentResolved,
            AuditAction::IncidentReopened,
            AuditAction::IncidentUpdated,
            AuditAction::IncidentDeleted,
            AuditAction::ReportReasonCreated,
            AuditAction::ReportReasonDeleted,
        ]
    }

    /// The entity type an action of this kind targets.
    pub fn entity_type(&self) -> ResourceType {
        match self {
            AuditAction::UserBanned
            | AuditAction::UserUnbanned
            | AuditAction::UserRoleChanged
            | AuditAction::ModeratorAdded
            | AuditAction::ModeratorRemoved => ResourceType::User,
            AuditAction::IncidentCreated
            | AuditAction::IncidentResolved
            | AuditAction::IncidentReopened
            | AuditAction::IncidentUpdated
            | AuditAction::IncidentDeleted => ResourceType::Incident,
            AuditAction::ReportReasonCreated | AuditAction::ReportReasonDeleted => {
                ResourceType::ReportReason
            }
        }
    }
}

impl std::fmt::Display for AuditAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An audit entry as submitted by a handler.
///
/// # Example
///
/// ```
/// use incident_audit::{AuditAction, AuditEntry};
/// use incident_ability::ResourceType;
/// use serde_json::json;
///
/// let entry = AuditEntry::new(AuditAction::IncidentResolved, 3, 12)
///     .with_metadata(json!({ "before": {}, "after": {} }))
///     .with_request("127.0.0.1", "curl/8.0");
///
/// assert_eq!(entry.entity_type, ResourceType::Incident);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditEntry {
    /// What happened
    pub action: AuditAction,

    /// Who did it
    pub actor_id: i64,

    /// Target entity type
    pub entity_type: ResourceType,

    /// Target entity ID
    pub entity_id: i64,

    /// Free-form payload, e.g. `{before, after}` snapshots
    pub metadata: Option<serde_json::Value>,

    /// Requester IP address
    pub ip_address: Option<String>,

    /// Requester user agent
    pub user_agent: Option<String>,
}

impl AuditEntry {
    /// Create an entry targeting the action's natural entity type.
    ///
    /// # Arguments
    ///
    /// * `action` - The audited action
    /// * `actor_id` - The acting user
    /// * `entity_id` - The target entity
    pub fn new(action: AuditAction, actor_id: i64, entity_id: i64) -> Self {
        Self {
            action,
            actor_id,
            entity_type: action.entity_type(),
            entity_id,
            metadata: None,
            ip_address: None,
            user_agent: None,
        }
    }

    /// Override the entity type.
    pub fn with_entity_type(mut self, entity_type: ResourceType) -> Self {
        self.entity_type = entity_type;
        self
    }

    /// Attach a metadata payload.
    pub fn with_metadata(mut self, metadata: serde_json::Value) -> Self {
        self.metadata = Some(metadata);
        self
    }

    /// Attach requester IP address and user agent.
    pub fn with_request(mut self, ip_address: impl Into<String>, user_agent: impl Into<String>) -> Self {
        self.ip_address = Some(ip_address.into());
        self.user_agent = Some(user_agent.into());
        self
    }

    /// Attach optional requester details.
    pub fn with_request_details(mut self, ip_address: Option<String>, user_agent: Option<String>) -> Self {
        self.ip_address = ip_address;
        self.user_agent = user_agent;
        self
    }
}

/// A stored audit record. Records are never modified once appended.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditRecord {
    /// Unique record ID (UUID v7, time ordered)
    pub id: Uuid,

    /// What happened
    pub action: AuditAction,

    /// Who did it
    pub actor_id: i64,

    /// Target entity type
    pub entity_type: ResourceType,

    /// Target entity ID
    pub entity_id: i64,

    /// Free-form payload
    pub metadata: Option<serde_json::Value>,

    /// Requester IP address
    pub ip_address: Option<String>,

    /// Requester user agent
    pub user_agent: Option<String>,

    /// When the record was written
    pub created_at: DateTime<Utc>,
}

impl AuditRecord {
    /// Stamp an entry into a record.
    pub fn from_entry(entry: AuditEntry) -> Self {
        Self {
            id: Uuid::now_v7(),
            action: entry.action,
            actor_id: entry.actor_id,
            entity_type: entry.entity_type,
            entity_id: entry.entity_id,
            metadata: entry.metadata,
            ip_address: entry.ip_address,
            user_agent: entry.user_agent,
            created_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_action_wire_tags() {
        assert_eq!(
            serde_json::to_string(&AuditAction::ReportReasonCreated).unwrap(),
            "\"REPORT_REASON_CREATED\""
        );
        for action in AuditAction::all() {
            let json = serde_json::to_value(action).unwrap();
            assert_eq!(json, json!(action.as_str()));
            assert_eq!(AuditAction::parse(action.as_str()), Some(action));
        }
        assert_eq!(AuditAction::all().len(), 12);
        assert_eq!(AuditAction::parse("POST_CREATED"), None);
    }

    #[test]
    fn test_action_entity_types() {
        assert_eq!(AuditAction::UserBanned.entity_type(), ResourceType::User);
        assert_eq!(AuditAction::ModeratorAdded.entity_type(), ResourceType::User);
        assert_eq!(AuditAction::IncidentReopened.entity_type(), ResourceType::Incident);
        assert_eq!(AuditAction::ReportReasonDeleted.entity_type(), ResourceType::ReportReason);
    }

    #[test]
    fn test_record_from_entry() {
        let entry = AuditEntry::new(AuditAction::UserBanned, 3, 2)
            .with_metadata(json!({"before": {"banned": false}, "after": {"banned": true}}));
        let record = AuditRecord::from_entry(entry.clone());

        assert_eq!(record.action, AuditAction::UserBanned);
        assert_eq!(record.actor_id, 3);
        assert_eq!(record.entity_type, ResourceType::User);
        assert_eq!(record.entity_id, 2);
        assert_eq!(record.metadata, entry.metadata);
        assert!(record.ip_address.is_none());

        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["entityType"], "User");
        assert_eq!(json["action"], "USER_BANNED");
    }
}
