//! Response views
//!
//! Handler results serialize to the JSON bodies of the tracker's REST
//! surface: the stored entity with its related records embedded.

use incident_audit::AuditRecord;
use incident_model::{Incident, ReportReason, UserSummary};
use serde::Serialize;

/// An incident with reporter, reported user, resolver and reason embedded.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IncidentView {
    /// The stored incident
    #[serde(flatten)]
    pub incident: Incident,

    /// Who filed the report
    pub reporter: Option<UserSummary>,

    /// Who the report is about
    pub reported_user: Option<UserSummary>,

    /// Who resolved the report
    pub resolver: Option<UserSummary>,

    /// Catalog reason
    pub report_reason: Option<ReportReason>,
}

impl IncidentView {
    /// Incident ID.
    pub fn id(&self) -> i64 {
        self.incident.id
    }
}

/// An audit record with the acting user embedded.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditLogView {
    /// The stored record
    #[serde(flatten)]
    pub record: AuditRecord,

    /// Who performed the action
    pub actor: Option<UserSummary>,
}

/// Liveness response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HealthStatus {
    /// Fixed liveness message
    pub message: &'static str,
}

impl HealthStatus {
    /// The running status.
    pub fn running() -> Self {
        Self {
            message: "Backend is running!",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use incident_model::{Role, User};
    use serde_json::json;

    #[test]
    fn test_incident_view_shape() {
        let mut incident = Incident::new(7, 1, 2, "Test", Some(2));
        incident.resolve(3).unwrap();
        let view = IncidentView {
            incident,
            reporter: Some(User::new(1, "alice.player@test.com", "Alice Player", Role::Player).summary()),
            reported_user: None,
            resolver: None,
            report_reason: Some(ReportReason::new(2, "Griefing")),
        };

        let json = serde_json::to_value(&view).unwrap();
        assert_eq!(json["id"], 7);
        assert_eq!(json["resolved"], true);
        assert_eq!(json["resolverId"], 3);
        assert_eq!(json["reporter"]["name"], "Alice Player");
        assert_eq!(json["reportedUser"], json!(null));
        assert_eq!(json["reportReason"], json!({"id": 2, "textKey": "Griefing"}));
    }

    #[test]
    fn test_health_status() {
        assert_eq!(
            serde_json::to_value(HealthStatus::running()).unwrap(),
            json!({"message": "Backend is running!"})
        );
    }
}
