//! # Resource Types
//!
//! Resource types the ability rules are declared over.

use serde::{Deserialize, Serialize};

/// Resource types that can have rules assigned.
///
/// `All` is the wildcard subject: a rule declared for `All` applies to
/// every resource type.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum ResourceType {
    /// Player reports.
    Incident,
    /// Tracker accounts.
    User,
    /// Report reason catalog entries.
    ReportReason,
    /// Audit trail entries.
    AuditLog,
    /// Any resource type.
    All,
}

impl ResourceType {
    /// Get the string representation of the resource type.
    ///
    /// This is also the entity type recorded in the audit trail.
    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceType::Incident => "Incident",
            ResourceType::User => "User",
            ResourceType::ReportReason => "ReportReason",
            ResourceType::AuditLog => "AuditLog",
            ResourceType::All => "all",
        }
    }

    /// Parse resource type from string representation.
    ///
    /// # Example
    ///
    /// ```
    /// use incident_ability::resources::ResourceType;
    ///
    /// assert_eq!(ResourceType::parse("Incident"), Some(ResourceType::Incident));
    /// assert_eq!(ResourceType::parse("report_reason"), Some(ResourceType::ReportReason));
    /// assert_eq!(ResourceType::parse("Post"), None);
    /// ```
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().replace('_', "").as_str() {
            "incident" => Some(ResourceType::Incident),
            "user" => Some(ResourceType::User),
            "reportreason" => Some(ResourceType::ReportReason),
            "auditlog" => Some(ResourceType::AuditLog),
            "all" => Some(ResourceType::All),
            _ => None,
        }
    }

    /// Get all concrete resource types (excludes the `All` wildcard).
    pub fn all() -> Vec<Self> {
        vec![
            ResourceType::Incident,
            ResourceType::User,
            ResourceType::ReportReason,
            ResourceType::AuditLog,
        ]
    }

    /// Check if a rule declared for this type covers a check for `other`.
    pub fn covers(&self, other: ResourceType) -> bool {
        *self == ResourceType::All || *self == other
    }
}

impl std::fmt::Display for ResourceType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
