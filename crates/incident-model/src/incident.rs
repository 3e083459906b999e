//! Incident domain models
//!
//! An incident is a report filed by a player, optionally against another
//! player. Its resolution follows a small state machine:
//!
//! ```text
//!   unresolved ──resolve(resolver)──▶ resolved
//!       ▲                                │
//!       └──────────── reopen ────────────┘
//! ```
//!
//! The `resolved` flag and the resolver reference only change together:
//! a resolved incident always names its resolver, an unresolved one never
//! does. Both fields are private so the transitions are the only writers.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Invalid resolution transition.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransitionError {
    /// The incident is already resolved
    #[error("Incident {0} is already resolved")]
    AlreadyResolved(i64),

    /// The incident is not resolved, so it cannot be reopened
    #[error("Incident {0} is not resolved")]
    NotResolved(i64),

    /// A stored incident whose resolved flag and resolver disagree
    #[error("Incident {0} has an inconsistent resolution state")]
    Inconsistent(i64),
}

/// Missing or malformed input on incident creation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// Required fields are absent
    #[error("reportReasonId and details are required")]
    MissingRequiredFields,
}

/// A player report.
///
/// # Examples
///
/// ```
/// use incident_model::Incident;
///
/// let mut incident = Incident::new(1, 1, 2, "Spawn camping", Some(2));
/// assert!(!incident.is_resolved());
///
/// incident.resolve(3).unwrap();
/// assert!(incident.is_resolved());
/// assert_eq!(incident.resolver_id(), Some(3));
///
/// incident.reopen().unwrap();
/// assert_eq!(incident.resolver_id(), None);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "IncidentRecord")]
pub struct Incident {
    /// Incident ID
    pub id: i64,

    /// Player who filed the report
    pub reporter_id: i64,

    /// Player the report is about (if any)
    pub reported_user_id: Option<i64>,

    /// Catalog reason
    pub report_reason_id: i64,

    /// Free-text details
    pub details: String,

    resolved: bool,

    resolver_id: Option<i64>,

    /// When the report was filed
    pub created_at: DateTime<Utc>,

    /// When the report last changed
    pub updated_at: DateTime<Utc>,
}

/// Wire form of an incident, checked before it becomes an [`Incident`].
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct IncidentRecord {
    id: i64,
    reporter_id: i64,
    #[serde(default)]
    reported_user_id: Option<i64>,
    report_reason_id: i64,
    details: String,
    resolved: bool,
    #[serde(default)]
    resolver_id: Option<i64>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<IncidentRecord> for Incident {
    type Error = TransitionError;

    fn try_from(record: IncidentRecord) -> Result<Self, Self::Error> {
        if record.resolved != record.resolver_id.is_some() {
            return Err(TransitionError::Inconsistent(record.id));
        }
        Ok(Self {
            id: record.id,
            reporter_id: record.reporter_id,
            reported_user_id: record.reported_user_id,
            report_reason_id: record.report_reason_id,
            details: record.details,
            resolved: record.resolved,
            resolver_id: record.resolver_id,
            created_at: record.created_at,
            updated_at: record.updated_at,
        })
    }
}

/// Outcome classification of an applied patch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IncidentChange {
    /// The incident went from unresolved to resolved
    Resolved,
    /// The incident went from resolved to unresolved
    Reopened,
    /// Anything else (details, reason, or no effective change)
    Updated,
}

impl Incident {
    /// Creates a new, unresolved incident.
    ///
    /// # Arguments
    ///
    /// * `id` - The incident ID
    /// * `reporter_id` - The reporting player
    /// * `report_reason_id` - The catalog reason
    /// * `details` - Free-text details
    /// * `reported_user_id` - The reported player, if any
    pub fn new(
        id: i64,
        reporter_id: i64,
        report_reason_id: i64,
        details: impl Into<String>,
        reported_user_id: Option<i64>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id,
            reporter_id,
            reported_user_id,
            report_reason_id,
            details: details.into(),
            resolved: false,
            resolver_id: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Whether the incident is resolved.
    pub fn is_resolved(&self) -> bool {
        self.resolved
    }

    /// Who resolved the incident. `Some` exactly when resolved.
    pub fn resolver_id(&self) -> Option<i64> {
        self.resolver_id
    }

    /// Resolve the incident on behalf of `resolver_id`.
    ///
    /// # Errors
    ///
    /// `TransitionError::AlreadyResolved` if the incident is resolved.
    pub fn resolve(&mut self, resolver_id: i64) -> Result<(), TransitionError> {
        if self.resolved {
            return Err(TransitionError::AlreadyResolved(self.id));
        }
        self.resolved = true;
        self.resolver_id = Some(resolver_id);
        self.touch();
        Ok(())
    }

    /// Reopen a resolved incident, clearing its resolver.
    ///
    /// # Errors
    ///
    /// `TransitionError::NotResolved` if the incident is unresolved.
    pub fn reopen(&mut self) -> Result<(), TransitionError> {
        if !self.resolved {
            return Err(TransitionError::NotResolved(self.id));
        }
        self.resolved = false;
        self.resolver_id = None;
        self.touch();
        Ok(())
    }

    /// Apply a patch on behalf of `actor_id`.
    ///
    /// A `resolved` value equal to the current state is a no-op. The
    /// caller is responsible for the access decision; this only keeps the
    /// resolution fields consistent.
    pub fn apply(&mut self, patch: &IncidentPatch, actor_id: i64) -> IncidentChange {
        let mut change = IncidentChange::Updated;

        match patch.resolved {
            Some(true) if !self.resolved => {
                self.resolved = true;
                self.resolver_id = Some(actor_id);
                change = IncidentChange::Resolved;
            }
            Some(false) if self.resolved => {
                self.resolved = false;
                self.resolver_id = None;
                change = IncidentChange::Reopened;
            }
            _ => {}
        }

        if let Some(details) = &patch.details {
            self.details = details.clone();
        }
        if let Some(reason_id) = patch.report_reason_id {
            self.report_reason_id = reason_id;
        }

        self.touch();
        change
    }

    /// JSON snapshot used for ability conditions and audit metadata.
    pub fn snapshot(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }

    fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

/// Payload for filing a report.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewIncident {
    /// Catalog reason (required)
    #[serde(default, alias = "reasonId")]
    pub report_reason_id: Option<i64>,

    /// Free-text details (required, not blank)
    #[serde(default)]
    pub details: Option<String>,

    /// Reported player
    #[serde(default)]
    pub reported_user_id: Option<i64>,
}

impl NewIncident {
    /// Payload with all fields set.
    pub fn new(report_reason_id: i64, details: impl Into<String>, reported_user_id: Option<i64>) -> Self {
        Self {
            report_reason_id: Some(report_reason_id),
            details: Some(details.into()),
            reported_user_id,
        }
    }

    /// Check required fields.
    ///
    /// # Returns
    ///
    /// The reason ID and the details on success
    pub fn validate(&self) -> Result<(i64, &str), ValidationError> {
        let details = self
            .details
            .as_deref()
            .filter(|d| !d.trim().is_empty())
            .ok_or(ValidationError::MissingRequiredFields)?;
        let reason_id = self
            .report_reason_id
            .ok_or(ValidationError::MissingRequiredFields)?;
        Ok((reason_id, details))
    }
}

/// Partial update of an incident.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IncidentPatch {
    /// Resolve (`true`) or reopen (`false`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resolved: Option<bool>,

    /// New details
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,

    /// New catalog reason
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub report_reason_id: Option<i64>,
}

impl IncidentPatch {
    /// Patch that resolves the incident.
    pub fn resolve() -> Self {
        Self {
            resolved: Some(true),
            ..Self::default()
        }
    }

    /// Patch that reopens the incident.
    pub fn reopen() -> Self {
        Self {
            resolved: Some(false),
            ..Self::default()
        }
    }

    /// Patch that replaces the details.
    pub fn details(details: impl Into<String>) -> Self {
        Self {
            details: Some(details.into()),
            ..Self::default()
        }
    }

    /// Field names this patch wants to change, in wire form.
    pub fn requested_fields(&self) -> Vec<&'static str> {
        let mut fields = Vec::new();
        if self.resolved.is_some() {
            fields.push("resolved");
        }
        if self.details.is_some() {
            fields.push("details");
        }
        if self.report_reason_id.is_some() {
            fields.push("reportReasonId");
        }
        fields
    }
}
