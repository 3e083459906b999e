//! Incident handlers
//!
//! Players file reports and see their own; moderators triage unresolved
//! reports; admins can do anything, including reopening and deleting.

use incident_ability::{Action, ResourceType};
use incident_audit::AuditAction;
use incident_model::{IncidentChange, IncidentPatch, NewIncident};
use serde_json::json;
use tracing::instrument;

use crate::error::{ServiceError, ServiceResult};
use crate::request::RequestContext;
use crate::service::TrackerService;
use crate::views::IncidentView;

impl TrackerService {
    /// List incidents, newest first.
    ///
    /// Players only see the reports they filed.
    #[instrument(skip(self, ctx))]
    pub async fn list_incidents(&self, ctx: &RequestContext) -> ServiceResult<Vec<IncidentView>> {
        let (actor, ability) = self.authenticate(ctx).await?;
        if ability.cannot(Action::Read, ResourceType::Incident) {
            return Err(ServiceError::forbidden());
        }

        let reporter = if actor.role.is_staff() { None } else { Some(actor.id) };
        let incidents = self.store.list_incidents(reporter).await?;

        let mut views = Vec::with_capacity(incidents.len());
        for incident in incidents {
            if ability.can_on(Action::Read, ResourceType::Incident, &incident.snapshot(), &[]) {
                views.push(self.incident_view(incident).await?);
            }
        }

        tracing::debug!(actor_id = actor.id, count = views.len(), "Listed incidents");
        Ok(views)
    }

    /// Get a single incident.
    ///
    /// # Errors
    ///
    /// `NotFound` before `Forbidden`: a missing incident is reported as
    /// missing regardless of who asks.
    #[instrument(skip(self, ctx))]
    pub async fn get_incident(&self, ctx: &RequestContext, id: i64) -> ServiceResult<IncidentView> {
        let (_actor, ability) = self.authenticate(ctx).await?;

        let incident = self
            .store
            .get_incident(id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Incident"))?;

        if !ability.can_on(Action::Read, ResourceType::Incident, &incident.snapshot(), &[]) {
            return Err(ServiceError::forbidden());
        }

        self.incident_view(incident).await
    }

    /// File a report on behalf of the acting user.
    ///
    /// # Errors
    ///
    /// - `Forbidden` for banned accounts and roles that cannot file reports
    /// - `Validation` for missing fields or unknown reason / reported user
    #[instrument(skip(self, ctx, payload))]
    pub async fn create_incident(&self, ctx: &RequestContext, payload: NewIncident) -> ServiceResult<IncidentView> {
        let (actor, ability) = self.authenticate(ctx).await?;

        if actor.banned {
            tracing::debug!(actor_id = actor.id, "Banned user tried to file a report");
            return Err(ServiceError::Forbidden(
                "Banned users cannot create incidents".to_string(),
            ));
        }

        let draft = json!({ "reporterId": actor.id });
        if !ability.can_on(Action::Create, ResourceType::Incident, &draft, &[]) {
            return Err(ServiceError::forbidden());
        }

        let (reason_id, details) = payload.validate()?;

        let reason = self
            .store
            .get_report_reason(reason_id)
            .await?
            .ok_or_else(|| ServiceError::Validation("Invalid report reason".to_string()))?;

        if let Some(reported_id) = payload.reported_user_id {
            if self.store.get_user(reported_id).await?.is_none() {
                return Err(ServiceError::Validation("Reported user not found".to_string()));
            }
        }

        let incident = self
            .store
            .create_incident(actor.id, reason.id, details, payload.reported_user_id)
            .await?;

        tracing::info!(
            incident_id = incident.id,
            reporter_id = actor.id,
            reported_user_id = ?incident.reported_user_id,
            "Incident created"
        );

        self.audit
            .record(
                self.audit_entry(ctx, AuditAction::IncidentCreated, &actor, incident.id)
                    .with_metadata(json!({
                        "details": incident.details,
                        "reportReason": reason.text_key,
                    })),
            )
            .await;

        self.incident_view(incident).await
    }

    /// Apply a partial update.
    ///
    /// `resolved: true` resolves the report and records the acting user as
    /// resolver; `resolved: false` reopens it and clears the resolver.
    /// Whether either is allowed is decided by the acting user's ability on
    /// the current incident and the requested fields.
    #[instrument(skip(self, ctx, patch))]
    pub async fn update_incident(
        &self,
        ctx: &RequestContext,
        id: i64,
        patch: IncidentPatch,
    ) -> ServiceResult<IncidentView> {
        let (actor, ability) = self.authenticate(ctx).await?;

        let mut incident = self
            .store
            .get_incident(id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Incident"))?;

        let before = incident.snapshot();
        let fields = patch.requested_fields();
        if !ability.can_on(Action::Update, ResourceType::Incident, &before, &fields) {
            tracing::debug!(actor_id = actor.id, incident_id = id, ?fields, "Incident update denied");
            if incident.is_resolved() && !actor.role.is_admin() {
                return Err(ServiceError::Forbidden("Cannot edit resolved incidents".to_string()));
            }
            return Err(ServiceError::forbidden());
        }

        if let Some(reason_id) = patch.report_reason_id {
            if self.store.get_report_reason(reason_id).await?.is_none() {
                return Err(ServiceError::Validation("Invalid report reason".to_string()));
            }
        }

        let change = incident.apply(&patch, actor.id);
        let updated = self.store.save_incident(incident).await?;

        let action = match change {
            IncidentChange::Resolved => AuditAction::IncidentResolved,
            IncidentChange::Reopened => AuditAction::IncidentReopened,
            IncidentChange::Updated => AuditAction::IncidentUpdated,
        };
        tracing::info!(incident_id = id, actor_id = actor.id, action = %action, "Incident updated");

        self.audit
            .record(
                self.audit_entry(ctx, action, &actor, id)
                    .with_metadata(json!({ "before": before, "after": updated.snapshot() })),
            )
            .await;

        self.incident_view(updated).await
    }

    /// Delete an incident.
    #[instrument(skip(self, ctx))]
    pub async fn delete_incident(&self, ctx: &RequestContext, id: i64) -> ServiceResult<()> {
        let (actor, ability) = self.authenticate(ctx).await?;
        if ability.cannot(Action::Delete, ResourceType::Incident) {
            return Err(ServiceError::forbidden());
        }

        let incident = self
            .store
            .get_incident(id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Incident"))?;

        if !self.store.delete_incident(id).await? {
            return Err(ServiceError::not_found("Incident"));
        }

        tracing::info!(incident_id = id, actor_id = actor.id, "Incident deleted");

        self.audit
            .record(
                self.audit_entry(ctx, AuditAction::IncidentDeleted, &actor, id).with_metadata(json!({
                    "incident": { "id": incident.id, "reporterId": incident.reporter_id },
                })),
            )
            .await;

        Ok(())
    }
}
