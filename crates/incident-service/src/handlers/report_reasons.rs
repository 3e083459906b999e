//! Report reason catalog handlers

use incident_ability::{Action, ResourceType};
use incident_audit::AuditAction;
use incident_model::{NewReportReason, ReportReason};
use serde_json::json;
use tracing::instrument;

use crate::error::{ServiceError, ServiceResult};
use crate::request::RequestContext;
use crate::service::TrackerService;

impl TrackerService {
    /// List the catalog, ordered by text key.
    #[instrument(skip(self, ctx))]
    pub async fn list_report_reasons(&self, ctx: &RequestContext) -> ServiceResult<Vec<ReportReason>> {
        let (_actor, ability) = self.authenticate(ctx).await?;
        if ability.cannot(Action::Read, ResourceType::ReportReason) {
            return Err(ServiceError::forbidden());
        }
        Ok(self.store.list_report_reasons().await?)
    }

    /// Add a reason to the catalog.
    ///
    /// # Errors
    ///
    /// `Validation` for a blank or already used text key.
    #[instrument(skip(self, ctx, payload))]
    pub async fn create_report_reason(
        &self,
        ctx: &RequestContext,
        payload: NewReportReason,
    ) -> ServiceResult<ReportReason> {
        let (actor, ability) = self.authenticate(ctx).await?;
        if ability.cannot(Action::Create, ResourceType::ReportReason) {
            return Err(ServiceError::forbidden());
        }

        let text_key = payload
            .text_key()
            .ok_or_else(|| ServiceError::Validation("textKey is required".to_string()))?;

        let reason = self.store.create_report_reason(text_key).await?;
        tracing::info!(reason_id = reason.id, text_key = %reason.text_key, "Report reason created");

        self.audit
            .record(
                self.audit_entry(ctx, AuditAction::ReportReasonCreated, &actor, reason.id)
                    .with_metadata(json!({ "textKey": reason.text_key })),
            )
            .await;

        Ok(reason)
    }

    /// Remove a reason from the catalog.
    ///
    /// Reasons still referenced by an incident are kept.
    #[instrument(skip(self, ctx))]
    pub async fn delete_report_reason(&self, ctx: &RequestContext, id: i64) -> ServiceResult<()> {
        let (actor, ability) = self.authenticate(ctx).await?;
        if ability.cannot(Action::Delete, ResourceType::ReportReason) {
            return Err(ServiceError::forbidden());
        }

        let reason = self
            .store
            .get_report_reason(id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Report reason"))?;

        if self.store.report_reason_in_use(id).await? {
            return Err(ServiceError::Validation(
                "Report reason is in use by existing incidents".to_string(),
            ));
        }

        if !self.store.delete_report_reason(id).await? {
            return Err(ServiceError::not_found("Report reason"));
        }
        tracing::info!(reason_id = id, text_key = %reason.text_key, "Report reason deleted");

        self.audit
            .record(
                self.audit_entry(ctx, AuditAction::ReportReasonDeleted, &actor, id)
                    .with_metadata(json!({ "textKey": reason.text_key })),
            )
            .await;

        Ok(())
    }
}
