//! Audit log listing

use incident_ability::{Action, ResourceType};
use incident_audit::{AuditAction, AuditQuery};
use std::collections::HashMap;
use std::str::FromStr;
use tracing::instrument;

use crate::config::ServiceConfig;
use crate::error::{ServiceError, ServiceResult};
use crate::request::RequestContext;
use crate::service::TrackerService;
use crate::views::AuditLogView;

/// Filters of the audit log listing, as given in the query string.
///
/// `entityType` and `entityId` only filter when both are present.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuditLogParams {
    /// `entityType`
    pub entity_type: Option<ResourceType>,
    /// `entityId`
    pub entity_id: Option<i64>,
    /// `actorId`
    pub actor_id: Option<i64>,
    /// `action`
    pub action: Option<AuditAction>,
    /// `limit`
    pub limit: Option<usize>,
}

impl AuditLogParams {
    /// Parse from query parameters.
    ///
    /// # Errors
    ///
    /// `Validation` naming the first malformed parameter.
    pub fn from_query(query: &HashMap<String, String>) -> ServiceResult<Self> {
        let entity_type = match non_empty(query, "entityType") {
            Some(raw) => Some(ResourceType::parse(raw).ok_or_else(|| invalid("entityType"))?),
            None => None,
        };
        let action = match non_empty(query, "action") {
            Some(raw) => Some(AuditAction::parse(raw).ok_or_else(|| invalid("action"))?),
            None => None,
        };

        Ok(Self {
            entity_type,
            entity_id: number(query, "entityId")?,
            actor_id: number(query, "actorId")?,
            action,
            limit: number(query, "limit")?,
        })
    }

    /// Build the sink query, clamping the limit to the configured maximum.
    pub fn to_query(&self, config: &ServiceConfig) -> AuditQuery {
        let mut query = AuditQuery::new().with_limit(config.audit_limit(self.limit));
        if let (Some(entity_type), Some(entity_id)) = (self.entity_type, self.entity_id) {
            query = query.for_entity(entity_type, entity_id);
        }
        if let Some(actor_id) = self.actor_id {
            query = query.by_actor(actor_id);
        }
        if let Some(action) = self.action {
            query = query.with_action(action);
        }
        query
    }
}

fn non_empty<'a>(query: &'a HashMap<String, String>, key: &str) -> Option<&'a str> {
    query.get(key).map(|v| v.trim()).filter(|v| !v.is_empty())
}

fn number<T: FromStr>(query: &HashMap<String, String>, key: &str) -> ServiceResult<Option<T>> {
    match non_empty(query, key) {
        Some(raw) => raw.parse().map(Some).map_err(|_| invalid(key)),
        None => Ok(None),
    }
}

fn invalid(key: &str) -> ServiceError {
    ServiceError::Validation(format!("Invalid query parameter: {}", key))
}

impl TrackerService {
    /// List the audit trail, newest first, filtered by the query string.
    #[instrument(skip(self, ctx))]
    pub async fn list_audit_logs(&self, ctx: &RequestContext) -> ServiceResult<Vec<AuditLogView>> {
        let (_actor, ability) = self.authenticate(ctx).await?;
        if ability.cannot(Action::Read, ResourceType::AuditLog) {
            return Err(ServiceError::forbidden());
        }

        let params = AuditLogParams::from_query(&ctx.query)?;
        let records = self
            .audit
            .query(&params.to_query(&self.config))
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "Audit log query failed");
                ServiceError::Unexpected(e.to_string())
            })?;

        let mut views = Vec::with_capacity(records.len());
        for record in records {
            let actor = self.user_summary(Some(record.actor_id)).await?;
            views.push(AuditLogView { record, actor });
        }
        Ok(views)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use incident_model::{IncidentPatch, NewIncident, UserPatch};

    fn query(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    #[test]
    fn test_params_parse() {
        let params = AuditLogParams::from_query(&query(&[
            ("entityType", "Incident"),
            ("entityId", "12"),
            ("actorId", "3"),
            ("limit", "20"),
        ]))
        .unwrap();
        assert_eq!(params.entity_type, Some(ResourceType::Incident));
        assert_eq!(params.entity_id, Some(12));
        assert_eq!(params.actor_id, Some(3));
        assert_eq!(params.limit, Some(20));

        assert_eq!(AuditLogParams::from_query(&HashMap::new()).unwrap(), AuditLogParams::default());

        let err = AuditLogParams::from_query(&query(&[("entityId", "twelve")])).unwrap_err();
        assert_eq!(err, ServiceError::Validation("Invalid query parameter: entityId".into()));
    }

    #[test]
    fn test_lone_entity_type_does_not_filter() {
        let config = ServiceConfig::default();
        let params = AuditLogParams {
            entity_type: Some(ResourceType::User),
            limit: Some(5000),
            ..AuditLogParams::default()
        };
        let q = params.to_query(&config);
        assert_eq!(q.entity_type, None);
        assert_eq!(q.limit, 1000);
    }

    #[tokio::test]
    async fn test_admin_only_listing_with_filters() {
        let (service, _) = TrackerService::in_memory(ServiceConfig::default()).unwrap();
        let id = service
            .create_incident(&RequestContext::as_user(1), NewIncident::new(2, "Test", Some(2)))
            .await
            .unwrap()
            .id();
        service
            .update_incident(&RequestContext::as_user(3), id, IncidentPatch::resolve())
            .await
            .unwrap();
        service
            .update_user(&RequestContext::as_user(3), 2, UserPatch::ban())
            .await
            .unwrap();

        for actor in [1, 3] {
            let err = service.list_audit_logs(&RequestContext::as_user(actor)).await.unwrap_err();
            assert_eq!(err.status_code(), 403);
        }

        let admin = RequestContext::as_user(4);
        let all = service.list_audit_logs(&admin).await.unwrap();
        assert_eq!(all.len(), 3);
        assert_eq!(all[0].record.action, AuditAction::UserBanned);
        assert_eq!(all[0].actor.as_ref().unwrap().name, "Bob Moderator");

        let ctx = admin
            .clone()
            .with_query("entityType", "Incident")
            .with_query("entityId", id.to_string());
        let for_incident = service.list_audit_logs(&ctx).await.unwrap();
        assert_eq!(for_incident.len(), 2);

        let ctx = admin.clone().with_query("actorId", "3").with_query("limit", "1");
        let by_bob = service.list_audit_logs(&ctx).await.unwrap();
        assert_eq!(by_bob.len(), 1);
        assert_eq!(by_bob[0].record.action, AuditAction::UserBanned);

        let json = serde_json::to_value(&by_bob[0]).unwrap();
        assert_eq!(json["action"], "USER_BANNED");
        assert_eq!(json["entityType"], "User");
        assert_eq!(json["actor"]["id"], 3);
    }
}
