//! Tracker service
//!
//! [`TrackerService`] owns the store, the audit recorder and the actor
//! resolver. The request handlers in [`crate::handlers`] and the moderation
//! workflows in [`crate::workflow`] are implemented as methods on it.

use incident_ability::{define_ability, Ability};
use incident_audit::{AuditAction, AuditEntry, AuditRecorder, MemoryAuditLog};
use incident_model::{Incident, User, UserSummary};
use std::sync::Arc;

use crate::config::{ConfigError, ServiceConfig};
use crate::error::ServiceResult;
use crate::request::{ActorResolver, HeaderActorResolver, RequestContext};
use crate::store::{MemoryStore, Store};
use crate::views::{HealthStatus, IncidentView};

/// Request handling entry point.
#[derive(Clone)]
pub struct TrackerService {
    pub(crate) store: Arc<dyn Store>,
    pub(crate) audit: AuditRecorder,
    pub(crate) actors: Arc<dyn ActorResolver>,
    pub(crate) config: ServiceConfig,
}

impl std::fmt::Debug for TrackerService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TrackerService")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl TrackerService {
    /// Create a service identifying actors by the `x-user-id` header.
    ///
    /// # Arguments
    ///
    /// * `store` - Persistence backend
    /// * `audit` - Audit recorder
    /// * `config` - Service configuration
    pub fn new(store: Arc<dyn Store>, audit: AuditRecorder, config: ServiceConfig) -> Self {
        let actors = Arc::new(HeaderActorResolver::new(store.clone()));
        Self {
            store,
            audit,
            actors,
            config,
        }
    }

    /// Create a fully in-memory service.
    ///
    /// The store is seeded when `config.seed_demo_data` is set. The audit
    /// log is returned alongside so callers can subscribe to it.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when `config` fails validation.
    ///
    /// # Example
    ///
    /// ```rust,no_run
    /// use incident_service::{RequestContext, ServiceConfig, TrackerService};
    ///
    /// async fn example() -> Result<(), Box<dyn std::error::Error>> {
    ///     let (service, _audit_log) = TrackerService::in_memory(ServiceConfig::default())?;
    ///     let incidents = service.list_incidents(&RequestContext::as_user(3)).await?;
    ///     assert!(incidents.is_empty());
    ///     Ok(())
    /// }
    /// ```
    pub fn in_memory(config: ServiceConfig) -> Result<(Self, Arc<MemoryAuditLog>), ConfigError> {
        config.validate()?;

        let store: Arc<dyn Store> = if config.seed_demo_data {
            Arc::new(MemoryStore::seeded())
        } else {
            Arc::new(MemoryStore::new())
        };
        let log = Arc::new(MemoryAuditLog::with_capacity(config.audit_channel_capacity));
        let service = Self::new(store, AuditRecorder::new(log.clone()), config);
        Ok((service, log))
    }

    /// Replace the actor resolver.
    pub fn with_actor_resolver(mut self, actors: Arc<dyn ActorResolver>) -> Self {
        self.actors = actors;
        self
    }

    /// The persistence backend.
    pub fn store(&self) -> &Arc<dyn Store> {
        &self.store
    }

    /// The service configuration.
    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    /// Liveness check. Needs no acting user.
    pub fn health(&self) -> HealthStatus {
        HealthStatus::running()
    }

    /// Identify the acting user and build their ability.
    pub(crate) async fn authenticate(&self, ctx: &RequestContext) -> ServiceResult<(User, Ability)> {
        let actor = self.actors.resolve(ctx).await?;
        let ability = define_ability(&actor);
        Ok((actor, ability))
    }

    /// Audit entry carrying the requester details of `ctx`.
    pub(crate) fn audit_entry(
        &self,
        ctx: &RequestContext,
        action: AuditAction,
        actor: &User,
        entity_id: i64,
    ) -> AuditEntry {
        let user_agent = ctx
            .user_agent
            .clone()
            .or_else(|| ctx.header("user-agent").map(str::to_string));
        AuditEntry::new(action, actor.id, entity_id).with_request_details(ctx.ip_address.clone(), user_agent)
    }

    pub(crate) async fn user_summary(&self, id: Option<i64>) -> ServiceResult<Option<UserSummary>> {
        match id {
            Some(id) => Ok(self.store.get_user(id).await?.map(|user| user.summary())),
            None => Ok(None),
        }
    }

    /// Embed the related records of an incident.
    pub(crate) async fn incident_view(&self, incident: Incident) -> ServiceResult<IncidentView> {
        let reporter = self.user_summary(Some(incident.reporter_id)).await?;
        let reported_user = self.user_summary(incident.reported_user_id).await?;
        let resolver = self.user_summary(incident.resolver_id()).await?;
        let report_reason = self.store.get_report_reason(incident.report_reason_id).await?;

        Ok(IncidentView {
            incident,
            reporter,
            reported_user,
            resolver,
            report_reason,
        })
    }
}
