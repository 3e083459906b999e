//! Moderation workflows
//!
//! Resolving a report and banning the reported player are two separate
//! operations. The workflows here issue them in sequence on behalf of the
//! same acting user:
//!
//! ```text
//! resolve(id, should_ban) ── update incident {resolved: true} ──┬── failed: abort
//!                                                              └── ok ── should_ban && reported user?
//!                                                                          └── update user {banned: true}
//!
//! reopen(id) ── update incident {resolved: false} ──┬── failed: abort
//!                                                   └── ok ── reported user banned?
//!                                                               └── update user {banned: false}
//! ```
//!
//! There is no transaction spanning both steps. A failed ban leaves the
//! report resolved; the failure is returned as part of the outcome instead
//! of as an error.

use incident_model::{IncidentPatch, User, UserPatch};
use tracing::instrument;

use crate::error::{ServiceError, ServiceResult};
use crate::request::RequestContext;
use crate::service::TrackerService;
use crate::views::IncidentView;

/// What happened to the reported player after a resolution.
#[derive(Debug, Clone, PartialEq)]
pub enum BanOutcome {
    /// No ban was asked for
    NotRequested,
    /// The report names no player to ban
    NoReportedUser,
    /// The player is now banned
    Banned(User),
    /// The ban was refused or failed; the report stays resolved
    Failed(ServiceError),
}

/// Result of [`TrackerService::resolve_incident`].
#[derive(Debug, Clone, PartialEq)]
pub struct ResolutionOutcome {
    /// The resolved incident
    pub incident: IncidentView,
    /// The ban step
    pub ban: BanOutcome,
}

impl ResolutionOutcome {
    /// Human-readable summary for the moderator.
    pub fn message(&self) -> String {
        match &self.ban {
            BanOutcome::Banned(_) => "Report resolved and user banned.".to_string(),
            BanOutcome::Failed(e) => format!("Report resolved but failed to ban user: {}", e),
            BanOutcome::NoReportedUser => "Report resolved, but no user to ban.".to_string(),
            BanOutcome::NotRequested => "Report resolved without banning.".to_string(),
        }
    }

    /// Check if the ban step failed.
    pub fn is_partial(&self) -> bool {
        matches!(self.ban, BanOutcome::Failed(_))
    }
}

/// What happened to the reported player after a reopen.
#[derive(Debug, Clone, PartialEq)]
pub enum UnbanOutcome {
    /// The player was not banned, nothing to lift
    NotBanned,
    /// The report names no player
    NoReportedUser,
    /// The ban is lifted
    Unbanned(User),
    /// Lifting the ban was refused or failed; the report stays reopened
    Failed(ServiceError),
}

/// Result of [`TrackerService::reopen_incident`].
#[derive(Debug, Clone, PartialEq)]
pub struct ReopenOutcome {
    /// The reopened incident
    pub incident: IncidentView,
    /// The unban step
    pub unban: UnbanOutcome,
}

impl ReopenOutcome {
    /// Human-readable summary for the moderator.
    pub fn message(&self) -> String {
        match &self.unban {
            UnbanOutcome::Unbanned(_) => "Report reopened and user unbanned.".to_string(),
            UnbanOutcome::Failed(e) => format!("Report reopened but failed to unban user: {}", e),
            UnbanOutcome::NotBanned | UnbanOutcome::NoReportedUser => "Report reopened.".to_string(),
        }
    }

    /// Check if the unban step failed.
    pub fn is_partial(&self) -> bool {
        matches!(self.unban, UnbanOutcome::Failed(_))
    }
}

impl TrackerService {
    /// Resolve a report and optionally ban the reported player.
    ///
    /// # Errors
    ///
    /// Only a failed resolve is an error. A failed ban is reported as
    /// [`BanOutcome::Failed`].
    #[instrument(skip(self, ctx))]
    pub async fn resolve_incident(
        &self,
        ctx: &RequestContext,
        incident_id: i64,
        should_ban: bool,
    ) -> ServiceResult<ResolutionOutcome> {
        let incident = self
            .update_incident(ctx, incident_id, IncidentPatch::resolve())
            .await?;

        let ban = match (should_ban, incident.incident.reported_user_id) {
            (false, _) => BanOutcome::NotRequested,
            (true, None) => BanOutcome::NoReportedUser,
            (true, Some(user_id)) => match self.update_user(ctx, user_id, UserPatch::ban()).await {
                Ok(user) => BanOutcome::Banned(user),
                Err(e) => {
                    tracing::warn!(incident_id, user_id, error = %e, "Report resolved but ban failed");
                    BanOutcome::Failed(e)
                }
            },
        };

        Ok(ResolutionOutcome { incident, ban })
    }

    /// Reopen a report and lift the reported player's ban if there is one.
    ///
    /// # Errors
    ///
    /// Only a failed reopen is an error. A failed unban is reported as
    /// [`UnbanOutcome::Failed`].
    #[instrument(skip(self, ctx))]
    pub async fn reopen_incident(&self, ctx: &RequestContext, incident_id: i64) -> ServiceResult<ReopenOutcome> {
        let incident = self
            .update_incident(ctx, incident_id, IncidentPatch::reopen())
            .await?;

        let unban = match &incident.reported_user {
            None => UnbanOutcome::NoReportedUser,
            Some(reported) if !reported.banned => UnbanOutcome::NotBanned,
            Some(reported) => match self.update_user(ctx, reported.id, UserPatch::unban()).await {
                Ok(user) => UnbanOutcome::Unbanned(user),
                Err(e) => {
                    tracing::warn!(incident_id, user_id = reported.id, error = %e, "Report reopened but unban failed");
                    UnbanOutcome::Failed(e)
                }
            },
        };

        Ok(ReopenOutcome { incident, unban })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ServiceConfig;
    use incident_model::NewIncident;

    #[test]
    fn test_messages() {
        let incident = IncidentView {
            incident: incident_model::Incident::new(1, 1, 2, "Test", Some(2)),
            reporter: None,
            reported_user: None,
            resolver: None,
            report_reason: None,
        };

        let outcome = ResolutionOutcome {
            incident: incident.clone(),
            ban: BanOutcome::Failed(ServiceError::forbidden()),
        };
        assert_eq!(outcome.message(), "Report resolved but failed to ban user: Forbidden");
        assert!(outcome.is_partial());

        let outcome = ResolutionOutcome {
            incident: incident.clone(),
            ban: BanOutcome::NoReportedUser,
        };
        assert_eq!(outcome.message(), "Report resolved, but no user to ban.");

        let outcome = ReopenOutcome {
            incident,
            unban: UnbanOutcome::NotBanned,
        };
        assert_eq!(outcome.message(), "Report reopened.");
        assert!(!outcome.is_partial());
    }

    #[tokio::test]
    async fn test_resolve_without_ban() {
        let (service, _) = TrackerService::in_memory(ServiceConfig::default()).unwrap();
        let id = service
            .create_incident(&RequestContext::as_user(1), NewIncident::new(2, "Test", Some(2)))
            .await
            .unwrap()
            .id();

        let outcome = service
            .resolve_incident(&RequestContext::as_user(3), id, false)
            .await
            .unwrap();
        assert_eq!(outcome.ban, BanOutcome::NotRequested);
        assert_eq!(outcome.message(), "Report resolved without banning.");

        let dave = service.store().get_user(2).await.unwrap().unwrap();
        assert!(!dave.banned);
    }

    #[tokio::test]
    async fn test_resolve_without_reported_user() {
        let (service, _) = TrackerService::in_memory(ServiceConfig::default()).unwrap();
        let id = service
            .create_incident(&RequestContext::as_user(1), NewIncident::new(4, "Lag", None))
            .await
            .unwrap()
            .id();

        let outcome = service
            .resolve_incident(&RequestContext::as_user(3), id, true)
            .await
            .unwrap();
        assert_eq!(outcome.ban, BanOutcome::NoReportedUser);
        assert!(outcome.incident.incident.is_resolved());
    }

    #[tokio::test]
    async fn test_failed_resolve_skips_ban() {
        let (service, _) = TrackerService::in_memory(ServiceConfig::default()).unwrap();
        let id = service
            .create_incident(&RequestContext::as_user(1), NewIncident::new(2, "Test", Some(2)))
            .await
            .unwrap()
            .id();

        // Players cannot resolve
        let err = service
            .resolve_incident(&RequestContext::as_user(1), id, true)
            .await
            .unwrap_err();
        assert_eq!(err.status_code(), 403);
        assert!(!service.store().get_user(2).await.unwrap().unwrap().banned);
    }
}
