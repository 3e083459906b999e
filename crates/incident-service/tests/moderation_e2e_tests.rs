//! End-to-end tests for the moderation flow.
//!
//! These tests drive the tracker service through complete report lifecycles
//! with the seeded demo accounts and verify the resulting incident state,
//! ban status and audit trail.
//!
//! Test flows:
//! 1. Player reports, moderator resolves and bans
//! 2. Ban refused for a non-player target, report stays resolved
//! 3. Admin reopens and lifts the ban
//! 4. Audit sink failure does not fail the mutation
//! 5. Status mapping across identification and access failures

use async_trait::async_trait;
use incident_audit::{
    AuditAction, AuditEntry, AuditError, AuditQuery, AuditRecord, AuditRecorder, AuditResult, AuditSink,
    MemoryAuditLog,
};
use incident_model::{IncidentPatch, NewIncident, Role, User, UserPatch};
use incident_service::{
    BanOutcome, MemoryStore, RequestContext, ServiceConfig, ServiceError, Store, TrackerService, UnbanOutcome,
};
use std::sync::Arc;

const ALICE: i64 = 1;
const DAVE: i64 = 2;
const BOB: i64 = 3;
const CHARLIE: i64 = 4;

/// Test fixture with a seeded store and an in-memory audit log.
struct TestFixture {
    /// Service under test.
    service: TrackerService,
    /// Audit log behind the service.
    audit_log: Arc<MemoryAuditLog>,
}

impl TestFixture {
    fn new() -> Self {
        let (service, audit_log) = TrackerService::in_memory(ServiceConfig::default()).unwrap();
        Self { service, audit_log }
    }

    async fn report(&self, reporter: i64, reason_id: i64, reported: Option<i64>) -> i64 {
        self.service
            .create_incident(
                &RequestContext::as_user(reporter),
                NewIncident::new(reason_id, "Test", reported),
            )
            .await
            .expect("report should be filed")
            .id()
    }

    async fn user(&self, id: i64) -> User {
        self.service.store().get_user(id).await.unwrap().unwrap()
    }

    async fn actions(&self) -> Vec<AuditAction> {
        self.audit_log
            .query(&AuditQuery::new())
            .await
            .unwrap()
            .into_iter()
            .map(|r| r.action)
            .collect()
    }
}

struct BrokenSink;

#[async_trait]
impl AuditSink for BrokenSink {
    async fn append(&self, _entry: AuditEntry) -> AuditResult<AuditRecord> {
        Err(AuditError::AppendError("connection refused".to_string()))
    }

    async fn query(&self, _query: &AuditQuery) -> AuditResult<Vec<AuditRecord>> {
        Err(AuditError::QueryError("connection refused".to_string()))
    }
}

#[tokio::test]
async fn test_player_report_resolved_with_ban() {
    let fixture = TestFixture::new();

    let payload: NewIncident =
        serde_json::from_str(r#"{"reasonId": 2, "details": "Test", "reportedUserId": 2}"#).unwrap();
    let created = fixture
        .service
        .create_incident(&RequestContext::as_user(ALICE), payload)
        .await
        .unwrap();
    assert!(!created.incident.is_resolved());
    assert_eq!(created.incident.reporter_id, ALICE);
    assert_eq!(created.report_reason.as_ref().unwrap().id, 2);

    let outcome = fixture
        .service
        .resolve_incident(&RequestContext::as_user(BOB), created.id(), true)
        .await
        .unwrap();

    assert!(outcome.incident.incident.is_resolved());
    assert_eq!(outcome.incident.incident.resolver_id(), Some(BOB));
    assert!(matches!(&outcome.ban, BanOutcome::Banned(user) if user.id == DAVE && user.banned));
    assert_eq!(outcome.message(), "Report resolved and user banned.");
    assert!(fixture.user(DAVE).await.banned);

    let json = serde_json::to_value(&outcome.incident).unwrap();
    assert_eq!(json["resolved"], true);
    assert_eq!(json["resolverId"], BOB);
    assert_eq!(json["resolver"]["name"], "Bob Moderator");

    assert_eq!(
        fixture.actions().await,
        vec![AuditAction::UserBanned, AuditAction::IncidentResolved, AuditAction::IncidentCreated]
    );

    // The banned player can no longer file reports
    let err = fixture
        .service
        .create_incident(&RequestContext::as_user(DAVE), NewIncident::new(1, "Revenge", Some(ALICE)))
        .await
        .unwrap_err();
    assert_eq!(err.to_body(), serde_json::json!({"error": "Banned users cannot create incidents"}));
}

#[tokio::test]
async fn test_ban_refused_leaves_report_resolved() {
    let fixture = TestFixture::new();
    let id = fixture.report(ALICE, 3, Some(BOB)).await;

    // A moderator may only ban players
    let outcome = fixture
        .service
        .resolve_incident(&RequestContext::as_user(BOB), id, true)
        .await
        .unwrap();

    assert!(outcome.incident.incident.is_resolved());
    assert_eq!(outcome.ban, BanOutcome::Failed(ServiceError::forbidden()));
    assert_eq!(outcome.message(), "Report resolved but failed to ban user: Forbidden");
    assert!(outcome.is_partial());
    assert!(!fixture.user(BOB).await.banned);

    let stored = fixture.service.store().get_incident(id).await.unwrap().unwrap();
    assert!(stored.is_resolved());
}

#[tokio::test]
async fn test_admin_reopen_lifts_ban() {
    let fixture = TestFixture::new();
    let id = fixture.report(ALICE, 2, Some(DAVE)).await;

    fixture
        .service
        .resolve_incident(&RequestContext::as_user(BOB), id, true)
        .await
        .unwrap();

    // Moderators cannot touch resolved reports
    let err = fixture
        .service
        .reopen_incident(&RequestContext::as_user(BOB), id)
        .await
        .unwrap_err();
    assert_eq!(err.status_code(), 403);
    assert!(fixture.user(DAVE).await.banned);

    let outcome = fixture
        .service
        .reopen_incident(&RequestContext::as_user(CHARLIE), id)
        .await
        .unwrap();
    assert!(!outcome.incident.incident.is_resolved());
    assert_eq!(outcome.incident.incident.resolver_id(), None);
    assert!(matches!(outcome.unban, UnbanOutcome::Unbanned(ref user) if !user.banned));
    assert_eq!(outcome.message(), "Report reopened and user unbanned.");
    assert!(!fixture.user(DAVE).await.banned);

    // Reopening again is not a state change but a no-op update
    let again = fixture
        .service
        .update_incident(&RequestContext::as_user(CHARLIE), id, IncidentPatch::reopen())
        .await
        .unwrap();
    assert!(!again.incident.is_resolved());

    assert_eq!(
        fixture.actions().await,
        vec![
            AuditAction::IncidentUpdated,
            AuditAction::UserUnbanned,
            AuditAction::IncidentReopened,
            AuditAction::UserBanned,
            AuditAction::IncidentResolved,
            AuditAction::IncidentCreated,
        ]
    );
}

#[tokio::test]
async fn test_reopen_without_ban_does_not_unban() {
    let fixture = TestFixture::new();
    let id = fixture.report(ALICE, 1, Some(DAVE)).await;

    fixture
        .service
        .resolve_incident(&RequestContext::as_user(BOB), id, false)
        .await
        .unwrap();

    let outcome = fixture
        .service
        .reopen_incident(&RequestContext::as_user(CHARLIE), id)
        .await
        .unwrap();
    assert_eq!(outcome.unban, UnbanOutcome::NotBanned);
    assert_eq!(outcome.message(), "Report reopened.");
    assert!(!fixture.actions().await.contains(&AuditAction::UserUnbanned));
}

#[tokio::test]
async fn test_audit_failure_does_not_fail_mutation() {
    let store = Arc::new(MemoryStore::seeded());
    let service = TrackerService::new(
        store.clone(),
        AuditRecorder::new(Arc::new(BrokenSink)),
        ServiceConfig::default(),
    );

    let id = service
        .create_incident(&RequestContext::as_user(ALICE), NewIncident::new(2, "Test", Some(DAVE)))
        .await
        .unwrap()
        .id();
    let outcome = service
        .resolve_incident(&RequestContext::as_user(BOB), id, true)
        .await
        .unwrap();
    assert!(matches!(outcome.ban, BanOutcome::Banned(_)));

    assert!(store.get_incident(id).await.unwrap().unwrap().is_resolved());
    assert!(store.get_user(DAVE).await.unwrap().unwrap().banned);

    // Reading the trail does surface the failure
    let err = service.list_audit_logs(&RequestContext::as_user(CHARLIE)).await.unwrap_err();
    assert_eq!(err.status_code(), 500);
    let body = err.to_body();
    assert!(body["error"].as_str().unwrap().contains("connection refused"));
}

#[tokio::test]
async fn test_status_mapping() {
    let fixture = TestFixture::new();
    let id = fixture.report(ALICE, 2, Some(DAVE)).await;
    let service = &fixture.service;

    // 401: no or unknown acting user
    for ctx in [RequestContext::new(), RequestContext::as_user(99), RequestContext::new().with_query("userId", "x")] {
        assert_eq!(service.list_incidents(&ctx).await.unwrap_err().status_code(), 401);
    }

    // Query parameter identification works too
    let ctx = RequestContext::new().with_query("userId", ALICE.to_string());
    assert_eq!(service.list_incidents(&ctx).await.unwrap().len(), 1);

    // 403: another player's report
    let err = service.get_incident(&RequestContext::as_user(DAVE), id).await.unwrap_err();
    assert_eq!(err.status_code(), 403);
    assert_eq!(err.error_code(), "FORBIDDEN");

    // 404: missing entities
    assert_eq!(
        service.get_incident(&RequestContext::as_user(BOB), 404).await.unwrap_err().to_body(),
        serde_json::json!({"error": "Incident not found"})
    );
    let err = service
        .update_user(&RequestContext::as_user(CHARLIE), 404, UserPatch::ban())
        .await
        .unwrap_err();
    assert_eq!(err.status_code(), 404);

    // 400: invalid input
    let err = service
        .create_incident(&RequestContext::as_user(ALICE), NewIncident::default())
        .await
        .unwrap_err();
    assert_eq!(err.status_code(), 400);
    assert_eq!(err.error_code(), "VALIDATION_ERROR");

    assert_eq!(service.health().message, "Backend is running!");
}

#[tokio::test]
async fn test_demoted_moderator_loses_triage() {
    let fixture = TestFixture::new();
    let id = fixture.report(ALICE, 2, Some(DAVE)).await;

    fixture
        .service
        .update_user(&RequestContext::as_user(CHARLIE), BOB, UserPatch::role(Role::Player))
        .await
        .unwrap();

    let err = fixture
        .service
        .resolve_incident(&RequestContext::as_user(BOB), id, false)
        .await
        .unwrap_err();
    assert_eq!(err.status_code(), 403);

    assert!(fixture.actions().await.contains(&AuditAction::ModeratorRemoved));
}

#[tokio::test]
async fn test_new_moderator_can_triage() {
    let store = Arc::new(MemoryStore::seeded());
    store
        .insert_user(User::new(5, "erin.moderator@test.com", "Erin Moderator", Role::Moderator))
        .await;
    let audit_log = Arc::new(MemoryAuditLog::new());
    let service = TrackerService::new(store, AuditRecorder::new(audit_log.clone()), ServiceConfig::default());

    let id = service
        .create_incident(&RequestContext::as_user(ALICE), NewIncident::new(1, "Test", Some(DAVE)))
        .await
        .unwrap()
        .id();
    let outcome = service
        .resolve_incident(&RequestContext::as_user(5), id, true)
        .await
        .unwrap();
    assert_eq!(outcome.incident.resolver.as_ref().unwrap().name, "Erin Moderator");
    assert_eq!(audit_log.len().await, 3);
}
