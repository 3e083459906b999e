//! Persistence seam
//!
//! This module defines the storage operations the handlers need and the
//! in-memory implementation used for single-process deployments and tests.

use async_trait::async_trait;
use incident_model::{Incident, ReportReason, Role, User, DEFAULT_REPORT_REASONS};
use std::collections::BTreeMap;
use thiserror::Error;
use tokio::sync::RwLock;

/// Storage error types.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// The entity to update does not exist
    #[error("{0} not found")]
    NotFound(String),

    /// A uniqueness or reference constraint would be violated
    #[error("{0}")]
    Conflict(String),

    /// The backend could not serve the request
    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

/// Result type for storage operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Storage operations used by the handlers.
#[async_trait]
pub trait Store: Send + Sync {
    /// Get a user by ID.
    async fn get_user(&self, id: i64) -> StoreResult<Option<User>>;

    /// List users, newest first. `only` restricts the listing to one ID.
    async fn list_users(&self, only: Option<i64>) -> StoreResult<Vec<User>>;

    /// Persist changes to an existing user.
    async fn save_user(&self, user: User) -> StoreResult<User>;

    /// List incidents, newest first, optionally only those filed by `reporter_id`.
    async fn list_incidents(&self, reporter_id: Option<i64>) -> StoreResult<Vec<Incident>>;

    /// Get an incident by ID.
    async fn get_incident(&self, id: i64) -> StoreResult<Option<Incident>>;

    /// File a new, unresolved incident.
    async fn create_incident(
        &self,
        reporter_id: i64,
        report_reason_id: i64,
        details: &str,
        reported_user_id: Option<i64>,
    ) -> StoreResult<Incident>;

    /// Persist changes to an existing incident.
    async fn save_incident(&self, incident: Incident) -> StoreResult<Incident>;

    /// Delete an incident. Returns whether it existed.
    async fn delete_incident(&self, id: i64) -> StoreResult<bool>;

    /// List the reason catalog, ordered by text key.
    async fn list_report_reasons(&self) -> StoreResult<Vec<ReportReason>>;

    /// Get a reason by ID.
    async fn get_report_reason(&self, id: i64) -> StoreResult<Option<ReportReason>>;

    /// Get a reason by its text key.
    async fn find_report_reason(&self, text_key: &str) -> StoreResult<Option<ReportReason>>;

    /// Add a reason. Fails with `Conflict` if the text key is taken.
    async fn create_report_reason(&self, text_key: &str) -> StoreResult<ReportReason>;

    /// Delete a reason. Returns whether it existed.
    async fn delete_report_reason(&self, id: i64) -> StoreResult<bool>;

    /// Check if any incident references the reason.
    async fn report_reason_in_use(&self, id: i64) -> StoreResult<bool>;
}

#[derive(Debug, Default)]
struct Tables {
    users: BTreeMap<i64, User>,
    incidents: BTreeMap<i64, Incident>,
    reasons: BTreeMap<i64, ReportReason>,
    next_user_id: i64,
    next_incident_id: i64,
    next_reason_id: i64,
}

impl Tables {
    fn next_id(counter: &mut i64) -> i64 {
        *counter += 1;
        *counter
    }
}

/// In-memory store.
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store holding the demo accounts and the default reasons.
    ///
    /// | ID | Name           | Role      |
    /// |----|----------------|-----------|
    /// | 1  | Alice Player   | Player    |
    /// | 2  | Dave Player    | Player    |
    /// | 3  | Bob Moderator  | Moderator |
    /// | 4  | Charlie Admin  | Admin     |
    pub fn seeded() -> Self {
        let mut tables = Tables::default();

        let users = [
            User::new(1, "alice.player@test.com", "Alice Player", Role::Player),
            User::new(2, "dave.player@test.com", "Dave Player", Role::Player),
            User::new(3, "bob.moderator@test.com", "Bob Moderator", Role::Moderator),
            User::new(4, "charlie.admin@test.com", "Charlie Admin", Role::Admin),
        ];
        for user in users {
            tables.next_user_id = tables.next_user_id.max(user.id);
            tables.users.insert(user.id, user);
        }

        for text_key in DEFAULT_REPORT_REASONS {
            let id = Tables::next_id(&mut tables.next_reason_id);
            tables.reasons.insert(id, ReportReason::new(id, text_key));
        }

        Self {
            tables: RwLock::new(tables),
        }
    }

    /// Insert an account with a caller-chosen ID, replacing any existing one.
    pub async fn insert_user(&self, user: User) -> User {
        let mut tables = self.tables.write().await;
        tables.next_user_id = tables.next_user_id.max(user.id);
        tables.users.insert(user.id, user.clone());
        user
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn get_user(&self, id: i64) -> StoreResult<Option<User>> {
        Ok(self.tables.read().await.users.get(&id).cloned())
    }

    async fn list_users(&self, only: Option<i64>) -> StoreResult<Vec<User>> {
        let tables = self.tables.read().await;
        let mut users: Vec<User> = tables
            .users
            .values()
            .filter(|user| only.map_or(true, |id| user.id == id))
            .cloned()
            .collect();
        users.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(users)
    }

    async fn save_user(&self, user: User) -> StoreResult<User> {
        let mut tables = self.tables.write().await;
        match tables.users.get_mut(&user.id) {
            Some(stored) => {
                *stored = user.clone();
                Ok(user)
            }
            None => Err(StoreError::NotFound("User".to_string())),
        }
    }

    async fn list_incidents(&self, reporter_id: Option<i64>) -> StoreResult<Vec<Incident>> {
        let tables = self.tables.read().await;
        let mut incidents: Vec<Incident> = tables
            .incidents
            .values()
            .filter(|incident| reporter_id.map_or(true, |id| incident.reporter_id == id))
            .cloned()
            .collect();
        incidents.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(incidents)
    }

    async fn get_incident(&self, id: i64) -> StoreResult<Option<Incident>> {
        Ok(self.tables.read().await.incidents.get(&id).cloned())
    }

    async fn create_incident(
        &self,
        reporter_id: i64,
        report_reason_id: i64,
        details: &str,
        reported_user_id: Option<i64>,
    ) -> StoreResult<Incident> {
        let mut tables = self.tables.write().await;
        if !tables.reasons.contains_key(&report_reason_id) {
            return Err(StoreError::Conflict("Invalid report reason".to_string()));
        }
        let id = Tables::next_id(&mut tables.next_incident_id);
        let incident = Incident::new(id, reporter_id, report_reason_id, details, reported_user_id);
        tables.incidents.insert(id, incident.clone());
        Ok(incident)
    }

    async fn save_incident(&self, incident: Incident) -> StoreResult<Incident> {
        let mut tables = self.tables.write().await;
        match tables.incidents.get_mut(&incident.id) {
            Some(stored) => {
                *stored = incident.clone();
                Ok(incident)
            }
            None => Err(StoreError::NotFound("Incident".to_string())),
        }
    }

    async fn delete_incident(&self, id: i64) -> StoreResult<bool> {
        Ok(self.tables.write().await.incidents.remove(&id).is_some())
    }

    async fn list_report_reasons(&self) -> StoreResult<Vec<ReportReason>> {
        let tables = self.tables.read().await;
        let mut reasons: Vec<ReportReason> = tables.reasons.values().cloned().collect();
        reasons.sort_by(|a, b| a.text_key.cmp(&b.text_key));
        Ok(reasons)
    }

    async fn get_report_reason(&self, id: i64) -> StoreResult<Option<ReportReason>> {
        Ok(self.tables.read().await.reasons.get(&id).cloned())
    }

    async fn find_report_reason(&self, text_key: &str) -> StoreResult<Option<ReportReason>> {
        let tables = self.tables.read().await;
        Ok(tables
            .reasons
            .values()
            .find(|reason| reason.text_key == text_key)
            .cloned())
    }

    async fn create_report_reason(&self, text_key: &str) -> StoreResult<ReportReason> {
        let mut tables = self.tables.write().await;
        if tables.reasons.values().any(|reason| reason.text_key == text_key) {
            return Err(StoreError::Conflict(
                "A report reason with this textKey already exists".to_string(),
            ));
        }
        let id = Tables::next_id(&mut tables.next_reason_id);
        let reason = ReportReason::new(id, text_key);
        tables.reasons.insert(id, reason.clone());
        Ok(reason)
    }

    async fn delete_report_reason(&self, id: i64) -> StoreResult<bool> {
        Ok(self.tables.write().await.reasons.remove(&id).is_some())
    }

    async fn report_reason_in_use(&self, id: i64) -> StoreResult<bool> {
        let tables = self.tables.read().await;
        Ok(tables
            .incidents
            .values()
            .any(|incident| incident.report_reason_id == id))
    }
}
