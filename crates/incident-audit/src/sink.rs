//! Audit sink implementation
//!
//! This module provides the audit sink abstraction and the in-memory,
//! append-only implementation used by the tracker service and in tests.

use crate::types::{AuditAction, AuditEntry, AuditRecord};
use async_trait::async_trait;
use incident_ability::ResourceType;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::{broadcast, RwLock};

/// Default number of records returned by a query.
pub const DEFAULT_QUERY_LIMIT: usize = 100;

/// Audit sink error types.
#[derive(Debug, Error)]
pub enum AuditError {
    /// Failed to append a record
    #[error("Failed to append audit record: {0}")]
    AppendError(String),

    /// Failed to query records
    #[error("Failed to query audit records: {0}")]
    QueryError(String),

    /// Subscription channel closed
    #[error("Channel closed")]
    ChannelClosed,
}

/// Result type for audit operations.
pub type AuditResult<T> = Result<T, AuditError>;

/// Filter for listing the audit trail.
///
/// The entity filter applies only when both the type and the ID are set.
/// Results are newest first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditQuery {
    /// Entity type filter (needs `entity_id` too)
    pub entity_type: Option<ResourceType>,
    /// Entity ID filter (needs `entity_type` too)
    pub entity_id: Option<i64>,
    /// Actor filter
    pub actor_id: Option<i64>,
    /// Action filter
    pub action: Option<AuditAction>,
    /// Maximum number of records
    pub limit: usize,
}

impl Default for AuditQuery {
    fn default() -> Self {
        Self {
            entity_type: None,
            entity_id: None,
            actor_id: None,
            action: None,
            limit: DEFAULT_QUERY_LIMIT,
        }
    }
}

impl AuditQuery {
    /// Query with the default limit and no filters.
    pub fn new() -> Self {
        Self::default()
    }

    /// Filter by target entity.
    pub fn for_entity(mut self, entity_type: ResourceType, entity_id: i64) -> Self {
        self.entity_type = Some(entity_type);
        self.entity_id = Some(entity_id);
        self
    }

    /// Filter by actor.
    pub fn by_actor(mut self, actor_id: i64) -> Self {
        self.actor_id = Some(actor_id);
        self
    }

    /// Filter by action.
    pub fn with_action(mut self, action: AuditAction) -> Self {
        self.action = Some(action);
        self
    }

    /// Set the maximum number of records.
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    /// Check if a record passes the filter.
    pub fn matches(&self, record: &AuditRecord) -> bool {
        if let (Some(entity_type), Some(entity_id)) = (self.entity_type, self.entity_id) {
            if record.entity_type != entity_type || record.entity_id != entity_id {
                return false;
            }
        }
        if let Some(actor_id) = self.actor_id {
            if record.actor_id != actor_id {
                return false;
            }
        }
        if let Some(action) = self.action {
            if record.action != action {
                return false;
            }
        }
        true
    }
}

/// Append-only audit storage.
#[async_trait]
pub trait AuditSink: Send + Sync {
    /// Append an entry, returning the stored record.
    async fn append(&self, entry: AuditEntry) -> AuditResult<AuditRecord>;

    /// List records matching a filter, newest first.
    async fn query(&self, query: &AuditQuery) -> AuditResult<Vec<AuditRecord>>;
}

/// Audit log statistics.
#[derive(Debug, Clone, Default)]
pub struct AuditLogStats {
    /// Total records appended
    pub records_appended: u64,
    /// Total records delivered to subscribers
    pub records_delivered: u64,
    /// Queries served
    pub queries_served: u64,
}

/// In-memory audit log.
///
/// Suitable for single-process deployments and tests. Appended records are
/// also broadcast to subscribers.
pub struct MemoryAuditLog {
    /// Records in append order
    records: Arc<RwLock<Vec<AuditRecord>>>,
    /// Live feed of appended records
    sender: broadcast::Sender<AuditRecord>,
    /// Statistics
    stats: Arc<RwLock<AuditLogStats>>,
}

impl std::fmt::Debug for MemoryAuditLog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryAuditLog")
            .field("subscribers", &self.sender.receiver_count())
            .finish()
    }
}

impl MemoryAuditLog {
    /// Create a new in-memory audit log.
    pub fn new() -> Self {
        Self::with_capacity(1024)
    }

    /// Create with custom subscriber channel capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self {
            records: Arc::new(RwLock::new(Vec::new())),
            sender,
            stats: Arc::new(RwLock::new(AuditLogStats::default())),
        }
    }

    /// Subscribe to records appended from now on.
    pub fn subscribe(&self) -> AuditSubscription {
        AuditSubscription {
            receiver: self.sender.subscribe(),
        }
    }

    /// Number of stored records.
    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    /// Check if no record has been stored.
    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }

    /// Get log statistics.
    pub async fn stats(&self) -> AuditLogStats {
        self.stats.read().await.clone()
    }
}

impl Default for MemoryAuditLog {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AuditSink for MemoryAuditLog {
    async fn append(&self, entry: AuditEntry) -> AuditResult<AuditRecord> {
        let record = AuditRecord::from_entry(entry);

        self.records.write().await.push(record.clone());

        // No subscribers is not an error
        let delivered = self.sender.send(record.clone()).unwrap_or(0);

        {
            let mut stats = self.stats.write().await;
            stats.records_appended += 1;
            stats.records_delivered += delivered as u64;
        }

        tracing::debug!(
            action = %record.action,
            actor_id = record.actor_id,
            entity_type = %record.entity_type,
            entity_id = record.entity_id,
            "Audit record appended"
        );

        Ok(record)
    }

    async fn query(&self, query: &AuditQuery) -> AuditResult<Vec<AuditRecord>> {
        let records = self.records.read().await;
        let found = records
            .iter()
            .rev()
            .filter(|record| query.matches(record))
            .take(query.limit)
            .cloned()
            .collect();

        self.stats.write().await.queries_served += 1;

        Ok(found)
    }
}

/// Live feed of appended records.
pub struct AuditSubscription {
    receiver: broadcast::Receiver<AuditRecord>,
}

impl AuditSubscription {
    /// Receive the next appended record.
    pub async fn recv(&mut self) -> AuditResult<AuditRecord> {
        self.receiver
            .recv()
            .await
            .map_err(|_| AuditError::ChannelClosed)
    }
}
