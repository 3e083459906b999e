//! Fire-and-forget audit recording
//!
//! Handlers record after their primary mutation has been persisted. A
//! failed append is logged and dropped; it never fails or rolls back the
//! mutation that triggered it.

use std::sync::Arc;

use crate::sink::{AuditQuery, AuditResult, AuditSink};
use crate::types::{AuditEntry, AuditRecord};

/// Shared handle that appends audit entries to a sink.
#[derive(Clone)]
pub struct AuditRecorder {
    sink: Arc<dyn AuditSink>,
}

impl std::fmt::Debug for AuditRecorder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuditRecorder").finish_non_exhaustive()
    }
}

impl AuditRecorder {
    /// Create a recorder writing to `sink`.
    pub fn new(sink: Arc<dyn AuditSink>) -> Self {
        Self { sink }
    }

    /// Append an entry.
    ///
    /// # Returns
    ///
    /// The stored record, or `None` if the sink refused it
    pub async fn record(&self, entry: AuditEntry) -> Option<AuditRecord> {
        let action = entry.action;
        let entity_id = entry.entity_id;

        match self.sink.append(entry).await {
            Ok(record) => Some(record),
            Err(e) => {
                tracing::warn!(
                    action = %action,
                    entity_id,
                    error = %e,
                    "Failed to write audit record"
                );
                None
            }
        }
    }

    /// Append several entries in order.
    pub async fn record_all<I>(&self, entries: I)
    where
        I: IntoIterator<Item = AuditEntry>,
    {
        for entry in entries {
            self.record(entry).await;
        }
    }

    /// Read back the trail. Only the audit listing uses this.
    pub async fn query(&self, query: &AuditQuery) -> AuditResult<Vec<AuditRecord>> {
        self.sink.query(query).await
    }
}
