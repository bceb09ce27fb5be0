//! Bounded delivery log.
//!
//! An append-only record of dispatch outcomes kept for operators. The log
//! holds at most `capacity` entries; appending past the cap drops the oldest
//! entries first. Writing the log is best-effort: failures are reported on
//! the tracing channel and never reach the caller.

use std::sync::Arc;

use crate::metrics::DeliveryLogMetrics;
use crate::storage::{LogStore, StoreError, StoreHandle, StoreResult};

use super::{LogEntry, LogEntryKind};

/// Default number of retained entries
pub const DEFAULT_LOG_CAPACITY: usize = 100;

pub struct DeliveryLog {
    entries: StoreHandle<Vec<LogEntry>>,
    capacity: usize,
}

impl DeliveryLog {
    pub fn new(store: Arc<LogStore>, capacity: usize) -> Self {
        Self {
            entries: StoreHandle::new(store),
            capacity: capacity.max(1),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Record an entry, evicting the oldest ones beyond capacity.
    pub async fn append(&self, message: impl Into<String>, kind: LogEntryKind) {
        let entry = LogEntry::new(message, kind);
        let capacity = self.capacity;

        let result = self
            .entries
            .update(|entries| {
                entries.push(entry);
                if entries.len() > capacity {
                    let excess = entries.len() - capacity;
                    entries.drain(..excess);
                }
                Ok::<_, StoreError>(())
            })
            .await;

        if let Err(e) = result {
            DeliveryLogMetrics::record_write_failure();
            tracing::warn!(error = %e, "Failed to write delivery log entry");
        }
    }

    /// Current entries, oldest first
    pub async fn entries(&self) -> StoreResult<Vec<LogEntry>> {
        self.entries.load().await
    }
}
