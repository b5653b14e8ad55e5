//! Deferred operations awaiting replication.
//!
//! A local store with replication enabled appends every committed mutation
//! to a [`SyncQueue`]; a replicator later drains it in order.

use std::collections::VecDeque;
use std::sync::{Mutex, PoisonError};

use serde::{Deserialize, Serialize};

use crate::audit::{AuditEntry, AuditOperation, AuditSink};

/// A committed mutation not yet pushed to the remote store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingOperation {
    /// Monotonic position in the queue.
    pub sequence: u64,
    /// Mutation kind.
    pub operation: AuditOperation,
    /// Affected table.
    pub table: String,
    /// Affected row.
    pub record_id: i32,
    /// Row state after the mutation, if captured.
    pub payload: Option<String>,
}

/// FIFO of pending operations. Serialisable so it survives restarts.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncQueue {
    next_sequence: u64,
    pending: VecDeque<PendingOperation>,
}

impl SyncQueue {
    /// Creates an empty queue.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Enqueues a committed audit entry and returns its sequence number.
    pub fn push(&mut self, entry: &AuditEntry) -> u64 {
        let sequence = self.next_sequence;
        self.next_sequence += 1;
        self.pending.push_back(PendingOperation {
            sequence,
            operation: entry.operation,
            table: entry.table.clone(),
            record_id: entry.record_id,
            payload: entry.new_value.clone(),
        });
        sequence
    }

    /// Oldest pending operation.
    #[must_use]
    pub fn peek(&self) -> Option<&PendingOperation> {
        self.pending.front()
    }

    /// Removes and returns every pending operation, oldest first.
    pub fn drain(&mut self) -> Vec<PendingOperation> {
        self.pending.drain(..).collect()
    }

    /// Number of pending operations.
    #[must_use]
    pub fn len(&self) -> usize {
        self.pending.len()
    }

    /// Returns true when nothing is pending.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}

/// Audit sink that feeds a [`SyncQueue`].
#[derive(Debug, Default)]
pub struct SyncQueueSink {
    queue: Mutex<SyncQueue>,
}

impl SyncQueueSink {
    /// Creates a sink over an empty queue.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Resumes from a previously persisted queue.
    #[must_use]
    pub fn from_queue(queue: SyncQueue) -> Self {
        Self {
            queue: Mutex::new(queue),
        }
    }

    /// Drains the queue.
    pub fn take_pending(&self) -> Vec<PendingOperation> {
        self.queue
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .drain()
    }

    /// Copy of the queue for persistence.
    #[must_use]
    pub fn snapshot(&self) -> SyncQueue {
        self.queue
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl AuditSink for SyncQueueSink {
    fn record(&self, entry: &AuditEntry) {
        self.queue
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(entry);
    }
}
