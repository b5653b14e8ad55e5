//! Audit trail collection.
//!
//! Operations collect [`AuditEntry`] values in an [`AuditJournal`] while
//! their transaction is open and flush them to an [`AuditSink`] only after
//! commit, so rolled-back work never shows up in the trail.

use std::fmt::Debug;
use std::sync::{Arc, Mutex, PoisonError};

use serde::{Deserialize, Serialize};

use crate::auth::ActorContext;

/// Kind of mutation being recorded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AuditOperation {
    /// Record inserted by an operator.
    Create,
    /// Record changed by an operator.
    Update,
    /// Record deleted by an operator.
    Delete,
    /// Side effect of reconciliation.
    Automatic,
    /// Year-end closure.
    Closure,
}

impl AuditOperation {
    /// Label stored in the audit log.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Create => "EKLE",
            Self::Update => "GÜNCELLE",
            Self::Delete => "SİL",
            Self::Automatic => "OTOMATIK",
            Self::Closure => "DEVİR",
        }
    }
}

/// One audited mutation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditEntry {
    /// Actor that triggered the mutation.
    pub actor: String,
    /// Mutation kind.
    pub operation: AuditOperation,
    /// Affected table.
    pub table: String,
    /// Affected row.
    pub record_id: i32,
    /// Human-readable summary.
    pub description: String,
    /// Value before the change.
    pub old_value: Option<String>,
    /// Value after the change.
    pub new_value: Option<String>,
}

/// Receiver of committed audit entries.
pub trait AuditSink: Send + Sync + Debug {
    /// Records one entry.
    fn record(&self, entry: &AuditEntry);
}

/// Entries gathered during one operation.
#[derive(Debug)]
pub struct AuditJournal {
    actor: String,
    entries: Vec<AuditEntry>,
}

impl AuditJournal {
    /// Starts an empty journal for the actor.
    #[must_use]
    pub fn new(ctx: &ActorContext) -> Self {
        Self {
            actor: ctx.actor.clone(),
            entries: Vec::new(),
        }
    }

    /// Appends an entry without before/after values.
    pub fn push(
        &mut self,
        operation: AuditOperation,
        table: &str,
        record_id: i32,
        description: impl Into<String>,
    ) {
        self.push_change(operation, table, record_id, description, None, None);
    }

    /// Appends an entry with before/after values.
    pub fn push_change(
        &mut self,
        operation: AuditOperation,
        table: &str,
        record_id: i32,
        description: impl Into<String>,
        old_value: Option<String>,
        new_value: Option<String>,
    ) {
        self.entries.push(AuditEntry {
            actor: self.actor.clone(),
            operation,
            table: table.to_string(),
            record_id,
            description: description.into(),
            old_value,
            new_value,
        });
    }

    /// Entries collected so far.
    #[must_use]
    pub fn entries(&self) -> &[AuditEntry] {
        &self.entries
    }

    /// Hands every entry to the sink, returning how many were written.
    pub fn flush(self, sink: &dyn AuditSink) -> usize {
        let count = self.entries.len();
        for entry in &self.entries {
            sink.record(entry);
        }
        count
    }
}

/// Writes audit entries as structured log events.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingAuditSink;

impl AuditSink for TracingAuditSink {
    fn record(&self, entry: &AuditEntry) {
        tracing::info!(
            target: "dernek::audit",
            actor = %entry.actor,
            operation = entry.operation.as_str(),
            table = %entry.table,
            record_id = entry.record_id,
            old_value = entry.old_value.as_deref(),
            new_value = entry.new_value.as_deref(),
            "{}",
            entry.description
        );
    }
}

/// Forwards every entry to several sinks.
#[derive(Debug, Default)]
pub struct FanoutAuditSink {
    sinks: Vec<Arc<dyn AuditSink>>,
}

impl FanoutAuditSink {
    /// Creates a sink forwarding to `sinks` in order.
    #[must_use]
    pub fn new(sinks: Vec<Arc<dyn AuditSink>>) -> Self {
        Self { sinks }
    }
}

impl AuditSink for FanoutAuditSink {
    fn record(&self, entry: &AuditEntry) {
        for sink in &self.sinks {
            sink.record(entry);
        }
    }
}

/// Keeps entries in memory.
#[derive(Debug, Default)]
pub struct MemoryAuditSink {
    entries: Mutex<Vec<AuditEntry>>,
}

impl MemoryAuditSink {
    /// Creates an empty sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of every recorded entry.
    #[must_use]
    pub fn entries(&self) -> Vec<AuditEntry> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl AuditSink for MemoryAuditSink {
    fn record(&self, entry: &AuditEntry) {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(entry.clone());
    }
}
