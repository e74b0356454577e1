//! Decision audit records and sinks.
//!
//! The engine hands every decision (and every evaluation failure) to a
//! [`DecisionSink`]. Sinks are fire-and-forget: they cannot fail or alter a
//! decision, and the engine never waits on them for anything but the call
//! itself. Formatting and storage of the audit trail belong to the sink.

use chrono::{DateTime, Utc};
use quire_core::{Decision, Operation, Requester, ResourcePath};
use serde::{Deserialize, Serialize};
use std::sync::Mutex;

use crate::evaluation::{Evaluation, Reason};

/// Tracing target used by [`TracingSink`].
pub const AUDIT_TARGET: &str = "quire::audit";

/// What happened to a decision request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum DecisionOutcome {
    /// A decision was reached.
    Decided {
        /// ALLOW or DENY.
        decision: Decision,
        /// Why.
        reason: Reason,
    },
    /// Evaluation failed before a decision was reached.
    Failed {
        /// Error message.
        error: String,
    },
}

impl DecisionOutcome {
    /// The decision, if one was reached.
    #[must_use]
    pub fn decision(&self) -> Option<Decision> {
        match self {
            Self::Decided { decision, .. } => Some(*decision),
            Self::Failed { .. } => None,
        }
    }
}

impl From<&Evaluation> for DecisionOutcome {
    fn from(evaluation: &Evaluation) -> Self {
        Self::Decided {
            decision: evaluation.decision,
            reason: evaluation.reason.clone(),
        }
    }
}

/// One audited decision request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecisionRecord {
    /// When the decision was made.
    pub timestamp: DateTime<Utc>,
    /// Who asked.
    pub requester: Requester,
    /// The requested path.
    pub path: ResourcePath,
    /// The requested operation.
    pub operation: Operation,
    /// The result.
    pub outcome: DecisionOutcome,
}

impl DecisionRecord {
    /// Create a record stamped with the current time.
    #[must_use]
    pub fn new(
        requester: Requester,
        path: ResourcePath,
        operation: Operation,
        outcome: DecisionOutcome,
    ) -> Self {
        Self {
            timestamp: Utc::now(),
            requester,
            path,
            operation,
            outcome,
        }
    }
}

/// Receives one record per decision request.
pub trait DecisionSink: Send + Sync {
    /// Record a decision. Must not block for long and must not panic.
    fn record(&self, record: &DecisionRecord);
}

/// Emits each record as a structured `tracing` event on [`AUDIT_TARGET`].
///
/// Decisions are logged at `info`, evaluation failures at `warn`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl DecisionSink for TracingSink {
    fn record(&self, record: &DecisionRecord) {
        match &record.outcome {
            DecisionOutcome::Decided { decision, reason } => {
                tracing::info!(
                    target: AUDIT_TARGET,
                    requester = %record.requester,
                    path = %record.path,
                    operation = %record.operation,
                    decision = %decision,
                    reason = %reason,
                    "authorization decision"
                );
            },
            DecisionOutcome::Failed { error } => {
                tracing::warn!(
                    target: AUDIT_TARGET,
                    requester = %record.requester,
                    path = %record.path,
                    operation = %record.operation,
                    error = %error,
                    "authorization evaluation failed"
                );
            },
        }
    }
}

/// Drops every record.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl DecisionSink for NullSink {
    fn record(&self, _record: &DecisionRecord) {}
}

/// Keeps every record in memory.
#[derive(Debug, Default)]
pub struct MemorySink {
    records: Mutex<Vec<DecisionRecord>>,
}

impl MemorySink {
    /// Create an empty sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of every record so far, oldest first.
    #[must_use]
    pub fn records(&self) -> Vec<DecisionRecord> {
        self.records
            .lock()
            .unwrap_or_else(|e| {
                tracing::warn!("MemorySink lock poisoned, recovering");
                e.into_inner()
            })
            .clone()
    }

    /// Number of records so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.lock().map(|r| r.len()).unwrap_or_default()
    }

    /// Returns `true` if nothing has been recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Discard all records.
    pub fn clear(&self) {
        self.records
            .lock()
            .unwrap_or_else(|e| {
                tracing::warn!("MemorySink lock poisoned, recovering");
                e.into_inner()
            })
            .clear();
    }
}

impl DecisionSink for MemorySink {
    fn record(&self, record: &DecisionRecord) {
        self.records
            .lock()
            .unwrap_or_else(|e| {
                tracing::warn!("MemorySink lock poisoned, recovering");
                e.into_inner()
            })
            .push(record.clone());
    }
}

impl<T: DecisionSink + ?Sized> DecisionSink for std::sync::Arc<T> {
    fn record(&self, record: &DecisionRecord) {
        (**self).record(record);
    }
}
