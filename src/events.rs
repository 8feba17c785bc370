//! Ledger events for external indexing.
//!
//! Every successful state-mutating operation appends exactly one event.
//! Events are appended only after the whole operation has committed, so a
//! consumer never observes an event for a rolled-back call.
//!
//! Consumers poll incrementally with [`EventLog::read_from`], keeping their
//! own cursor.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::env::{AccountId, Amount};
use crate::ledger::TaskId;

/// A ledger state change, as seen by an external consumer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum LedgerEvent {
    /// A task was created and its stake escrowed.
    TaskCreated {
        id: TaskId,
        owner: AccountId,
        name: String,
        stake: Amount,
        at: DateTime<Utc>,
    },

    /// A task was completed and the stake minus fee paid out.
    TaskCompleted {
        id: TaskId,
        payout: Amount,
        at: DateTime<Utc>,
    },

    /// A task was cancelled and the stake minus penalty refunded.
    TaskCancelled {
        id: TaskId,
        refund: Amount,
        at: DateTime<Utc>,
    },
}

/// Append-only event log with cursor-based reads.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EventLog {
    events: Vec<LedgerEvent>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn append(&mut self, event: LedgerEvent) {
        self.events.push(event);
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Every event since the ledger was created, in order.
    pub fn all(&self) -> &[LedgerEvent] {
        &self.events
    }

    /// Up to `limit` events starting at `cursor` (an index into the log).
    ///
    /// A cursor at or past the end yields an empty slice, never an error;
    /// the consumer just has nothing new to read.
    pub fn read_from(&self, cursor: usize, limit: usize) -> &[LedgerEvent] {
        let start = cursor.min(self.events.len());
        let end = start.saturating_add(limit).min(self.events.len());
        &self.events[start..end]
    }
}
