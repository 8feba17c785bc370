//! Task record and its state machine.
//!
//! # Invariants
//! - `name` and `description` are non-empty
//! - `stake > 0`
//! - `completed_at.is_some()` exactly when `status == Completed`
//!
//! All fields are immutable after construction except `status` and
//! `completed_at`, which change only through the explicit transitions below.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::ledger::LedgerError;
use crate::env::{AccountId, Amount};

/// Identifier of a task within one ledger.
///
/// # Properties
/// - Densely assigned: 1, 2, 3, ... in creation order
/// - Never reused, even after the task is finalized
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct TaskId(u64);

impl TaskId {
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    pub const fn raw(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Status of a task in its lifecycle.
///
/// # State Machine
/// ```text
/// Pending -> Completed
///         \-> Cancelled
/// ```
///
/// Both `Completed` and `Cancelled` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    /// Stake is escrowed; the owner may still complete or cancel.
    Pending,
    /// Stake was paid out minus the completion fee.
    Completed,
    /// Stake was refunded minus the cancellation penalty.
    Cancelled,
}

impl TaskStatus {
    /// Check if the task is in a terminal state.
    ///
    /// # Property
    /// `is_terminal() => no further transition is possible`
    pub fn is_terminal(&self) -> bool {
        matches!(self, TaskStatus::Completed | TaskStatus::Cancelled)
    }
}

/// A task backed by an escrowed stake.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    id: TaskId,
    owner: AccountId,
    name: String,
    description: String,
    stake: Amount,
    status: TaskStatus,
    created_at: DateTime<Utc>,
    completed_at: Option<DateTime<Utc>>,
}

impl Task {
    /// Create a new pending task.
    ///
    /// # Preconditions
    /// - `name` and `description` are non-empty
    /// - `stake > 0`
    ///
    /// # Errors
    /// `InvalidInput` for empty text, `InvalidStake` for a zero stake.
    pub(crate) fn new(
        id: TaskId,
        owner: AccountId,
        name: &str,
        description: &str,
        stake: Amount,
        created_at: DateTime<Utc>,
    ) -> Result<Self, LedgerError> {
        if name.is_empty() || description.is_empty() {
            return Err(LedgerError::InvalidInput);
        }
        if stake == 0 {
            return Err(LedgerError::InvalidStake);
        }

        Ok(Self {
            id,
            owner,
            name: name.to_string(),
            description: description.to_string(),
            stake,
            status: TaskStatus::Pending,
            created_at,
            completed_at: None,
        })
    }

    // Getters - all fields are private to protect the invariants

    pub fn id(&self) -> TaskId {
        self.id
    }

    pub fn owner(&self) -> AccountId {
        self.owner
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn stake(&self) -> Amount {
        self.stake
    }

    pub fn status(&self) -> TaskStatus {
        self.status
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn completed_at(&self) -> Option<DateTime<Utc>> {
        self.completed_at
    }

    /// Check if the task is still pending.
    pub fn is_pending(&self) -> bool {
        self.status == TaskStatus::Pending
    }

    // State transitions - explicit and validated

    /// Transition to `Completed`.
    ///
    /// # Precondition
    /// `self.status == Pending`
    ///
    /// # Errors
    /// `AlreadyFinalized` if the task is already terminal.
    pub(crate) fn complete(&mut self, at: DateTime<Utc>) -> Result<(), LedgerError> {
        if self.status.is_terminal() {
            return Err(LedgerError::AlreadyFinalized { id: self.id });
        }
        self.status = TaskStatus::Completed;
        self.completed_at = Some(at);
        Ok(())
    }

    /// Transition to `Cancelled`.
    ///
    /// # Precondition
    /// `self.status == Pending`
    ///
    /// # Errors
    /// `AlreadyFinalized` if the task is already terminal.
    pub(crate) fn cancel(&mut self) -> Result<(), LedgerError> {
        if self.status.is_terminal() {
            return Err(LedgerError::AlreadyFinalized { id: self.id });
        }
        self.status = TaskStatus::Cancelled;
        Ok(())
    }

    /// Roll a finalization back to `Pending`.
    ///
    /// Used only when the outbound transfer of a completion or cancellation
    /// fails after bookkeeping has been applied; the whole operation must
    /// then be unwound.
    pub(crate) fn reopen(&mut self) {
        self.status = TaskStatus::Pending;
        self.completed_at = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pending_task() -> Task {
        Task::new(
            TaskId::new(1),
            AccountId::new(),
            "write report",
            "quarterly numbers",
            100,
            Utc::now(),
        )
        .unwrap()
    }

    #[test]
    fn new_task_is_pending() {
        let task = pending_task();
        assert_eq!(task.status(), TaskStatus::Pending);
        assert!(task.is_pending());
        assert!(task.completed_at().is_none());
    }

    #[test]
    fn empty_name_or_description_is_rejected() {
        let owner = AccountId::new();
        let now = Utc::now();

        let err = Task::new(TaskId::new(1), owner, "", "desc", 100, now).unwrap_err();
        assert!(matches!(err, LedgerError::InvalidInput));

        let err = Task::new(TaskId::new(1), owner, "name", "", 100, now).unwrap_err();
        assert!(matches!(err, LedgerError::InvalidInput));
    }

    #[test]
    fn zero_stake_is_rejected() {
        let err =
            Task::new(TaskId::new(1), AccountId::new(), "name", "desc", 0, Utc::now()).unwrap_err();
        assert!(matches!(err, LedgerError::InvalidStake));
    }

    #[test]
    fn complete_sets_terminal_state_and_timestamp() {
        let mut task = pending_task();
        let at = Utc::now();

        task.complete(at).unwrap();

        assert_eq!(task.status(), TaskStatus::Completed);
        assert!(task.status().is_terminal());
        assert_eq!(task.completed_at(), Some(at));
    }

    #[test]
    fn terminal_tasks_refuse_further_transitions() {
        let mut completed = pending_task();
        completed.complete(Utc::now()).unwrap();
        assert!(matches!(
            completed.complete(Utc::now()),
            Err(LedgerError::AlreadyFinalized { .. })
        ));
        assert!(matches!(
            completed.cancel(),
            Err(LedgerError::AlreadyFinalized { .. })
        ));

        let mut cancelled = pending_task();
        cancelled.cancel().unwrap();
        assert!(matches!(
            cancelled.complete(Utc::now()),
            Err(LedgerError::AlreadyFinalized { .. })
        ));
    }

    #[test]
    fn reopen_restores_pending() {
        let mut task = pending_task();
        task.complete(Utc::now()).unwrap();

        task.reopen();

        assert!(task.is_pending());
        assert!(task.completed_at().is_none());
    }
}
