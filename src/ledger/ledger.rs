//! The escrow ledger: task records, counters, and value movement.
//!
//! # Invariants
//! - `total_staked_active == sum of stake over pending tasks`
//! - the ledger account's balance equals the escrowed stakes of pending
//!   tasks plus every fee and penalty retained so far
//! - `total_tasks_created` and `total_tasks_completed` never decrease
//!
//! # Ordering rule
//! Completion and cancellation update the task record and the counters
//! first, then perform the outbound transfer as the last fallible step. If
//! the transfer fails, every internal effect is rolled back before the
//! error is returned, so no partially-applied state is ever observable.

use std::collections::BTreeMap;

use tracing::{info, warn};

use super::stats::{GlobalStats, UserStats};
use super::task::{Task, TaskId, TaskStatus};
use crate::config::FeeSchedule;
use crate::env::{AccountId, Amount, CallContext, Environment, TransferError};
use crate::events::{EventLog, LedgerEvent};

/// Errors that can occur during ledger operations.
///
/// Every error is a rejection of the whole call: no funds move and no state
/// changes when one of these is returned.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LedgerError {
    #[error("task name and description cannot be empty")]
    InvalidInput,

    #[error("stake must be greater than zero")]
    InvalidStake,

    #[error("no task with id {id}")]
    NotFound { id: TaskId },

    #[error("caller is not the owner of task {id}")]
    Unauthorized { id: TaskId },

    #[error("task {id} is already finalized")]
    AlreadyFinalized { id: TaskId },

    #[error("transfer failed: {0}")]
    Transfer(#[from] TransferError),
}

/// The task/escrow ledger.
///
/// Owns every task record, the global counters, and an escrow account in
/// the environment where stakes and retained fees live. Counters are
/// private and change only inside the operations below, together with the
/// task record they describe.
#[derive(Debug)]
pub struct Ledger {
    /// Escrow account holding stakes and retained fees.
    account: AccountId,
    fees: FeeSchedule,
    tasks: BTreeMap<TaskId, Task>,
    /// Last assigned task id; ids are 1-based and never reused.
    next_id: u64,
    total_tasks_created: u64,
    total_tasks_completed: u64,
    total_staked_active: Amount,
    events: EventLog,
}

impl Ledger {
    /// Create a ledger with a fresh escrow account in `env`.
    pub fn new(env: &mut impl Environment, fees: FeeSchedule) -> Self {
        Self {
            account: env.create_account(),
            fees,
            tasks: BTreeMap::new(),
            next_id: 0,
            total_tasks_created: 0,
            total_tasks_completed: 0,
            total_staked_active: 0,
            events: EventLog::new(),
        }
    }

    /// The ledger's escrow account identity.
    pub fn account(&self) -> AccountId {
        self.account
    }

    /// The fee schedule this ledger applies.
    pub fn fees(&self) -> FeeSchedule {
        self.fees
    }

    /// Create a task backed by the payment attached to the call.
    ///
    /// The attached value becomes the task's stake and moves into the
    /// ledger's escrow account.
    ///
    /// # Errors
    /// - `InvalidInput` for an empty name or description
    /// - `InvalidStake` for a zero attached value
    /// - `Transfer` if the caller cannot cover the stake
    ///
    /// None of these mutate any state.
    pub fn create_task(
        &mut self,
        env: &mut impl Environment,
        ctx: &CallContext,
        name: &str,
        description: &str,
    ) -> Result<TaskId, LedgerError> {
        let id = TaskId::new(self.next_id + 1);
        let created_at = env.now();

        // Validates name, description, and stake before anything moves.
        let task = Task::new(id, ctx.caller, name, description, ctx.value, created_at)?;

        env.transfer(ctx.caller, self.account, ctx.value)?;

        self.next_id += 1;
        self.total_tasks_created += 1;
        self.total_staked_active = self.total_staked_active.saturating_add(ctx.value);
        self.tasks.insert(id, task);
        self.events.append(LedgerEvent::TaskCreated {
            id,
            owner: ctx.caller,
            name: name.to_string(),
            stake: ctx.value,
            at: created_at,
        });

        info!(task = %id, owner = %ctx.caller, stake = ctx.value, "task created");
        Ok(id)
    }

    /// Mark a task done and pay the stake minus the completion fee to its
    /// owner. Returns the payout.
    ///
    /// # Errors
    /// - `NotFound` if the id was never assigned
    /// - `Unauthorized` if the caller is not the task's owner
    /// - `AlreadyFinalized` if the task is not pending
    /// - `Transfer` if the owner rejects the payout; the task stays pending
    ///   and the counters are unchanged
    pub fn complete_task(
        &mut self,
        env: &mut impl Environment,
        ctx: &CallContext,
        id: TaskId,
    ) -> Result<Amount, LedgerError> {
        let at = env.now();

        let task = self.tasks.get_mut(&id).ok_or(LedgerError::NotFound { id })?;
        if task.owner() != ctx.caller {
            return Err(LedgerError::Unauthorized { id });
        }
        task.complete(at)?;

        let owner = task.owner();
        let stake = task.stake();
        let fee = self.fees.completion_fee(stake);
        let payout = stake - fee;

        // Bookkeeping first; the outbound transfer is the last fallible
        // step (see the module-level ordering rule).
        self.total_staked_active = self.total_staked_active.saturating_sub(stake);
        self.total_tasks_completed += 1;

        if let Err(err) = env.transfer(self.account, owner, payout) {
            if let Some(task) = self.tasks.get_mut(&id) {
                task.reopen();
            }
            self.total_staked_active = self.total_staked_active.saturating_add(stake);
            self.total_tasks_completed -= 1;
            warn!(task = %id, owner = %owner, payout, error = %err, "payout rejected, completion rolled back");
            return Err(LedgerError::Transfer(err));
        }

        self.events
            .append(LedgerEvent::TaskCompleted { id, payout, at });

        info!(task = %id, owner = %owner, payout, fee, "task completed");
        Ok(payout)
    }

    /// Withdraw a task early, refunding the stake minus the cancellation
    /// penalty to its owner. Returns the refund.
    ///
    /// Cancellation is not completion: `total_tasks_completed` does not
    /// move.
    ///
    /// # Errors
    /// Same kinds as [`Ledger::complete_task`], with the same rollback
    /// guarantee on a rejected refund.
    pub fn cancel_task(
        &mut self,
        env: &mut impl Environment,
        ctx: &CallContext,
        id: TaskId,
    ) -> Result<Amount, LedgerError> {
        let at = env.now();

        let task = self.tasks.get_mut(&id).ok_or(LedgerError::NotFound { id })?;
        if task.owner() != ctx.caller {
            return Err(LedgerError::Unauthorized { id });
        }
        task.cancel()?;

        let owner = task.owner();
        let stake = task.stake();
        let penalty = self.fees.cancellation_penalty(stake);
        let refund = stake - penalty;

        self.total_staked_active = self.total_staked_active.saturating_sub(stake);

        if let Err(err) = env.transfer(self.account, owner, refund) {
            if let Some(task) = self.tasks.get_mut(&id) {
                task.reopen();
            }
            self.total_staked_active = self.total_staked_active.saturating_add(stake);
            warn!(task = %id, owner = %owner, refund, error = %err, "refund rejected, cancellation rolled back");
            return Err(LedgerError::Transfer(err));
        }

        self.events
            .append(LedgerEvent::TaskCancelled { id, refund, at });

        info!(task = %id, owner = %owner, refund, penalty, "task cancelled");
        Ok(refund)
    }

    /// Look up a task by id.
    ///
    /// # Errors
    /// `NotFound` if the id is unknown.
    pub fn task(&self, id: TaskId) -> Result<&Task, LedgerError> {
        self.tasks.get(&id).ok_or(LedgerError::NotFound { id })
    }

    /// Every task in id order.
    pub fn tasks(&self) -> impl Iterator<Item = &Task> {
        self.tasks.values()
    }

    /// Statistics for one owner, recomputed from the task set on every
    /// call.
    ///
    /// Cancelled tasks count toward `total_tasks` but contribute nothing to
    /// `total_staked` or `total_earned`.
    pub fn user_stats(&self, owner: AccountId) -> UserStats {
        let mut stats = UserStats::default();

        for task in self.tasks.values().filter(|t| t.owner() == owner) {
            stats.total_tasks += 1;
            match task.status() {
                TaskStatus::Pending => {
                    stats.pending_tasks += 1;
                    stats.total_staked = stats.total_staked.saturating_add(task.stake());
                }
                TaskStatus::Completed => {
                    stats.completed_tasks += 1;
                    let payout = task.stake() - self.fees.completion_fee(task.stake());
                    stats.total_earned = stats.total_earned.saturating_add(payout);
                }
                TaskStatus::Cancelled => {}
            }
        }

        stats
    }

    /// Ledger-wide statistics. The balance is read live from the
    /// environment, never cached.
    pub fn global_stats(&self, env: &impl Environment) -> GlobalStats {
        GlobalStats {
            total_tasks_created: self.total_tasks_created,
            total_tasks_completed: self.total_tasks_completed,
            total_staked_active: self.total_staked_active,
            ledger_balance: env.balance_of(self.account),
        }
    }

    /// Events emitted by this ledger.
    pub fn events(&self) -> &EventLog {
        &self.events
    }

    /// Assert the value-conservation invariant: the active-stake counter
    /// matches the task set, and the escrow balance covers it.
    #[cfg(test)]
    pub(crate) fn assert_consistent(&self, env: &impl Environment) {
        let pending_total: Amount = self
            .tasks
            .values()
            .filter(|t| t.is_pending())
            .map(Task::stake)
            .sum();
        assert_eq!(self.total_staked_active, pending_total);
        assert!(env.balance_of(self.account) >= pending_total);
    }
}
