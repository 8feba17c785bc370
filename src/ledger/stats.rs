//! Aggregate statistics returned by the ledger's read-only queries.

use serde::{Deserialize, Serialize};

use crate::env::Amount;

/// Per-owner statistics, derived on demand from the task set.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserStats {
    /// Tasks ever created by this owner, in any state.
    pub total_tasks: u64,

    /// Tasks that reached `Completed`.
    pub completed_tasks: u64,

    /// Tasks still `Pending`.
    pub pending_tasks: u64,

    /// Sum of stakes over this owner's pending tasks only.
    pub total_staked: Amount,

    /// Sum of payouts already received from this owner's completed tasks.
    pub total_earned: Amount,
}

/// Ledger-wide statistics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GlobalStats {
    /// Tasks ever created. Monotonic.
    pub total_tasks_created: u64,

    /// Tasks that reached `Completed`. Monotonic; cancellations do not
    /// count.
    pub total_tasks_completed: u64,

    /// Sum of stakes over all pending tasks.
    pub total_staked_active: Amount,

    /// The ledger account's balance, read live from the environment. Equals
    /// the escrowed stakes plus every fee and penalty retained so far.
    pub ledger_balance: Amount,
}
