//! Ledger module - the task escrow state machine.
//!
//! # Key Concepts
//! - Task: an escrow-backed record with a Pending/Completed/Cancelled
//!   lifecycle
//! - Ledger: owns the task set, the global counters, and the escrow account
//! - Stats: per-owner aggregates are derived on demand; global counters are
//!   stored and updated atomically with the task record

pub mod ledger;
mod stats;
pub mod task;

pub use ledger::{Ledger, LedgerError};
pub use stats::{GlobalStats, UserStats};
pub use task::{Task, TaskId, TaskStatus};
