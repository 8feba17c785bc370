//! # stake-ledger
//!
//! Escrow-backed task ledger. A party records a task and backs it with a
//! monetary stake; later it either collects the stake minus a 2% service
//! fee by marking the task done, or withdraws it early minus a 10% penalty
//! by cancelling.
//!
//! The crate is the business-logic state machine only. It assumes a
//! deterministic, atomic host that serializes mutating calls and supplies
//! identity, time, and value transfer; that boundary is the
//! [`env::Environment`] trait.
//!
//! ## Flow
//! 1. Caller attaches a payment and creates a task; the stake moves into
//!    the ledger's escrow account
//! 2. Only the task's owner may complete or cancel it; both transitions are
//!    terminal
//! 3. Counters and the task record are updated first, the outbound payout
//!    is the last fallible step, and a rejected payout unwinds the whole
//!    operation
//! 4. Consumers read tasks, per-owner and global stats, and poll the event
//!    log
//!
//! ## Modules
//! - `ledger`: the task/escrow state machine (the core)
//! - `registry`: mints new independent ledgers for a flat fee
//! - `env`: the execution-environment boundary and an in-memory host
//! - `events`: append-only event log for external indexing
//! - `config`: fee schedule
//!
//! ## Example
//!
//! ```rust
//! use stake_ledger::{CallContext, FeeSchedule, InMemoryEnv, Ledger};
//! use stake_ledger::env::Environment;
//!
//! let mut env = InMemoryEnv::new();
//! let alice = env.create_account();
//! env.mint(alice, 1_000);
//!
//! let mut ledger = Ledger::new(&mut env, FeeSchedule::default());
//! let id = ledger
//!     .create_task(&mut env, &CallContext::new(alice, 100), "ship v1", "cut the release")
//!     .unwrap();
//!
//! let payout = ledger
//!     .complete_task(&mut env, &CallContext::from_caller(alice), id)
//!     .unwrap();
//! assert_eq!(payout, 98); // 2% fee stays in escrow
//! ```

pub mod config;
pub mod env;
pub mod events;
pub mod ledger;
pub mod registry;

pub use config::{ConfigError, FeeSchedule};
pub use env::{AccountId, Amount, CallContext, Environment, InMemoryEnv, TransferError};
pub use events::{EventLog, LedgerEvent};
pub use ledger::{GlobalStats, Ledger, LedgerError, Task, TaskId, TaskStatus, UserStats};
pub use registry::{Registry, RegistryError};
