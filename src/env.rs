//! Execution environment boundary.
//!
//! The ledger does not own accounts, balances, or a clock. It runs inside a
//! host that serializes all state-mutating calls and supplies caller
//! identity, attached payments, timestamps, and the value-transfer
//! primitive. That host is modelled as the [`Environment`] trait.
//!
//! # Key Concepts
//! - `AccountId`: unforgeable account identity, minted by the environment
//! - `CallContext`: who is calling and how much value is attached
//! - `InMemoryEnv`: a deterministic in-process environment for tests and
//!   embedding

use std::collections::{HashMap, HashSet};
use std::fmt;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Native value amount, in indivisible units.
pub type Amount = u64;

/// Unforgeable identity of an account.
///
/// # Properties
/// - Globally unique within an environment
/// - Immutable once minted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AccountId(Uuid);

impl AccountId {
    /// Mint a fresh account identity.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Get the inner UUID.
    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for AccountId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Per-call context supplied by the environment: the caller's identity and
/// the value attached to the call.
#[derive(Debug, Clone, Copy)]
pub struct CallContext {
    /// The account invoking the operation.
    pub caller: AccountId,

    /// Value attached to the call, already owned by `caller`.
    pub value: Amount,
}

impl CallContext {
    /// Build a call context with an attached payment.
    pub fn new(caller: AccountId, value: Amount) -> Self {
        Self { caller, value }
    }

    /// Build a call context with no attached payment.
    pub fn from_caller(caller: AccountId) -> Self {
        Self { caller, value: 0 }
    }
}

/// Errors from the value-transfer primitive.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransferError {
    #[error("insufficient funds: need {needed} units, have {available}")]
    InsufficientFunds { needed: Amount, available: Amount },

    #[error("account {account} rejected the transfer")]
    Rejected { account: AccountId },

    #[error("unknown account {account}")]
    UnknownAccount { account: AccountId },
}

/// What the host must provide to the ledger.
///
/// The host is assumed to serialize all mutating calls into a strict total
/// order, so implementations need no internal locking; `&mut self` on the
/// mutating methods encodes exactly that discipline.
pub trait Environment {
    /// Current timestamp.
    fn now(&self) -> DateTime<Utc>;

    /// Mint a fresh account with a zero balance.
    fn create_account(&mut self) -> AccountId;

    /// Current balance of an account. Unknown accounts read as zero.
    fn balance_of(&self, account: AccountId) -> Amount;

    /// Move `amount` units from `from` to `to`.
    ///
    /// # Errors
    /// - `InsufficientFunds` if `from` cannot cover `amount`
    /// - `Rejected` if `to` refuses incoming value
    /// - `UnknownAccount` if `from` was never minted
    fn transfer(&mut self, from: AccountId, to: AccountId, amount: Amount)
        -> Result<(), TransferError>;
}

/// Deterministic in-process environment.
///
/// Holds an account/balance map and a settable clock. Accounts can be
/// flagged as rejecting incoming transfers, which is how tests exercise the
/// payout-rollback path.
#[derive(Debug, Clone)]
pub struct InMemoryEnv {
    balances: HashMap<AccountId, Amount>,
    rejecting: HashSet<AccountId>,
    now: DateTime<Utc>,
}

impl InMemoryEnv {
    /// Create an empty environment with the clock set to the current time.
    pub fn new() -> Self {
        Self::starting_at(Utc::now())
    }

    /// Create an empty environment with the clock set to `start`.
    pub fn starting_at(start: DateTime<Utc>) -> Self {
        Self {
            balances: HashMap::new(),
            rejecting: HashSet::new(),
            now: start,
        }
    }

    /// Credit `amount` units to an account out of thin air.
    pub fn mint(&mut self, account: AccountId, amount: Amount) {
        let balance = self.balances.entry(account).or_insert(0);
        *balance = balance.saturating_add(amount);
    }

    /// Make an account refuse (or accept again) incoming transfers.
    pub fn set_rejecting(&mut self, account: AccountId, reject: bool) {
        if reject {
            self.rejecting.insert(account);
        } else {
            self.rejecting.remove(&account);
        }
    }

    /// Advance the clock.
    pub fn advance(&mut self, by: Duration) {
        self.now += by;
    }
}

impl Default for InMemoryEnv {
    fn default() -> Self {
        Self::new()
    }
}

impl Environment for InMemoryEnv {
    fn now(&self) -> DateTime<Utc> {
        self.now
    }

    fn create_account(&mut self) -> AccountId {
        let account = AccountId::new();
        self.balances.insert(account, 0);
        account
    }

    fn balance_of(&self, account: AccountId) -> Amount {
        self.balances.get(&account).copied().unwrap_or(0)
    }

    fn transfer(
        &mut self,
        from: AccountId,
        to: AccountId,
        amount: Amount,
    ) -> Result<(), TransferError> {
        if self.rejecting.contains(&to) {
            return Err(TransferError::Rejected { account: to });
        }

        let available = self
            .balances
            .get(&from)
            .copied()
            .ok_or(TransferError::UnknownAccount { account: from })?;

        if available < amount {
            return Err(TransferError::InsufficientFunds {
                needed: amount,
                available,
            });
        }

        if let Some(balance) = self.balances.get_mut(&from) {
            *balance -= amount;
        }
        let to_balance = self.balances.entry(to).or_insert(0);
        *to_balance = to_balance.saturating_add(amount);

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transfer_moves_funds() {
        let mut env = InMemoryEnv::new();
        let alice = env.create_account();
        let bob = env.create_account();
        env.mint(alice, 100);

        env.transfer(alice, bob, 40).unwrap();

        assert_eq!(env.balance_of(alice), 60);
        assert_eq!(env.balance_of(bob), 40);
    }

    #[test]
    fn transfer_fails_on_insufficient_funds() {
        let mut env = InMemoryEnv::new();
        let alice = env.create_account();
        let bob = env.create_account();
        env.mint(alice, 10);

        let err = env.transfer(alice, bob, 11).unwrap_err();
        assert_eq!(
            err,
            TransferError::InsufficientFunds {
                needed: 11,
                available: 10
            }
        );
        assert_eq!(env.balance_of(alice), 10);
        assert_eq!(env.balance_of(bob), 0);
    }

    #[test]
    fn transfer_fails_from_unminted_account() {
        let mut env = InMemoryEnv::new();
        let ghost = AccountId::new();
        let bob = env.create_account();

        let err = env.transfer(ghost, bob, 1).unwrap_err();
        assert_eq!(err, TransferError::UnknownAccount { account: ghost });
    }

    #[test]
    fn rejecting_account_refuses_incoming_value() {
        let mut env = InMemoryEnv::new();
        let alice = env.create_account();
        let bob = env.create_account();
        env.mint(alice, 100);
        env.set_rejecting(bob, true);

        let err = env.transfer(alice, bob, 10).unwrap_err();
        assert_eq!(err, TransferError::Rejected { account: bob });
        assert_eq!(env.balance_of(alice), 100);

        env.set_rejecting(bob, false);
        env.transfer(alice, bob, 10).unwrap();
        assert_eq!(env.balance_of(bob), 10);
    }

    #[test]
    fn clock_advances_deterministically() {
        let start = Utc::now();
        let mut env = InMemoryEnv::starting_at(start);
        assert_eq!(env.now(), start);

        env.advance(Duration::seconds(30));
        assert_eq!(env.now(), start + Duration::seconds(30));
    }
}
