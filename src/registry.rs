//! Instance registry: mints new, independent ledgers for a fee.
//!
//! The registry charges a flat creation fee, paid to its operator, and
//! records the ledgers it has created. It keeps no authority over them
//! afterwards: it does not proxy calls and does not aggregate their
//! statistics.

use tracing::info;

use crate::config::FeeSchedule;
use crate::env::{AccountId, Amount, CallContext, Environment, TransferError};
use crate::ledger::Ledger;

/// Errors that can occur during registry operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
    #[error("creation fee is {required} units, only {attached} attached")]
    InsufficientFee { required: Amount, attached: Amount },

    #[error("no instance at index {index}")]
    NotFound { index: usize },

    #[error("transfer failed: {0}")]
    Transfer(#[from] TransferError),
}

/// Factory for independent [`Ledger`] instances.
#[derive(Debug)]
pub struct Registry {
    /// Account the creation fee is paid to.
    operator: AccountId,
    creation_fee: Amount,
    /// Fee schedule stamped onto every created ledger.
    fees: FeeSchedule,
    instances: Vec<Ledger>,
}

impl Registry {
    pub fn new(operator: AccountId, creation_fee: Amount, fees: FeeSchedule) -> Self {
        Self {
            operator,
            creation_fee,
            fees,
            instances: Vec::new(),
        }
    }

    pub fn operator(&self) -> AccountId {
        self.operator
    }

    pub fn creation_fee(&self) -> Amount {
        self.creation_fee
    }

    /// Number of ledgers created so far.
    pub fn instance_count(&self) -> usize {
        self.instances.len()
    }

    /// Create a fresh, independent ledger and return its index.
    ///
    /// Exactly the creation fee moves from the caller to the operator; any
    /// excess attached value never leaves the caller.
    ///
    /// # Errors
    /// - `InsufficientFee` if the attached value does not cover the fee
    /// - `Transfer` if the fee payment fails
    ///
    /// Neither mutates any state.
    pub fn create_instance(
        &mut self,
        env: &mut impl Environment,
        ctx: &CallContext,
    ) -> Result<usize, RegistryError> {
        if ctx.value < self.creation_fee {
            return Err(RegistryError::InsufficientFee {
                required: self.creation_fee,
                attached: ctx.value,
            });
        }

        env.transfer(ctx.caller, self.operator, self.creation_fee)?;

        let ledger = Ledger::new(env, self.fees);
        let index = self.instances.len();
        info!(index, account = %ledger.account(), creator = %ctx.caller, "ledger instance created");
        self.instances.push(ledger);

        Ok(index)
    }

    /// Look up a previously created ledger.
    ///
    /// # Errors
    /// `NotFound` if `index` is out of range.
    pub fn instance(&self, index: usize) -> Result<&Ledger, RegistryError> {
        self.instances
            .get(index)
            .ok_or(RegistryError::NotFound { index })
    }

    /// Mutable access to a previously created ledger, for hosts that route
    /// calls by index.
    ///
    /// # Errors
    /// `NotFound` if `index` is out of range.
    pub fn instance_mut(&mut self, index: usize) -> Result<&mut Ledger, RegistryError> {
        self.instances
            .get_mut(index)
            .ok_or(RegistryError::NotFound { index })
    }

    /// Escrow account identity of a previously created ledger.
    ///
    /// # Errors
    /// `NotFound` if `index` is out of range.
    pub fn instance_account(&self, index: usize) -> Result<AccountId, RegistryError> {
        self.instance(index).map(Ledger::account)
    }
}
