//! Fee configuration for the ledger.
//!
//! Defaults match the documented behavior: a 2% completion fee and a 10%
//! cancellation penalty, both computed with integer division (the remainder
//! stays with the payout). Overrides can be set via environment variables:
//! - `STAKE_COMPLETION_FEE_PCT` - Optional. Percent retained on completion.
//! - `STAKE_CANCELLATION_PENALTY_PCT` - Optional. Percent retained on
//!   cancellation.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::env::Amount;

/// Percent of the stake retained when a task is completed.
pub const DEFAULT_COMPLETION_FEE_PCT: u64 = 2;

/// Percent of the stake retained when a task is cancelled early.
pub const DEFAULT_CANCELLATION_PENALTY_PCT: u64 = 10;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}: {1}")]
    InvalidValue(String, String),

    #[error("{name} must be at most 100, got {value}")]
    PercentOutOfRange { name: &'static str, value: u64 },
}

/// Fee percentages applied by a ledger.
///
/// # Invariants
/// - `completion_fee_pct <= 100`
/// - `cancellation_penalty_pct <= 100`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeeSchedule {
    completion_fee_pct: u64,
    cancellation_penalty_pct: u64,
}

impl FeeSchedule {
    /// Build a fee schedule with explicit percentages.
    ///
    /// # Errors
    /// Returns `ConfigError::PercentOutOfRange` if either percentage
    /// exceeds 100.
    pub fn new(completion_fee_pct: u64, cancellation_penalty_pct: u64) -> Result<Self, ConfigError> {
        if completion_fee_pct > 100 {
            return Err(ConfigError::PercentOutOfRange {
                name: "completion_fee_pct",
                value: completion_fee_pct,
            });
        }
        if cancellation_penalty_pct > 100 {
            return Err(ConfigError::PercentOutOfRange {
                name: "cancellation_penalty_pct",
                value: cancellation_penalty_pct,
            });
        }

        Ok(Self {
            completion_fee_pct,
            cancellation_penalty_pct,
        })
    }

    /// Load the schedule from environment variables, falling back to the
    /// defaults for anything unset.
    ///
    /// # Errors
    /// Returns `ConfigError::InvalidValue` if a variable is set but not a
    /// valid percentage.
    pub fn from_env() -> Result<Self, ConfigError> {
        let completion_fee_pct =
            read_pct_var("STAKE_COMPLETION_FEE_PCT", DEFAULT_COMPLETION_FEE_PCT)?;
        let cancellation_penalty_pct = read_pct_var(
            "STAKE_CANCELLATION_PENALTY_PCT",
            DEFAULT_CANCELLATION_PENALTY_PCT,
        )?;

        Self::new(completion_fee_pct, cancellation_penalty_pct)
    }

    pub fn completion_fee_pct(&self) -> u64 {
        self.completion_fee_pct
    }

    pub fn cancellation_penalty_pct(&self) -> u64 {
        self.cancellation_penalty_pct
    }

    /// Fee retained when a task with this stake is completed.
    ///
    /// # Property
    /// `completion_fee(stake) <= stake`
    pub fn completion_fee(&self, stake: Amount) -> Amount {
        apply_pct(stake, self.completion_fee_pct)
    }

    /// Penalty retained when a task with this stake is cancelled.
    ///
    /// # Property
    /// `cancellation_penalty(stake) <= stake`
    pub fn cancellation_penalty(&self, stake: Amount) -> Amount {
        apply_pct(stake, self.cancellation_penalty_pct)
    }
}

impl Default for FeeSchedule {
    /// Default schedule: 2% completion fee, 10% cancellation penalty.
    fn default() -> Self {
        Self {
            completion_fee_pct: DEFAULT_COMPLETION_FEE_PCT,
            cancellation_penalty_pct: DEFAULT_CANCELLATION_PENALTY_PCT,
        }
    }
}

/// `stake * pct / 100` with floor rounding, widened to avoid overflow.
fn apply_pct(stake: Amount, pct: u64) -> Amount {
    // pct <= 100, so the result never exceeds stake and fits back in u64.
    ((u128::from(stake) * u128::from(pct)) / 100) as Amount
}

fn read_pct_var(name: &str, default: u64) -> Result<u64, ConfigError> {
    match std::env::var(name) {
        Ok(raw) => raw
            .parse()
            .map_err(|e| ConfigError::InvalidValue(name.to_string(), format!("{}", e))),
        Err(_) => Ok(default),
    }
}
