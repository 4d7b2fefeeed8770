//! Per-account vesting position.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::Amount;

/// Cumulative locked and claimed totals of one account.
///
/// `claimed_total <= locked_total` always holds. Neither field ever
/// decreases.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VestingAccount {
    pub locked_total: Amount,
    pub claimed_total: Amount,
}

impl VestingAccount {
    /// Locked tokens not yet claimed.
    #[must_use]
    pub fn outstanding(&self) -> Amount {
        self.locked_total.saturating_sub(self.claimed_total)
    }
}

/// Coarse position of an account along the lock schedule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VestingState {
    /// Nothing locked for this account.
    NoLock,
    /// Some of the locked amount is still accruing.
    Locking,
    /// The schedule has run out; everything outstanding may be claimed.
    FullyUnlockable,
}

impl fmt::Display for VestingState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoLock => write!(f, "NO_LOCK"),
            Self::Locking => write!(f, "LOCKING"),
            Self::FullyUnlockable => write!(f, "FULLY_UNLOCKABLE"),
        }
    }
}
