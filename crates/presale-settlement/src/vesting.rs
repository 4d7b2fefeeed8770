//! Vesting engine: per-account locked balances under one lock schedule.
//!
//! The schedule is a versioned cell. Re-timing it replaces the cell and
//! bumps the version; it never touches `claimed_total` and never rewrites a
//! deblock record. Claimable amounts are floored at zero, so pushing the
//! schedule back after claims simply pauses further unlocking.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use presale_core::schedule;
use presale_types::{
    AccountId, Amount, LockSchedule, PresaleError, Result, VestingAccount, VestingConfig,
    VestingState,
};

/// Locked balances and the schedule that releases them.
#[derive(Debug, Clone)]
pub struct VestingEngine {
    schedule: LockSchedule,
    /// Percent of every credit released immediately.
    release_ratio: u32,
    accounts: HashMap<AccountId, VestingAccount>,
}

impl VestingEngine {
    /// # Errors
    /// [`PresaleError::InvalidConfig`] if the schedule or ratio is invalid.
    pub fn new(config: &VestingConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            schedule: config.schedule(),
            release_ratio: config.release_ratio,
            accounts: HashMap::new(),
        })
    }

    #[must_use]
    pub fn schedule(&self) -> LockSchedule {
        self.schedule
    }

    #[must_use]
    pub fn release_ratio(&self) -> u32 {
        self.release_ratio
    }

    /// The account's position, if it ever had anything locked.
    #[must_use]
    pub fn account(&self, account: AccountId) -> Option<VestingAccount> {
        self.accounts.get(&account).copied()
    }

    #[must_use]
    pub fn claimable(&self, account: AccountId, now: DateTime<Utc>) -> Amount {
        self.accounts
            .get(&account)
            .map_or(0, |a| schedule::claimable(a, &self.schedule, now))
    }

    #[must_use]
    pub fn state(&self, account: AccountId, now: DateTime<Utc>) -> VestingState {
        let position = self.accounts.get(&account).copied().unwrap_or_default();
        schedule::state(&position, &self.schedule, now)
    }

    #[must_use]
    pub fn next_unlock_at(&self, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        schedule::next_unlock_at(&self.schedule, now)
    }

    /// Split a purchase credit into `(immediate, locked)`.
    #[must_use]
    pub fn split_credit(&self, credited: Amount) -> (Amount, Amount) {
        schedule::split_release(credited, self.release_ratio)
    }

    /// Add `amount` to the account's locked total, creating it lazily.
    ///
    /// # Errors
    /// [`PresaleError::ArithmeticOverflow`] if the total would not fit.
    pub fn lock(&mut self, account: AccountId, amount: Amount) -> Result<()> {
        if amount == 0 {
            return Ok(());
        }
        let position = self.accounts.entry(account).or_default();
        position.locked_total = position
            .locked_total
            .checked_add(amount)
            .ok_or(PresaleError::ArithmeticOverflow { context: "lock" })?;
        Ok(())
    }

    /// Check that `amount` may be claimed now.
    ///
    /// # Errors
    /// - [`PresaleError::ZeroClaim`] for a zero amount
    /// - [`PresaleError::InsufficientClaimable`] if more than has unlocked
    pub fn check_claim(&self, account: AccountId, amount: Amount, now: DateTime<Utc>) -> Result<()> {
        if amount == 0 {
            return Err(PresaleError::ZeroClaim);
        }
        let claimable = self.claimable(account, now);
        if amount > claimable {
            return Err(PresaleError::InsufficientClaimable {
                requested: amount,
                claimable,
            });
        }
        Ok(())
    }

    /// Move `amount` from locked to claimed. Call only after
    /// [`Self::check_claim`] succeeded for the same inputs.
    ///
    /// # Errors
    /// [`PresaleError::InsufficientClaimable`] if the account cannot cover it.
    pub fn apply_claim(&mut self, account: AccountId, amount: Amount) -> Result<()> {
        let position = self
            .accounts
            .get_mut(&account)
            .filter(|p| p.outstanding() >= amount)
            .ok_or(PresaleError::InsufficientClaimable {
                requested: amount,
                claimable: 0,
            })?;
        position.claimed_total += amount;
        Ok(())
    }

    /// Put an account back exactly as it was.
    pub(crate) fn restore_account(&mut self, account: AccountId, previous: Option<VestingAccount>) {
        match previous {
            Some(position) => {
                self.accounts.insert(account, position);
            }
            None => {
                self.accounts.remove(&account);
            }
        }
    }

    /// Sum of locked totals across accounts.
    #[must_use]
    pub fn total_locked(&self) -> Amount {
        self.accounts
            .values()
            .fold(0, |acc: Amount, a| acc.saturating_add(a.locked_total))
    }

    /// Sum of claimed totals across accounts.
    #[must_use]
    pub fn total_claimed(&self) -> Amount {
        self.accounts
            .values()
            .fold(0, |acc: Amount, a| acc.saturating_add(a.claimed_total))
    }

    pub fn accounts(&self) -> impl Iterator<Item = (&AccountId, &VestingAccount)> + '_ {
        self.accounts.iter()
    }

    // ------------------------------------------------------------------
    // Schedule updates
    // ------------------------------------------------------------------

    /// # Errors
    /// [`PresaleError::InvalidConfig`] if the resulting schedule is invalid.
    pub fn update_lock_start(&mut self, lock_start: DateTime<Utc>) -> Result<LockSchedule> {
        self.replace_schedule(LockSchedule {
            lock_start,
            ..self.schedule
        })
    }

    /// # Errors
    /// As [`Self::update_lock_start`].
    pub fn update_lock_duration(&mut self, lock_duration_secs: u64) -> Result<LockSchedule> {
        self.replace_schedule(LockSchedule {
            lock_duration_secs,
            ..self.schedule
        })
    }

    /// # Errors
    /// As [`Self::update_lock_start`].
    pub fn update_tranche_count(&mut self, tranche_count: u32) -> Result<LockSchedule> {
        self.replace_schedule(LockSchedule {
            tranche_count,
            ..self.schedule
        })
    }

    fn replace_schedule(&mut self, mut next: LockSchedule) -> Result<LockSchedule> {
        next.version = self.schedule.version + 1;
        next.validate()?;
        self.schedule = next;
        Ok(next)
    }
}
