//! Thread-safe, reentrancy-guarded campaign handle.
//!
//! Every call takes the campaign lock for its whole check-then-act span, so
//! concurrent purchases can never both pass the supply check on the same
//! totals. The lock is reentrant: an asset ledger that calls back into the
//! same handle from inside `settle` does not deadlock, it finds the campaign
//! already borrowed and gets [`PresaleError::ReentrantCall`].

use std::cell::RefCell;

use chrono::{DateTime, Utc};
use parking_lot::ReentrantMutex;
use presale_ingress::AssetLedger;
use presale_types::{AccountId, DeblockRecord, LockSchedule, Order, PresaleError, Result};

use crate::campaign::Campaign;
use crate::claim::ClaimRequest;
use crate::purchase::PurchaseRequest;

/// A [`Campaign`] shared between threads and external callbacks.
pub struct SharedCampaign {
    inner: ReentrantMutex<RefCell<Campaign>>,
}

impl SharedCampaign {
    #[must_use]
    pub fn new(campaign: Campaign) -> Self {
        Self {
            inner: ReentrantMutex::new(RefCell::new(campaign)),
        }
    }

    /// Run `f` with exclusive access.
    ///
    /// # Errors
    /// [`PresaleError::ReentrantCall`] if this thread is already inside a
    /// call on this handle; otherwise whatever `f` returns.
    pub fn update<R>(&self, f: impl FnOnce(&mut Campaign) -> Result<R>) -> Result<R> {
        let guard = self.inner.lock();
        let Ok(mut campaign) = guard.try_borrow_mut() else {
            tracing::warn!("Reentrant campaign call rejected");
            return Err(PresaleError::ReentrantCall);
        };
        f(&mut campaign)
    }

    /// Run `f` with shared access.
    ///
    /// # Errors
    /// [`PresaleError::ReentrantCall`] if called from inside a mutation on
    /// this thread, where state may be half-committed.
    pub fn read<R>(&self, f: impl FnOnce(&Campaign) -> R) -> Result<R> {
        let guard = self.inner.lock();
        let Ok(campaign) = guard.try_borrow() else {
            tracing::warn!("Read during in-flight campaign mutation rejected");
            return Err(PresaleError::ReentrantCall);
        };
        Ok(f(&campaign))
    }

    /// # Errors
    /// As [`Campaign::buy`], plus [`PresaleError::ReentrantCall`].
    pub fn buy<L: AssetLedger + ?Sized>(
        &self,
        ledger: &mut L,
        request: PurchaseRequest,
        now: DateTime<Utc>,
    ) -> Result<Order> {
        self.update(|c| c.buy(ledger, request, now))
    }

    /// # Errors
    /// As [`Campaign::claim`], plus [`PresaleError::ReentrantCall`].
    pub fn claim<L: AssetLedger + ?Sized>(
        &self,
        ledger: &mut L,
        request: ClaimRequest,
        now: DateTime<Utc>,
    ) -> Result<DeblockRecord> {
        self.update(|c| c.claim(ledger, request, now))
    }

    /// # Errors
    /// As [`Campaign::pause`], plus [`PresaleError::ReentrantCall`].
    pub fn pause(&self, caller: AccountId) -> Result<()> {
        self.update(|c| c.pause(caller))
    }

    /// # Errors
    /// As [`Campaign::unpause`], plus [`PresaleError::ReentrantCall`].
    pub fn unpause(&self, caller: AccountId) -> Result<()> {
        self.update(|c| c.unpause(caller))
    }

    /// # Errors
    /// As [`Campaign::update_lock_start`], plus [`PresaleError::ReentrantCall`].
    pub fn update_lock_start(&self, caller: AccountId, lock_start: DateTime<Utc>) -> Result<LockSchedule> {
        self.update(|c| c.update_lock_start(caller, lock_start))
    }

    /// # Errors
    /// As [`Campaign::update_lock_duration`], plus [`PresaleError::ReentrantCall`].
    pub fn update_lock_duration(&self, caller: AccountId, secs: u64) -> Result<LockSchedule> {
        self.update(|c| c.update_lock_duration(caller, secs))
    }

    /// # Errors
    /// As [`Campaign::update_tranche_count`], plus [`PresaleError::ReentrantCall`].
    pub fn update_tranche_count(&self, caller: AccountId, tranche_count: u32) -> Result<LockSchedule> {
        self.update(|c| c.update_tranche_count(caller, tranche_count))
    }

    /// Take the campaign back out.
    #[must_use]
    pub fn into_inner(self) -> Campaign {
        self.inner.into_inner().into_inner()
    }
}

impl std::fmt::Debug for SharedCampaign {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SharedCampaign").finish_non_exhaustive()
    }
}
