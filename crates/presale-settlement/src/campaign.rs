//! One sale campaign: configuration, running state, queries, and admin.
//!
//! `Campaign` is the single choke point for every mutation of sale state.
//! Purchases live in [`crate::purchase`], claims in [`crate::claim`]; both
//! follow the same discipline:
//!
//! 1. Reject a reused order id before anything else
//! 2. Run every check that needs no external call
//! 3. Commit internal effects under a checkpoint
//! 4. Hand one [`SettlementBatch`](presale_ingress::SettlementBatch) to the
//!    asset ledger
//! 5. On a ledger failure, restore the checkpoint and surface the error

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use presale_core::{ConversionTable, PaymentSplitter};
use presale_ingress::{AssetLedger, LimitPolicy, PolicySnapshot};
use presale_types::{
    AccountId, Amount, Asset, CampaignConfig, CampaignId, CampaignTotals, DeblockRecord,
    LedgerEntry, LockSchedule, Order, OrderId, PresaleError, Result, VestingAccount, VestingState,
    constants,
};

use crate::order_ledger::{LedgerCheckpoint, OrderLedger};
use crate::vesting::VestingEngine;

/// A capped sale with its order ledger and, optionally, a vesting engine.
#[derive(Debug, Clone)]
pub struct Campaign {
    pub(crate) id: CampaignId,
    pub(crate) config: CampaignConfig,
    pub(crate) conversion: ConversionTable,
    pub(crate) splitter: PaymentSplitter,
    pub(crate) policy: LimitPolicy,
    pub(crate) ledger: OrderLedger,
    pub(crate) vesting: Option<VestingEngine>,
    /// Cumulative tokens credited per account.
    pub(crate) purchased: HashMap<AccountId, Amount>,
    pub(crate) totals: CampaignTotals,
    pub(crate) paused: bool,
}

/// Everything a failed settlement has to put back.
pub(crate) struct Checkpoint {
    ledger: LedgerCheckpoint,
    totals: CampaignTotals,
    account: AccountId,
    purchased: Option<Amount>,
    vesting: Option<VestingAccount>,
}

impl Campaign {
    /// Build a campaign from a validated configuration.
    ///
    /// # Errors
    /// The first configuration invariant that does not hold.
    pub fn new(id: CampaignId, config: CampaignConfig) -> Result<Self> {
        config.validate()?;
        let vesting = config.vesting.as_ref().map(VestingEngine::new).transpose()?;

        tracing::info!(
            engine = constants::ENGINE_NAME,
            version = constants::VERSION,
            campaign = %id,
            presale_max = config.presale_max,
            currencies = config.ratios.len(),
            payees = config.payees.len(),
            vesting = vesting.is_some(),
            "Campaign created"
        );

        Ok(Self {
            id,
            conversion: ConversionTable::from_config(&config)?,
            splitter: PaymentSplitter::new(config.payees.clone()),
            policy: LimitPolicy::from_config(&config),
            ledger: OrderLedger::new(),
            vesting,
            purchased: HashMap::new(),
            totals: CampaignTotals::new(config.presale_max),
            paused: false,
            config,
        })
    }

    // ------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------

    #[must_use]
    pub fn id(&self) -> CampaignId {
        self.id
    }

    #[must_use]
    pub fn config(&self) -> &CampaignConfig {
        &self.config
    }

    #[must_use]
    pub fn totals(&self) -> &CampaignTotals {
        &self.totals
    }

    #[must_use]
    pub fn is_paused(&self) -> bool {
        self.paused
    }

    #[must_use]
    pub fn conversion(&self) -> &ConversionTable {
        &self.conversion
    }

    #[must_use]
    pub fn order_ledger(&self) -> &OrderLedger {
        &self.ledger
    }

    /// Any ledger entry, purchase or deblock.
    #[must_use]
    pub fn entry(&self, order_id: OrderId) -> Option<&LedgerEntry> {
        self.ledger.get(order_id)
    }

    /// # Errors
    /// [`PresaleError::OrderNotFound`] if no purchase has this id.
    pub fn order_by_id(&self, order_id: OrderId) -> Result<&Order> {
        self.ledger
            .get(order_id)
            .and_then(LedgerEntry::as_purchase)
            .ok_or(PresaleError::OrderNotFound(order_id))
    }

    /// # Errors
    /// [`PresaleError::OrderNotFound`] if no deblock has this id.
    pub fn deblock_by_id(&self, order_id: OrderId) -> Result<&DeblockRecord> {
        self.ledger
            .get(order_id)
            .and_then(LedgerEntry::as_deblock)
            .ok_or(PresaleError::OrderNotFound(order_id))
    }

    /// Purchases of `account` in commit order.
    pub fn orders_by_account(&self, account: AccountId) -> impl Iterator<Item = &Order> + '_ {
        self.ledger.orders_for(account)
    }

    /// Purchases and deblocks of `account` in commit order.
    pub fn entries_by_account(&self, account: AccountId) -> impl Iterator<Item = &LedgerEntry> + '_ {
        self.ledger.entries_for(account)
    }

    /// The `index`-th purchase of `account`.
    #[must_use]
    pub fn order_at(&self, account: AccountId, index: usize) -> Option<&Order> {
        self.ledger.order_at(account, index)
    }

    /// Tokens credited to `account` so far.
    #[must_use]
    pub fn purchased_by(&self, account: AccountId) -> Amount {
        self.purchased.get(&account).copied().unwrap_or(0)
    }

    /// Tokens `account` may still buy before its cap.
    #[must_use]
    pub fn remaining_for(&self, account: AccountId) -> Amount {
        self.policy
            .account_remaining(self.purchased_by(account))
            .min(self.totals.remaining())
    }

    /// Unlocked, unclaimed tokens of `account`; zero without vesting.
    #[must_use]
    pub fn claimable_of(&self, account: AccountId, now: DateTime<Utc>) -> Amount {
        self.vesting
            .as_ref()
            .map_or(0, |v| v.claimable(account, now))
    }

    #[must_use]
    pub fn vesting_account(&self, account: AccountId) -> Option<VestingAccount> {
        self.vesting.as_ref().and_then(|v| v.account(account))
    }

    #[must_use]
    pub fn vesting_state(&self, account: AccountId, now: DateTime<Utc>) -> VestingState {
        self.vesting
            .as_ref()
            .map_or(VestingState::NoLock, |v| v.state(account, now))
    }

    #[must_use]
    pub fn lock_schedule(&self) -> Option<LockSchedule> {
        self.vesting.as_ref().map(VestingEngine::schedule)
    }

    #[must_use]
    pub fn next_unlock_at(&self, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        self.vesting.as_ref().and_then(|v| v.next_unlock_at(now))
    }

    /// Hex SHA-256 head of the order-ledger hash chain.
    #[must_use]
    pub fn ledger_digest(&self) -> String {
        self.ledger.digest_hex()
    }

    // ------------------------------------------------------------------
    // Admin
    // ------------------------------------------------------------------

    /// Stop accepting purchases. Claims continue.
    ///
    /// # Errors
    /// [`PresaleError::Unauthorized`] unless `caller` is the admin.
    pub fn pause(&mut self, caller: AccountId) -> Result<()> {
        self.authorize(caller)?;
        self.paused = true;
        tracing::info!(campaign = %self.id, "Sale paused");
        Ok(())
    }

    /// # Errors
    /// [`PresaleError::Unauthorized`] unless `caller` is the admin.
    pub fn unpause(&mut self, caller: AccountId) -> Result<()> {
        self.authorize(caller)?;
        self.paused = false;
        tracing::info!(campaign = %self.id, "Sale unpaused");
        Ok(())
    }

    /// Move the lock start. Claims already made are unaffected.
    ///
    /// # Errors
    /// `Unauthorized`, `VestingDisabled`, or `InvalidConfig`.
    pub fn update_lock_start(
        &mut self,
        caller: AccountId,
        lock_start: DateTime<Utc>,
    ) -> Result<LockSchedule> {
        self.authorize(caller)?;
        let schedule = self.vesting_mut()?.update_lock_start(lock_start)?;
        self.log_schedule(&schedule);
        Ok(schedule)
    }

    /// # Errors
    /// `Unauthorized`, `VestingDisabled`, or `InvalidConfig`.
    pub fn update_lock_duration(
        &mut self,
        caller: AccountId,
        lock_duration_secs: u64,
    ) -> Result<LockSchedule> {
        self.authorize(caller)?;
        let schedule = self.vesting_mut()?.update_lock_duration(lock_duration_secs)?;
        self.log_schedule(&schedule);
        Ok(schedule)
    }

    /// # Errors
    /// `Unauthorized`, `VestingDisabled`, or `InvalidConfig`.
    pub fn update_tranche_count(
        &mut self,
        caller: AccountId,
        tranche_count: u32,
    ) -> Result<LockSchedule> {
        self.authorize(caller)?;
        let schedule = self.vesting_mut()?.update_tranche_count(tranche_count)?;
        self.log_schedule(&schedule);
        Ok(schedule)
    }

    fn authorize(&self, caller: AccountId) -> Result<()> {
        if caller != self.config.admin {
            tracing::warn!(campaign = %self.id, caller = %caller, "Admin call rejected");
            return Err(PresaleError::Unauthorized);
        }
        Ok(())
    }

    fn vesting_mut(&mut self) -> Result<&mut VestingEngine> {
        self.vesting.as_mut().ok_or(PresaleError::VestingDisabled)
    }

    fn log_schedule(&self, schedule: &LockSchedule) {
        tracing::info!(
            campaign = %self.id,
            lock_start = %schedule.lock_start,
            lock_duration_secs = schedule.lock_duration_secs,
            tranche_count = schedule.tranche_count,
            version = schedule.version,
            "Lock schedule updated"
        );
    }

    // ------------------------------------------------------------------
    // Shared plumbing for purchase and claim
    // ------------------------------------------------------------------

    pub(crate) fn reject_duplicate(&self, order_id: OrderId, account: AccountId) -> Result<()> {
        if self.ledger.contains(order_id) {
            tracing::warn!(
                campaign = %self.id,
                order = %order_id,
                account = %account.short(),
                "Duplicate order id rejected"
            );
            return Err(PresaleError::DuplicateOrderId(order_id));
        }
        Ok(())
    }

    pub(crate) fn snapshot(&self, account: AccountId) -> PolicySnapshot {
        PolicySnapshot {
            paused: self.paused,
            account_purchased: self.purchased_by(account),
            total_sold: self.totals.total_sold,
        }
    }

    /// Fail early if the sale account cannot hand out `amount` tokens.
    pub(crate) fn ensure_inventory<L: AssetLedger + ?Sized>(
        &self,
        ledger: &L,
        amount: Amount,
    ) -> Result<()> {
        if amount == 0 {
            return Ok(());
        }
        let available = ledger.balance_of(Asset::SaleToken, self.config.sale_account);
        if available < amount {
            return Err(PresaleError::InsufficientBalance {
                asset: Asset::SaleToken,
                needed: amount,
                available,
            });
        }
        Ok(())
    }

    pub(crate) fn checkpoint(&self, account: AccountId) -> Checkpoint {
        Checkpoint {
            ledger: self.ledger.checkpoint(),
            totals: self.totals.clone(),
            account,
            purchased: self.purchased.get(&account).copied(),
            vesting: self.vesting_account(account),
        }
    }

    pub(crate) fn restore(&mut self, checkpoint: Checkpoint) {
        self.ledger.restore(checkpoint.ledger);
        self.totals = checkpoint.totals;
        match checkpoint.purchased {
            Some(amount) => {
                self.purchased.insert(checkpoint.account, amount);
            }
            None => {
                self.purchased.remove(&checkpoint.account);
            }
        }
        if let Some(vesting) = self.vesting.as_mut() {
            vesting.restore_account(checkpoint.account, checkpoint.vesting);
        }
    }
}
