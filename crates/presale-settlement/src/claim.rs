//! Vesting claims (deblocks).
//!
//! Locked tokens stay in the sale account until claimed. A claim records a
//! [`DeblockRecord`], moves the amount from locked to claimed, and pushes the
//! tokens to the buyer, rolling all of it back if the push fails.

use chrono::{DateTime, Utc};
use presale_ingress::{AssetLedger, SettlementBatch, TransferLeg};
use presale_types::{AccountId, Amount, Asset, DeblockRecord, LedgerEntry, OrderId, PresaleError, Result};

use crate::campaign::Campaign;

/// An account's request to release `amount` of its unlocked tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClaimRequest {
    pub order_id: OrderId,
    pub account: AccountId,
    pub amount: Amount,
}

impl ClaimRequest {
    #[must_use]
    pub fn new(order_id: impl Into<OrderId>, account: AccountId, amount: Amount) -> Self {
        Self {
            order_id: order_id.into(),
            account,
            amount,
        }
    }
}

impl Campaign {
    /// Claim unlocked tokens.
    ///
    /// # Errors
    /// - `VestingDisabled` on a campaign without a lock schedule
    /// - `DuplicateOrderId` if the id is on the ledger
    /// - `ZeroClaim`, `InsufficientClaimable`
    /// - `InsufficientBalance`, `TransferRejected` from settlement, with
    ///   every internal effect rolled back
    pub fn claim<L: AssetLedger + ?Sized>(
        &mut self,
        ledger: &mut L,
        request: ClaimRequest,
        now: DateTime<Utc>,
    ) -> Result<DeblockRecord> {
        let ClaimRequest {
            order_id,
            account,
            amount,
        } = request;

        let schedule_version = match &self.vesting {
            Some(vesting) => vesting.schedule().version,
            None => return Err(PresaleError::VestingDisabled),
        };
        self.reject_duplicate(order_id, account)?;
        if let Some(vesting) = &self.vesting {
            vesting.check_claim(account, amount, now)?;
        }
        self.ensure_inventory(ledger, amount)?;

        let record = DeblockRecord {
            order_id,
            buyer: account,
            amount,
            timestamp: now,
            schedule_version,
        };

        let mut batch = SettlementBatch::new();
        batch.push(TransferLeg::Push {
            asset: Asset::SaleToken,
            from: self.config.sale_account,
            to: account,
            amount,
        });

        let checkpoint = self.checkpoint(account);
        self.ledger.record(LedgerEntry::Deblock(record.clone()))?;
        if let Some(vesting) = self.vesting.as_mut() {
            if let Err(err) = vesting.apply_claim(account, amount) {
                self.restore(checkpoint);
                return Err(err);
            }
        }
        self.totals.total_claimed += amount;
        self.totals.deblock_count += 1;

        if let Err(err) = ledger.settle(&batch) {
            self.restore(checkpoint);
            tracing::warn!(
                campaign = %self.id,
                order = %order_id,
                account = %account.short(),
                error = %err,
                "Claim settlement failed, rolled back"
            );
            return Err(err.into());
        }

        tracing::info!(
            campaign = %self.id,
            order = %order_id,
            account = %account.short(),
            amount,
            schedule_version,
            "Claim committed"
        );
        Ok(record)
    }
}
