//! Purchase settlement.
//!
//! A purchase is one atomic unit:
//! 1. Reject a reused order id
//! 2. Convert the payment to tokens (`ConversionTable`)
//! 3. Validate the converted amount (`LimitPolicy`)
//! 4. Work out the charge, the payee shares, and the immediate/locked split
//! 5. Check the sale account holds the whole credit on top of every lock
//!    still owed to earlier buyers
//! 6. Commit order, totals, and locked balance
//! 7. Settle payee pulls and the immediate token push in one batch
//!
//! If step 7 fails the commit is rolled back, so a failed purchase is
//! indistinguishable from one never attempted.

use chrono::{DateTime, Utc};
use presale_ingress::{AssetLedger, SettlementBatch, TransferLeg};
use presale_types::{
    AccountId, Amount, Asset, ChargeMode, Currency, LedgerEntry, Order, OrderId, PresaleError,
    Result,
};

use crate::campaign::Campaign;

/// A buyer's request to spend `paid_amount` of `currency`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PurchaseRequest {
    pub order_id: OrderId,
    pub buyer: AccountId,
    pub currency: Currency,
    pub paid_amount: Amount,
}

impl PurchaseRequest {
    #[must_use]
    pub fn new(order_id: impl Into<OrderId>, buyer: AccountId, currency: Currency, paid_amount: Amount) -> Self {
        Self {
            order_id: order_id.into(),
            buyer,
            currency,
            paid_amount,
        }
    }
}

impl Campaign {
    /// Buy tokens.
    ///
    /// # Errors
    /// - `DuplicateOrderId` if the id is on the ledger (checked first)
    /// - `UnsupportedCurrency`, `ZeroOutput` from conversion
    /// - `SalePaused`, `SaleClosed`, `AmountOutOfRange`,
    ///   `AccountLimitExceeded`, `SupplyExhausted` from the limit policy
    /// - `InsufficientBalance`, `InsufficientAllowance`, `TransferRejected`
    ///   from settlement, with every internal effect rolled back
    pub fn buy<L: AssetLedger + ?Sized>(
        &mut self,
        ledger: &mut L,
        request: PurchaseRequest,
        now: DateTime<Utc>,
    ) -> Result<Order> {
        let PurchaseRequest {
            order_id,
            buyer,
            currency,
            paid_amount,
        } = request;

        self.reject_duplicate(order_id, buyer)?;

        let credited = self.conversion.convert(currency, paid_amount)?;
        self.policy.validate(&self.snapshot(buyer), credited, now)?;

        let charged = match self.config.charge_mode {
            ChargeMode::FullPayment => paid_amount,
            ChargeMode::ExactCost => self.conversion.cost_of(currency, credited)?,
        };
        let (immediate, locked) = match &self.vesting {
            Some(vesting) => vesting.split_credit(credited),
            None => (credited, 0),
        };
        let reserved = credited
            .checked_add(self.totals.outstanding_locked())
            .ok_or(PresaleError::ArithmeticOverflow { context: "reserved inventory" })?;
        self.ensure_inventory(ledger, reserved)?;

        let collected = self
            .totals
            .collected
            .get(&currency)
            .copied()
            .unwrap_or(0)
            .checked_add(charged)
            .ok_or(PresaleError::ArithmeticOverflow { context: "collected" })?;

        let order = Order {
            order_id,
            buyer,
            currency,
            paid_amount: charged,
            credited_amount: credited,
            locked_amount: locked,
            timestamp: now,
        };

        let batch = self.purchase_batch(&order, immediate);

        // Effects before interactions.
        let checkpoint = self.checkpoint(buyer);
        self.ledger.record(LedgerEntry::Purchase(order.clone()))?;
        if let Some(vesting) = self.vesting.as_mut() {
            if let Err(err) = vesting.lock(buyer, locked) {
                self.restore(checkpoint);
                return Err(err);
            }
        }
        *self.purchased.entry(buyer).or_default() += credited;
        self.totals.total_sold += credited;
        self.totals.released_immediately += immediate;
        self.totals.total_locked += locked;
        self.totals.purchase_count += 1;
        self.totals.collected.insert(currency, collected);

        if let Err(err) = ledger.settle(&batch) {
            self.restore(checkpoint);
            tracing::warn!(
                campaign = %self.id,
                order = %order_id,
                account = %buyer.short(),
                error = %err,
                "Purchase settlement failed, rolled back"
            );
            return Err(err.into());
        }

        tracing::info!(
            campaign = %self.id,
            order = %order_id,
            account = %buyer.short(),
            currency = %currency,
            paid = charged,
            credited,
            locked,
            "Purchase committed"
        );
        Ok(order)
    }

    fn purchase_batch(&self, order: &Order, immediate: Amount) -> SettlementBatch {
        let asset = Asset::from(order.currency);
        let sale_account = self.config.sale_account;
        let mut batch = SettlementBatch::new();

        for share in self.splitter.split(order.paid_amount) {
            tracing::debug!(
                order = %order.order_id,
                payee = %share.account.short(),
                percentage = share.percentage,
                amount = share.amount,
                "Payee share"
            );
            batch.push(TransferLeg::Pull {
                asset,
                spender: sale_account,
                from: order.buyer,
                to: share.account,
                amount: share.amount,
            });
        }

        batch.push(TransferLeg::Push {
            asset: Asset::SaleToken,
            from: sale_account,
            to: order.buyer,
            amount: immediate,
        });
        batch
    }
}
