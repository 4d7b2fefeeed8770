//! Sale conservation invariant checker.
//!
//! Invariants that must hold after every committed purchase or claim:
//! ```text
//! total_sold            == Σ purchased[account] == Σ Order.credited
//! total_sold            == released_immediately + total_locked
//! total_locked          == Σ VestingAccount.locked_total == Σ Order.locked
//! total_claimed         == Σ VestingAccount.claimed_total == Σ DeblockRecord.amount
//! total_sold            <= presale_max
//! ```
//!
//! A violation means the ledger is corrupt. The caller should stop selling.

use presale_types::{Amount, CampaignTotals, LedgerEntry, PresaleError, Result};
use serde::{Deserialize, Serialize};

use crate::campaign::Campaign;

/// Independent recomputation of every total the campaign tracks.
///
/// Serializable so audits can export it next to the ledger digest.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConservationReport {
    pub credited_by_orders: Amount,
    pub locked_by_orders: Amount,
    pub claimed_by_deblocks: Amount,
    pub purchased_by_accounts: Amount,
    pub locked_by_accounts: Amount,
    pub claimed_by_accounts: Amount,
    pub purchases: u64,
    pub deblocks: u64,
}

impl ConservationReport {
    /// Compare against the running totals.
    ///
    /// # Errors
    /// [`PresaleError::ConservationViolation`] naming the first mismatch.
    pub fn verify(&self, totals: &CampaignTotals) -> Result<()> {
        let checks: [(&str, Amount, Amount); 8] = [
            ("total_sold vs Σ order credit", totals.total_sold, self.credited_by_orders),
            ("total_sold vs Σ account purchases", totals.total_sold, self.purchased_by_accounts),
            (
                "total_sold vs released + locked",
                totals.total_sold,
                totals.released_immediately.saturating_add(totals.total_locked),
            ),
            ("total_locked vs Σ order locked", totals.total_locked, self.locked_by_orders),
            ("total_locked vs Σ account locked", totals.total_locked, self.locked_by_accounts),
            ("total_claimed vs Σ deblocks", totals.total_claimed, self.claimed_by_deblocks),
            ("total_claimed vs Σ account claimed", totals.total_claimed, self.claimed_by_accounts),
            (
                "purchase count",
                Amount::from(totals.purchase_count),
                Amount::from(self.purchases),
            ),
        ];
        for (name, tracked, recomputed) in checks {
            if tracked != recomputed {
                return Err(PresaleError::ConservationViolation {
                    reason: format!("{name}: tracked {tracked} != recomputed {recomputed}"),
                });
            }
        }
        if totals.deblock_count != self.deblocks {
            return Err(PresaleError::ConservationViolation {
                reason: format!(
                    "deblock count: tracked {} != recomputed {}",
                    totals.deblock_count, self.deblocks
                ),
            });
        }
        if totals.total_sold > totals.presale_max {
            return Err(PresaleError::ConservationViolation {
                reason: format!(
                    "total_sold {} exceeds presale_max {}",
                    totals.total_sold, totals.presale_max
                ),
            });
        }
        Ok(())
    }
}

impl Campaign {
    /// Recompute every total from the ledger and per-account state.
    #[must_use]
    pub fn conservation_report(&self) -> ConservationReport {
        let mut report = ConservationReport::default();
        for entry in self.ledger.iter() {
            match entry {
                LedgerEntry::Purchase(order) => {
                    report.credited_by_orders += order.credited_amount;
                    report.locked_by_orders += order.locked_amount;
                    report.purchases += 1;
                }
                LedgerEntry::Deblock(deblock) => {
                    report.claimed_by_deblocks += deblock.amount;
                    report.deblocks += 1;
                }
            }
        }
        report.purchased_by_accounts = self
            .purchased
            .values()
            .fold(0, |acc: Amount, v| acc.saturating_add(*v));
        if let Some(vesting) = &self.vesting {
            report.locked_by_accounts = vesting.total_locked();
            report.claimed_by_accounts = vesting.total_claimed();
        }
        report
    }

    /// Check every conservation invariant and the ledger hash chain.
    ///
    /// # Errors
    /// [`PresaleError::ConservationViolation`] on the first mismatch.
    pub fn verify_conservation(&self) -> Result<()> {
        let result = if self.ledger.verify_digest() {
            self.conservation_report().verify(&self.totals)
        } else {
            Err(PresaleError::ConservationViolation {
                reason: "order ledger hash chain does not match its entries".to_string(),
            })
        };
        if let Err(ref err) = result {
            tracing::error!(campaign = %self.id, error = %err, "Conservation check failed");
        }
        result
    }
}
