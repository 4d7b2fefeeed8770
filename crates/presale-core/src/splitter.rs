//! Lossless percentage split of one payment among the payees.
//!
//! Every payee but the last receives `floor(total * percentage / 100)`; the
//! last receives whatever is left. The shares therefore always sum to the
//! total exactly, whatever the percentages and however indivisible the
//! total is.

use presale_types::{AccountId, Amount, PayeeSet, constants};

use crate::arith::scale_floor;

/// One payee's cut of a payment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Share {
    pub account: AccountId,
    pub percentage: u32,
    pub amount: Amount,
}

/// Splits payments according to a fixed, validated payee list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentSplitter {
    payees: PayeeSet,
}

impl PaymentSplitter {
    #[must_use]
    pub fn new(payees: PayeeSet) -> Self {
        Self { payees }
    }

    #[must_use]
    pub fn payees(&self) -> &PayeeSet {
        &self.payees
    }

    /// Shares of `total`, in payee order. Zero shares are included.
    #[must_use]
    pub fn split(&self, total: Amount) -> Vec<Share> {
        split(total, &self.payees)
    }
}

/// Split `total` across `payees`; `sum(shares) == total`.
#[must_use]
pub fn split(total: Amount, payees: &PayeeSet) -> Vec<Share> {
    let payees = payees.as_slice();
    let mut shares = Vec::with_capacity(payees.len());
    let mut allocated: Amount = 0;

    let Some((last, head)) = payees.split_last() else {
        return shares;
    };

    for payee in head {
        let amount = scale_floor(total, payee.percentage, constants::PERCENT_TOTAL);
        allocated += amount;
        shares.push(Share {
            account: payee.account,
            percentage: payee.percentage,
            amount,
        });
    }

    // Head percentages sum to at most 100, so the floors never exceed total.
    shares.push(Share {
        account: last.account,
        percentage: last.percentage,
        amount: total - allocated,
    });

    tracing::debug!(total, payees = shares.len(), "Payment split computed");

    shares
}
