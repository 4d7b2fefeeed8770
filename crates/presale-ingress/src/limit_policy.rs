//! Limit policy: the hard gate every purchase passes before anything moves.
//!
//! The policy only reads. It is handed a snapshot of the running totals and
//! the converted token amount, and answers yes or the first rule broken.
//! The caller must commit using the same amount it validated.
//!
//! ## Check order
//!
//! 1. Sale not paused, else `SalePaused`
//! 2. `begin_time <= now <= end_time`, else `SaleClosed`
//! 3. `per_min_buy <= amount <= per_max_buy`, else `AmountOutOfRange`
//! 4. `account_purchased + amount <= limit_buy`, else `AccountLimitExceeded`
//! 5. `total_sold + amount <= presale_max`, else `SupplyExhausted`

use chrono::{DateTime, Utc};
use presale_types::{Amount, CampaignConfig, PresaleError, Result};

/// Running totals the policy checks a purchase against.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PolicySnapshot {
    pub paused: bool,
    /// Tokens already credited to the buying account.
    pub account_purchased: Amount,
    /// Tokens already credited across the campaign.
    pub total_sold: Amount,
}

/// Per-transaction, per-account, and campaign-wide purchase caps plus the
/// active window. All amounts are token counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LimitPolicy {
    begin_time: DateTime<Utc>,
    end_time: DateTime<Utc>,
    per_min_buy: Amount,
    per_max_buy: Amount,
    limit_buy: Amount,
    presale_max: Amount,
}

impl LimitPolicy {
    #[must_use]
    pub fn from_config(config: &CampaignConfig) -> Self {
        Self {
            begin_time: config.begin_time,
            end_time: config.end_time,
            per_min_buy: config.per_min_buy,
            per_max_buy: config.per_max_buy,
            limit_buy: config.limit_buy,
            presale_max: config.presale_max,
        }
    }

    /// Validate a prospective purchase of `amount` tokens.
    ///
    /// # Errors
    /// The first failing check, in the order listed in the module docs.
    pub fn validate(&self, snapshot: &PolicySnapshot, amount: Amount, now: DateTime<Utc>) -> Result<()> {
        let result = self.check(snapshot, amount, now);
        if let Err(ref err) = result {
            tracing::debug!(amount, error = %err, "Purchase rejected by limit policy");
        }
        result
    }

    fn check(&self, snapshot: &PolicySnapshot, amount: Amount, now: DateTime<Utc>) -> Result<()> {
        if snapshot.paused {
            return Err(PresaleError::SalePaused);
        }

        if !self.is_open(now) {
            return Err(PresaleError::SaleClosed {
                now: now.timestamp(),
                begin: self.begin_time.timestamp(),
                end: self.end_time.timestamp(),
            });
        }

        if amount < self.per_min_buy || amount > self.per_max_buy {
            return Err(PresaleError::AmountOutOfRange {
                amount,
                min: self.per_min_buy,
                max: self.per_max_buy,
            });
        }

        let remaining = self.account_remaining(snapshot.account_purchased);
        if amount > remaining {
            return Err(PresaleError::AccountLimitExceeded {
                requested: amount,
                remaining,
            });
        }

        let supply_left = self.presale_max.saturating_sub(snapshot.total_sold);
        if amount > supply_left {
            return Err(PresaleError::SupplyExhausted {
                requested: amount,
                remaining: supply_left,
            });
        }

        Ok(())
    }

    /// Whether `now` lies inside the inclusive sale window.
    #[must_use]
    pub fn is_open(&self, now: DateTime<Utc>) -> bool {
        self.begin_time <= now && now <= self.end_time
    }

    /// Tokens an account may still buy before hitting `limit_buy`.
    #[must_use]
    pub fn account_remaining(&self, account_purchased: Amount) -> Amount {
        self.limit_buy.saturating_sub(account_purchased)
    }

    #[must_use]
    pub fn limit_buy(&self) -> Amount {
        self.limit_buy
    }

    #[must_use]
    pub fn presale_max(&self) -> Amount {
        self.presale_max
    }
}
