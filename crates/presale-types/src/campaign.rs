//! Campaign configuration, lock schedule, and running totals.

use std::collections::BTreeMap;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::{AccountId, Amount, ConversionRatio, Currency, PayeeSet, PresaleError, Result, constants};

/// How much of the offered payment a purchase collects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChargeMode {
    /// Collect the full offered amount (token sales).
    #[default]
    FullPayment,
    /// Collect only what the credited amount costs; the buyer keeps the
    /// excess (coupon and item sales priced per unit).
    ExactCost,
}

/// Vesting parameters for campaigns that lock purchased tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VestingConfig {
    /// When the first tranche starts accruing.
    pub lock_start: DateTime<Utc>,
    /// Seconds from `lock_start` until everything is unlocked.
    pub lock_duration_secs: u64,
    /// Number of equal linear unlocks across `lock_duration_secs`.
    pub tranche_count: u32,
    /// Percent of each purchase credited immediately instead of locked.
    #[serde(default)]
    pub release_ratio: u32,
}

impl VestingConfig {
    pub fn validate(&self) -> Result<()> {
        if self.release_ratio > constants::PERCENT_TOTAL {
            return Err(PresaleError::InvalidConfig {
                reason: format!("release_ratio {} exceeds 100", self.release_ratio),
            });
        }
        self.schedule().validate()
    }

    /// Initial (version 0) lock schedule.
    #[must_use]
    pub fn schedule(&self) -> LockSchedule {
        LockSchedule {
            lock_start: self.lock_start,
            lock_duration_secs: self.lock_duration_secs,
            tranche_count: self.tranche_count,
            version: 0,
        }
    }
}

/// The current lock timing of a campaign.
///
/// Admin updates replace the schedule and bump `version`; past claims and
/// their records are unaffected by a new schedule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LockSchedule {
    pub lock_start: DateTime<Utc>,
    pub lock_duration_secs: u64,
    pub tranche_count: u32,
    pub version: u64,
}

impl LockSchedule {
    /// # Errors
    /// Returns [`PresaleError::InvalidConfig`] unless
    /// `1 <= tranche_count <= MAX_TRANCHE_COUNT` and every tranche lasts at
    /// least one second.
    pub fn validate(&self) -> Result<()> {
        if self.tranche_count == 0 || self.tranche_count > constants::MAX_TRANCHE_COUNT {
            return Err(PresaleError::InvalidConfig {
                reason: format!(
                    "tranche_count {} outside 1..={}",
                    self.tranche_count,
                    constants::MAX_TRANCHE_COUNT
                ),
            });
        }
        if self.lock_duration_secs < u64::from(self.tranche_count) {
            return Err(PresaleError::InvalidConfig {
                reason: format!(
                    "lock_duration_secs {} shorter than tranche_count {}",
                    self.lock_duration_secs, self.tranche_count
                ),
            });
        }
        if self.lock_duration_secs > constants::MAX_LOCK_DURATION_SECS {
            return Err(PresaleError::InvalidConfig {
                reason: format!(
                    "lock_duration_secs {} exceeds {}",
                    self.lock_duration_secs,
                    constants::MAX_LOCK_DURATION_SECS
                ),
            });
        }
        Ok(())
    }

    /// Seconds after `lock_start` at which `k` tranches have unlocked,
    /// `ceil(k * lock_duration / tranche_count)`. The last tranche unlocks
    /// exactly at [`lock_end`](Self::lock_end), so uneven durations stretch
    /// tranches instead of finishing early.
    #[must_use]
    pub fn unlock_offset_secs(&self, k: u32) -> u64 {
        let count = u128::from(self.tranche_count.max(1));
        let k = u128::from(k.min(self.tranche_count));
        let secs = (k * u128::from(self.lock_duration_secs)).div_ceil(count);
        u64::try_from(secs).unwrap_or(u64::MAX)
    }

    /// Instant from which everything is claimable.
    #[must_use]
    pub fn lock_end(&self) -> DateTime<Utc> {
        let secs = i64::try_from(self.lock_duration_secs.min(constants::MAX_LOCK_DURATION_SECS))
            .unwrap_or(i64::MAX);
        self.lock_start
            .checked_add_signed(Duration::seconds(secs))
            .unwrap_or(DateTime::<Utc>::MAX_UTC)
    }
}

/// Immutable construction parameters of one sale campaign.
///
/// All caps are token amounts in base units: `per_min_buy`, `per_max_buy`,
/// and `limit_buy` bound the credited token count, never the raw payment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CampaignConfig {
    /// Account allowed to pause the sale and re-time the lock schedule.
    pub admin: AccountId,
    /// Treasury account holding the inventory of sale tokens.
    pub sale_account: AccountId,
    pub presale_max: Amount,
    pub begin_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub per_min_buy: Amount,
    pub per_max_buy: Amount,
    pub limit_buy: Amount,
    pub ratios: BTreeMap<Currency, ConversionRatio>,
    pub payees: PayeeSet,
    #[serde(default)]
    pub charge_mode: ChargeMode,
    /// `None` credits every purchase immediately.
    #[serde(default)]
    pub vesting: Option<VestingConfig>,
}

impl CampaignConfig {
    /// Check every construction invariant.
    ///
    /// # Errors
    /// Returns the first violated invariant as a configuration error.
    pub fn validate(&self) -> Result<()> {
        if self.presale_max == 0 {
            return Err(invalid("presale_max must be positive"));
        }
        if self.per_min_buy == 0 {
            return Err(invalid("per_min_buy must be positive"));
        }
        if self.per_min_buy > self.per_max_buy {
            return Err(invalid(format!(
                "per_min_buy {} > per_max_buy {}",
                self.per_min_buy, self.per_max_buy
            )));
        }
        if self.per_max_buy > self.limit_buy {
            return Err(invalid(format!(
                "per_max_buy {} > limit_buy {}",
                self.per_max_buy, self.limit_buy
            )));
        }
        if self.limit_buy > self.presale_max {
            return Err(invalid(format!(
                "limit_buy {} > presale_max {}",
                self.limit_buy, self.presale_max
            )));
        }
        if self.begin_time > self.end_time {
            return Err(invalid(format!(
                "begin_time {} after end_time {}",
                self.begin_time, self.end_time
            )));
        }
        if self.ratios.is_empty() {
            return Err(invalid("at least one currency must be accepted"));
        }
        for (currency, ratio) in &self.ratios {
            ratio.validate(*currency)?;
        }
        if let Some(vesting) = &self.vesting {
            vesting.validate()?;
        }
        Ok(())
    }

    #[must_use]
    pub fn accepts(&self, currency: Currency) -> bool {
        self.ratios.contains_key(&currency)
    }
}

fn invalid(reason: impl Into<String>) -> PresaleError {
    PresaleError::InvalidConfig {
        reason: reason.into(),
    }
}

/// Running totals of a campaign, exposed through the query surface.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CampaignTotals {
    pub presale_max: Amount,
    /// Tokens credited across all purchases.
    pub total_sold: Amount,
    /// Part of `total_sold` transferred at purchase time.
    pub released_immediately: Amount,
    /// Part of `total_sold` registered as locked. Never decreases.
    pub total_locked: Amount,
    /// Locked tokens released by claims.
    pub total_claimed: Amount,
    pub purchase_count: u64,
    pub deblock_count: u64,
    /// Payment collected per currency.
    pub collected: BTreeMap<Currency, Amount>,
}

impl CampaignTotals {
    #[must_use]
    pub fn new(presale_max: Amount) -> Self {
        Self {
            presale_max,
            ..Self::default()
        }
    }

    /// Tokens still available for sale.
    #[must_use]
    pub fn remaining(&self) -> Amount {
        self.presale_max.saturating_sub(self.total_sold)
    }

    /// Locked tokens not yet claimed.
    #[must_use]
    pub fn outstanding_locked(&self) -> Amount {
        self.total_locked.saturating_sub(self.total_claimed)
    }
}

/// Fixture configs for tests. **Never use in production.**
#[cfg(any(test, feature = "test-helpers"))]
impl CampaignConfig {
    /// Cap 1000, per-tx 1..=500, per-account 500, stable at 4 tokens per
    /// unit paid, open for all of 2025.
    pub fn fixture(admin: AccountId, sale_account: AccountId, payees: PayeeSet) -> Self {
        use chrono::TimeZone;
        let mut ratios = BTreeMap::new();
        ratios.insert(
            Currency::Stable,
            ConversionRatio {
                numerator: 4,
                denominator: 1,
            },
        );
        Self {
            admin,
            sale_account,
            presale_max: 1000,
            begin_time: Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap(),
            end_time: Utc.with_ymd_and_hms(2025, 12, 31, 23, 59, 59).unwrap(),
            per_min_buy: 1,
            per_max_buy: 500,
            limit_buy: 500,
            ratios,
            payees,
            charge_mode: ChargeMode::FullPayment,
            vesting: None,
        }
    }
}
