//! Human-readable campaign manifests.
//!
//! A manifest states prices and caps the way a deployment is usually
//! written down: whole tokens and decimal unit prices per currency. It is
//! converted into a base-unit [`CampaignConfig`] and validated in one step.

use std::collections::BTreeMap;
use std::path::Path;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::units::to_base_units;
use crate::{
    AccountId, Amount, CampaignConfig, CampaignId, ChargeMode, ConversionRatio, Currency, Payee,
    PayeeSet, PresaleError, Result, VestingConfig,
};

/// Price of one whole sale token in one payment currency.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrencyPrice {
    pub currency: Currency,
    /// Decimals of the payment currency.
    pub decimals: u32,
    /// Currency units per one token (or per item), e.g. `"0.016"`.
    #[serde(with = "rust_decimal::serde::str")]
    pub unit_price: Decimal,
}

/// Deployment-style description of a campaign.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CampaignManifest {
    pub name: String,
    /// Decimals of the sale token. `0` for coupons and items.
    pub token_decimals: u32,
    pub admin: AccountId,
    pub sale_account: AccountId,
    #[serde(with = "rust_decimal::serde::str")]
    pub presale_max: Decimal,
    pub begin_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    #[serde(with = "rust_decimal::serde::str")]
    pub per_min_buy: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub per_max_buy: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub limit_buy: Decimal,
    pub prices: Vec<CurrencyPrice>,
    pub payees: Vec<Payee>,
    #[serde(default)]
    pub charge_mode: ChargeMode,
    #[serde(default)]
    pub vesting: Option<VestingConfig>,
}

impl CampaignManifest {
    /// # Errors
    /// Returns [`PresaleError::Configuration`] if the JSON does not parse.
    pub fn from_json_str(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| PresaleError::Configuration(e.to_string()))
    }

    /// # Errors
    /// Returns [`PresaleError::Io`] if the file cannot be read, otherwise as
    /// [`Self::from_json_str`].
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    /// Deterministic id for this campaign, derived from its name.
    #[must_use]
    pub fn campaign_id(&self) -> CampaignId {
        CampaignId::from_name(&self.name)
    }

    /// Convert to base units and validate.
    ///
    /// A unit price `p` in a currency with `d` decimals becomes the ratio
    /// `10^token_decimals / (p * 10^d)`, reduced.
    ///
    /// # Errors
    /// Any scaling error, a duplicate currency, or a failed
    /// [`CampaignConfig::validate`].
    pub fn into_config(self) -> Result<CampaignConfig> {
        let decimals = self.token_decimals;
        let token = move |amount: Decimal| to_base_units(amount, decimals);
        let one_token = token(Decimal::ONE)?;

        let mut ratios = BTreeMap::new();
        for price in &self.prices {
            let cost = to_base_units(price.unit_price, price.decimals)?;
            let ratio = reduced(price.currency, one_token, cost)?;
            if ratios.insert(price.currency, ratio).is_some() {
                return Err(PresaleError::InvalidConfig {
                    reason: format!("currency {} priced twice", price.currency),
                });
            }
        }

        let config = CampaignConfig {
            admin: self.admin,
            sale_account: self.sale_account,
            presale_max: token(self.presale_max)?,
            begin_time: self.begin_time,
            end_time: self.end_time,
            per_min_buy: token(self.per_min_buy)?,
            per_max_buy: token(self.per_max_buy)?,
            limit_buy: token(self.limit_buy)?,
            ratios,
            payees: PayeeSet::new(self.payees)?,
            charge_mode: self.charge_mode,
            vesting: self.vesting,
        };
        config.validate()?;
        Ok(config)
    }
}

fn reduced(currency: Currency, numerator: Amount, denominator: Amount) -> Result<ConversionRatio> {
    if numerator == 0 || denominator == 0 {
        return Err(PresaleError::InvalidRatio(currency));
    }
    let g = gcd(numerator, denominator);
    ConversionRatio::new(currency, numerator / g, denominator / g)
}

fn gcd(mut a: Amount, mut b: Amount) -> Amount {
    while b != 0 {
        (a, b) = (b, a % b);
    }
    a
}
