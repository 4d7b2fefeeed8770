//! Accepted payment currencies and their fixed conversion ratios.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{Amount, PresaleError, Result};

/// A currency a campaign may accept as payment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Currency {
    /// The host chain's native coin. Travels with the call, no approval needed.
    Native,
    /// A stablecoin (USDT and friends).
    Stable,
    /// Any other fungible token, e.g. a previously sold project token.
    Secondary,
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Native => write!(f, "NATIVE"),
            Self::Stable => write!(f, "STABLE"),
            Self::Secondary => write!(f, "SECONDARY"),
        }
    }
}

/// Anything the asset ledger holds balances of: the payment currencies and
/// the token being sold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Asset {
    Currency(Currency),
    SaleToken,
}

impl From<Currency> for Asset {
    fn from(currency: Currency) -> Self {
        Self::Currency(currency)
    }
}

impl fmt::Display for Asset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Currency(c) => write!(f, "{c}"),
            Self::SaleToken => write!(f, "SALE_TOKEN"),
        }
    }
}

/// `tokens = floor(paid * numerator / denominator)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversionRatio {
    pub numerator: Amount,
    pub denominator: Amount,
}

impl ConversionRatio {
    /// Build a ratio, rejecting a zero term.
    ///
    /// # Errors
    /// Returns [`PresaleError::InvalidRatio`] if either term is zero.
    pub fn new(currency: Currency, numerator: Amount, denominator: Amount) -> Result<Self> {
        let ratio = Self {
            numerator,
            denominator,
        };
        ratio.validate(currency)?;
        Ok(ratio)
    }

    /// A per-unit price: one token (or item) costs `price` base units.
    pub fn unit_price(currency: Currency, price: Amount) -> Result<Self> {
        Self::new(currency, 1, price)
    }

    pub fn validate(&self, currency: Currency) -> Result<()> {
        if self.numerator == 0 || self.denominator == 0 {
            return Err(PresaleError::InvalidRatio(currency));
        }
        Ok(())
    }
}

impl fmt::Display for ConversionRatio {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.numerator, self.denominator)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn currency_display() {
        assert_eq!(Currency::Native.to_string(), "NATIVE");
        assert_eq!(Asset::SaleToken.to_string(), "SALE_TOKEN");
        assert_eq!(Asset::from(Currency::Stable).to_string(), "STABLE");
    }

    #[test]
    fn zero_terms_rejected() {
        assert_eq!(
            ConversionRatio::new(Currency::Stable, 4, 0).unwrap_err(),
            PresaleError::InvalidRatio(Currency::Stable)
        );
        assert!(ConversionRatio::new(Currency::Stable, 0, 1).is_err());
        assert!(ConversionRatio::unit_price(Currency::Native, 0).is_err());
    }

    #[test]
    fn unit_price_ratio() {
        let r = ConversionRatio::unit_price(Currency::Stable, 500).unwrap();
        assert_eq!(r.numerator, 1);
        assert_eq!(r.denominator, 500);
        assert_eq!(r.to_string(), "1/500");
    }

    #[test]
    fn currency_serde_snake_case() {
        let json = serde_json::to_string(&Currency::Secondary).unwrap();
        assert_eq!(json, "\"secondary\"");
        let back: Currency = serde_json::from_str("\"native\"").unwrap();
        assert_eq!(back, Currency::Native);
    }
}
