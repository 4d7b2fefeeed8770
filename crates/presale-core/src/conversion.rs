//! Per-currency fixed-ratio pricing.

use std::collections::BTreeMap;

use presale_types::{Amount, CampaignConfig, ConversionRatio, Currency, PresaleError, Result};

use crate::arith::{mul_div_ceil, mul_div_floor};

/// Fixed conversion ratios for every currency a campaign accepts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversionTable {
    ratios: BTreeMap<Currency, ConversionRatio>,
}

impl ConversionTable {
    /// # Errors
    /// [`PresaleError::InvalidRatio`] if any ratio has a zero term.
    pub fn new(ratios: BTreeMap<Currency, ConversionRatio>) -> Result<Self> {
        for (currency, ratio) in &ratios {
            ratio.validate(*currency)?;
        }
        Ok(Self { ratios })
    }

    /// # Errors
    /// As [`Self::new`].
    pub fn from_config(config: &CampaignConfig) -> Result<Self> {
        Self::new(config.ratios.clone())
    }

    /// # Errors
    /// [`PresaleError::UnsupportedCurrency`] if the currency is not accepted.
    pub fn ratio(&self, currency: Currency) -> Result<ConversionRatio> {
        self.ratios
            .get(&currency)
            .copied()
            .ok_or(PresaleError::UnsupportedCurrency(currency))
    }

    pub fn currencies(&self) -> impl Iterator<Item = Currency> + '_ {
        self.ratios.keys().copied()
    }

    /// Tokens bought by `paid`: `floor(paid * numerator / denominator)`.
    ///
    /// # Errors
    /// - [`PresaleError::UnsupportedCurrency`] for an unknown currency
    /// - [`PresaleError::ZeroOutput`] if truncation leaves nothing
    /// - [`PresaleError::ArithmeticOverflow`] if the result does not fit
    pub fn convert(&self, currency: Currency, paid: Amount) -> Result<Amount> {
        let ratio = self.ratio(currency)?;
        let tokens = mul_div_floor(paid, ratio.numerator, ratio.denominator, "convert")?;
        if tokens == 0 {
            return Err(PresaleError::ZeroOutput { paid });
        }
        Ok(tokens)
    }

    /// Smallest payment that buys at least `tokens`:
    /// `ceil(tokens * denominator / numerator)`.
    ///
    /// # Errors
    /// [`PresaleError::UnsupportedCurrency`] or
    /// [`PresaleError::ArithmeticOverflow`].
    pub fn cost_of(&self, currency: Currency, tokens: Amount) -> Result<Amount> {
        let ratio = self.ratio(currency)?;
        mul_div_ceil(tokens, ratio.denominator, ratio.numerator, "cost_of")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn table() -> ConversionTable {
        let mut ratios = BTreeMap::new();
        ratios.insert(Currency::Stable, ConversionRatio::new(Currency::Stable, 4, 1).unwrap());
        ratios.insert(Currency::Native, ConversionRatio::new(Currency::Native, 125, 2).unwrap());
        ratios.insert(
            Currency::Secondary,
            ConversionRatio::unit_price(Currency::Secondary, 500).unwrap(),
        );
        ConversionTable::new(ratios).unwrap()
    }

    #[test]
    fn four_tokens_per_unit() {
        assert_eq!(table().convert(Currency::Stable, 100).unwrap(), 400);
        assert_eq!(table().convert(Currency::Stable, 2600).unwrap(), 10_400);
    }

    #[test]
    fn conversion_truncates_toward_zero() {
        // 3 * 125 / 2 = 187.5
        assert_eq!(table().convert(Currency::Native, 3).unwrap(), 187);
        // 1499 / 500 = 2.998
        assert_eq!(table().convert(Currency::Secondary, 1499).unwrap(), 2);
    }

    #[test]
    fn zero_output_rejected() {
        assert_eq!(
            table().convert(Currency::Secondary, 499).unwrap_err(),
            PresaleError::ZeroOutput { paid: 499 }
        );
        assert!(table().convert(Currency::Stable, 0).is_err());
    }

    #[test]
    fn unknown_currency_rejected() {
        let mut ratios = BTreeMap::new();
        ratios.insert(Currency::Stable, ConversionRatio::new(Currency::Stable, 1, 1).unwrap());
        let t = ConversionTable::new(ratios).unwrap();
        assert_eq!(
            t.convert(Currency::Native, 10).unwrap_err(),
            PresaleError::UnsupportedCurrency(Currency::Native)
        );
    }

    #[test]
    fn zero_ratio_rejected_at_construction() {
        let mut ratios = BTreeMap::new();
        ratios.insert(
            Currency::Stable,
            ConversionRatio {
                numerator: 1,
                denominator: 0,
            },
        );
        assert!(ConversionTable::new(ratios).is_err());
    }

    #[test]
    fn cost_of_is_count_times_price() {
        assert_eq!(table().cost_of(Currency::Secondary, 3).unwrap(), 1500);
        // 187 tokens at 2/125 each = 2.992, rounded up
        assert_eq!(table().cost_of(Currency::Native, 187).unwrap(), 3);
    }

    #[test]
    fn cost_never_exceeds_payment() {
        let t = table();
        let mut rng = StdRng::seed_from_u64(42);
        for _ in 0..1_000 {
            let paid: u128 = rng.gen_range(1..10_000_000);
            for currency in t.currencies().collect::<Vec<_>>() {
                let Ok(tokens) = t.convert(currency, paid) else {
                    continue;
                };
                let cost = t.cost_of(currency, tokens).unwrap();
                assert!(cost <= paid, "{currency}: cost {cost} > paid {paid}");
                assert_eq!(t.convert(currency, cost).unwrap(), tokens);
            }
        }
    }
}
