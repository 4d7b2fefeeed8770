//! Base-unit amounts and conversion from human-readable decimals.
//!
//! The ledger only ever sees integers in an asset's smallest unit. Human
//! amounts ("0.016 USDT") appear in configuration and are scaled by the
//! asset's `decimals`, the same way `toWei` scales ether.

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;

use crate::{PresaleError, Result, constants};

/// Amount in an asset's smallest indivisible unit.
pub type Amount = u128;

/// Scale a human amount to base units: `amount * 10^decimals`.
///
/// # Errors
/// Returns [`PresaleError::InvalidConfig`] if the amount is negative, does
/// not fit, or still has a fractional part after scaling.
pub fn to_base_units(amount: Decimal, decimals: u32) -> Result<Amount> {
    if decimals > constants::MAX_DECIMALS {
        return Err(PresaleError::InvalidConfig {
            reason: format!("decimals {decimals} exceeds {}", constants::MAX_DECIMALS),
        });
    }
    if amount.is_sign_negative() {
        return Err(PresaleError::InvalidConfig {
            reason: format!("amount {amount} is negative"),
        });
    }
    let factor = Decimal::from_i128_with_scale(10_i128.pow(decimals), 0);
    let scaled = amount
        .checked_mul(factor)
        .ok_or_else(|| PresaleError::InvalidConfig {
            reason: format!("amount {amount} with {decimals} decimals overflows"),
        })?;
    if !scaled.fract().is_zero() {
        return Err(PresaleError::InvalidConfig {
            reason: format!("amount {amount} is finer than {decimals} decimals"),
        });
    }
    scaled.to_u128().ok_or_else(|| PresaleError::InvalidConfig {
        reason: format!("amount {amount} does not fit in base units"),
    })
}
