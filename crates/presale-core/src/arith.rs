//! Overflow-aware integer scaling.
//!
//! Every floor and ceiling in the ledger goes through here. Products are
//! decomposed as `a * b / d = (a / d) * b + (a % d) * b / d`, which is exact
//! and keeps intermediates as small as the result allows.

use presale_types::{Amount, PresaleError, Result};

/// `floor(a * b / d)`.
///
/// # Errors
/// [`PresaleError::ArithmeticOverflow`] if the result or an intermediate
/// does not fit, or if `d` is zero.
pub fn mul_div_floor(a: Amount, b: Amount, d: Amount, context: &'static str) -> Result<Amount> {
    let (whole, rem) = parts(a, b, d, context)?;
    whole
        .checked_add(rem / d)
        .ok_or(PresaleError::ArithmeticOverflow { context })
}

/// `ceil(a * b / d)`.
///
/// # Errors
/// As [`mul_div_floor`].
pub fn mul_div_ceil(a: Amount, b: Amount, d: Amount, context: &'static str) -> Result<Amount> {
    let (whole, rem) = parts(a, b, d, context)?;
    whole
        .checked_add(rem.div_ceil(d))
        .ok_or(PresaleError::ArithmeticOverflow { context })
}

fn parts(a: Amount, b: Amount, d: Amount, context: &'static str) -> Result<(Amount, Amount)> {
    if d == 0 {
        return Err(PresaleError::ArithmeticOverflow { context });
    }
    let overflow = || PresaleError::ArithmeticOverflow { context };
    let whole = (a / d).checked_mul(b).ok_or_else(overflow)?;
    let rem = (a % d).checked_mul(b).ok_or_else(overflow)?;
    Ok((whole, rem))
}

/// `floor(amount * part / whole)` for `part <= whole`. Never overflows.
///
/// `whole == 0` yields 0.
#[must_use]
pub fn scale_floor(amount: Amount, part: u32, whole: u32) -> Amount {
    if whole == 0 {
        return 0;
    }
    let part = Amount::from(part.min(whole));
    let whole = Amount::from(whole);
    // (amount % whole) < 2^32 and part <= 2^32, so the product fits.
    (amount / whole) * part + (amount % whole) * part / whole
}
