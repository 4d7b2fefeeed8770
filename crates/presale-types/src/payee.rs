//! Payment beneficiaries and their percentage shares.

use serde::{Deserialize, Serialize};

use crate::{AccountId, PresaleError, Result, constants};

/// One beneficiary of every incoming payment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Payee {
    pub account: AccountId,
    /// Whole percent of each payment, `0..=100`.
    pub percentage: u32,
}

impl Payee {
    #[must_use]
    pub fn new(account: AccountId, percentage: u32) -> Self {
        Self {
            account,
            percentage,
        }
    }
}

/// Ordered, validated list of payees whose percentages sum to exactly 100.
///
/// Order matters: the last payee absorbs the rounding remainder of a split.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Payee>", into = "Vec<Payee>")]
pub struct PayeeSet(Vec<Payee>);

impl PayeeSet {
    /// # Errors
    /// Returns [`PresaleError::InvalidPayees`] if the list is empty, longer
    /// than [`constants::MAX_PAYEES`], or its percentages do not sum to 100.
    pub fn new(payees: Vec<Payee>) -> Result<Self> {
        if payees.is_empty() {
            return Err(PresaleError::InvalidPayees {
                reason: "at least one payee is required".to_string(),
            });
        }
        if payees.len() > constants::MAX_PAYEES {
            return Err(PresaleError::InvalidPayees {
                reason: format!(
                    "{} payees exceeds maximum {}",
                    payees.len(),
                    constants::MAX_PAYEES
                ),
            });
        }
        let total: u64 = payees.iter().map(|p| u64::from(p.percentage)).sum();
        if total != u64::from(constants::PERCENT_TOTAL) {
            return Err(PresaleError::InvalidPayees {
                reason: format!(
                    "percentages sum to {total}, expected {}",
                    constants::PERCENT_TOTAL
                ),
            });
        }
        Ok(Self(payees))
    }

    /// A single payee receiving everything.
    #[must_use]
    pub fn single(account: AccountId) -> Self {
        Self(vec![Payee::new(account, constants::PERCENT_TOTAL)])
    }

    #[must_use]
    pub fn as_slice(&self) -> &[Payee] {
        &self.0
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Always `false` for a validated set; present for API symmetry.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Payee> {
        self.0.iter()
    }
}

impl TryFrom<Vec<Payee>> for PayeeSet {
    type Error = PresaleError;

    fn try_from(payees: Vec<Payee>) -> Result<Self> {
        Self::new(payees)
    }
}

impl From<PayeeSet> for Vec<Payee> {
    fn from(set: PayeeSet) -> Self {
        set.0
    }
}
