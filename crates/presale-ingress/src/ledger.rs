//! The asset-ledger capability the sale settles against.
//!
//! Currency and token balances live outside the presale engine. The engine
//! only needs the ERC-20-style surface below, plus [`AssetLedger::settle`]:
//! a batch of transfer legs applied all-or-nothing, the way a host
//! transaction reverts as a whole when any transfer in it fails.

use presale_types::{AccountId, Amount, Asset, TransferError};

/// One transfer inside a [`SettlementBatch`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferLeg {
    /// `transfer_from`: `spender` moves `from`'s funds under an allowance.
    Pull {
        asset: Asset,
        spender: AccountId,
        from: AccountId,
        to: AccountId,
        amount: Amount,
    },
    /// `transfer`: `from` moves its own funds.
    Push {
        asset: Asset,
        from: AccountId,
        to: AccountId,
        amount: Amount,
    },
}

impl TransferLeg {
    #[must_use]
    pub fn asset(&self) -> Asset {
        match self {
            Self::Pull { asset, .. } | Self::Push { asset, .. } => *asset,
        }
    }

    #[must_use]
    pub fn from(&self) -> AccountId {
        match self {
            Self::Pull { from, .. } | Self::Push { from, .. } => *from,
        }
    }

    #[must_use]
    pub fn to(&self) -> AccountId {
        match self {
            Self::Pull { to, .. } | Self::Push { to, .. } => *to,
        }
    }

    #[must_use]
    pub fn amount(&self) -> Amount {
        match self {
            Self::Pull { amount, .. } | Self::Push { amount, .. } => *amount,
        }
    }
}

/// Ordered transfer legs that succeed or fail together.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SettlementBatch {
    legs: Vec<TransferLeg>,
}

impl SettlementBatch {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a leg. Zero-amount legs are dropped.
    pub fn push(&mut self, leg: TransferLeg) {
        if leg.amount() > 0 {
            self.legs.push(leg);
        }
    }

    #[must_use]
    pub fn legs(&self) -> &[TransferLeg] {
        &self.legs
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.legs.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.legs.is_empty()
    }

    /// Sum of all legs leaving `from` in `asset`.
    #[must_use]
    pub fn outflow(&self, asset: Asset, from: AccountId) -> Amount {
        self.legs
            .iter()
            .filter(|l| l.asset() == asset && l.from() == from)
            .fold(0, |acc: Amount, l| acc.saturating_add(l.amount()))
    }
}

/// Fungible balances of every [`Asset`] the sale touches.
///
/// Implementations may call back into arbitrary code from `settle`
/// (token hooks, contract receivers); the engine commits its own state
/// first and guards against re-entry.
pub trait AssetLedger {
    fn balance_of(&self, asset: Asset, account: AccountId) -> Amount;

    fn allowance(&self, asset: Asset, owner: AccountId, spender: AccountId) -> Amount;

    /// Move `amount` of `from`'s own funds to `to`.
    ///
    /// # Errors
    /// `InsufficientBalance`, or `Rejected` for ledger-specific refusals.
    fn transfer(
        &mut self,
        asset: Asset,
        from: AccountId,
        to: AccountId,
        amount: Amount,
    ) -> Result<(), TransferError>;

    /// Move `amount` from `from` to `to` on `spender`'s allowance.
    ///
    /// # Errors
    /// `InsufficientAllowance`, `InsufficientBalance`, or `Rejected`.
    fn transfer_from(
        &mut self,
        asset: Asset,
        spender: AccountId,
        from: AccountId,
        to: AccountId,
        amount: Amount,
    ) -> Result<(), TransferError>;

    /// Apply every leg of `batch`, or none of them.
    ///
    /// # Errors
    /// The first leg that cannot be applied; the ledger is then unchanged.
    fn settle(&mut self, batch: &SettlementBatch) -> Result<(), TransferError>;
}
