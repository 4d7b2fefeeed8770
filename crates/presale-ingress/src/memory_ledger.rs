//! In-memory [`AssetLedger`].
//!
//! Tracks per-(asset, account) balances and per-(asset, owner, spender)
//! allowances. Every mutation, single transfer or whole batch, is staged
//! first and committed only if every leg succeeds.
//!
//! Native-currency payments travel with the call on the host chain, so
//! pulls of [`Currency::Native`] need no allowance.

use std::collections::{HashMap, HashSet};

use presale_types::{AccountId, Amount, Asset, Currency, TransferError};

use crate::ledger::{AssetLedger, SettlementBatch, TransferLeg};

type BalanceKey = (Asset, AccountId);
type AllowanceKey = (Asset, AccountId, AccountId);

/// Balances and allowances held in hash maps.
#[derive(Debug, Clone, Default)]
pub struct MemoryLedger {
    balances: HashMap<BalanceKey, Amount>,
    allowances: HashMap<AllowanceKey, Amount>,
    /// Accounts whose transfers are refused (blacklists, paused tokens).
    blocked: HashSet<AccountId>,
}

/// Pending writes of one settlement.
#[derive(Default)]
struct Staging {
    balances: HashMap<BalanceKey, Amount>,
    allowances: HashMap<AllowanceKey, Amount>,
}

impl MemoryLedger {
    /// Create a new empty ledger.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create `amount` out of thin air in `account`.
    pub fn mint(&mut self, asset: impl Into<Asset>, account: AccountId, amount: Amount) {
        let entry = self.balances.entry((asset.into(), account)).or_default();
        *entry = entry.saturating_add(amount);
    }

    /// Set `spender`'s allowance over `owner`'s funds.
    pub fn approve(
        &mut self,
        asset: impl Into<Asset>,
        owner: AccountId,
        spender: AccountId,
        amount: Amount,
    ) {
        self.allowances.insert((asset.into(), owner, spender), amount);
    }

    /// Refuse every transfer touching `account` until [`Self::unblock`].
    pub fn block(&mut self, account: AccountId) {
        self.blocked.insert(account);
    }

    pub fn unblock(&mut self, account: AccountId) {
        self.blocked.remove(&account);
    }

    /// Sum of all balances of an asset.
    #[must_use]
    pub fn total_supply(&self, asset: impl Into<Asset>) -> Amount {
        let asset = asset.into();
        self.balances
            .iter()
            .filter(|((a, _), _)| *a == asset)
            .fold(0, |acc: Amount, (_, v)| acc.saturating_add(*v))
    }

    fn needs_allowance(asset: Asset) -> bool {
        asset != Asset::Currency(Currency::Native)
    }

    fn staged_balance(&self, staging: &Staging, key: BalanceKey) -> Amount {
        staging
            .balances
            .get(&key)
            .or_else(|| self.balances.get(&key))
            .copied()
            .unwrap_or(0)
    }

    fn staged_allowance(&self, staging: &Staging, key: AllowanceKey) -> Amount {
        staging
            .allowances
            .get(&key)
            .or_else(|| self.allowances.get(&key))
            .copied()
            .unwrap_or(0)
    }

    fn stage(&self, staging: &mut Staging, leg: &TransferLeg) -> Result<(), TransferError> {
        let asset = leg.asset();
        let (from, to, amount) = (leg.from(), leg.to(), leg.amount());

        for account in [from, to] {
            if self.blocked.contains(&account) {
                return Err(TransferError::Rejected(format!(
                    "{asset} transfers blocked for {account}"
                )));
            }
        }

        if let TransferLeg::Pull { spender, .. } = *leg {
            if Self::needs_allowance(asset) {
                let key = (asset, from, spender);
                let approved = self.staged_allowance(staging, key);
                if approved < amount {
                    return Err(TransferError::InsufficientAllowance {
                        asset,
                        needed: amount,
                        approved,
                    });
                }
                staging.allowances.insert(key, approved - amount);
            }
        }

        let available = self.staged_balance(staging, (asset, from));
        if available < amount {
            return Err(TransferError::InsufficientBalance {
                asset,
                needed: amount,
                available,
            });
        }
        staging.balances.insert((asset, from), available - amount);

        let credited = self
            .staged_balance(staging, (asset, to))
            .checked_add(amount)
            .ok_or_else(|| TransferError::Rejected(format!("{asset} balance of {to} overflows")))?;
        staging.balances.insert((asset, to), credited);
        Ok(())
    }

    fn commit(&mut self, staging: Staging) {
        self.balances.extend(staging.balances);
        self.allowances.extend(staging.allowances);
    }
}

impl AssetLedger for MemoryLedger {
    fn balance_of(&self, asset: Asset, account: AccountId) -> Amount {
        self.balances.get(&(asset, account)).copied().unwrap_or(0)
    }

    fn allowance(&self, asset: Asset, owner: AccountId, spender: AccountId) -> Amount {
        if !Self::needs_allowance(asset) {
            return Amount::MAX;
        }
        self.allowances
            .get(&(asset, owner, spender))
            .copied()
            .unwrap_or(0)
    }

    fn transfer(
        &mut self,
        asset: Asset,
        from: AccountId,
        to: AccountId,
        amount: Amount,
    ) -> Result<(), TransferError> {
        let mut staging = Staging::default();
        self.stage(
            &mut staging,
            &TransferLeg::Push {
                asset,
                from,
                to,
                amount,
            },
        )?;
        self.commit(staging);
        Ok(())
    }

    fn transfer_from(
        &mut self,
        asset: Asset,
        spender: AccountId,
        from: AccountId,
        to: AccountId,
        amount: Amount,
    ) -> Result<(), TransferError> {
        let mut staging = Staging::default();
        self.stage(
            &mut staging,
            &TransferLeg::Pull {
                asset,
                spender,
                from,
                to,
                amount,
            },
        )?;
        self.commit(staging);
        Ok(())
    }

    fn settle(&mut self, batch: &SettlementBatch) -> Result<(), TransferError> {
        let mut staging = Staging::default();
        for leg in batch.legs() {
            self.stage(&mut staging, leg)?;
        }
        self.commit(staging);
        tracing::debug!(legs = batch.len(), "Settlement batch applied");
        Ok(())
    }
}
