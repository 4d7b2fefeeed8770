//! Append-only order ledger, keyed by caller-supplied order ids.
//!
//! Like a UTXO set: each order id can be spent once. Purchases and claims
//! share one namespace, so a retried request carrying an id that is already
//! on the ledger is rejected with [`PresaleError::DuplicateOrderId`] and has
//! no further effect, whichever account or currency the retry names.
//!
//! Every committed entry is folded into a SHA-256 hash chain. Two replicas
//! that applied the same entries in the same order report the same digest.

use std::collections::HashMap;

use presale_types::{
    AccountId, DeblockRecord, LedgerEntry, Order, OrderId, PresaleError, Result, constants,
};
use sha2::{Digest, Sha256};

/// Position of the ledger that [`OrderLedger::restore`] can return to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LedgerCheckpoint {
    len: usize,
    digest: [u8; 32],
}

/// Append-only record of purchases and deblocks.
#[derive(Debug, Clone, Default)]
pub struct OrderLedger {
    /// Entries in commit order.
    entries: Vec<LedgerEntry>,
    /// Order id → position in `entries`.
    by_id: HashMap<OrderId, usize>,
    /// Account → positions in `entries`, ascending.
    by_account: HashMap<AccountId, Vec<usize>>,
    /// Head of the hash chain.
    digest: [u8; 32],
}

impl OrderLedger {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `entry` if its order id is unused.
    ///
    /// # Errors
    /// [`PresaleError::DuplicateOrderId`] if the id is already recorded.
    pub fn record(&mut self, entry: LedgerEntry) -> Result<()> {
        let order_id = entry.order_id();
        if self.by_id.contains_key(&order_id) {
            return Err(PresaleError::DuplicateOrderId(order_id));
        }

        let position = self.entries.len();
        self.digest = chain(&self.digest, &entry);
        self.by_id.insert(order_id, position);
        self.by_account
            .entry(entry.account())
            .or_default()
            .push(position);
        self.entries.push(entry);
        Ok(())
    }

    #[must_use]
    pub fn contains(&self, order_id: OrderId) -> bool {
        self.by_id.contains_key(&order_id)
    }

    #[must_use]
    pub fn get(&self, order_id: OrderId) -> Option<&LedgerEntry> {
        self.by_id.get(&order_id).map(|&i| &self.entries[i])
    }

    /// Every entry of `account`, in commit order.
    pub fn entries_for(&self, account: AccountId) -> impl Iterator<Item = &LedgerEntry> + '_ {
        self.by_account
            .get(&account)
            .into_iter()
            .flatten()
            .map(|&i| &self.entries[i])
    }

    /// Purchases of `account`, in commit order.
    pub fn orders_for(&self, account: AccountId) -> impl Iterator<Item = &Order> + '_ {
        self.entries_for(account).filter_map(LedgerEntry::as_purchase)
    }

    /// Deblocks of `account`, in commit order.
    pub fn deblocks_for(&self, account: AccountId) -> impl Iterator<Item = &DeblockRecord> + '_ {
        self.entries_for(account).filter_map(LedgerEntry::as_deblock)
    }

    /// The `index`-th purchase of `account`.
    #[must_use]
    pub fn order_at(&self, account: AccountId, index: usize) -> Option<&Order> {
        self.orders_for(account).nth(index)
    }

    /// All entries in commit order.
    pub fn iter(&self) -> impl Iterator<Item = &LedgerEntry> + '_ {
        self.entries.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn digest(&self) -> [u8; 32] {
        self.digest
    }

    #[must_use]
    pub fn digest_hex(&self) -> String {
        hex::encode(self.digest)
    }

    /// Recompute the chain from the entries and compare with the head.
    #[must_use]
    pub fn verify_digest(&self) -> bool {
        let recomputed = self
            .entries
            .iter()
            .fold([0u8; 32], |head, entry| chain(&head, entry));
        recomputed == self.digest
    }

    #[must_use]
    pub fn checkpoint(&self) -> LedgerCheckpoint {
        LedgerCheckpoint {
            len: self.entries.len(),
            digest: self.digest,
        }
    }

    /// Drop every entry recorded after `checkpoint`.
    pub fn restore(&mut self, checkpoint: LedgerCheckpoint) {
        while self.entries.len() > checkpoint.len {
            let Some(entry) = self.entries.pop() else {
                break;
            };
            self.by_id.remove(&entry.order_id());
            let account = entry.account();
            if let Some(positions) = self.by_account.get_mut(&account) {
                positions.pop();
                if positions.is_empty() {
                    self.by_account.remove(&account);
                }
            }
        }
        self.digest = checkpoint.digest;
    }
}

fn chain(head: &[u8; 32], entry: &LedgerEntry) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(constants::LEDGER_DIGEST_DOMAIN);
    hasher.update(head);
    hasher.update(entry.canonical_bytes());
    let result = hasher.finalize();
    let mut out = [0u8; 32];
    out.copy_from_slice(&result);
    out
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};
    use presale_types::Currency;

    use super::*;

    fn acct(n: u128) -> AccountId {
        AccountId::from_u128(n)
    }

    fn purchase(id: u64, buyer: AccountId, credited: u128) -> LedgerEntry {
        LedgerEntry::Purchase(Order {
            order_id: OrderId(id),
            buyer,
            currency: Currency::Stable,
            paid_amount: credited / 4,
            credited_amount: credited,
            locked_amount: 0,
            timestamp: Utc.with_ymd_and_hms(2025, 6, 1, 0, 0, 0).unwrap(),
        })
    }

    fn deblock(id: u64, buyer: AccountId, amount: u128) -> LedgerEntry {
        LedgerEntry::Deblock(DeblockRecord {
            order_id: OrderId(id),
            buyer,
            amount,
            timestamp: Utc.with_ymd_and_hms(2026, 6, 1, 0, 0, 0).unwrap(),
            schedule_version: 0,
        })
    }

    #[test]
    fn record_and_get() {
        let mut ledger = OrderLedger::new();
        ledger.record(purchase(1, acct(1), 400)).unwrap();
        assert!(ledger.contains(OrderId(1)));
        assert_eq!(ledger.get(OrderId(1)).unwrap().account(), acct(1));
        assert!(ledger.get(OrderId(2)).is_none());
        assert_eq!(ledger.len(), 1);
    }

    #[test]
    fn duplicate_blocked_across_accounts_and_kinds() {
        let mut ledger = OrderLedger::new();
        ledger.record(purchase(7, acct(1), 400)).unwrap();
        let digest = ledger.digest();

        let err = ledger.record(purchase(7, acct(2), 8)).unwrap_err();
        assert!(
            matches!(err, PresaleError::DuplicateOrderId(id) if id == OrderId(7)),
            "Expected DuplicateOrderId, got: {err:?}"
        );
        assert!(ledger.record(deblock(7, acct(1), 1)).is_err());
        assert_eq!(ledger.len(), 1);
        assert_eq!(ledger.digest(), digest);
    }

    #[test]
    fn per_account_enumeration_in_order() {
        let mut ledger = OrderLedger::new();
        ledger.record(purchase(10, acct(1), 4)).unwrap();
        ledger.record(purchase(11, acct(2), 8)).unwrap();
        ledger.record(deblock(12, acct(1), 1)).unwrap();
        ledger.record(purchase(13, acct(1), 12)).unwrap();

        let ids: Vec<_> = ledger.entries_for(acct(1)).map(LedgerEntry::order_id).collect();
        assert_eq!(ids, vec![OrderId(10), OrderId(12), OrderId(13)]);
        assert_eq!(ledger.orders_for(acct(1)).count(), 2);
        assert_eq!(ledger.deblocks_for(acct(1)).count(), 1);
        assert_eq!(ledger.order_at(acct(1), 1).unwrap().order_id, OrderId(13));
        assert!(ledger.order_at(acct(1), 2).is_none());
        assert_eq!(ledger.entries_for(acct(3)).count(), 0);

        // Restartable: a second pass sees the same sequence.
        let again: Vec<_> = ledger.entries_for(acct(1)).map(LedgerEntry::order_id).collect();
        assert_eq!(ids, again);
    }

    #[test]
    fn restore_rewinds_everything() {
        let mut ledger = OrderLedger::new();
        ledger.record(purchase(1, acct(1), 4)).unwrap();
        let cp = ledger.checkpoint();

        ledger.record(purchase(2, acct(1), 4)).unwrap();
        ledger.record(purchase(3, acct(2), 4)).unwrap();
        ledger.restore(cp);

        assert_eq!(ledger.len(), 1);
        assert!(!ledger.contains(OrderId(2)));
        assert!(!ledger.contains(OrderId(3)));
        assert_eq!(ledger.entries_for(acct(1)).count(), 1);
        assert_eq!(ledger.entries_for(acct(2)).count(), 0);
        assert_eq!(ledger.checkpoint(), cp);
        assert!(ledger.verify_digest());

        // The rewound ids are free again.
        ledger.record(purchase(2, acct(1), 4)).unwrap();
    }

    #[test]
    fn digest_is_deterministic_and_order_sensitive() {
        let mut a = OrderLedger::new();
        let mut b = OrderLedger::new();
        for ledger in [&mut a, &mut b] {
            ledger.record(purchase(1, acct(1), 4)).unwrap();
            ledger.record(purchase(2, acct(2), 8)).unwrap();
        }
        assert_eq!(a.digest_hex(), b.digest_hex());
        assert_eq!(a.digest_hex().len(), 64);
        assert!(a.verify_digest());

        let mut c = OrderLedger::new();
        c.record(purchase(2, acct(2), 8)).unwrap();
        c.record(purchase(1, acct(1), 4)).unwrap();
        assert_ne!(a.digest(), c.digest());
    }
}
