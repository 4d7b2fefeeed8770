//! Ledger records: purchase orders and vesting claims (deblocks).
//!
//! Both kinds are created once, keyed by a caller-supplied [`OrderId`],
//! and never mutated afterwards.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{AccountId, Amount, Currency, OrderId};

/// A committed purchase.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub order_id: OrderId,
    pub buyer: AccountId,
    pub currency: Currency,
    /// Payment actually collected and split among the payees.
    pub paid_amount: Amount,
    /// Tokens credited for this purchase (immediate + locked).
    pub credited_amount: Amount,
    /// Portion of `credited_amount` registered with the vesting engine.
    pub locked_amount: Amount,
    pub timestamp: DateTime<Utc>,
}

impl Order {
    /// Portion of `credited_amount` transferred at purchase time.
    #[must_use]
    pub fn released_amount(&self) -> Amount {
        self.credited_amount - self.locked_amount
    }
}

/// A committed vesting claim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeblockRecord {
    pub order_id: OrderId,
    pub buyer: AccountId,
    pub amount: Amount,
    pub timestamp: DateTime<Utc>,
    /// Lock schedule version the claim was computed against.
    pub schedule_version: u64,
}

/// Discriminant of a [`LedgerEntry`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntryKind {
    Purchase,
    Deblock,
}

impl std::fmt::Display for EntryKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Purchase => write!(f, "PURCHASE"),
            Self::Deblock => write!(f, "DEBLOCK"),
        }
    }
}

/// One entry of the append-only order ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum LedgerEntry {
    Purchase(Order),
    Deblock(DeblockRecord),
}

impl LedgerEntry {
    #[must_use]
    pub fn order_id(&self) -> OrderId {
        match self {
            Self::Purchase(o) => o.order_id,
            Self::Deblock(d) => d.order_id,
        }
    }

    #[must_use]
    pub fn account(&self) -> AccountId {
        match self {
            Self::Purchase(o) => o.buyer,
            Self::Deblock(d) => d.buyer,
        }
    }

    #[must_use]
    pub fn timestamp(&self) -> DateTime<Utc> {
        match self {
            Self::Purchase(o) => o.timestamp,
            Self::Deblock(d) => d.timestamp,
        }
    }

    #[must_use]
    pub fn kind(&self) -> EntryKind {
        match self {
            Self::Purchase(_) => EntryKind::Purchase,
            Self::Deblock(_) => EntryKind::Deblock,
        }
    }

    #[must_use]
    pub fn as_purchase(&self) -> Option<&Order> {
        match self {
            Self::Purchase(o) => Some(o),
            Self::Deblock(_) => None,
        }
    }

    #[must_use]
    pub fn as_deblock(&self) -> Option<&DeblockRecord> {
        match self {
            Self::Deblock(d) => Some(d),
            Self::Purchase(_) => None,
        }
    }

    /// Canonical byte encoding fed into the ledger hash chain.
    ///
    /// Format: `kind || order_id || account || amounts... || timestamp_secs`,
    /// integers little-endian.
    #[must_use]
    pub fn canonical_bytes(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(96);
        match self {
            Self::Purchase(o) => {
                buf.push(b'P');
                buf.extend_from_slice(&o.order_id.0.to_le_bytes());
                buf.extend_from_slice(o.buyer.as_bytes());
                buf.push(match o.currency {
                    Currency::Native => 0,
                    Currency::Stable => 1,
                    Currency::Secondary => 2,
                });
                buf.extend_from_slice(&o.paid_amount.to_le_bytes());
                buf.extend_from_slice(&o.credited_amount.to_le_bytes());
                buf.extend_from_slice(&o.locked_amount.to_le_bytes());
                buf.extend_from_slice(&o.timestamp.timestamp().to_le_bytes());
            }
            Self::Deblock(d) => {
                buf.push(b'D');
                buf.extend_from_slice(&d.order_id.0.to_le_bytes());
                buf.extend_from_slice(d.buyer.as_bytes());
                buf.extend_from_slice(&d.amount.to_le_bytes());
                buf.extend_from_slice(&d.timestamp.timestamp().to_le_bytes());
                buf.extend_from_slice(&d.schedule_version.to_le_bytes());
            }
        }
        buf
    }
}
