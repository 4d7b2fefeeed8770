//! # presale-settlement
//!
//! **Finality plane**: the only place sale state changes.
//!
//! ## Architecture
//!
//! A [`Campaign`] receives purchase and claim requests and:
//! 1. Rejects reused order ids (the [`OrderLedger`] is the idempotency key set)
//! 2. Prices and validates the request (`presale-core`, `presale-ingress`)
//! 3. Commits the order record, running totals, and locked balances
//! 4. Settles payee shares and token credits through one atomic
//!    [`AssetLedger::settle`](presale_ingress::AssetLedger::settle) call
//! 5. Restores its checkpoint if that call fails
//!
//! [`SharedCampaign`] serializes calls across threads and rejects
//! re-entry from ledger callbacks. [`Campaign::verify_conservation`]
//! recomputes every total from the ledger.

pub mod campaign;
pub mod claim;
pub mod conservation;
pub mod order_ledger;
pub mod purchase;
pub mod shared;
pub mod vesting;

pub use campaign::Campaign;
pub use claim::ClaimRequest;
pub use conservation::ConservationReport;
pub use order_ledger::{LedgerCheckpoint, OrderLedger};
pub use purchase::PurchaseRequest;
pub use shared::SharedCampaign;
pub use vesting::VestingEngine;
