//! # presale-ingress
//!
//! **Gatekeeping plane**: purchase limits and the asset ledger the sale
//! settles against.
//!
//! ## Architecture
//!
//! 1. **LimitPolicy**: hard gate, validates a converted purchase against
//!    the window and the per-transaction, per-account, and supply caps
//! 2. **AssetLedger**: the external balance capability (`balance_of`,
//!    `transfer`, `transfer_from`, and an all-or-nothing `settle`)
//! 3. **MemoryLedger**: in-memory `AssetLedger` for hosts and tests
//!
//! ## Purchase Flow
//!
//! ```text
//! ConversionTable.convert() → LimitPolicy.validate() → Campaign commit
//!     → AssetLedger.settle(batch)
//! ```

pub mod ledger;
pub mod limit_policy;
pub mod memory_ledger;

pub use ledger::{AssetLedger, SettlementBatch, TransferLeg};
pub use limit_policy::{LimitPolicy, PolicySnapshot};
pub use memory_ledger::MemoryLedger;
