//! # presale-core
//!
//! **Pure presale arithmetic.**
//!
//! The compute plane of the ledger: given configuration and amounts it
//! answers how many tokens a payment buys, how a payment divides among the
//! payees, and how much of a locked balance has vested. It has:
//!
//! - **Zero side effects**: no balances, no order records, no transfers
//! - **Exact integer math**: every floor is integer division, every product is checked
//! - **Lossless splits**: payee shares always sum to the payment
//! - **Dust-free vesting**: the final tranche always releases the full locked total

pub mod arith;
pub mod conversion;
pub mod schedule;
pub mod splitter;

pub use arith::{mul_div_ceil, mul_div_floor, scale_floor};
pub use conversion::ConversionTable;
pub use schedule::{claimable, elapsed_tranches, entitled, next_unlock_at, split_release, state};
pub use splitter::{PaymentSplitter, Share, split};
