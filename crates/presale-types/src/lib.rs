//! # presale-types
//!
//! Shared types, errors, and configuration for the **Presale** ledger.
//!
//! This crate is the leaf dependency of the workspace; every other crate
//! depends on it. It defines:
//!
//! - **Identifiers**: [`AccountId`], [`CampaignId`], [`OrderId`]
//! - **Amounts**: [`Amount`] and [`to_base_units`]
//! - **Currencies**: [`Currency`], [`Asset`], [`ConversionRatio`]
//! - **Payees**: [`Payee`], [`PayeeSet`]
//! - **Campaign model**: [`CampaignConfig`], [`VestingConfig`], [`LockSchedule`], [`ChargeMode`], [`CampaignTotals`]
//! - **Ledger records**: [`Order`], [`DeblockRecord`], [`LedgerEntry`]
//! - **Vesting model**: [`VestingAccount`], [`VestingState`]
//! - **Manifests**: [`CampaignManifest`], [`CurrencyPrice`]
//! - **Errors**: [`PresaleError`] with `PS_ERR_` prefix codes, [`TransferError`]
//! - **Constants**: system-wide limits

pub mod campaign;
pub mod constants;
pub mod currency;
pub mod error;
pub mod ids;
pub mod manifest;
pub mod order;
pub mod payee;
pub mod units;
pub mod vesting;

pub use campaign::*;
pub use currency::*;
pub use error::*;
pub use ids::*;
pub use manifest::*;
pub use order::*;
pub use payee::*;
pub use units::*;
pub use vesting::*;

// Constants are accessed via `presale_types::constants::FOO`
// (not re-exported to avoid name collisions).
