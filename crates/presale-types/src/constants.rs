//! System-wide constants for the presale ledger.

/// Payee percentages and the release ratio are expressed against this.
pub const PERCENT_TOTAL: u32 = 100;

/// Maximum number of payees a payment may be split across.
pub const MAX_PAYEES: usize = 32;

/// Maximum number of vesting tranches.
pub const MAX_TRANCHE_COUNT: u32 = 10_000;

/// Maximum asset decimals accepted when scaling human amounts.
pub const MAX_DECIMALS: u32 = 28;

/// Upper bound on a lock duration (100 years of seconds).
pub const MAX_LOCK_DURATION_SECS: u64 = 3_153_600_000;

/// Domain separator prefixed to the order-ledger hash chain.
pub const LEDGER_DIGEST_DOMAIN: &[u8] = b"presale:ledger:v1:";

/// Version string.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Engine name.
pub const ENGINE_NAME: &str = "Presale";
