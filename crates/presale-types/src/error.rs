//! Error types for the presale ledger.
//!
//! All errors use the `PS_ERR_` prefix convention for easy grepping in logs.
//! Error codes are grouped by subsystem:
//! - 1xx: Configuration / validation errors
//! - 2xx: Sale policy errors
//! - 3xx: Order ledger errors
//! - 4xx: Payment errors
//! - 5xx: Vesting errors
//! - 6xx: Security / admin errors
//! - 9xx: General / internal errors

use thiserror::Error;

use crate::{Amount, Asset, Currency, OrderId};

/// Central error enum for all presale operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PresaleError {
    // =================================================================
    // Configuration Errors (1xx)
    // =================================================================
    /// A campaign parameter is missing or inconsistent.
    #[error("PS_ERR_100: Invalid campaign config: {reason}")]
    InvalidConfig { reason: String },

    /// Payee list is empty, too long, or does not sum to 100%.
    #[error("PS_ERR_101: Invalid payees: {reason}")]
    InvalidPayees { reason: String },

    /// A conversion ratio has a zero numerator or denominator.
    #[error("PS_ERR_102: Invalid conversion ratio for {0}")]
    InvalidRatio(Currency),

    // =================================================================
    // Policy Errors (2xx)
    // =================================================================
    /// The admin has paused the sale.
    #[error("PS_ERR_200: Sale is paused")]
    SalePaused,

    /// `now` lies outside the campaign's active window.
    #[error("PS_ERR_201: Sale closed: now={now}, window=[{begin}, {end}]")]
    SaleClosed { now: i64, begin: i64, end: i64 },

    /// The converted token amount is outside the per-transaction bounds.
    #[error("PS_ERR_202: Amount {amount} out of range [{min}, {max}]")]
    AmountOutOfRange { amount: Amount, min: Amount, max: Amount },

    /// The purchase would push the account past its cumulative cap.
    #[error("PS_ERR_203: Account limit exceeded: requested {requested}, remaining {remaining}")]
    AccountLimitExceeded { requested: Amount, remaining: Amount },

    /// The purchase would push the campaign past its presale cap.
    #[error("PS_ERR_204: Supply exhausted: requested {requested}, remaining {remaining}")]
    SupplyExhausted { requested: Amount, remaining: Amount },

    /// The campaign has no conversion ratio for this currency.
    #[error("PS_ERR_205: Currency not accepted: {0}")]
    UnsupportedCurrency(Currency),

    /// The payment converts to zero tokens after truncation.
    #[error("PS_ERR_206: Payment of {paid} converts to zero tokens")]
    ZeroOutput { paid: Amount },

    // =================================================================
    // Ledger Errors (3xx)
    // =================================================================
    /// An entry with this order id already exists on the ledger.
    #[error("PS_ERR_300: Duplicate order id: {0}")]
    DuplicateOrderId(OrderId),

    /// No ledger entry with this order id.
    #[error("PS_ERR_301: Order not found: {0}")]
    OrderNotFound(OrderId),

    // =================================================================
    // Payment Errors (4xx)
    // =================================================================
    /// The paying account does not hold enough of the asset.
    #[error("PS_ERR_400: Insufficient {asset} balance: need {needed}, have {available}")]
    InsufficientBalance {
        asset: Asset,
        needed: Amount,
        available: Amount,
    },

    /// The paying account has not approved the sale to pull enough.
    #[error("PS_ERR_401: Insufficient {asset} allowance: need {needed}, approved {approved}")]
    InsufficientAllowance {
        asset: Asset,
        needed: Amount,
        approved: Amount,
    },

    /// The asset ledger refused the transfer for its own reasons.
    #[error("PS_ERR_402: Transfer rejected: {reason}")]
    TransferRejected { reason: String },

    // =================================================================
    // Vesting Errors (5xx)
    // =================================================================
    /// The claim exceeds what has unlocked so far.
    #[error("PS_ERR_500: Insufficient claimable: requested {requested}, claimable {claimable}")]
    InsufficientClaimable { requested: Amount, claimable: Amount },

    /// Claims and lock administration on a campaign without vesting.
    #[error("PS_ERR_501: Campaign has no vesting schedule")]
    VestingDisabled,

    /// A claim for zero tokens.
    #[error("PS_ERR_502: Claim amount must be positive")]
    ZeroClaim,

    // =================================================================
    // Security Errors (6xx)
    // =================================================================
    /// Admin-only operation invoked by another account.
    #[error("PS_ERR_600: Caller is not the campaign admin")]
    Unauthorized,

    /// A call re-entered the campaign while another operation was in flight.
    #[error("PS_ERR_601: Reentrant call rejected")]
    ReentrantCall,

    /// Sale totals disagree with the per-account records. Critical.
    #[error("PS_ERR_602: Conservation violation: {reason}")]
    ConservationViolation { reason: String },

    /// An intermediate product does not fit in the amount type.
    #[error("PS_ERR_603: Arithmetic overflow in {context}")]
    ArithmeticOverflow { context: &'static str },

    // =================================================================
    // General / Internal (9xx)
    // =================================================================
    /// Unrecoverable internal error.
    #[error("PS_ERR_900: Internal error: {0}")]
    Internal(String),

    /// Serialization / deserialization error.
    #[error("PS_ERR_901: Serialization error: {0}")]
    Serialization(String),

    /// Configuration file could not be interpreted.
    #[error("PS_ERR_902: Configuration error: {0}")]
    Configuration(String),

    /// I/O error (reading a manifest, etc.).
    #[error("PS_ERR_903: I/O error: {0}")]
    Io(String),
}

/// Coarse classification of [`PresaleError`] used by callers to decide
/// whether and how to retry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// Bad configuration at construction. Fatal for setup.
    Validation,
    /// Sale rules rejected the request. Retry with another amount or time.
    Policy,
    /// The order id is taken. Retry with a fresh id; nothing happened.
    DuplicateOrderId,
    /// The buyer's funds or approvals are short. Nothing happened.
    Payment,
    /// The claim is larger than what has unlocked.
    Claim,
    /// Authorization, reentrancy, or invariant failures.
    Security,
    /// Everything else.
    Internal,
}

impl PresaleError {
    /// Map the error onto its recovery class.
    #[must_use]
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::InvalidConfig { .. } | Self::InvalidPayees { .. } | Self::InvalidRatio(_) => {
                ErrorCategory::Validation
            }
            Self::SalePaused
            | Self::SaleClosed { .. }
            | Self::AmountOutOfRange { .. }
            | Self::AccountLimitExceeded { .. }
            | Self::SupplyExhausted { .. }
            | Self::UnsupportedCurrency(_)
            | Self::ZeroOutput { .. } => ErrorCategory::Policy,
            Self::DuplicateOrderId(_) => ErrorCategory::DuplicateOrderId,
            Self::InsufficientBalance { .. }
            | Self::InsufficientAllowance { .. }
            | Self::TransferRejected { .. } => ErrorCategory::Payment,
            Self::InsufficientClaimable { .. } | Self::VestingDisabled | Self::ZeroClaim => {
                ErrorCategory::Claim
            }
            Self::Unauthorized
            | Self::ReentrantCall
            | Self::ConservationViolation { .. }
            | Self::ArithmeticOverflow { .. } => ErrorCategory::Security,
            Self::OrderNotFound(_)
            | Self::Internal(_)
            | Self::Serialization(_)
            | Self::Configuration(_)
            | Self::Io(_) => ErrorCategory::Internal,
        }
    }

    /// Whether the caller may retry after adjusting the request.
    #[must_use]
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self.category(),
            ErrorCategory::Policy
                | ErrorCategory::DuplicateOrderId
                | ErrorCategory::Payment
                | ErrorCategory::Claim
        ) || matches!(self, Self::ReentrantCall)
    }
}

/// Crate-wide `Result` alias.
pub type Result<T> = std::result::Result<T, PresaleError>;

/// Failure signal of the external asset-ledger capability.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransferError {
    #[error("insufficient {asset} balance: need {needed}, have {available}")]
    InsufficientBalance {
        asset: Asset,
        needed: Amount,
        available: Amount,
    },

    #[error("insufficient {asset} allowance: need {needed}, approved {approved}")]
    InsufficientAllowance {
        asset: Asset,
        needed: Amount,
        approved: Amount,
    },

    #[error("rejected: {0}")]
    Rejected(String),
}

impl From<TransferError> for PresaleError {
    fn from(err: TransferError) -> Self {
        match err {
            TransferError::InsufficientBalance {
                asset,
                needed,
                available,
            } => Self::InsufficientBalance {
                asset,
                needed,
                available,
            },
            TransferError::InsufficientAllowance {
                asset,
                needed,
                approved,
            } => Self::InsufficientAllowance {
                asset,
                needed,
                approved,
            },
            TransferError::Rejected(reason) => Self::TransferRejected { reason },
        }
    }
}

impl From<std::io::Error> for PresaleError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

impl From<serde_json::Error> for PresaleError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_contains_prefix() {
        let err = PresaleError::DuplicateOrderId(OrderId(9));
        let msg = format!("{err}");
        assert!(msg.starts_with("PS_ERR_300"), "Got: {msg}");
        assert!(msg.contains("order:9"));
    }

    #[test]
    fn account_limit_display() {
        let err = PresaleError::AccountLimitExceeded {
            requested: 10_400,
            remaining: 100,
        };
        let msg = format!("{err}");
        assert!(msg.contains("PS_ERR_203"));
        assert!(msg.contains("10400"));
        assert!(msg.contains("100"));
    }

    #[test]
    fn transfer_error_maps_to_payment_group() {
        let err: PresaleError = TransferError::InsufficientAllowance {
            asset: Asset::Currency(Currency::Stable),
            needed: 5,
            approved: 0,
        }
        .into();
        assert!(matches!(err, PresaleError::InsufficientAllowance { .. }));
        assert_eq!(err.category(), ErrorCategory::Payment);
        assert!(format!("{err}").contains("STABLE"));
    }

    #[test]
    fn categories_follow_taxonomy() {
        assert_eq!(
            PresaleError::InvalidRatio(Currency::Native).category(),
            ErrorCategory::Validation
        );
        assert_eq!(PresaleError::SalePaused.category(), ErrorCategory::Policy);
        assert_eq!(
            PresaleError::InsufficientClaimable {
                requested: 1,
                claimable: 0
            }
            .category(),
            ErrorCategory::Claim
        );
        assert_eq!(PresaleError::Unauthorized.category(), ErrorCategory::Security);
    }

    #[test]
    fn recoverability() {
        assert!(PresaleError::DuplicateOrderId(OrderId(1)).is_recoverable());
        assert!(PresaleError::ZeroOutput { paid: 1 }.is_recoverable());
        assert!(PresaleError::ReentrantCall.is_recoverable());
        assert!(!PresaleError::InvalidConfig { reason: "x".into() }.is_recoverable());
        assert!(!PresaleError::Unauthorized.is_recoverable());
    }

    #[test]
    fn all_errors_have_ps_err_prefix() {
        let errors: Vec<Box<dyn std::error::Error>> = vec![
            Box::new(PresaleError::SalePaused),
            Box::new(PresaleError::VestingDisabled),
            Box::new(PresaleError::ReentrantCall),
            Box::new(PresaleError::Internal("test".into())),
            Box::new(PresaleError::ArithmeticOverflow { context: "convert" }),
        ];
        for err in errors {
            let msg = format!("{err}");
            assert!(
                msg.starts_with("PS_ERR_"),
                "Error missing PS_ERR_ prefix: {msg}"
            );
        }
    }
}
