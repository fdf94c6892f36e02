//! What drives a simulated swap.

use core::fmt;

use super::Amount;
use crate::error::BacktestError;

/// The fixed side of a simulated swap: an exact gross input, or an exact
/// output.
///
/// # Invariants
///
/// The contained amount is always non-zero.
///
/// # Examples
///
/// ```
/// use clmm_backtest::domain::{Amount, SwapSpec};
///
/// let spec = SwapSpec::exact_in(Amount::new(1000));
/// assert!(spec.is_ok());
/// assert!(SwapSpec::exact_out(Amount::ZERO).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum SwapSpec {
    /// Spend exactly this much of the input token, fee included.
    ExactIn {
        /// The gross input amount.
        amount_in: Amount,
    },
    /// Receive exactly this much of the output token.
    ExactOut {
        /// The requested output amount.
        amount_out: Amount,
    },
}

impl SwapSpec {
    /// Creates an exact-input specification.
    ///
    /// # Errors
    ///
    /// Returns [`BacktestError::InvalidQuantity`] if `amount` is zero.
    pub const fn exact_in(amount: Amount) -> crate::error::Result<Self> {
        if amount.is_zero() {
            return Err(BacktestError::InvalidQuantity("swap amount must be non-zero"));
        }
        Ok(Self::ExactIn { amount_in: amount })
    }

    /// Creates an exact-output specification.
    ///
    /// # Errors
    ///
    /// Returns [`BacktestError::InvalidQuantity`] if `amount` is zero.
    pub const fn exact_out(amount: Amount) -> crate::error::Result<Self> {
        if amount.is_zero() {
            return Err(BacktestError::InvalidQuantity("swap amount must be non-zero"));
        }
        Ok(Self::ExactOut { amount_out: amount })
    }

    /// Returns `true` for an exact-input specification.
    #[must_use]
    pub const fn is_exact_in(&self) -> bool {
        matches!(self, Self::ExactIn { .. })
    }

    /// Extracts the amount regardless of variant.
    pub const fn amount(&self) -> Amount {
        match self {
            Self::ExactIn { amount_in } => *amount_in,
            Self::ExactOut { amount_out } => *amount_out,
        }
    }
}

impl fmt::Display for SwapSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ExactIn { amount_in } => write!(f, "ExactIn({amount_in})"),
            Self::ExactOut { amount_out } => write!(f, "ExactOut({amount_out})"),
        }
    }
}
