//! Rounding helpers for 256-bit integer division.
//!
//! [`div_round`] is the low-level building block the sqrt-price math uses
//! wherever a quotient must round in a chosen direction.
//!
//! # Convention
//!
//! **Always round in the pool's favour**:
//!
//! | Quantity | Direction |
//! |----------|-----------|
//! | Amount paid into the pool | [`Rounding::Up`] |
//! | Amount paid out of the pool | [`Rounding::Down`] |
//! | Fee credited to liquidity | [`Rounding::Down`] |
//!
//! # Examples
//!
//! ```
//! use alloy_primitives::U256;
//! use clmm_backtest::domain::Rounding;
//! use clmm_backtest::math::div_round;
//!
//! let ten = U256::from(10u8);
//! let three = U256::from(3u8);
//! assert_eq!(div_round(ten, three, Rounding::Down), Some(U256::from(3u8)));
//! assert_eq!(div_round(ten, three, Rounding::Up), Some(U256::from(4u8)));
//! assert_eq!(div_round(ten, U256::ZERO, Rounding::Down), None);
//! ```

use alloy_primitives::U256;

use crate::domain::Rounding;

/// Division of `U256` values with explicit rounding direction.
///
/// - [`Rounding::Down`]: floor division.
/// - [`Rounding::Up`]: the smallest integer ≥ the exact quotient.
///
/// Returns [`None`] if `denominator` is zero.
#[must_use]
pub fn div_round(numerator: U256, denominator: U256, rounding: Rounding) -> Option<U256> {
    if denominator.is_zero() {
        return None;
    }
    let quotient = numerator / denominator;
    if rounding.is_up() && !(numerator % denominator).is_zero() {
        // quotient < U256::MAX whenever a remainder exists
        return Some(quotient + U256::from(1u8));
    }
    Some(quotient)
}
