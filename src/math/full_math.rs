//! Full-precision `a × b / d` on 256-bit operands.
//!
//! The product is formed in 512 bits, so neither function can overflow
//! in the intermediate; they fail only when the final quotient does not
//! fit in 256 bits.

use alloy_primitives::{U256, U512};

use crate::error::BacktestError;

/// `2^96`, the Q64.96 unit.
pub const Q96: U256 = U256::from_limbs([0, 1 << 32, 0, 0]);

/// `2^128`, the Q128.128 unit.
pub const Q128: U256 = U256::from_limbs([0, 0, 1, 0]);

/// Computes `floor(a × b / denominator)`.
///
/// # Errors
///
/// - [`BacktestError::DivisionByZero`] if `denominator` is zero.
/// - [`BacktestError::ArithmeticOverflow`] if the quotient exceeds 256 bits.
///
/// # Examples
///
/// ```
/// use alloy_primitives::U256;
/// use clmm_backtest::math::mul_div;
///
/// // (2^255 * 4) / 8 fits even though the product does not
/// let big = U256::from(1u8) << 255;
/// let r = mul_div(big, U256::from(4u8), U256::from(8u8));
/// assert_eq!(r, Ok(U256::from(1u8) << 254));
/// ```
pub fn mul_div(a: U256, b: U256, denominator: U256) -> crate::error::Result<U256> {
    if denominator.is_zero() {
        return Err(BacktestError::DivisionByZero("mul_div denominator"));
    }
    let product = U512::from(a) * U512::from(b);
    narrow(product / U512::from(denominator))
}

/// Computes `ceil(a × b / denominator)`.
///
/// # Errors
///
/// Same as [`mul_div`].
pub fn mul_div_rounding_up(a: U256, b: U256, denominator: U256) -> crate::error::Result<U256> {
    if denominator.is_zero() {
        return Err(BacktestError::DivisionByZero("mul_div denominator"));
    }
    let product = U512::from(a) * U512::from(b);
    let denominator = U512::from(denominator);
    let mut quotient = product / denominator;
    if !(product % denominator).is_zero() {
        quotient += U512::from(1u8);
    }
    narrow(quotient)
}

/// Narrows a 512-bit intermediate back to 256 bits.
fn narrow(value: U512) -> crate::error::Result<U256> {
    let limbs = value.as_limbs();
    if limbs[4..].iter().any(|&limb| limb != 0) {
        return Err(BacktestError::ArithmeticOverflow(
            "mul_div result exceeds 256 bits",
        ));
    }
    Ok(U256::from_limbs([limbs[0], limbs[1], limbs[2], limbs[3]]))
}

/// Narrows a 256-bit amount to `u128`.
///
/// # Errors
///
/// Returns [`BacktestError::ArithmeticOverflow`] naming `what` if the
/// value exceeds `u128::MAX`.
pub fn to_u128(value: U256, what: &'static str) -> crate::error::Result<u128> {
    u128::try_from(value).map_err(|_| BacktestError::ArithmeticOverflow(what))
}
