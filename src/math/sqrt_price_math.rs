//! Token amounts and price movement within one liquidity range.
//!
//! Within a range of constant liquidity `L`, moving the sqrt price from
//! `√P_a` to `√P_b` exchanges
//!
//! - `Δx = L · (√P_b − √P_a) / (√P_a · √P_b)` of token0, and
//! - `Δy = L · (√P_b − √P_a)` of token1.
//!
//! Every function takes or applies an explicit rounding direction so the
//! pool never gives away a rounding unit.

use alloy_primitives::U256;

use super::full_math::{mul_div, mul_div_rounding_up, Q96};
use super::rounding::div_round;
use crate::domain::Rounding;
use crate::error::BacktestError;

/// Largest value of a 160-bit sqrt price.
const MAX_U160: U256 = U256::from_limbs([u64::MAX, u64::MAX, u32::MAX as u64, 0]);

/// Token0 exchanged between two sqrt prices, in either order.
///
/// # Errors
///
/// - [`BacktestError::InvalidSqrtPrice`] if either price is zero.
/// - [`BacktestError::ArithmeticOverflow`] if the amount exceeds 256 bits.
pub fn get_amount0_delta(
    sqrt_price_a: U256,
    sqrt_price_b: U256,
    liquidity: u128,
    rounding: Rounding,
) -> crate::error::Result<U256> {
    let (lower, upper) = ordered(sqrt_price_a, sqrt_price_b);
    if lower.is_zero() {
        return Err(BacktestError::InvalidSqrtPrice("sqrt price must be non-zero"));
    }
    let numerator1 = U256::from(liquidity) << 96;
    let numerator2 = upper - lower;
    match rounding {
        Rounding::Up => {
            let scaled = mul_div_rounding_up(numerator1, numerator2, upper)?;
            div_round(scaled, lower, Rounding::Up)
                .ok_or(BacktestError::DivisionByZero("amount0 delta"))
        }
        Rounding::Down => Ok(mul_div(numerator1, numerator2, upper)? / lower),
    }
}

/// Token1 exchanged between two sqrt prices, in either order.
///
/// # Errors
///
/// Returns [`BacktestError::ArithmeticOverflow`] if the amount exceeds
/// 256 bits.
pub fn get_amount1_delta(
    sqrt_price_a: U256,
    sqrt_price_b: U256,
    liquidity: u128,
    rounding: Rounding,
) -> crate::error::Result<U256> {
    let (lower, upper) = ordered(sqrt_price_a, sqrt_price_b);
    let liquidity = U256::from(liquidity);
    match rounding {
        Rounding::Up => mul_div_rounding_up(liquidity, upper - lower, Q96),
        Rounding::Down => mul_div(liquidity, upper - lower, Q96),
    }
}

/// Sqrt price after adding `amount_in` of the input token.
///
/// Rounds so the price never moves further than the input pays for:
/// up when token0 is added (price falls), down when token1 is added.
///
/// # Errors
///
/// - [`BacktestError::InvalidSqrtPrice`] if `sqrt_price` is zero.
/// - [`BacktestError::DivisionByZero`] if `liquidity` is zero.
/// - [`BacktestError::ArithmeticOverflow`] if the new price exceeds 160 bits.
pub fn next_sqrt_price_from_input(
    sqrt_price: U256,
    liquidity: u128,
    amount_in: U256,
    zero_for_one: bool,
) -> crate::error::Result<U256> {
    check_inputs(sqrt_price, liquidity)?;
    if zero_for_one {
        next_from_amount0_rounding_up(sqrt_price, liquidity, amount_in, true)
    } else {
        next_from_amount1_rounding_down(sqrt_price, liquidity, amount_in, true)
    }
}

/// Sqrt price after removing `amount_out` of the output token.
///
/// # Errors
///
/// - [`BacktestError::InvalidSqrtPrice`] if `sqrt_price` is zero.
/// - [`BacktestError::DivisionByZero`] if `liquidity` is zero.
/// - [`BacktestError::InvalidQuantity`] if the range cannot supply
///   `amount_out`.
pub fn next_sqrt_price_from_output(
    sqrt_price: U256,
    liquidity: u128,
    amount_out: U256,
    zero_for_one: bool,
) -> crate::error::Result<U256> {
    check_inputs(sqrt_price, liquidity)?;
    if zero_for_one {
        next_from_amount1_rounding_down(sqrt_price, liquidity, amount_out, false)
    } else {
        next_from_amount0_rounding_up(sqrt_price, liquidity, amount_out, false)
    }
}

fn ordered(a: U256, b: U256) -> (U256, U256) {
    if a > b {
        (b, a)
    } else {
        (a, b)
    }
}

fn check_inputs(sqrt_price: U256, liquidity: u128) -> crate::error::Result<()> {
    if sqrt_price.is_zero() {
        return Err(BacktestError::InvalidSqrtPrice("sqrt price must be non-zero"));
    }
    if liquidity == 0 {
        return Err(BacktestError::DivisionByZero("price movement with zero liquidity"));
    }
    Ok(())
}

fn next_from_amount0_rounding_up(
    sqrt_price: U256,
    liquidity: u128,
    amount: U256,
    add: bool,
) -> crate::error::Result<U256> {
    if amount.is_zero() {
        return Ok(sqrt_price);
    }
    let numerator1: U256 = U256::from(liquidity) << 96;
    if add {
        if let Some(denominator) = amount
            .checked_mul(sqrt_price)
            .and_then(|product| numerator1.checked_add(product))
        {
            return mul_div_rounding_up(numerator1, sqrt_price, denominator);
        }
        // L·2^96 / (L·2^96 / √P + Δx), less precise but cannot overflow
        let denominator = (numerator1 / sqrt_price)
            .checked_add(amount)
            .ok_or(BacktestError::ArithmeticOverflow("next sqrt price from amount0"))?;
        return div_round(numerator1, denominator, Rounding::Up)
            .ok_or(BacktestError::DivisionByZero("next sqrt price from amount0"));
    }
    let product = amount
        .checked_mul(sqrt_price)
        .ok_or(BacktestError::InvalidQuantity("output exceeds range reserves"))?;
    if numerator1 <= product {
        return Err(BacktestError::InvalidQuantity("output exceeds range reserves"));
    }
    mul_div_rounding_up(numerator1, sqrt_price, numerator1 - product)
}

fn next_from_amount1_rounding_down(
    sqrt_price: U256,
    liquidity: u128,
    amount: U256,
    add: bool,
) -> crate::error::Result<U256> {
    let liquidity = U256::from(liquidity);
    if add {
        let quotient = if amount <= MAX_U160 {
            (amount << 96) / liquidity
        } else {
            mul_div(amount, Q96, liquidity)?
        };
        let next = sqrt_price
            .checked_add(quotient)
            .ok_or(BacktestError::ArithmeticOverflow("next sqrt price from amount1"))?;
        if next > MAX_U160 {
            return Err(BacktestError::ArithmeticOverflow(
                "next sqrt price exceeds 160 bits",
            ));
        }
        return Ok(next);
    }
    let quotient = if amount <= MAX_U160 {
        div_round(amount << 96, liquidity, Rounding::Up)
            .ok_or(BacktestError::DivisionByZero("next sqrt price from amount1"))?
    } else {
        mul_div_rounding_up(amount, Q96, liquidity)?
    };
    if sqrt_price <= quotient {
        return Err(BacktestError::InvalidQuantity("output exceeds range reserves"));
    }
    Ok(sqrt_price - quotient)
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    fn dec(s: &str) -> U256 {
        let Ok(v) = U256::from_str_radix(s, 10) else {
            panic!("valid literal");
        };
        v
    }

    fn q96() -> U256 {
        U256::from(1u8) << 96
    }

    // sqrt prices at ticks 0 and 50
    fn p0() -> U256 {
        q96()
    }

    fn p50() -> U256 {
        dec("79426470787362580746886972461")
    }

    // -- amount deltas ----------------------------------------------------------

    #[test]
    fn amount1_delta_rounding() {
        let l = 1_000_000_000_000;
        let Ok(down) = get_amount1_delta(p0(), p50(), l, Rounding::Down) else {
            panic!("expected Ok");
        };
        let Ok(up) = get_amount1_delta(p50(), p0(), l, Rounding::Up) else {
            panic!("expected Ok");
        };
        assert_eq!(down, U256::from(2_503_002_301u64));
        assert_eq!(up, down + U256::from(1u8));
    }

    #[test]
    fn amount0_delta_rounding() {
        let l = 1_000_000_000_000;
        let Ok(down) = get_amount0_delta(p50(), p0(), l, Rounding::Down) else {
            panic!("expected Ok");
        };
        let Ok(up) = get_amount0_delta(p0(), p50(), l, Rounding::Up) else {
            panic!("expected Ok");
        };
        assert_eq!(down, U256::from(2_496_752_922u64));
        assert_eq!(up, down + U256::from(1u8));
    }

    #[test]
    fn equal_prices_exchange_nothing() {
        assert_eq!(
            get_amount0_delta(p50(), p50(), u128::MAX, Rounding::Up),
            Ok(U256::ZERO)
        );
        assert_eq!(
            get_amount1_delta(p50(), p50(), u128::MAX, Rounding::Up),
            Ok(U256::ZERO)
        );
    }

    #[test]
    fn zero_price_rejected() {
        assert!(get_amount0_delta(U256::ZERO, p0(), 1, Rounding::Down).is_err());
    }

    // -- next price from input ------------------------------------------------

    #[test]
    fn token1_in_raises_price() {
        // 1e18 liquidity, 1e17 token1 in: √P rises by 0.1
        let l = 1_000_000_000_000_000_000u128;
        let amount = U256::from(100_000_000_000_000_000u128);
        let Ok(next) = next_sqrt_price_from_input(q96(), l, amount, false) else {
            panic!("expected Ok");
        };
        assert_eq!(next, dec("87150978765690771352898345369"));
    }

    #[test]
    fn token0_in_lowers_price() {
        let l = 1_000_000_000_000_000_000u128;
        let amount = U256::from(100_000_000_000_000_000u128);
        let Ok(next) = next_sqrt_price_from_input(q96(), l, amount, true) else {
            panic!("expected Ok");
        };
        assert_eq!(next, dec("72025602285694852357767227579"));
    }

    #[test]
    fn zero_input_keeps_price() {
        assert_eq!(
            next_sqrt_price_from_input(p50(), 1, U256::ZERO, true),
            Ok(p50())
        );
    }

    #[test]
    fn zero_liquidity_rejected() {
        let Err(e) = next_sqrt_price_from_input(q96(), 0, U256::from(1u8), true) else {
            panic!("expected Err");
        };
        assert_eq!(
            e,
            BacktestError::DivisionByZero("price movement with zero liquidity")
        );
    }

    #[test]
    fn huge_token0_input_uses_fallback() {
        // amount * price overflows 256 bits; price falls towards zero but stays positive
        let amount = U256::MAX - U256::from(1u8);
        let Ok(next) = next_sqrt_price_from_input(q96(), 1, amount, true) else {
            panic!("expected Ok");
        };
        assert_eq!(next, U256::from(1u8));
    }

    // -- next price from output -----------------------------------------------

    #[test]
    fn output_within_reserves() {
        let l = 1_000_000_000_000_000_000u128;
        let amount = U256::from(100_000_000_000_000_000u128);
        let Ok(next) = next_sqrt_price_from_output(q96(), l, amount, true) else {
            panic!("expected Ok");
        };
        assert_eq!(next, dec("71305346262837903834189555302"));
    }

    #[test]
    fn output_beyond_reserves_rejected() {
        // token1 reserves of the range are L * √P = 1e18; asking for that much fails
        let l = 1_000_000_000_000_000_000u128;
        let r = next_sqrt_price_from_output(q96(), l, U256::from(l), true);
        assert_eq!(
            r,
            Err(BacktestError::InvalidQuantity("output exceeds range reserves"))
        );
        let r = next_sqrt_price_from_output(q96(), l, U256::from(l), false);
        assert!(r.is_err());
    }
}
