//! One step of a swap inside a single liquidity range.

use alloy_primitives::U256;

use super::full_math::{mul_div, mul_div_rounding_up};
use super::sqrt_price_math::{
    get_amount0_delta, get_amount1_delta, next_sqrt_price_from_input,
    next_sqrt_price_from_output,
};
use crate::domain::{Rounding, PIPS_DENOMINATOR};

/// Result of [`compute_swap_step`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SwapStep {
    /// Price reached by the step, never past the target.
    pub sqrt_price_next: U256,
    /// Input consumed, fee excluded.
    pub amount_in: U256,
    /// Output produced.
    pub amount_out: U256,
    /// Fee taken from the input.
    pub fee_amount: U256,
}

/// Swaps as much of `amount_remaining` as the range allows before the
/// price reaches `sqrt_price_target`.
///
/// The direction is inferred from the prices: token0 in when
/// `sqrt_price_current >= sqrt_price_target`. For exact input,
/// `amount_remaining` is the gross input left and
/// `amount_in + fee_amount` never exceeds it. For exact output it is the
/// output still wanted and `amount_out` never exceeds it.
///
/// # Errors
///
/// Propagates failures from the sqrt-price math: zero liquidity with a
/// price still to move, or a quotient wider than 256 bits.
pub fn compute_swap_step(
    sqrt_price_current: U256,
    sqrt_price_target: U256,
    liquidity: u128,
    amount_remaining: U256,
    exact_in: bool,
    fee_pips: u32,
) -> crate::error::Result<SwapStep> {
    let zero_for_one = sqrt_price_current >= sqrt_price_target;
    let pips = U256::from(fee_pips);
    let denominator = U256::from(PIPS_DENOMINATOR);

    let mut amount_in = U256::ZERO;
    let mut amount_out = U256::ZERO;
    let sqrt_price_next = if exact_in {
        let remaining_less_fee = mul_div(amount_remaining, denominator - pips, denominator)?;
        amount_in = if zero_for_one {
            get_amount0_delta(sqrt_price_target, sqrt_price_current, liquidity, Rounding::Up)?
        } else {
            get_amount1_delta(sqrt_price_current, sqrt_price_target, liquidity, Rounding::Up)?
        };
        if remaining_less_fee >= amount_in {
            sqrt_price_target
        } else {
            next_sqrt_price_from_input(
                sqrt_price_current,
                liquidity,
                remaining_less_fee,
                zero_for_one,
            )?
        }
    } else {
        amount_out = if zero_for_one {
            get_amount1_delta(sqrt_price_target, sqrt_price_current, liquidity, Rounding::Down)?
        } else {
            get_amount0_delta(sqrt_price_current, sqrt_price_target, liquidity, Rounding::Down)?
        };
        if amount_remaining >= amount_out {
            sqrt_price_target
        } else {
            next_sqrt_price_from_output(
                sqrt_price_current,
                liquidity,
                amount_remaining,
                zero_for_one,
            )?
        }
    };

    let reached_target = sqrt_price_next == sqrt_price_target;
    if zero_for_one {
        if !(reached_target && exact_in) {
            amount_in =
                get_amount0_delta(sqrt_price_next, sqrt_price_current, liquidity, Rounding::Up)?;
        }
        if !(reached_target && !exact_in) {
            amount_out =
                get_amount1_delta(sqrt_price_next, sqrt_price_current, liquidity, Rounding::Down)?;
        }
    } else {
        if !(reached_target && exact_in) {
            amount_in =
                get_amount1_delta(sqrt_price_current, sqrt_price_next, liquidity, Rounding::Up)?;
        }
        if !(reached_target && !exact_in) {
            amount_out =
                get_amount0_delta(sqrt_price_current, sqrt_price_next, liquidity, Rounding::Down)?;
        }
    }

    if !exact_in && amount_out > amount_remaining {
        amount_out = amount_remaining;
    }

    let fee_amount = if exact_in && !reached_target {
        // the rest of the input is all fee
        amount_remaining - amount_in
    } else {
        mul_div_rounding_up(amount_in, pips, denominator - pips)?
    };

    Ok(SwapStep {
        sqrt_price_next,
        amount_in,
        amount_out,
        fee_amount,
    })
}
