//! Fee-growth accumulator arithmetic.
//!
//! Fees are tracked per unit of liquidity in Q128.128: a fee `f` earned
//! by active liquidity `L` adds `f · 2^128 / L` to the global accumulator
//! of the fee token. A position earns `L_pos · Δinside / 2^128`.

use alloy_primitives::U256;

use super::full_math::{mul_div, to_u128, Q128};
use crate::domain::{Amount, FeeGrowth, Liquidity, Tick, TickInfo};
use crate::error::BacktestError;

/// Fee growth accrued strictly inside `[tick_lower, tick_upper)`.
///
/// Growth below the range is the lower tick's outside value when the
/// current tick is at or above it, else its complement against the
/// global; symmetrically above. The result is
/// `global − below − above`, computed modulo 2²⁵⁶.
///
/// Ticks that are not initialized are passed as `TickInfo::default()`.
///
/// # Errors
///
/// Returns [`BacktestError::InvalidTickRange`] if
/// `tick_lower >= tick_upper`.
pub fn get_fee_growth_inside(
    tick_lower: Tick,
    tick_upper: Tick,
    current_tick: Tick,
    fee_growth_global0: FeeGrowth,
    fee_growth_global1: FeeGrowth,
    lower: &TickInfo,
    upper: &TickInfo,
) -> crate::error::Result<(FeeGrowth, FeeGrowth)> {
    if tick_lower >= tick_upper {
        return Err(BacktestError::InvalidTickRange(
            "lower tick must be less than upper tick",
        ));
    }

    let (below0, below1) = if current_tick >= tick_lower {
        (lower.fee_growth_outside0, lower.fee_growth_outside1)
    } else {
        (
            fee_growth_global0.wrapping_sub(&lower.fee_growth_outside0),
            fee_growth_global1.wrapping_sub(&lower.fee_growth_outside1),
        )
    };

    let (above0, above1) = if current_tick < tick_upper {
        (upper.fee_growth_outside0, upper.fee_growth_outside1)
    } else {
        (
            fee_growth_global0.wrapping_sub(&upper.fee_growth_outside0),
            fee_growth_global1.wrapping_sub(&upper.fee_growth_outside1),
        )
    };

    Ok((
        fee_growth_global0.wrapping_sub(&below0).wrapping_sub(&above0),
        fee_growth_global1.wrapping_sub(&below1).wrapping_sub(&above1),
    ))
}

/// Growth added to a global accumulator when `fee` is earned by
/// `liquidity`, `floor(fee · 2^128 / liquidity)`.
///
/// # Errors
///
/// Returns [`BacktestError::DivisionByZero`] if `liquidity` is zero.
pub fn fee_growth_delta(fee: Amount, liquidity: Liquidity) -> crate::error::Result<FeeGrowth> {
    if liquidity.is_zero() {
        return Err(BacktestError::DivisionByZero("fee growth with zero liquidity"));
    }
    let growth = mul_div(U256::from(fee.get()), Q128, U256::from(liquidity.get()))?;
    Ok(FeeGrowth::new(growth))
}

/// Fees earned by `liquidity` over an inside-growth increase of `delta`,
/// `floor(liquidity · delta / 2^128)`.
///
/// # Errors
///
/// Returns [`BacktestError::ArithmeticOverflow`] if the result exceeds
/// `u128`.
pub fn fees_earned(liquidity: Liquidity, delta: FeeGrowth) -> crate::error::Result<Amount> {
    let earned = mul_div(U256::from(liquidity.get()), delta.get(), Q128)?;
    Ok(Amount::new(to_u128(earned, "fees earned exceed u128")?))
}
