//! From-scratch simulation of a raw swap amount.
//!
//! # Algorithm
//!
//! 1. Find the next initialized tick in the swap direction and aim for
//!    its price, or the price limit if that comes first.
//! 2. Run one [`compute_swap_step`] against the active liquidity; the
//!    step's fee is credited to the input token's global accumulator.
//! 3. If the step reached the tick's price, cross it and continue;
//!    otherwise the amount is exhausted or the limit reached.

use alloy_primitives::U256;
use tracing::debug;

use super::state::PoolState;
use crate::domain::{Amount, SqrtPriceX96, SwapDirection, SwapResult, SwapSpec, Tick};
use crate::error::BacktestError;
use crate::math::{compute_swap_step, sqrt_price_to_tick, tick_to_sqrt_price, to_u128};

impl PoolState {
    /// Swaps `spec` in `direction`, stopping at `sqrt_price_limit`.
    ///
    /// Without a limit the swap may move the price to one unit inside
    /// the representable range. The returned [`SwapResult`] reports the
    /// part that executed, which is less than requested if the limit
    /// was reached first.
    ///
    /// # Errors
    ///
    /// - [`BacktestError::InvalidSqrtPrice`] if the limit is not strictly
    ///   beyond the current price in `direction`, or outside the range.
    /// - [`BacktestError::LiquidityUnderflow`] if a crossing would make
    ///   active liquidity negative.
    /// - [`BacktestError::ArithmeticOverflow`] if an amount or the fee
    ///   growth accumulator overflows.
    pub fn swap(
        &mut self,
        direction: SwapDirection,
        spec: SwapSpec,
        sqrt_price_limit: Option<SqrtPriceX96>,
    ) -> crate::error::Result<SwapResult> {
        let zero_for_one = direction.is_zero_for_one();
        let current = self.sqrt_price().get();
        let one = U256::from(1u8);
        let limit = match sqrt_price_limit {
            Some(limit) => limit.get(),
            None if zero_for_one => SqrtPriceX96::MIN.get() + one,
            None => SqrtPriceX96::MAX.get() - one,
        };
        let limit_ok = if zero_for_one {
            limit < current && limit > SqrtPriceX96::MIN.get()
        } else {
            limit > current && limit < SqrtPriceX96::MAX.get()
        };
        if !limit_ok {
            return Err(BacktestError::InvalidSqrtPrice(
                "price limit must lie beyond the current price in the swap direction",
            ));
        }

        let exact_in = spec.is_exact_in();
        let fee_pips = self.fee_tier().pips();
        let mut remaining = U256::from(spec.amount().get());
        let mut total_in = U256::ZERO;
        let mut total_out = U256::ZERO;
        let mut total_fee = U256::ZERO;
        let mut plan = self.plan();

        while !remaining.is_zero() && plan.sqrt_price.get() != limit {
            let next = self.ticks().next_initialized_tick(plan.tick, direction);
            let next_tick = next.unwrap_or(if zero_for_one { Tick::MIN } else { Tick::MAX });
            let next_price = tick_to_sqrt_price(next_tick)?.get();
            let target = if zero_for_one {
                next_price.max(limit)
            } else {
                next_price.min(limit)
            };

            let start = plan.sqrt_price.get();
            let step = compute_swap_step(
                start,
                target,
                plan.liquidity.get(),
                remaining,
                exact_in,
                fee_pips,
            )?;

            let consumed = if exact_in {
                step.amount_in + step.fee_amount
            } else {
                step.amount_out
            };
            remaining = remaining
                .checked_sub(consumed)
                .ok_or(BacktestError::ArithmeticOverflow("swap step consumed more than remaining"))?;
            total_in = total_in
                .checked_add(step.amount_in + step.fee_amount)
                .ok_or(BacktestError::ArithmeticOverflow("swap input"))?;
            total_out = total_out
                .checked_add(step.amount_out)
                .ok_or(BacktestError::ArithmeticOverflow("swap output"))?;
            total_fee += step.fee_amount;

            let fee = Amount::new(to_u128(step.fee_amount, "step fee exceeds u128")?);
            plan.credit_fee(direction, fee)?;
            plan.sqrt_price = SqrtPriceX96::new(step.sqrt_price_next)?;

            if step.sqrt_price_next == next_price {
                if let Some(crossed) = next {
                    let info = self.ticks().info(crossed);
                    plan.cross(crossed, &info, direction)?;
                }
                plan.tick = if zero_for_one {
                    next_tick.checked_sub(1).unwrap_or(Tick::MIN)
                } else {
                    next_tick
                };
            } else if step.sqrt_price_next != start {
                plan.tick = sqrt_price_to_tick(plan.sqrt_price)?;
            }
        }

        let ticks_crossed = u32::try_from(plan.crossings.len())
            .map_err(|_| BacktestError::ArithmeticOverflow("ticks crossed"))?;
        let result = SwapResult::new(
            direction,
            Amount::new(to_u128(total_in, "swap input exceeds u128")?),
            Amount::new(to_u128(total_out, "swap output exceeds u128")?),
            Amount::new(to_u128(total_fee, "swap fee exceeds u128")?),
            ticks_crossed,
        );
        self.commit(plan);
        debug!(
            %direction,
            amount_in = %result.amount_in(),
            amount_out = %result.amount_out(),
            ticks_crossed,
            tick = %self.tick(),
            "swap executed"
        );
        Ok(result)
    }
}
