//! Replay of recorded trades.
//!
//! A recorded trade already says where the price ended up, so replay
//! does not solve for the price from an amount. It walks the price from
//! the current value to the recorded `sqrt_price_after`, crossing every
//! initialized tick on the way, and charges the fee on the recorded
//! gross input.
//!
//! # Fee attribution
//!
//! The fee is `floor(amount_in × fee_tier)`. It is split over the walk's
//! segments in proportion to the input each segment absorbs (rounded
//! up, as the pool would charge it), and each share is credited to the
//! liquidity active in its segment. Any rounding remainder goes to the
//! last segment that absorbed input. When no segment absorbed input the
//! whole fee goes to the current liquidity, and with no liquidity at all
//! it stays unattributed.

use alloy_primitives::U256;
use tracing::{debug, warn};

use super::state::PoolState;
use crate::config::{DivergencePolicy, ReplayConfig};
use crate::domain::{
    Amount, Divergence, Liquidity, Rounding, SqrtPriceX96, SwapDirection, Tick, TradeData,
};
use crate::error::BacktestError;
use crate::math::{
    get_amount0_delta, get_amount1_delta, mul_div, sqrt_price_to_tick, tick_to_sqrt_price,
    to_u128,
};

/// What replaying one trade did to the pool.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct ReplayOutcome {
    direction: Option<SwapDirection>,
    fee: Amount,
    unattributed_fee: Amount,
    ticks_crossed: u32,
    divergences: Vec<Divergence>,
}

impl ReplayOutcome {
    /// Direction the price moved, or the recorded direction when it did
    /// not move. `None` for a trade that neither moved the price nor
    /// recorded an input.
    #[must_use]
    pub const fn direction(&self) -> Option<SwapDirection> {
        self.direction
    }

    /// Total fee charged on the recorded input.
    #[must_use]
    pub const fn fee(&self) -> Amount {
        self.fee
    }

    /// Part of the fee charged while no liquidity was active.
    #[must_use]
    pub const fn unattributed_fee(&self) -> Amount {
        self.unattributed_fee
    }

    /// Number of initialized ticks crossed.
    #[must_use]
    pub const fn ticks_crossed(&self) -> u32 {
        self.ticks_crossed
    }

    /// Divergences found, empty under [`DivergencePolicy::Ignore`].
    #[must_use]
    pub fn divergences(&self) -> &[Divergence] {
        &self.divergences
    }

    /// Consumes the outcome, returning its divergences.
    #[must_use]
    pub fn into_divergences(self) -> Vec<Divergence> {
        self.divergences
    }
}

/// Stretch of the walk with constant active liquidity.
#[derive(Debug, Clone, Copy)]
struct Segment {
    liquidity: Liquidity,
    /// Input absorbed moving through the segment, rounded up.
    weight: U256,
    /// Initialized tick crossed at the end of the segment.
    crossing: Option<Tick>,
}

/// Where the walk to the recorded price ended.
#[derive(Debug)]
struct Walk {
    segments: Vec<Segment>,
    tick: Tick,
    liquidity: Liquidity,
}

impl PoolState {
    /// Replays `trade` against the pool.
    ///
    /// The pool ends at the recorded sqrt price, with the tick and
    /// liquidity the crossings produce. Recorded tick and liquidity are
    /// then compared with the simulated ones; how disagreements are
    /// handled depends on `config`'s [`DivergencePolicy`].
    ///
    /// # Errors
    ///
    /// - [`BacktestError::ReplayDivergence`] under
    ///   [`DivergencePolicy::Fail`] if any divergence is found.
    /// - [`BacktestError::LiquidityUnderflow`] if a crossing would make
    ///   active liquidity negative.
    /// - [`BacktestError::ArithmeticOverflow`] if the fee growth
    ///   accumulator overflows.
    ///
    /// The pool is unchanged on error.
    pub fn replay(
        &mut self,
        trade: &TradeData,
        config: &ReplayConfig,
    ) -> crate::error::Result<ReplayOutcome> {
        let target = trade.sqrt_price_after();
        let moved = match target.cmp(&self.sqrt_price()) {
            core::cmp::Ordering::Less => Some(SwapDirection::ZeroForOne),
            core::cmp::Ordering::Greater => Some(SwapDirection::OneForZero),
            core::cmp::Ordering::Equal => None,
        };
        let recorded = trade.direction();

        let mut divergences = Vec::new();
        if let (Some(recorded), Some(simulated)) = (recorded, moved) {
            if recorded != simulated {
                divergences.push(Divergence::DirectionMismatch {
                    recorded,
                    simulated,
                });
            }
        }

        let walk = match moved {
            Some(direction) => self.walk_to(target, direction)?,
            None => Walk {
                segments: Vec::new(),
                tick: self.tick(),
                liquidity: self.liquidity(),
            },
        };

        // fees are paid in the token that went in
        let fee_direction = recorded.or(moved);
        let fee = match fee_direction {
            Some(direction) => self.fee_tier().fee_on(trade.amount_in_for(direction)),
            None => Amount::ZERO,
        };

        let mut plan = self.plan();
        let mut unattributed_fee = Amount::ZERO;
        let total_weight = walk
            .segments
            .iter()
            .try_fold(U256::ZERO, |sum, s| sum.checked_add(s.weight))
            .ok_or(BacktestError::ArithmeticOverflow("replay input weight"))?;
        let last_weighted = walk.segments.iter().rposition(|s| !s.weight.is_zero());
        let mut distributed = U256::ZERO;
        let total_fee = U256::from(fee.get());

        for (index, segment) in walk.segments.iter().enumerate() {
            plan.liquidity = segment.liquidity;
            if !segment.weight.is_zero() {
                let share = if Some(index) == last_weighted {
                    total_fee - distributed
                } else {
                    mul_div(total_fee, segment.weight, total_weight)?
                };
                distributed += share;
                if let Some(direction) = fee_direction {
                    let share = Amount::new(to_u128(share, "fee share exceeds u128")?);
                    plan.credit_fee(direction, share)?;
                }
            }
            if let (Some(tick), Some(direction)) = (segment.crossing, moved) {
                let info = self.ticks().info(tick);
                plan.cross(tick, &info, direction)?;
            }
        }
        plan.liquidity = walk.liquidity;
        // no stretch absorbed input, so only liquidity active at the end
        // can have earned the fee
        if total_weight.is_zero() && !fee.is_zero() {
            if let Some(direction) = fee_direction {
                if !plan.credit_fee(direction, fee)? {
                    unattributed_fee = fee;
                }
            }
        }
        let settled = self.settle_tick(trade.tick_after(), walk.tick, target, moved)?;
        plan.sqrt_price = target;
        plan.tick = settled;
        if !config.ticks_agree(trade.tick_after().get(), settled.get()) {
            divergences.push(Divergence::TickMismatch {
                recorded: trade.tick_after(),
                simulated: settled,
            });
        }
        if trade.liquidity_after() != walk.liquidity {
            divergences.push(Divergence::LiquidityMismatch {
                recorded: trade.liquidity_after(),
                simulated: walk.liquidity,
            });
        }

        match config.divergence_policy() {
            DivergencePolicy::Fail => {
                if let Some(first) = divergences.first() {
                    return Err(BacktestError::ReplayDivergence(*first));
                }
            }
            DivergencePolicy::Warn => {
                for divergence in &divergences {
                    warn!(block = trade.block_number(), %divergence, "replay divergence");
                }
            }
            DivergencePolicy::Ignore => divergences.clear(),
        }

        let ticks_crossed = u32::try_from(plan.crossings.len())
            .map_err(|_| BacktestError::ArithmeticOverflow("ticks crossed"))?;
        self.commit(plan);
        debug!(
            block = trade.block_number(),
            tick = %self.tick(),
            liquidity = %self.liquidity(),
            %fee,
            ticks_crossed,
            "trade replayed"
        );
        Ok(ReplayOutcome {
            direction: moved.or(recorded),
            fee,
            unattributed_fee,
            ticks_crossed,
            divergences,
        })
    }

    /// Walks the price to `target`, recording one segment per stretch of
    /// constant liquidity.
    fn walk_to(
        &self,
        target: SqrtPriceX96,
        direction: SwapDirection,
    ) -> crate::error::Result<Walk> {
        let zero_for_one = direction.is_zero_for_one();
        let target = target.get();
        let mut price = self.sqrt_price().get();
        let mut tick = self.tick();
        let mut liquidity = self.liquidity();
        let mut segments = Vec::new();

        while price != target {
            let next = self.ticks().next_initialized_tick(tick, direction);
            let next_tick = next.unwrap_or(if zero_for_one { Tick::MIN } else { Tick::MAX });
            let next_price = tick_to_sqrt_price(next_tick)?.get();
            let step_target = if zero_for_one {
                next_price.max(target)
            } else {
                next_price.min(target)
            };
            let weight = if zero_for_one {
                get_amount0_delta(step_target, price, liquidity.get(), Rounding::Up)?
            } else {
                get_amount1_delta(price, step_target, liquidity.get(), Rounding::Up)?
            };

            let mut segment = Segment {
                liquidity,
                weight,
                crossing: None,
            };
            price = step_target;
            if step_target == next_price {
                if let Some(crossed) = next {
                    let info = self.ticks().info(crossed);
                    let delta = if zero_for_one {
                        info.liquidity_net
                            .checked_neg()
                            .ok_or(BacktestError::ArithmeticOverflow("tick liquidity net"))?
                    } else {
                        info.liquidity_net
                    };
                    liquidity = liquidity.checked_apply_delta(delta).ok_or(
                        BacktestError::LiquidityUnderflow {
                            tick: crossed,
                            liquidity,
                            delta,
                        },
                    )?;
                    segment.crossing = Some(crossed);
                }
                tick = if zero_for_one {
                    next_tick.checked_sub(1).unwrap_or(Tick::MIN)
                } else {
                    next_tick
                };
            } else {
                tick = sqrt_price_to_tick(SqrtPriceX96::new(step_target)?)?;
            }
            segments.push(segment);
        }

        Ok(Walk {
            segments,
            tick,
            liquidity,
        })
    }

    /// Picks the tick the pool adopts after a replay.
    ///
    /// A downward move that stops exactly on an uninitialized tick's
    /// price may be recorded one tick lower; both describe the same
    /// liquidity, so the recorded one is taken.
    fn settle_tick(
        &self,
        recorded: Tick,
        simulated: Tick,
        target: SqrtPriceX96,
        moved: Option<SwapDirection>,
    ) -> crate::error::Result<Tick> {
        let moved_down = moved == Some(SwapDirection::ZeroForOne);
        if moved_down
            && recorded.checked_add(1) == Some(simulated)
            && !self.ticks().is_initialized(simulated)
            && tick_to_sqrt_price(simulated)? == target
        {
            return Ok(recorded);
        }
        Ok(simulated)
    }
}
