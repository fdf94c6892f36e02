//! Price, liquidity and fee-growth state of one simulated pool.
//!
//! # State
//!
//! - `sqrt_price` / `tick`: the current price. `tick` is the greatest
//!   tick whose price is ≤ `sqrt_price`, except right after a downward
//!   crossing that stopped exactly on the crossed tick, where it is one
//!   below.
//! - `liquidity`: the liquidity of every range containing `tick`.
//! - `fee_growth_global{0,1}`: fees per unit of liquidity earned since
//!   the pool was created. They only ever grow.
//! - `ticks`: the [`TickMap`] of initialized range boundaries.
//!
//! # Atomicity
//!
//! Swaps and replays are computed into a [`Plan`] against the current
//! state and written back only once the whole trade has succeeded, so a
//! failing trade leaves the pool exactly as it was.

use tracing::debug;

use super::snapshot::PoolSnapshot;
use super::tick_map::{max_liquidity_per_tick, TickMap};
use crate::config::PoolConfig;
use crate::domain::{
    Amount, FeeGrowth, FeeTier, Liquidity, SqrtPriceX96, SwapDirection, Tick, TickInfo,
};
use crate::error::BacktestError;
use crate::math::{fee_growth_delta, get_fee_growth_inside};
use crate::traits::FromConfig;

/// A Uniswap V3 pool being replayed.
///
/// Created from a [`PoolConfig`] via [`FromConfig`]. Mutated only by
/// [`update_liquidity`](Self::update_liquidity),
/// [`swap`](Self::swap) and [`replay`](Self::replay).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PoolState {
    fee_tier: FeeTier,
    tick_spacing: u32,
    max_liquidity_per_tick: Liquidity,
    sqrt_price: SqrtPriceX96,
    tick: Tick,
    liquidity: Liquidity,
    fee_growth_global0: FeeGrowth,
    fee_growth_global1: FeeGrowth,
    ticks: TickMap,
}

/// A tick crossed while planning a trade, with the globals at the
/// moment it was crossed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) struct Crossing {
    pub(super) tick: Tick,
    pub(super) fee_growth_global0: FeeGrowth,
    pub(super) fee_growth_global1: FeeGrowth,
}

/// Pool-level outcome of a trade, not yet written back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(super) struct Plan {
    pub(super) sqrt_price: SqrtPriceX96,
    pub(super) tick: Tick,
    pub(super) liquidity: Liquidity,
    pub(super) fee_growth_global0: FeeGrowth,
    pub(super) fee_growth_global1: FeeGrowth,
    pub(super) crossings: Vec<Crossing>,
}

impl Plan {
    /// Credits `fee`, paid in the input token of `direction`, to the
    /// liquidity currently active in the plan.
    ///
    /// Returns `false` without crediting when no liquidity is active.
    pub(super) fn credit_fee(
        &mut self,
        direction: SwapDirection,
        fee: Amount,
    ) -> crate::error::Result<bool> {
        if self.liquidity.is_zero() {
            return Ok(false);
        }
        if fee.is_zero() {
            return Ok(true);
        }
        let delta = fee_growth_delta(fee, self.liquidity)?;
        let global = match direction {
            SwapDirection::ZeroForOne => &mut self.fee_growth_global0,
            SwapDirection::OneForZero => &mut self.fee_growth_global1,
        };
        *global = global
            .checked_add(&delta)
            .ok_or(BacktestError::ArithmeticOverflow("fee growth global"))?;
        Ok(true)
    }

    /// Crosses `tick` moving in `direction`, applying its net liquidity.
    ///
    /// # Errors
    ///
    /// - [`BacktestError::LiquidityUnderflow`] if active liquidity would
    ///   go negative.
    /// - [`BacktestError::ArithmeticOverflow`] if it would exceed `u128`.
    pub(super) fn cross(
        &mut self,
        tick: Tick,
        info: &TickInfo,
        direction: SwapDirection,
    ) -> crate::error::Result<()> {
        let delta = match direction {
            SwapDirection::ZeroForOne => info
                .liquidity_net
                .checked_neg()
                .ok_or(BacktestError::ArithmeticOverflow("tick liquidity net"))?,
            SwapDirection::OneForZero => info.liquidity_net,
        };
        self.liquidity = apply_liquidity_delta(self.liquidity, delta, tick)?;
        self.crossings.push(Crossing {
            tick,
            fee_growth_global0: self.fee_growth_global0,
            fee_growth_global1: self.fee_growth_global1,
        });
        Ok(())
    }
}

/// Adds a signed delta to active liquidity, naming `tick` on underflow.
fn apply_liquidity_delta(
    liquidity: Liquidity,
    delta: i128,
    tick: Tick,
) -> crate::error::Result<Liquidity> {
    match liquidity.checked_apply_delta(delta) {
        Some(next) => Ok(next),
        None if delta < 0 => Err(BacktestError::LiquidityUnderflow {
            tick,
            liquidity,
            delta,
        }),
        None => Err(BacktestError::ArithmeticOverflow("active liquidity")),
    }
}

impl FromConfig<PoolConfig> for PoolState {
    /// Builds the pool and seeds its tick map with the background ranges.
    ///
    /// # Errors
    ///
    /// Propagates [`PoolConfig::validate`] failures, and
    /// [`BacktestError::InvalidQuantity`] if a background range exceeds
    /// the per-tick liquidity cap.
    fn from_config(config: &PoolConfig) -> crate::error::Result<Self> {
        config.validate()?;
        let mut pool = Self {
            fee_tier: config.fee_tier(),
            tick_spacing: config.tick_spacing(),
            max_liquidity_per_tick: max_liquidity_per_tick(config.tick_spacing())?,
            sqrt_price: config.sqrt_price(),
            tick: config.tick(),
            liquidity: Liquidity::ZERO,
            fee_growth_global0: config.fee_growth_global0(),
            fee_growth_global1: config.fee_growth_global1(),
            ticks: TickMap::new(),
        };
        for range in config.background_ranges() {
            let delta = i128::try_from(range.liquidity().get()).map_err(|_| {
                BacktestError::InvalidQuantity("background liquidity exceeds i128")
            })?;
            pool.update_liquidity(range.tick_lower(), range.tick_upper(), delta)?;
        }
        debug!(
            tick = %pool.tick,
            liquidity = %pool.liquidity,
            initialized_ticks = pool.ticks.len(),
            "pool created"
        );
        Ok(pool)
    }
}

impl PoolState {
    /// Returns the fee tier.
    #[must_use]
    pub const fn fee_tier(&self) -> FeeTier {
        self.fee_tier
    }

    /// Returns the tick spacing.
    #[must_use]
    pub const fn tick_spacing(&self) -> u32 {
        self.tick_spacing
    }

    /// Returns the largest `liquidity_gross` one tick may hold.
    #[must_use]
    pub const fn max_liquidity_per_tick(&self) -> Liquidity {
        self.max_liquidity_per_tick
    }

    /// Returns the current sqrt price.
    #[must_use]
    pub const fn sqrt_price(&self) -> SqrtPriceX96 {
        self.sqrt_price
    }

    /// Returns the current tick.
    #[must_use]
    pub const fn tick(&self) -> Tick {
        self.tick
    }

    /// Returns the active liquidity.
    #[must_use]
    pub const fn liquidity(&self) -> Liquidity {
        self.liquidity
    }

    /// Returns the token0 fee-growth accumulator.
    #[must_use]
    pub const fn fee_growth_global0(&self) -> FeeGrowth {
        self.fee_growth_global0
    }

    /// Returns the token1 fee-growth accumulator.
    #[must_use]
    pub const fn fee_growth_global1(&self) -> FeeGrowth {
        self.fee_growth_global1
    }

    /// Returns the tick map.
    #[must_use]
    pub const fn ticks(&self) -> &TickMap {
        &self.ticks
    }

    /// Returns a copy of the pool-level state.
    #[must_use]
    pub const fn snapshot(&self) -> PoolSnapshot {
        PoolSnapshot {
            sqrt_price: self.sqrt_price,
            tick: self.tick,
            liquidity: self.liquidity,
            fee_growth_global0: self.fee_growth_global0,
            fee_growth_global1: self.fee_growth_global1,
        }
    }

    /// Fee growth accrued inside `[tick_lower, tick_upper)` as of now.
    ///
    /// # Errors
    ///
    /// Returns [`BacktestError::InvalidTickRange`] if
    /// `tick_lower >= tick_upper`.
    pub fn fee_growth_inside(
        &self,
        tick_lower: Tick,
        tick_upper: Tick,
    ) -> crate::error::Result<(FeeGrowth, FeeGrowth)> {
        get_fee_growth_inside(
            tick_lower,
            tick_upper,
            self.tick,
            self.fee_growth_global0,
            self.fee_growth_global1,
            &self.ticks.info(tick_lower),
            &self.ticks.info(tick_upper),
        )
    }

    /// Adds `liquidity_delta` to the range `[tick_lower, tick_upper)`.
    ///
    /// Updates both boundary ticks and, when the range contains the
    /// current tick, active liquidity. Boundaries whose gross liquidity
    /// returns to zero are removed from the tick map. Nothing is written
    /// unless every check passes.
    ///
    /// # Errors
    ///
    /// - [`BacktestError::InvalidTickRange`] if the range is inverted or
    ///   not aligned to the tick spacing.
    /// - [`BacktestError::LiquidityUnderflow`] if a boundary or active
    ///   liquidity would go negative.
    /// - [`BacktestError::InvalidQuantity`] if a boundary would exceed
    ///   the per-tick cap.
    pub fn update_liquidity(
        &mut self,
        tick_lower: Tick,
        tick_upper: Tick,
        liquidity_delta: i128,
    ) -> crate::error::Result<()> {
        if tick_lower >= tick_upper {
            return Err(BacktestError::InvalidTickRange(
                "lower tick must be less than upper tick",
            ));
        }
        if !tick_lower.is_aligned(self.tick_spacing) || !tick_upper.is_aligned(self.tick_spacing)
        {
            return Err(BacktestError::InvalidTickRange(
                "ticks must be aligned to tick spacing",
            ));
        }
        if liquidity_delta == 0 {
            return Ok(());
        }

        let (lower, lower_flipped) = self.ticks.updated(
            tick_lower,
            self.tick,
            liquidity_delta,
            self.fee_growth_global0,
            self.fee_growth_global1,
            false,
            self.max_liquidity_per_tick,
        )?;
        let (upper, upper_flipped) = self.ticks.updated(
            tick_upper,
            self.tick,
            liquidity_delta,
            self.fee_growth_global0,
            self.fee_growth_global1,
            true,
            self.max_liquidity_per_tick,
        )?;
        let in_range = tick_lower <= self.tick && self.tick < tick_upper;
        let liquidity = if in_range {
            apply_liquidity_delta(self.liquidity, liquidity_delta, self.tick)?
        } else {
            self.liquidity
        };

        self.ticks.set(tick_lower, lower);
        self.ticks.set(tick_upper, upper);
        self.liquidity = liquidity;
        debug!(
            lower = %tick_lower,
            upper = %tick_upper,
            delta = liquidity_delta,
            lower_flipped,
            upper_flipped,
            active = %self.liquidity,
            "range liquidity updated"
        );
        Ok(())
    }

    /// Starts a plan from the current state.
    pub(super) fn plan(&self) -> Plan {
        Plan {
            sqrt_price: self.sqrt_price,
            tick: self.tick,
            liquidity: self.liquidity,
            fee_growth_global0: self.fee_growth_global0,
            fee_growth_global1: self.fee_growth_global1,
            crossings: Vec::new(),
        }
    }

    /// Writes a plan back, flipping every crossed tick in order.
    pub(super) fn commit(&mut self, plan: Plan) {
        for crossing in &plan.crossings {
            let net = self.ticks.cross(
                crossing.tick,
                crossing.fee_growth_global0,
                crossing.fee_growth_global1,
            );
            debug!(tick = %crossing.tick, liquidity_net = net, "tick crossed");
        }
        self.sqrt_price = plan.sqrt_price;
        self.tick = plan.tick;
        self.liquidity = plan.liquidity;
        self.fee_growth_global0 = plan.fee_growth_global0;
        self.fee_growth_global1 = plan.fee_growth_global1;
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use alloy_primitives::U256;

    use super::*;
    use crate::config::LiquidityRange;

    fn tick(v: i32) -> Tick {
        let Ok(t) = Tick::new(v) else {
            panic!("valid tick expected");
        };
        t
    }

    fn pool_at(v: i32) -> PoolState {
        let Ok(cfg) = PoolConfig::at_tick(FeeTier::TIER_0_30_PERCENT, tick(v)) else {
            panic!("expected Ok");
        };
        let Ok(pool) = PoolState::from_config(&cfg) else {
            panic!("expected Ok");
        };
        pool
    }

    // -- from_config ---------------------------------------------------------------

    #[test]
    fn from_config_empty() {
        let pool = pool_at(0);
        assert_eq!(pool.tick(), tick(0));
        assert_eq!(pool.sqrt_price().get(), U256::from(1u8) << 96);
        assert!(pool.liquidity().is_zero());
        assert!(pool.ticks().is_empty());
        assert_eq!(pool.tick_spacing(), 60);
    }

    #[test]
    fn from_config_seeds_background_ranges() {
        let Ok(base) = PoolConfig::at_tick(FeeTier::TIER_0_30_PERCENT, tick(0)) else {
            panic!("expected Ok");
        };
        let Ok(inside) = LiquidityRange::new(tick(-120), tick(120), Liquidity::new(1_000)) else {
            panic!("expected Ok");
        };
        let Ok(above) = LiquidityRange::new(tick(60), tick(180), Liquidity::new(400)) else {
            panic!("expected Ok");
        };
        let cfg = base
            .with_background_range(inside)
            .with_background_range(above)
            .with_liquidity(Liquidity::new(1_000));
        let Ok(pool) = PoolState::from_config(&cfg) else {
            panic!("expected Ok");
        };
        assert_eq!(pool.liquidity(), Liquidity::new(1_000));
        assert_eq!(pool.ticks().len(), 4);
        assert_eq!(pool.ticks().info(tick(60)).liquidity_net, 400);
        assert_eq!(pool.ticks().liquidity_net_sum(), Some(0));
    }

    #[test]
    fn from_config_rejects_inconsistent_liquidity() {
        let Ok(base) = PoolConfig::at_tick(FeeTier::TIER_0_30_PERCENT, tick(0)) else {
            panic!("expected Ok");
        };
        let cfg = base.with_liquidity(Liquidity::new(5));
        assert!(PoolState::from_config(&cfg).is_err());
    }

    // -- update_liquidity ------------------------------------------------------------

    #[test]
    fn update_in_range_moves_active_liquidity() {
        let mut pool = pool_at(0);
        assert!(pool.update_liquidity(tick(-60), tick(60), 1_000).is_ok());
        assert_eq!(pool.liquidity(), Liquidity::new(1_000));
        assert!(pool.update_liquidity(tick(-60), tick(60), -400).is_ok());
        assert_eq!(pool.liquidity(), Liquidity::new(600));
    }

    #[test]
    fn update_out_of_range_leaves_active_liquidity() {
        let mut pool = pool_at(0);
        assert!(pool.update_liquidity(tick(60), tick(120), 1_000).is_ok());
        assert!(pool.update_liquidity(tick(-120), tick(0), 1_000).is_ok());
        assert!(pool.liquidity().is_zero());
        assert_eq!(pool.ticks().len(), 4);
    }

    #[test]
    fn update_to_zero_removes_ticks() {
        let mut pool = pool_at(0);
        assert!(pool.update_liquidity(tick(-60), tick(60), 1_000).is_ok());
        assert!(pool.update_liquidity(tick(-60), tick(60), -1_000).is_ok());
        assert!(pool.ticks().is_empty());
        assert!(pool.liquidity().is_zero());
    }

    #[test]
    fn update_misaligned_rejected() {
        let mut pool = pool_at(0);
        let Err(e) = pool.update_liquidity(tick(-50), tick(60), 1) else {
            panic!("expected Err");
        };
        assert_eq!(
            e,
            BacktestError::InvalidTickRange("ticks must be aligned to tick spacing")
        );
    }

    #[test]
    fn update_inverted_rejected() {
        let mut pool = pool_at(0);
        assert!(pool.update_liquidity(tick(60), tick(60), 1).is_err());
        assert!(pool.update_liquidity(tick(120), tick(60), 1).is_err());
    }

    #[test]
    fn failed_update_writes_nothing() {
        let mut pool = pool_at(0);
        assert!(pool.update_liquidity(tick(-60), tick(60), 100).is_ok());
        assert!(pool.update_liquidity(tick(0), tick(60), 50).is_ok());
        let before = pool.clone();
        // lower tick -60 only holds 100
        let r = pool.update_liquidity(tick(-60), tick(60), -150);
        assert!(matches!(r, Err(BacktestError::LiquidityUnderflow { .. })));
        assert_eq!(pool, before);
    }

    #[test]
    fn update_over_cap_rejected() {
        let mut pool = pool_at(0);
        let cap = pool.max_liquidity_per_tick().get();
        let Ok(over) = i128::try_from(cap + 1) else {
            panic!("cap fits i128");
        };
        let r = pool.update_liquidity(tick(-60), tick(60), over);
        assert_eq!(
            r,
            Err(BacktestError::InvalidQuantity(
                "tick liquidity exceeds the per-tick maximum"
            ))
        );
    }

    // -- fee_growth_inside ---------------------------------------------------------

    #[test]
    fn fee_growth_inside_fresh_range_is_zero() {
        let mut pool = pool_at(0);
        assert!(pool.update_liquidity(tick(-60), tick(60), 10).is_ok());
        assert_eq!(
            pool.fee_growth_inside(tick(-60), tick(60)),
            Ok((FeeGrowth::ZERO, FeeGrowth::ZERO))
        );
    }

    #[test]
    fn snapshot_mirrors_state() {
        let pool = pool_at(-120);
        let snap = pool.snapshot();
        assert_eq!(snap.tick, pool.tick());
        assert_eq!(snap.sqrt_price, pool.sqrt_price());
        assert_eq!(snap.liquidity, pool.liquidity());
    }

    // -- plan ------------------------------------------------------------------------

    #[test]
    fn plan_credit_with_zero_liquidity_is_unattributed() {
        let pool = pool_at(0);
        let mut plan = pool.plan();
        assert_eq!(
            plan.credit_fee(SwapDirection::OneForZero, Amount::new(10)),
            Ok(false)
        );
        assert_eq!(plan.fee_growth_global1, FeeGrowth::ZERO);
    }

    #[test]
    fn plan_cross_underflow_names_tick() {
        let mut pool = pool_at(0);
        assert!(pool.update_liquidity(tick(-60), tick(60), 10).is_ok());
        let mut plan = pool.plan();
        plan.liquidity = Liquidity::new(5);
        let info = pool.ticks().info(tick(-60));
        let Err(e) = plan.cross(tick(-60), &info, SwapDirection::ZeroForOne) else {
            panic!("expected Err");
        };
        assert_eq!(
            e,
            BacktestError::LiquidityUnderflow {
                tick: tick(-60),
                liquidity: Liquidity::new(5),
                delta: -10,
            }
        );
    }
}
