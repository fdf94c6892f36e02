//! Initial state of a replayed pool.

use crate::domain::{FeeGrowth, FeeTier, Liquidity, SqrtPriceX96, Tick};
use crate::error::BacktestError;
use crate::math::{sqrt_price_to_tick, tick_to_sqrt_price};

/// Largest tick spacing a pool can be deployed with.
pub const MAX_TICK_SPACING: u32 = 16_384;

/// Liquidity in a range owned by LPs the ledger does not track.
///
/// Background ranges give the pool the depth it had on chain so that
/// tick crossings during replay apply the right `liquidity_net`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LiquidityRange {
    tick_lower: Tick,
    tick_upper: Tick,
    liquidity: Liquidity,
}

impl LiquidityRange {
    /// Creates a range.
    ///
    /// # Errors
    ///
    /// Returns [`BacktestError::InvalidTickRange`] if
    /// `tick_lower >= tick_upper`.
    pub const fn new(
        tick_lower: Tick,
        tick_upper: Tick,
        liquidity: Liquidity,
    ) -> crate::error::Result<Self> {
        if tick_lower.get() >= tick_upper.get() {
            return Err(BacktestError::InvalidTickRange(
                "lower tick must be less than upper tick",
            ));
        }
        Ok(Self {
            tick_lower,
            tick_upper,
            liquidity,
        })
    }

    /// Returns the inclusive lower tick.
    #[must_use]
    pub const fn tick_lower(&self) -> Tick {
        self.tick_lower
    }

    /// Returns the exclusive upper tick.
    #[must_use]
    pub const fn tick_upper(&self) -> Tick {
        self.tick_upper
    }

    /// Returns the range's liquidity.
    #[must_use]
    pub const fn liquidity(&self) -> Liquidity {
        self.liquidity
    }

    /// Returns `true` if `lower <= tick < upper`.
    #[must_use]
    pub const fn contains(&self, tick: Tick) -> bool {
        tick.get() >= self.tick_lower.get() && tick.get() < self.tick_upper.get()
    }
}

/// Initial parameters of a simulated pool.
///
/// # Validation
///
/// - `tick_spacing` must be in `1..=16384`.
/// - `tick` must be the tick of `sqrt_price`: the greatest tick whose
///   price is ≤ `sqrt_price`, or the one below it when `sqrt_price` sits
///   exactly on a tick (the state after a downward crossing).
/// - Every background range must be aligned to `tick_spacing`.
/// - `liquidity` must equal the sum of background ranges containing
///   `tick`.
///
/// # Examples
///
/// ```
/// use clmm_backtest::config::PoolConfig;
/// use clmm_backtest::domain::{FeeTier, Tick};
///
/// let config = PoolConfig::at_tick(FeeTier::TIER_0_30_PERCENT, Tick::ZERO);
/// let Ok(config) = config else { return };
/// assert_eq!(config.tick_spacing(), 60);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PoolConfig {
    fee_tier: FeeTier,
    tick_spacing: u32,
    sqrt_price: SqrtPriceX96,
    tick: Tick,
    #[cfg_attr(feature = "serde", serde(default))]
    liquidity: Liquidity,
    #[cfg_attr(feature = "serde", serde(default))]
    fee_growth_global0: FeeGrowth,
    #[cfg_attr(feature = "serde", serde(default))]
    fee_growth_global1: FeeGrowth,
    #[cfg_attr(feature = "serde", serde(default))]
    background_ranges: Vec<LiquidityRange>,
}

impl PoolConfig {
    /// Creates an empty pool configuration: no liquidity, zero fee growth.
    ///
    /// # Errors
    ///
    /// - [`BacktestError::InvalidConfiguration`] if `tick_spacing` is out
    ///   of range.
    /// - [`BacktestError::InvalidTick`] if `tick` does not match
    ///   `sqrt_price`.
    pub fn new(
        fee_tier: FeeTier,
        tick_spacing: u32,
        sqrt_price: SqrtPriceX96,
        tick: Tick,
    ) -> crate::error::Result<Self> {
        let config = Self {
            fee_tier,
            tick_spacing,
            sqrt_price,
            tick,
            liquidity: Liquidity::ZERO,
            fee_growth_global0: FeeGrowth::ZERO,
            fee_growth_global1: FeeGrowth::ZERO,
            background_ranges: Vec::new(),
        };
        config.validate()?;
        Ok(config)
    }

    /// Creates an empty pool priced exactly at `tick`, using the fee
    /// tier's standard tick spacing.
    ///
    /// # Errors
    ///
    /// Returns [`BacktestError::InvalidConfiguration`] if `fee_tier` has
    /// no standard spacing.
    pub fn at_tick(fee_tier: FeeTier, tick: Tick) -> crate::error::Result<Self> {
        let tick_spacing = fee_tier
            .standard_tick_spacing()
            .ok_or(BacktestError::InvalidConfiguration(
                "non-standard fee tier requires an explicit tick spacing",
            ))?;
        Self::new(fee_tier, tick_spacing, tick_to_sqrt_price(tick)?, tick)
    }

    /// Sets the initial active liquidity.
    #[must_use]
    pub fn with_liquidity(mut self, liquidity: Liquidity) -> Self {
        self.liquidity = liquidity;
        self
    }

    /// Sets the initial fee-growth accumulators.
    #[must_use]
    pub fn with_fee_growth(mut self, global0: FeeGrowth, global1: FeeGrowth) -> Self {
        self.fee_growth_global0 = global0;
        self.fee_growth_global1 = global1;
        self
    }

    /// Adds a background range. Active liquidity is not adjusted; call
    /// [`with_liquidity`](Self::with_liquidity) to match.
    #[must_use]
    pub fn with_background_range(mut self, range: LiquidityRange) -> Self {
        self.background_ranges.push(range);
        self
    }

    /// Validates all configuration invariants.
    ///
    /// # Errors
    ///
    /// - [`BacktestError::InvalidConfiguration`] if `tick_spacing` is out
    ///   of range, or `liquidity` disagrees with the background ranges.
    /// - [`BacktestError::InvalidTick`] if `tick` does not match
    ///   `sqrt_price`.
    /// - [`BacktestError::InvalidTickRange`] if a background range is not
    ///   aligned to `tick_spacing`.
    /// - [`BacktestError::ArithmeticOverflow`] if the background
    ///   liquidity at `tick` overflows.
    pub fn validate(&self) -> crate::error::Result<()> {
        if self.tick_spacing == 0 || self.tick_spacing > MAX_TICK_SPACING {
            return Err(BacktestError::InvalidConfiguration(
                "tick spacing must be in 1..=16384",
            ));
        }

        let floor_tick = sqrt_price_to_tick(self.sqrt_price)?;
        let on_boundary = self.tick.get() == floor_tick.get() - 1
            && tick_to_sqrt_price(floor_tick)? == self.sqrt_price;
        if self.tick != floor_tick && !on_boundary {
            return Err(BacktestError::InvalidTick(
                "tick does not match sqrt price",
            ));
        }

        let mut active = Liquidity::ZERO;
        for range in &self.background_ranges {
            if !range.tick_lower.is_aligned(self.tick_spacing)
                || !range.tick_upper.is_aligned(self.tick_spacing)
            {
                return Err(BacktestError::InvalidTickRange(
                    "background range must be aligned to tick spacing",
                ));
            }
            if range.contains(self.tick) {
                active = active
                    .checked_add(&range.liquidity)
                    .ok_or(BacktestError::ArithmeticOverflow("background liquidity"))?;
            }
        }
        if active != self.liquidity {
            return Err(BacktestError::InvalidConfiguration(
                "liquidity must equal the background ranges active at the initial tick",
            ));
        }
        Ok(())
    }

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

    /// Returns the initial sqrt price.
    #[must_use]
    pub const fn sqrt_price(&self) -> SqrtPriceX96 {
        self.sqrt_price
    }

    /// Returns the initial tick.
    #[must_use]
    pub const fn tick(&self) -> Tick {
        self.tick
    }

    /// Returns the initial active liquidity.
    #[must_use]
    pub const fn liquidity(&self) -> Liquidity {
        self.liquidity
    }

    /// Returns the initial token0 fee growth.
    #[must_use]
    pub const fn fee_growth_global0(&self) -> FeeGrowth {
        self.fee_growth_global0
    }

    /// Returns the initial token1 fee growth.
    #[must_use]
    pub const fn fee_growth_global1(&self) -> FeeGrowth {
        self.fee_growth_global1
    }

    /// Returns the background ranges.
    #[must_use]
    pub fn background_ranges(&self) -> &[LiquidityRange] {
        &self.background_ranges
    }
}
