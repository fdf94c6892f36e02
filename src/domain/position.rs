//! Concentrated liquidity position with fee-accrual snapshots.

use core::fmt;

use super::{Amount, FeeGrowth, Liquidity, Tick};
use crate::error::BacktestError;

/// A liquidity provider's position over the half-open range
/// `[tick_lower, tick_upper)`.
///
/// Opens with zero liquidity; liquidity changes only through the ledger.
/// `tokens_owed0/1` grow with every accrual and only decrease when the
/// owner collects. `fee_growth_inside{0,1}_last` hold the inside growth
/// observed at the previous accrual.
///
/// # Invariants
///
/// - `tick_lower < tick_upper`.
///
/// # Examples
///
/// ```
/// use clmm_backtest::domain::{Tick, V3LPPosition};
///
/// let lower = Tick::new(-100).unwrap_or(Tick::ZERO);
/// let upper = Tick::new(100).unwrap_or(Tick::ZERO);
/// let Ok(pos) = V3LPPosition::new(lower, upper) else { return };
/// assert!(pos.is_in_range(Tick::ZERO));
/// assert!(!pos.is_in_range(upper));
/// assert!(pos.liquidity().is_zero());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct V3LPPosition {
    tick_lower: Tick,
    tick_upper: Tick,
    liquidity: Liquidity,
    tokens_owed0: Amount,
    tokens_owed1: Amount,
    fee_growth_inside0_last: FeeGrowth,
    fee_growth_inside1_last: FeeGrowth,
}

impl V3LPPosition {
    /// Creates an empty position over `[tick_lower, tick_upper)`.
    ///
    /// # Errors
    ///
    /// Returns [`BacktestError::InvalidTickRange`] if
    /// `tick_lower >= tick_upper`.
    pub const fn new(tick_lower: Tick, tick_upper: Tick) -> crate::error::Result<Self> {
        if tick_lower.get() >= tick_upper.get() {
            return Err(BacktestError::InvalidTickRange(
                "lower tick must be less than upper tick",
            ));
        }
        Ok(Self {
            tick_lower,
            tick_upper,
            liquidity: Liquidity::ZERO,
            tokens_owed0: Amount::ZERO,
            tokens_owed1: Amount::ZERO,
            fee_growth_inside0_last: FeeGrowth::ZERO,
            fee_growth_inside1_last: FeeGrowth::ZERO,
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

    /// Returns the liquidity currently held.
    #[must_use]
    pub const fn liquidity(&self) -> Liquidity {
        self.liquidity
    }

    /// Returns uncollected token0 fees.
    pub const fn tokens_owed0(&self) -> Amount {
        self.tokens_owed0
    }

    /// Returns uncollected token1 fees.
    pub const fn tokens_owed1(&self) -> Amount {
        self.tokens_owed1
    }

    /// Token0 fee growth inside the range at the last accrual.
    #[must_use]
    pub const fn fee_growth_inside0_last(&self) -> FeeGrowth {
        self.fee_growth_inside0_last
    }

    /// Token1 fee growth inside the range at the last accrual.
    #[must_use]
    pub const fn fee_growth_inside1_last(&self) -> FeeGrowth {
        self.fee_growth_inside1_last
    }

    /// Returns `true` if `lower <= current_tick < upper`.
    #[must_use]
    pub const fn is_in_range(&self, current_tick: Tick) -> bool {
        current_tick.get() >= self.tick_lower.get() && current_tick.get() < self.tick_upper.get()
    }

    /// Returns `true` if the position holds no liquidity and no owed tokens.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.liquidity.is_zero() && self.tokens_owed0.is_zero() && self.tokens_owed1.is_zero()
    }

    /// Credits earned fees and moves the inside-growth snapshots forward.
    pub(crate) fn credit(
        &mut self,
        earned: (Amount, Amount),
        inside: (FeeGrowth, FeeGrowth),
    ) -> crate::error::Result<()> {
        let owed0 = self
            .tokens_owed0
            .checked_add(&earned.0)
            .ok_or(BacktestError::ArithmeticOverflow("tokens owed0"))?;
        let owed1 = self
            .tokens_owed1
            .checked_add(&earned.1)
            .ok_or(BacktestError::ArithmeticOverflow("tokens owed1"))?;
        self.tokens_owed0 = owed0;
        self.tokens_owed1 = owed1;
        self.fee_growth_inside0_last = inside.0;
        self.fee_growth_inside1_last = inside.1;
        Ok(())
    }

    pub(crate) fn set_liquidity(&mut self, liquidity: Liquidity) {
        self.liquidity = liquidity;
    }

    /// Pays out up to `max0`/`max1` of the owed tokens.
    pub(crate) fn take_owed(&mut self, max0: Amount, max1: Amount) -> (Amount, Amount) {
        let paid0 = self.tokens_owed0.min(max0);
        let paid1 = self.tokens_owed1.min(max1);
        // paid <= owed by construction
        self.tokens_owed0 = Amount::new(self.tokens_owed0.get() - paid0.get());
        self.tokens_owed1 = Amount::new(self.tokens_owed1.get() - paid1.get());
        (paid0, paid1)
    }
}

impl fmt::Display for V3LPPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "V3LPPosition([{}, {}), liquidity={}, owed=({}, {}))",
            self.tick_lower.get(),
            self.tick_upper.get(),
            self.liquidity,
            self.tokens_owed0,
            self.tokens_owed1
        )
    }
}
