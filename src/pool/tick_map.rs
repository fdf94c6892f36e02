//! Sparse map of initialized ticks.

use std::collections::BTreeMap;
use std::ops::Bound;

use crate::domain::{FeeGrowth, Liquidity, SwapDirection, Tick, TickInfo};
use crate::error::BacktestError;

/// Largest `liquidity_gross` a single tick may hold for `tick_spacing`.
///
/// Spreads `u128::MAX` evenly over every usable tick so active liquidity
/// cannot overflow even if every tick were initialized at the cap.
///
/// # Errors
///
/// Returns [`BacktestError::InvalidConfiguration`] if `tick_spacing` is
/// zero or does not fit an `i32`.
pub fn max_liquidity_per_tick(tick_spacing: u32) -> crate::error::Result<Liquidity> {
    let spacing = i32::try_from(tick_spacing)
        .ok()
        .filter(|s| *s > 0)
        .ok_or(BacktestError::InvalidConfiguration(
            "tick spacing must be positive",
        ))?;
    let min_tick = (Tick::MIN.get() / spacing) * spacing;
    let max_tick = (Tick::MAX.get() / spacing) * spacing;
    let num_ticks = u128::from((max_tick - min_tick).unsigned_abs() / tick_spacing) + 1;
    Ok(Liquidity::new(u128::MAX / num_ticks))
}

/// Initialized ticks keyed by index.
///
/// A tick is present iff its `liquidity_gross` is non-zero. Ordering is
/// by tick index only, so crossing order never depends on the order in
/// which ranges were added.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct TickMap {
    ticks: BTreeMap<Tick, TickInfo>,
}

impl TickMap {
    /// Creates an empty map.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            ticks: BTreeMap::new(),
        }
    }

    /// Returns the state of `tick` if it is initialized.
    #[must_use]
    pub fn get(&self, tick: Tick) -> Option<&TickInfo> {
        self.ticks.get(&tick)
    }

    /// Returns the state of `tick`, zeroed if it is not initialized.
    #[must_use]
    pub fn info(&self, tick: Tick) -> TickInfo {
        self.ticks.get(&tick).copied().unwrap_or_default()
    }

    /// Returns the entry for `tick`, inserting a zeroed one if absent.
    ///
    /// A zeroed entry left in the map is removed by the next
    /// [`set`](Self::set) of that tick.
    pub fn get_or_init(&mut self, tick: Tick) -> &mut TickInfo {
        self.ticks.entry(tick).or_default()
    }

    /// Returns `true` if `tick` is initialized.
    #[must_use]
    pub fn is_initialized(&self, tick: Tick) -> bool {
        self.ticks.get(&tick).is_some_and(TickInfo::is_initialized)
    }

    /// Number of initialized ticks.
    #[must_use]
    pub fn len(&self) -> usize {
        self.ticks.len()
    }

    /// Returns `true` if no tick is initialized.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ticks.is_empty()
    }

    /// Iterates over initialized ticks in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = (Tick, &TickInfo)> + '_ {
        self.ticks.iter().map(|(tick, info)| (*tick, info))
    }

    /// Sum of `liquidity_net` over every initialized tick.
    ///
    /// Zero whenever every range added has been added at both of its
    /// boundaries. `None` if the sum overflows `i128`.
    #[must_use]
    pub fn liquidity_net_sum(&self) -> Option<i128> {
        self.ticks
            .values()
            .try_fold(0i128, |sum, info| sum.checked_add(info.liquidity_net))
    }

    /// Computes the state `tick` would have after a range using it as a
    /// boundary changes by `liquidity_delta`, without writing it.
    ///
    /// Returns the new state and whether the tick flips between
    /// initialized and uninitialized. A tick initialized at or below
    /// `current_tick` starts with all growth so far counted as outside.
    ///
    /// # Errors
    ///
    /// - [`BacktestError::LiquidityUnderflow`] if `liquidity_gross` would
    ///   go negative.
    /// - [`BacktestError::InvalidQuantity`] if `liquidity_gross` would
    ///   exceed `max_liquidity`.
    /// - [`BacktestError::ArithmeticOverflow`] if `liquidity_net`
    ///   overflows.
    #[allow(clippy::too_many_arguments)]
    pub fn updated(
        &self,
        tick: Tick,
        current_tick: Tick,
        liquidity_delta: i128,
        fee_growth_global0: FeeGrowth,
        fee_growth_global1: FeeGrowth,
        is_upper: bool,
        max_liquidity: Liquidity,
    ) -> crate::error::Result<(TickInfo, bool)> {
        let mut info = self.info(tick);
        let gross_before = info.liquidity_gross;
        let gross_after = gross_before.checked_apply_delta(liquidity_delta).ok_or(
            BacktestError::LiquidityUnderflow {
                tick,
                liquidity: gross_before,
                delta: liquidity_delta,
            },
        )?;
        if gross_after > max_liquidity {
            return Err(BacktestError::InvalidQuantity(
                "tick liquidity exceeds the per-tick maximum",
            ));
        }

        let flipped = gross_after.is_zero() != gross_before.is_zero();
        if gross_before.is_zero() && tick <= current_tick {
            info.fee_growth_outside0 = fee_growth_global0;
            info.fee_growth_outside1 = fee_growth_global1;
        }

        info.liquidity_gross = gross_after;
        info.liquidity_net = if is_upper {
            info.liquidity_net.checked_sub(liquidity_delta)
        } else {
            info.liquidity_net.checked_add(liquidity_delta)
        }
        .ok_or(BacktestError::ArithmeticOverflow("tick liquidity net"))?;

        Ok((info, flipped))
    }

    /// Writes the state of `tick`, removing the entry when no liquidity
    /// references it.
    pub fn set(&mut self, tick: Tick, info: TickInfo) {
        if info.is_initialized() {
            self.ticks.insert(tick, info);
        } else {
            self.ticks.remove(&tick);
        }
    }

    /// Applies a range's liquidity change at one of its boundaries.
    ///
    /// Returns `true` if the tick flipped between initialized and
    /// uninitialized; a tick whose gross liquidity returns to zero is
    /// removed.
    ///
    /// # Errors
    ///
    /// Same as [`updated`](Self::updated); the map is unchanged on error.
    #[allow(clippy::too_many_arguments)]
    pub fn update(
        &mut self,
        tick: Tick,
        current_tick: Tick,
        liquidity_delta: i128,
        fee_growth_global0: FeeGrowth,
        fee_growth_global1: FeeGrowth,
        is_upper: bool,
        max_liquidity: Liquidity,
    ) -> crate::error::Result<bool> {
        let (info, flipped) = self.updated(
            tick,
            current_tick,
            liquidity_delta,
            fee_growth_global0,
            fee_growth_global1,
            is_upper,
            max_liquidity,
        )?;
        self.set(tick, info);
        Ok(flipped)
    }

    /// Crosses `tick`: flips its fee growth outside against the globals
    /// and returns its `liquidity_net`.
    ///
    /// Crossing an uninitialized tick is a no-op returning zero.
    pub fn cross(
        &mut self,
        tick: Tick,
        fee_growth_global0: FeeGrowth,
        fee_growth_global1: FeeGrowth,
    ) -> i128 {
        match self.ticks.get_mut(&tick) {
            Some(info) => {
                info.fee_growth_outside0 = fee_growth_global0.wrapping_sub(&info.fee_growth_outside0);
                info.fee_growth_outside1 = fee_growth_global1.wrapping_sub(&info.fee_growth_outside1);
                info.liquidity_net
            }
            None => 0,
        }
    }

    /// Nearest initialized tick the price meets moving in `direction`
    /// from `current_tick`.
    ///
    /// Moving down ([`SwapDirection::ZeroForOne`]) the price is at or
    /// above `current_tick`'s boundary, so the search includes
    /// `current_tick` itself. Moving up it is strictly above. `None` when
    /// no initialized tick lies that way; callers clamp to
    /// [`Tick::MIN`]/[`Tick::MAX`].
    #[must_use]
    pub fn next_initialized_tick(&self, current_tick: Tick, direction: SwapDirection) -> Option<Tick> {
        match direction {
            SwapDirection::ZeroForOne => self
                .ticks
                .range(..=current_tick)
                .next_back()
                .map(|(tick, _)| *tick),
            SwapDirection::OneForZero => self
                .ticks
                .range((Bound::Excluded(current_tick), Bound::Unbounded))
                .next()
                .map(|(tick, _)| *tick),
        }
    }
}
