//! Per-tick bookkeeping record.

use super::{FeeGrowth, Liquidity};

/// State held for one initialized tick.
///
/// `liquidity_net` is added to active liquidity when the price crosses
/// the tick upward and subtracted when it crosses downward.
/// `liquidity_gross` is the total liquidity of every range that uses the
/// tick as a boundary; a tick is initialized iff it is non-zero.
/// `fee_growth_outside{0,1}` hold the growth on the side of the tick
/// away from the current price, relative to the last crossing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TickInfo {
    /// Total liquidity referencing this tick.
    pub liquidity_gross: Liquidity,
    /// Signed liquidity change applied on an upward crossing.
    pub liquidity_net: i128,
    /// Token0 fee growth on the far side of this tick.
    pub fee_growth_outside0: FeeGrowth,
    /// Token1 fee growth on the far side of this tick.
    pub fee_growth_outside1: FeeGrowth,
}

impl TickInfo {
    /// Returns `true` if any range references this tick.
    #[must_use]
    pub const fn is_initialized(&self) -> bool {
        !self.liquidity_gross.is_zero()
    }
}
