//! Point-in-time view of a pool.

use core::fmt;

use crate::domain::{FeeGrowth, Liquidity, SqrtPriceX96, Tick};

/// The pool-level state after a trade, as handed to reporting.
///
/// Two replays of the same trades from the same configuration produce
/// equal snapshot sequences.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PoolSnapshot {
    /// Current Q64.96 sqrt price.
    pub sqrt_price: SqrtPriceX96,
    /// Current tick.
    pub tick: Tick,
    /// Liquidity active at `tick`.
    pub liquidity: Liquidity,
    /// Token0 fee growth per unit of liquidity.
    pub fee_growth_global0: FeeGrowth,
    /// Token1 fee growth per unit of liquidity.
    pub fee_growth_global1: FeeGrowth,
}

impl fmt::Display for PoolSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "PoolSnapshot(tick={}, sqrt_price={}, liquidity={})",
            self.tick, self.sqrt_price, self.liquidity
        )
    }
}
