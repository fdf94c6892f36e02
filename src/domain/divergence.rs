//! Disagreements between a replayed trade and its record.

use core::fmt;

use super::{Liquidity, SwapDirection, Tick};

/// One way a replayed trade disagreed with what the chain recorded.
///
/// Recorded values stay authoritative: the pool adopts the recorded price
/// and the simulated crossings whatever the divergence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum Divergence {
    /// The tick derived from the recorded price differs from the recorded
    /// tick by more than the configured tolerance.
    TickMismatch {
        /// Tick recorded on the trade.
        recorded: Tick,
        /// Tick the replay settled on.
        simulated: Tick,
    },
    /// Active liquidity after the crossings differs from the record.
    LiquidityMismatch {
        /// Liquidity recorded on the trade.
        recorded: Liquidity,
        /// Liquidity the replay settled on.
        simulated: Liquidity,
    },
    /// The token paid in disagrees with the price movement.
    DirectionMismatch {
        /// Direction implied by the recorded token flows.
        recorded: SwapDirection,
        /// Direction implied by the price movement.
        simulated: SwapDirection,
    },
}

impl fmt::Display for Divergence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TickMismatch {
                recorded,
                simulated,
            } => write!(f, "tick recorded {recorded}, simulated {simulated}"),
            Self::LiquidityMismatch {
                recorded,
                simulated,
            } => write!(f, "liquidity recorded {recorded}, simulated {simulated}"),
            Self::DirectionMismatch {
                recorded,
                simulated,
            } => write!(f, "direction recorded {recorded}, price moved {simulated}"),
        }
    }
}
