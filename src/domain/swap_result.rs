//! Outcome of a simulated swap.

use core::fmt;

use super::{Amount, SwapDirection};

/// Amounts exchanged by [`PoolState::swap`](crate::pool::PoolState::swap).
///
/// `amount_in` is gross (fee included) and `fee <= amount_in`. When the
/// price limit stops the swap early, the amounts reflect only the part
/// that executed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct SwapResult {
    direction: SwapDirection,
    amount_in: Amount,
    amount_out: Amount,
    fee: Amount,
    ticks_crossed: u32,
}

impl SwapResult {
    pub(crate) const fn new(
        direction: SwapDirection,
        amount_in: Amount,
        amount_out: Amount,
        fee: Amount,
        ticks_crossed: u32,
    ) -> Self {
        Self {
            direction,
            amount_in,
            amount_out,
            fee,
            ticks_crossed,
        }
    }

    /// Returns the swap direction.
    #[must_use]
    pub const fn direction(&self) -> SwapDirection {
        self.direction
    }

    /// Returns the gross input consumed.
    pub const fn amount_in(&self) -> Amount {
        self.amount_in
    }

    /// Returns the output paid out.
    pub const fn amount_out(&self) -> Amount {
        self.amount_out
    }

    /// Returns the fee charged, part of `amount_in`.
    pub const fn fee(&self) -> Amount {
        self.fee
    }

    /// Returns how many initialized ticks the swap crossed.
    #[must_use]
    pub const fn ticks_crossed(&self) -> u32 {
        self.ticks_crossed
    }
}

impl fmt::Display for SwapResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "SwapResult({}, in={}, out={}, fee={}, crossed={})",
            self.direction, self.amount_in, self.amount_out, self.fee, self.ticks_crossed
        )
    }
}
