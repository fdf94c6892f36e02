//! Position key: owner plus tick range.

use core::fmt;

use super::{Owner, Tick};
use crate::error::BacktestError;

/// Unique key of a position: one owner, one half-open tick range.
///
/// # Invariants
///
/// `tick_lower < tick_upper`.
///
/// # Examples
///
/// ```
/// use clmm_backtest::domain::{Owner, PositionId, Tick};
///
/// let lower = Tick::new(-60).unwrap_or(Tick::ZERO);
/// let upper = Tick::new(60).unwrap_or(Tick::ZERO);
/// let id = PositionId::new(Owner::new([1; 20]), lower, upper);
/// assert!(id.is_ok());
/// assert!(PositionId::new(Owner::new([1; 20]), upper, lower).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct PositionId {
    owner: Owner,
    tick_lower: Tick,
    tick_upper: Tick,
}

impl PositionId {
    /// Creates a key with validated tick ordering.
    ///
    /// # Errors
    ///
    /// Returns [`BacktestError::InvalidTickRange`] if
    /// `tick_lower >= tick_upper`.
    pub const fn new(
        owner: Owner,
        tick_lower: Tick,
        tick_upper: Tick,
    ) -> crate::error::Result<Self> {
        if tick_lower.get() >= tick_upper.get() {
            return Err(BacktestError::InvalidTickRange(
                "lower tick must be less than upper tick",
            ));
        }
        Ok(Self {
            owner,
            tick_lower,
            tick_upper,
        })
    }

    /// Returns the owning account.
    #[must_use]
    pub const fn owner(&self) -> Owner {
        self.owner
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
}

impl fmt::Display for PositionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}[{}, {})",
            self.owner,
            self.tick_lower.get(),
            self.tick_upper.get()
        )
    }
}
