//! Discrete price index for concentrated liquidity pools.

use core::fmt;

use crate::error::BacktestError;

/// Minimum valid tick index (Uniswap v3 standard).
const MIN_TICK: i32 = -887_272;

/// Maximum valid tick index (Uniswap v3 standard).
const MAX_TICK: i32 = 887_272;

/// A discrete price point in the concentrated liquidity model.
///
/// Follows the Uniswap v3 convention where price increases exponentially
/// with the tick index: `price = 1.0001^tick`. Valid tick indices range
/// from [`MIN`](Self::MIN) (`-887272`) to [`MAX`](Self::MAX) (`887272`).
///
/// # Examples
///
/// ```
/// use clmm_backtest::domain::Tick;
///
/// let tick = Tick::new(100);
/// assert!(tick.is_ok());
/// assert_eq!(tick.unwrap_or(Tick::ZERO).get(), 100);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(try_from = "i32", into = "i32")
)]
pub struct Tick(i32);

impl Tick {
    /// Minimum valid tick (`-887272`).
    pub const MIN: Self = Self(MIN_TICK);

    /// Maximum valid tick (`887272`).
    pub const MAX: Self = Self(MAX_TICK);

    /// Neutral tick where `price = 1.0001^0 = 1.0`.
    pub const ZERO: Self = Self(0);

    /// Creates a new `Tick` with range validation.
    ///
    /// # Errors
    ///
    /// Returns [`BacktestError::InvalidTick`] if `value` is outside
    /// the range `[-887272, 887272]`.
    pub const fn new(value: i32) -> crate::error::Result<Self> {
        if value < MIN_TICK || value > MAX_TICK {
            return Err(BacktestError::InvalidTick(
                "tick out of range [-887272, 887272]",
            ));
        }
        Ok(Self(value))
    }

    /// Returns the underlying `i32` tick index.
    #[must_use]
    pub const fn get(&self) -> i32 {
        self.0
    }

    /// Checked addition of a delta to this tick.
    ///
    /// Returns `None` if the result would be outside the valid tick range.
    #[must_use]
    pub const fn checked_add(&self, delta: i32) -> Option<Self> {
        match self.0.checked_add(delta) {
            Some(v) if v >= MIN_TICK && v <= MAX_TICK => Some(Self(v)),
            _ => None,
        }
    }

    /// Checked subtraction of a delta from this tick.
    ///
    /// Returns `None` if the result would be outside the valid tick range.
    #[must_use]
    pub const fn checked_sub(&self, delta: i32) -> Option<Self> {
        match self.0.checked_sub(delta) {
            Some(v) if v >= MIN_TICK && v <= MAX_TICK => Some(Self(v)),
            _ => None,
        }
    }

    /// Returns `true` if this tick is a multiple of `spacing`.
    ///
    /// A zero spacing never aligns.
    #[must_use]
    pub const fn is_aligned(&self, spacing: u32) -> bool {
        if spacing == 0 || spacing > i32::MAX as u32 {
            return false;
        }
        self.0 % (spacing as i32) == 0
    }
}

impl TryFrom<i32> for Tick {
    type Error = BacktestError;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Tick> for i32 {
    fn from(tick: Tick) -> Self {
        tick.0
    }
}

impl fmt::Display for Tick {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Tick({})", self.0)
    }
}
