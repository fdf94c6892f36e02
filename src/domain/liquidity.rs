//! Liquidity units for concentrated positions.

use core::fmt;

/// Liquidity units in a concentrated position or active at a tick.
///
/// This is distinct from [`Amount`](super::Amount) because it measures
/// the depth available in a price range (`L = √(x·y)`), not a token
/// quantity. All `u128` values are valid liquidity amounts; liquidity is
/// never negative.
///
/// # Examples
///
/// ```
/// use clmm_backtest::domain::Liquidity;
///
/// let a = Liquidity::new(1_000);
/// assert_eq!(a.checked_apply_delta(-400), Some(Liquidity::new(600)));
/// assert_eq!(a.checked_apply_delta(-1_001), None);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(transparent)
)]
pub struct Liquidity(u128);

impl Liquidity {
    /// No liquidity.
    pub const ZERO: Self = Self(0);

    /// Creates a new `Liquidity` from a raw `u128` value.
    pub const fn new(value: u128) -> Self {
        Self(value)
    }

    /// Returns the underlying `u128` value.
    #[must_use]
    pub const fn get(&self) -> u128 {
        self.0
    }

    /// Returns `true` if the liquidity is zero.
    #[must_use]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Checked addition. Returns `None` on overflow.
    #[must_use]
    pub const fn checked_add(&self, other: &Self) -> Option<Self> {
        match self.0.checked_add(other.0) {
            Some(v) => Some(Self(v)),
            None => None,
        }
    }

    /// Checked subtraction. Returns `None` on underflow.
    #[must_use]
    pub const fn checked_sub(&self, other: &Self) -> Option<Self> {
        match self.0.checked_sub(other.0) {
            Some(v) => Some(Self(v)),
            None => None,
        }
    }

    /// Applies a signed delta (`liquidity_net` or a position adjustment).
    ///
    /// Returns `None` if the result would be negative or overflow.
    #[must_use]
    pub const fn checked_apply_delta(&self, delta: i128) -> Option<Self> {
        if delta >= 0 {
            match self.0.checked_add(delta.unsigned_abs()) {
                Some(v) => Some(Self(v)),
                None => None,
            }
        } else {
            match self.0.checked_sub(delta.unsigned_abs()) {
                Some(v) => Some(Self(v)),
                None => None,
            }
        }
    }
}

impl fmt::Display for Liquidity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
