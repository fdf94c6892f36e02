//! Raw token amount with checked arithmetic.

use core::fmt;

/// A raw token amount in the smallest unit (wei or equivalent).
///
/// `Amount` never interprets decimals. All `u128` values are valid
/// amounts; arithmetic is checked and returns `None` on overflow or
/// underflow instead of panicking.
///
/// # Examples
///
/// ```
/// use clmm_backtest::domain::Amount;
///
/// let a = Amount::new(100);
/// let b = Amount::new(200);
/// assert_eq!(a.checked_add(&b), Some(Amount::new(300)));
/// assert_eq!(b.checked_sub(&a), Some(Amount::new(100)));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(transparent)
)]
#[must_use]
pub struct Amount(u128);

impl Amount {
    /// Zero amount.
    pub const ZERO: Self = Self(0);

    /// Maximum representable amount.
    pub const MAX: Self = Self(u128::MAX);

    /// Creates a new `Amount` from a raw `u128` value.
    pub const fn new(value: u128) -> Self {
        Self(value)
    }

    /// Returns the underlying `u128` value.
    #[must_use]
    pub const fn get(&self) -> u128 {
        self.0
    }

    /// Returns `true` if the amount is zero.
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

    /// Returns the smaller of two amounts.
    pub const fn min(self, other: Self) -> Self {
        if self.0 <= other.0 {
            self
        } else {
            other
        }
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn constants() {
        assert_eq!(Amount::ZERO.get(), 0);
        assert_eq!(Amount::MAX.get(), u128::MAX);
        assert_eq!(Amount::default(), Amount::ZERO);
    }

    #[test]
    fn add_overflow() {
        assert_eq!(Amount::MAX.checked_add(&Amount::new(1)), None);
    }

    #[test]
    fn sub_underflow() {
        assert_eq!(Amount::new(1).checked_sub(&Amount::new(2)), None);
        assert_eq!(Amount::new(2).checked_sub(&Amount::new(2)), Some(Amount::ZERO));
    }

    #[test]
    fn min_picks_smaller() {
        assert_eq!(Amount::new(3).min(Amount::new(7)), Amount::new(3));
        assert_eq!(Amount::new(7).min(Amount::new(3)), Amount::new(3));
    }

    #[test]
    fn display() {
        assert_eq!(format!("{}", Amount::new(1_000)), "1000");
    }
}
