//! Q128.128 fee-growth accumulator value.

use core::fmt;

use alloy_primitives::U256;

/// Fees earned per unit of liquidity, as an unsigned Q128.128 number.
///
/// Global accumulators only grow and use [`checked_add`](Self::checked_add).
/// Outside and inside values are differences of accumulators taken at
/// different times and are computed modulo 2²⁵⁶ with
/// [`wrapping_sub`](Self::wrapping_sub); the difference of two such
/// values is still exact as long as the true growth fits in 256 bits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(transparent)
)]
pub struct FeeGrowth(U256);

impl FeeGrowth {
    /// No fee growth.
    pub const ZERO: Self = Self(U256::ZERO);

    /// Wraps a raw Q128.128 value.
    #[must_use]
    pub const fn new(value: U256) -> Self {
        Self(value)
    }

    /// Returns the raw Q128.128 value.
    #[must_use]
    pub const fn get(&self) -> U256 {
        self.0
    }

    /// Checked addition. Returns `None` on overflow.
    #[must_use]
    pub fn checked_add(&self, other: &Self) -> Option<Self> {
        self.0.checked_add(other.0).map(Self)
    }

    /// Modular subtraction.
    #[must_use]
    pub fn wrapping_sub(&self, other: &Self) -> Self {
        Self(self.0.wrapping_sub(other.0))
    }
}

impl fmt::Display for FeeGrowth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_overflows_to_none() {
        let max = FeeGrowth::new(U256::MAX);
        assert_eq!(max.checked_add(&FeeGrowth::new(U256::from(1u8))), None);
    }

    #[test]
    fn wrapping_sub_recovers_difference_across_wrap() {
        let before = FeeGrowth::new(U256::MAX - U256::from(9u8));
        let after = FeeGrowth::new(U256::from(5u8));
        assert_eq!(after.wrapping_sub(&before).get(), U256::from(15u8));
    }
}
