//! Swap direction.

use core::fmt;

/// Which token a swap takes in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SwapDirection {
    /// Token0 in, token1 out. The price (token1 per token0) falls.
    ZeroForOne,
    /// Token1 in, token0 out. The price rises.
    OneForZero,
}

impl SwapDirection {
    /// Returns `true` if token0 is the input.
    #[must_use]
    pub const fn is_zero_for_one(&self) -> bool {
        matches!(self, Self::ZeroForOne)
    }

    /// Returns the opposite direction.
    #[must_use]
    pub const fn reversed(&self) -> Self {
        match self {
            Self::ZeroForOne => Self::OneForZero,
            Self::OneForZero => Self::ZeroForOne,
        }
    }
}

impl fmt::Display for SwapDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ZeroForOne => write!(f, "ZeroForOne"),
            Self::OneForZero => write!(f, "OneForZero"),
        }
    }
}
