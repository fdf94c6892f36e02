//! Q64.96 square-root price.

use core::fmt;

use alloy_primitives::U256;

use crate::error::BacktestError;

/// `√(token1 / token0)` encoded as an unsigned Q64.96 fixed-point number.
///
/// Valid values lie in `[MIN, MAX]`, the prices of [`Tick::MIN`] and
/// [`Tick::MAX`](super::Tick::MAX). Floating point is never used to
/// derive or compare prices.
///
/// [`Tick::MIN`]: super::Tick::MIN
///
/// # Examples
///
/// ```
/// use alloy_primitives::U256;
/// use clmm_backtest::domain::SqrtPriceX96;
///
/// // price 1.0
/// let one = SqrtPriceX96::new(U256::from(1u8) << 96);
/// assert!(one.is_ok());
/// assert!(SqrtPriceX96::new(U256::ZERO).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(try_from = "U256", into = "U256")
)]
pub struct SqrtPriceX96(U256);

impl SqrtPriceX96 {
    /// Price at the minimum tick, `4295128739`.
    pub const MIN: Self = Self(U256::from_limbs([4_295_128_739, 0, 0, 0]));

    /// Price at the maximum tick,
    /// `1461446703485210103287273052203988822378723970342`.
    pub const MAX: Self = Self(U256::from_limbs([
        0x5d95_1d52_6398_8d26,
        0xefd1_fc6a_5064_8849,
        0xfffd_8963,
        0,
    ]));

    /// Creates a validated sqrt price.
    ///
    /// # Errors
    ///
    /// Returns [`BacktestError::InvalidSqrtPrice`] if `value` lies outside
    /// `[MIN, MAX]`.
    pub fn new(value: U256) -> crate::error::Result<Self> {
        if value < Self::MIN.0 || value > Self::MAX.0 {
            return Err(BacktestError::InvalidSqrtPrice(
                "sqrt price outside the tick range",
            ));
        }
        Ok(Self(value))
    }

    /// Returns the raw Q64.96 value.
    #[must_use]
    pub const fn get(&self) -> U256 {
        self.0
    }
}

impl TryFrom<U256> for SqrtPriceX96 {
    type Error = BacktestError;

    fn try_from(value: U256) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<SqrtPriceX96> for U256 {
    fn from(price: SqrtPriceX96) -> Self {
        price.0
    }
}

impl fmt::Display for SqrtPriceX96 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
