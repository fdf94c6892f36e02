//! Pool fee tiers expressed in pips.

use core::fmt;

use super::{Amount, BasisPoints};
use crate::error::BacktestError;

/// Fee denominator: one pip is one millionth of the swapped amount.
pub const PIPS_DENOMINATOR: u32 = 1_000_000;

/// The swap fee charged by a pool, fixed at pool construction.
///
/// Stored in pips (hundredths of a basis point) so that every tier used
/// on-chain is represented exactly: 0.30% is `3_000` pips, 0.05% is `500`.
/// A fee must be strictly below 100%.
///
/// The four standard tiers carry the tick spacing they are deployed with
/// (see [`standard_tick_spacing`](Self::standard_tick_spacing)); other
/// tiers require the spacing to be configured explicitly.
///
/// # Examples
///
/// ```
/// use clmm_backtest::domain::FeeTier;
///
/// let tier = FeeTier::from_ratio(3, 1_000).unwrap_or(FeeTier::TIER_0_30_PERCENT);
/// assert_eq!(tier, FeeTier::TIER_0_30_PERCENT);
/// assert_eq!(tier.pips(), 3_000);
/// assert_eq!(tier.standard_tick_spacing(), Some(60));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(try_from = "u32", into = "u32")
)]
pub struct FeeTier(u32);

impl FeeTier {
    /// 0.01% fee (100 pips), tick spacing 1.
    pub const TIER_0_01_PERCENT: Self = Self(100);

    /// 0.05% fee (500 pips), tick spacing 10.
    pub const TIER_0_05_PERCENT: Self = Self(500);

    /// 0.30% fee (3 000 pips), tick spacing 60.
    pub const TIER_0_30_PERCENT: Self = Self(3_000);

    /// 1.00% fee (10 000 pips), tick spacing 200.
    pub const TIER_1_00_PERCENT: Self = Self(10_000);

    /// Creates a fee tier from pips.
    ///
    /// # Errors
    ///
    /// Returns [`BacktestError::InvalidFee`] if `pips` is 100% or more.
    pub const fn from_pips(pips: u32) -> crate::error::Result<Self> {
        if pips >= PIPS_DENOMINATOR {
            return Err(BacktestError::InvalidFee("fee must be below 100%"));
        }
        Ok(Self(pips))
    }

    /// Creates a fee tier from [`BasisPoints`].
    ///
    /// # Errors
    ///
    /// Returns [`BacktestError::InvalidFee`] if the value is 100% or more.
    pub const fn from_basis_points(bps: BasisPoints) -> crate::error::Result<Self> {
        if !bps.is_valid_percent() {
            return Err(BacktestError::InvalidFee("fee must be below 100%"));
        }
        match bps.to_pips() {
            Some(pips) => Self::from_pips(pips),
            None => Err(BacktestError::InvalidFee("fee must be below 100%")),
        }
    }

    /// Creates a fee tier from an exact rational, e.g. `3 / 1000` for 0.30%.
    ///
    /// # Errors
    ///
    /// - [`BacktestError::InvalidFee`] if `denominator` is zero, the ratio
    ///   is not a whole number of pips, or it is 100% or more.
    pub fn from_ratio(numerator: u64, denominator: u64) -> crate::error::Result<Self> {
        if denominator == 0 {
            return Err(BacktestError::InvalidFee("fee denominator must be non-zero"));
        }
        let scaled = u128::from(numerator) * u128::from(PIPS_DENOMINATOR);
        let denominator = u128::from(denominator);
        if scaled % denominator != 0 {
            return Err(BacktestError::InvalidFee(
                "fee ratio must be a whole number of pips",
            ));
        }
        let pips = u32::try_from(scaled / denominator)
            .map_err(|_| BacktestError::InvalidFee("fee must be below 100%"))?;
        Self::from_pips(pips)
    }

    /// Returns the fee in pips.
    #[must_use]
    pub const fn pips(&self) -> u32 {
        self.0
    }

    /// Tick spacing the tier is deployed with, for the four standard tiers.
    #[must_use]
    pub const fn standard_tick_spacing(&self) -> Option<u32> {
        match self.0 {
            100 => Some(1),
            500 => Some(10),
            3_000 => Some(60),
            10_000 => Some(200),
            _ => None,
        }
    }

    /// Returns `true` if this tier matches one of the four standard presets.
    #[must_use]
    pub const fn is_standard(&self) -> bool {
        self.standard_tick_spacing().is_some()
    }

    /// Fee portion of a gross input amount, `floor(amount × fee)`.
    ///
    /// Splits `amount` by the denominator first so the product never
    /// overflows; the result is exact.
    pub const fn fee_on(&self, amount: Amount) -> Amount {
        let denominator = PIPS_DENOMINATOR as u128;
        let pips = self.0 as u128;
        let whole = amount.get() / denominator;
        let rest = amount.get() % denominator;
        Amount::new(whole * pips + rest * pips / denominator)
    }
}

impl TryFrom<u32> for FeeTier {
    type Error = BacktestError;

    fn try_from(pips: u32) -> Result<Self, Self::Error> {
        Self::from_pips(pips)
    }
}

impl From<FeeTier> for u32 {
    fn from(tier: FeeTier) -> Self {
        tier.0
    }
}

impl fmt::Display for FeeTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FeeTier({} pips)", self.0)
    }
}
