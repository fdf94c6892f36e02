//! Explicit rounding direction for arithmetic operations.

/// Specifies the rounding direction for fixed-point division.
///
/// Every division in the engine takes an explicit `Rounding` so that
/// precision loss always falls on a chosen side: amounts paid into the
/// pool round [`Up`](Self::Up), amounts paid out and fee credits round
/// [`Down`](Self::Down).
///
/// # Examples
///
/// ```
/// use clmm_backtest::domain::Rounding;
///
/// let r = Rounding::Up;
/// assert!(r.is_up());
/// assert!(!Rounding::Down.is_up());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Rounding {
    /// Round towards positive infinity (ceiling).
    Up,
    /// Round towards zero (floor).
    Down,
}

impl Rounding {
    /// Returns `true` if this is [`Rounding::Up`].
    #[must_use]
    pub const fn is_up(&self) -> bool {
        matches!(self, Self::Up)
    }
}
