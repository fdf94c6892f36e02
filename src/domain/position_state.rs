//! Per-owner deposit and gas summary.

use super::Amount;
use crate::error::BacktestError;

/// An owner's initial deposit and the gas spent managing positions.
///
/// Maintained by the caller's own accounting; the engine never updates it.
/// Gas is recorded in the smallest unit of whatever currency the caller
/// prices it in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LPPositionState {
    initial_token0: Amount,
    initial_token1: Amount,
    total_gas_spent: u128,
}

impl LPPositionState {
    /// Creates a summary for the given initial deposit.
    pub const fn new(initial_token0: Amount, initial_token1: Amount) -> Self {
        Self {
            initial_token0,
            initial_token1,
            total_gas_spent: 0,
        }
    }

    /// Returns the token0 deposited at entry.
    pub const fn initial_token0(&self) -> Amount {
        self.initial_token0
    }

    /// Returns the token1 deposited at entry.
    pub const fn initial_token1(&self) -> Amount {
        self.initial_token1
    }

    /// Returns cumulative gas spent.
    #[must_use]
    pub const fn total_gas_spent(&self) -> u128 {
        self.total_gas_spent
    }

    /// Adds `gas` to the running total.
    ///
    /// # Errors
    ///
    /// Returns [`BacktestError::ArithmeticOverflow`] if the total would
    /// overflow; the total is left unchanged.
    pub fn record_gas(&mut self, gas: u128) -> crate::error::Result<()> {
        self.total_gas_spent = self
            .total_gas_spent
            .checked_add(gas)
            .ok_or(BacktestError::ArithmeticOverflow("total gas spent"))?;
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn records_gas() {
        let mut state = LPPositionState::new(Amount::new(1_000), Amount::new(2_000));
        let Ok(()) = state.record_gas(21_000) else {
            panic!("expected Ok");
        };
        let Ok(()) = state.record_gas(50_000) else {
            panic!("expected Ok");
        };
        assert_eq!(state.total_gas_spent(), 71_000);
        assert_eq!(state.initial_token0(), Amount::new(1_000));
        assert_eq!(state.initial_token1(), Amount::new(2_000));
    }

    #[test]
    fn gas_overflow_rejected() {
        let mut state = LPPositionState::default();
        let Ok(()) = state.record_gas(u128::MAX) else {
            panic!("expected Ok");
        };
        assert!(state.record_gas(1).is_err());
        assert_eq!(state.total_gas_spent(), u128::MAX);
    }
}
