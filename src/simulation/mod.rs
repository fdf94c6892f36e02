//! Backtest orchestration.
//!
//! [`SimulationDriver`] owns a [`PoolState`](crate::pool::PoolState) and
//! a [`PositionLedger`](crate::ledger::PositionLedger), routes position
//! requests to both, and replays trades one at a time in block order.

mod driver;

#[cfg(test)]
#[allow(clippy::panic)]
mod proptest_properties;

pub use driver::{AccrualDelta, Accruals, SimulationDriver, TradeReport, TradeStep};
