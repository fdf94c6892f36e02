//! Convenience re-exports for common types and traits.
//!
//! The prelude provides a single import to bring all commonly used items
//! into scope:
//!
//! ```rust
//! use clmm_backtest::prelude::*;
//! ```

// Re-export domain types
pub use crate::domain::{
    Amount, Divergence, FeeGrowth, FeeTier, Liquidity, Owner, PositionId, SqrtPriceX96,
    SwapAmounts, SwapDirection, SwapSpec, Tick, TradeData, V3LPPosition,
};

// Re-export core traits
pub use crate::traits::FromConfig;

// Re-export configuration
pub use crate::config::{DivergencePolicy, PoolConfig, ReplayConfig, SimulationConfig};

// Re-export error types
pub use crate::error::{BacktestError, Result};

// Re-export the engine
pub use crate::ledger::PositionLedger;
pub use crate::pool::{PoolSnapshot, PoolState};
pub use crate::simulation::{SimulationDriver, TradeReport};
