//! Simulation configuration.
//!
//! [`SimulationConfig`] is the top-level blueprint: a [`PoolConfig`]
//! describing the pool's state at the first replayed block, and a
//! [`ReplayConfig`] describing how recorded trades are checked. All
//! structs deserialize from JSON when the `serde` feature is enabled and
//! are validated when a pool or driver is built from them.

mod pool;
mod replay;
mod simulation;

pub use pool::{LiquidityRange, PoolConfig, MAX_TICK_SPACING};
pub use replay::{DivergencePolicy, ReplayConfig};
pub use simulation::SimulationConfig;
