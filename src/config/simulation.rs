//! Top-level blueprint for a backtest run.

use super::{PoolConfig, ReplayConfig};

/// Everything a [`SimulationDriver`](crate::simulation::SimulationDriver)
/// needs to start: the pool's initial state and the replay settings.
///
/// Deserializes from JSON with `replay` optional:
///
/// ```json
/// {
///   "pool": { "fee_tier": 3000, "tick_spacing": 60, "sqrt_price": "0x1000000000000000000000000", "tick": 0 },
///   "replay": { "divergence_policy": "fail" }
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SimulationConfig {
    pool: PoolConfig,
    #[cfg_attr(feature = "serde", serde(default))]
    replay: ReplayConfig,
}

impl SimulationConfig {
    /// Creates a simulation blueprint.
    ///
    /// # Errors
    ///
    /// Propagates [`PoolConfig::validate`] failures.
    pub fn new(pool: PoolConfig, replay: ReplayConfig) -> crate::error::Result<Self> {
        pool.validate()?;
        Ok(Self { pool, replay })
    }

    /// Validates the pool blueprint.
    ///
    /// # Errors
    ///
    /// Propagates [`PoolConfig::validate`] failures.
    pub fn validate(&self) -> crate::error::Result<()> {
        self.pool.validate()
    }

    /// Returns the pool blueprint.
    #[must_use]
    pub const fn pool(&self) -> &PoolConfig {
        &self.pool
    }

    /// Returns the replay settings.
    #[must_use]
    pub const fn replay(&self) -> ReplayConfig {
        self.replay
    }
}
