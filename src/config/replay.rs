//! How replay treats disagreement with recorded state.

use core::fmt;

/// What to do when the simulated outcome of a recorded trade disagrees
/// with the state the chain recorded after it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "snake_case")
)]
pub enum DivergencePolicy {
    /// Apply the trade and report nothing.
    Ignore,
    /// Apply the trade, log a warning and report the divergence.
    #[default]
    Warn,
    /// Reject the trade without touching pool state.
    Fail,
}

impl fmt::Display for DivergencePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ignore => write!(f, "ignore"),
            Self::Warn => write!(f, "warn"),
            Self::Fail => write!(f, "fail"),
        }
    }
}

/// Replay settings.
///
/// `tick_tolerance` is how far, in ticks, the simulated tick may drift
/// from the recorded one before it counts as a divergence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(default)
)]
pub struct ReplayConfig {
    divergence_policy: DivergencePolicy,
    tick_tolerance: u32,
}

impl ReplayConfig {
    /// Creates replay settings.
    #[must_use]
    pub const fn new(divergence_policy: DivergencePolicy, tick_tolerance: u32) -> Self {
        Self {
            divergence_policy,
            tick_tolerance,
        }
    }

    /// Returns the divergence policy.
    #[must_use]
    pub const fn divergence_policy(&self) -> DivergencePolicy {
        self.divergence_policy
    }

    /// Returns the tick tolerance.
    #[must_use]
    pub const fn tick_tolerance(&self) -> u32 {
        self.tick_tolerance
    }

    /// Returns `true` if `recorded` and `simulated` are within tolerance.
    #[must_use]
    pub const fn ticks_agree(&self, recorded: i32, simulated: i32) -> bool {
        recorded.abs_diff(simulated) <= self.tick_tolerance
    }
}
