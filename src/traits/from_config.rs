//! Construction of engine components from configuration.
//!
//! [`FromConfig`] gives every configurable component the same entry
//! point: a validated blueprint goes in, a component in a consistent
//! initial state comes out.
//!
//! # Validation Contract
//!
//! Implementations **must** validate the blueprint before building
//! anything. Deserialized configuration has not been through any
//! constructor, so `from_config` is the first place its invariants are
//! checked:
//!
//! - Tick spacing is in range and background ranges are aligned to it
//! - The initial tick matches the initial sqrt price
//! - Initial active liquidity matches the background ranges at the
//!   initial tick
//!
//! # Implementors
//!
//! ```text
//! PoolState::from_config(&PoolConfig)
//! SimulationDriver::from_config(&SimulationConfig)
//! ```
//!
//! There is no blanket implementation; each component/blueprint pairing
//! is written out explicitly.

/// Builds `Self` from a blueprint of type `C`.
///
/// # Errors
///
/// Returns [`BacktestError::InvalidConfiguration`](crate::error::BacktestError::InvalidConfiguration)
/// (or a more specific variant) if the blueprint is invalid.
pub trait FromConfig<C> {
    /// Validates `config` and builds a component from it.
    ///
    /// The configuration is taken by reference so one blueprint can seed
    /// several independent runs.
    ///
    /// # Errors
    ///
    /// - [`BacktestError::InvalidConfiguration`](crate::error::BacktestError::InvalidConfiguration)
    ///   if parameters are out of range or inconsistent.
    /// - [`BacktestError::InvalidTick`](crate::error::BacktestError::InvalidTick)
    ///   if the initial tick disagrees with the initial price.
    fn from_config(config: &C) -> crate::error::Result<Self>
    where
        Self: Sized;
}
