//! Trait abstractions shared across the engine.
//!
//! [`FromConfig`] is the construction seam between the declarative
//! [`config`](crate::config) blueprints and the stateful components that
//! replay trades.

mod from_config;

pub use from_config::FromConfig;
