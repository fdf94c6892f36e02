//! The simulated pool.
//!
//! [`PoolState`] owns the price, the active liquidity, the global fee
//! accumulators and the [`TickMap`] of initialized ticks. It changes in
//! three ways:
//!
//! | Operation | Effect |
//! |-----------|--------|
//! | [`PoolState::update_liquidity`] | Mirrors a range's liquidity change into the tick map |
//! | [`PoolState::swap`] | Simulates a raw swap amount from scratch |
//! | [`PoolState::replay`] | Replays a recorded trade to its recorded price |

mod replay;
mod snapshot;
mod state;
mod swap;
mod tick_map;

pub use replay::ReplayOutcome;
pub use snapshot::PoolSnapshot;
pub use state::PoolState;
pub use tick_map::{max_liquidity_per_tick, TickMap};
