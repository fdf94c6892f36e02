//! Liquidity positions and their owed fees.

mod positions;

pub use positions::PositionLedger;
