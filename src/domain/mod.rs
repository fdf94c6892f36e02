//! Value types of the concentrated-liquidity domain.
//!
//! Every type here is a small `Copy` record. Constructors validate the
//! invariants a type carries (tick bounds, price bounds, range ordering,
//! fee range), so code that holds one never re-checks them.
//!
//! | Type | Role |
//! |------|------|
//! | [`Tick`] | Discrete price index, `price = 1.0001^tick` |
//! | [`SqrtPriceX96`] | Q64.96 square-root price |
//! | [`Liquidity`] | Active or position liquidity |
//! | [`Amount`] | Raw token quantity |
//! | [`FeeGrowth`] | Q128.128 fee-per-liquidity accumulator |
//! | [`FeeTier`] | Pool fee in pips |
//! | [`TickInfo`] | Per-tick liquidity and fee-growth-outside |
//! | [`TradeData`] | A recorded swap |
//! | [`V3LPPosition`] | A liquidity position and its fee snapshots |
//! | [`PositionId`] | Owner plus tick range |
//! | [`LPPositionState`] | Per-owner deposit and gas summary |

mod amount;
mod basis_points;
mod direction;
mod divergence;
mod fee_growth;
mod fee_tier;
mod liquidity;
mod owner;
mod position;
mod position_id;
mod position_state;
mod rounding;
mod sqrt_price;
mod swap_result;
mod swap_spec;
mod tick;
mod tick_info;
mod trade;

pub use amount::Amount;
pub use basis_points::BasisPoints;
pub use direction::SwapDirection;
pub use divergence::Divergence;
pub use fee_growth::FeeGrowth;
pub use fee_tier::{FeeTier, PIPS_DENOMINATOR};
pub use liquidity::Liquidity;
pub use owner::Owner;
pub use position::V3LPPosition;
pub use position_id::PositionId;
pub use position_state::LPPositionState;
pub use rounding::Rounding;
pub use sqrt_price::SqrtPriceX96;
pub use swap_result::SwapResult;
pub use swap_spec::SwapSpec;
pub use tick::Tick;
pub use tick_info::TickInfo;
pub use trade::{SwapAmounts, TradeData};
