//! Fixed-point arithmetic for concentrated-liquidity pools.
//!
//! Every quantity that must agree with on-chain computation is an
//! integer: sqrt prices are Q64.96, fee growth is Q128.128, liquidity and
//! amounts are `u128`. Floating point is never used.
//!
//! | Function | Purpose |
//! |----------|---------|
//! | [`mul_div`] / [`mul_div_rounding_up`] | `a·b/d` with a 512-bit intermediate |
//! | [`tick_to_sqrt_price`] / [`sqrt_price_to_tick`] | Exact tick ↔ price conversion |
//! | [`get_amount0_delta`] / [`get_amount1_delta`] | Token amounts between two prices |
//! | [`compute_swap_step`] | One swap step within a range |
//! | [`get_fee_growth_inside`] | Fee growth inside a tick range |

mod fee_growth;
mod full_math;
mod rounding;
mod sqrt_price_math;
mod swap_math;
mod tick_math;

pub use fee_growth::{fee_growth_delta, fees_earned, get_fee_growth_inside};
pub use full_math::{mul_div, mul_div_rounding_up, to_u128, Q128, Q96};
pub use rounding::div_round;
pub use sqrt_price_math::{
    get_amount0_delta, get_amount1_delta, next_sqrt_price_from_input,
    next_sqrt_price_from_output,
};
pub use swap_math::{compute_swap_step, SwapStep};
pub use tick_math::{sqrt_price_to_tick, tick_to_sqrt_price};
