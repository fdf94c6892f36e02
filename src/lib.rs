//! # CLMM Backtest
//!
//! Deterministic Uniswap V3 swap replay and fee accrual for backtesting
//! concentrated-liquidity positions against recorded trades.
//!
//! The engine reproduces the pool's integer arithmetic exactly: Q64.96
//! square-root prices, Q128.128 fee-growth accumulators, fees in pips.
//! A recorded trade moves the simulated pool to the price the chain
//! recorded, its fee is split across the liquidity segments traversed,
//! and every position the price touched is credited what it earned.
//!
//! # Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `serde` | yes | `Serialize`/`Deserialize` for configs, domain types and reports |
//!
//! # Quick Start
//!
//! ```rust
//! use clmm_backtest::config::{PoolConfig, ReplayConfig, SimulationConfig};
//! use clmm_backtest::domain::{
//!     Amount, FeeTier, Liquidity, Owner, PositionId, SwapAmounts, Tick, TradeData,
//! };
//! use clmm_backtest::math::tick_to_sqrt_price;
//! use clmm_backtest::simulation::SimulationDriver;
//! use clmm_backtest::traits::FromConfig;
//!
//! # fn main() -> clmm_backtest::error::Result<()> {
//! // 1. A 0.30% pool at tick 0
//! let pool = PoolConfig::at_tick(FeeTier::TIER_0_30_PERCENT, Tick::ZERO)?;
//! let config = SimulationConfig::new(pool, ReplayConfig::default())?;
//! let mut driver = SimulationDriver::from_config(&config)?;
//!
//! // 2. One position over [-120, 120)
//! let id = PositionId::new(Owner::new([7u8; 20]), Tick::new(-120)?, Tick::new(120)?)?;
//! driver.open_position(id)?;
//! driver.adjust_liquidity(&id, 1_000)?;
//!
//! // 3. A recorded trade paying 1 000 000 token1 in, ending at tick 60
//! let to = Tick::new(60)?;
//! let trade = TradeData::new(
//!     1,
//!     tick_to_sqrt_price(to)?,
//!     Liquidity::new(1_000),
//!     to,
//!     SwapAmounts { amount1_in: Amount::new(1_000_000), ..SwapAmounts::default() },
//! );
//! let reports = driver.run([&trade])?;
//!
//! // 4. The whole 3 000 fee went to the only position
//! assert_eq!(reports[0].accruals[0].earned1, Amount::new(3_000));
//! # Ok(())
//! # }
//! ```
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────┐
//! │ SimulationDriver │  block ordering, position requests, accrual
//! └────────┬─────────┘
//!          │ replay / update_liquidity      accrue / collect
//!          ▼                                       ▼
//! ┌──────────────────┐                  ┌──────────────────┐
//! │    PoolState     │ ◄─ fee growth ── │  PositionLedger  │
//! │    + TickMap     │     inside       └──────────────────┘
//! └────────┬─────────┘
//!          │ tick math, swap steps, fee growth
//!          ▼
//! ┌──────────────────┐
//! │       math       │  U256 fixed point, exact rounding
//! └──────────────────┘
//! ```
//!
//! # Module Guide
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`domain`] | Value types: [`Tick`](domain::Tick), [`SqrtPriceX96`](domain::SqrtPriceX96), [`TradeData`](domain::TradeData), etc. |
//! | [`math`] | Fixed-point tick, price, amount and fee-growth arithmetic |
//! | [`pool`] | [`PoolState`](pool::PoolState), [`TickMap`](pool::TickMap), swap and replay |
//! | [`ledger`] | [`PositionLedger`](ledger::PositionLedger) of positions and owed fees |
//! | [`simulation`] | [`SimulationDriver`](simulation::SimulationDriver) and per-trade reports |
//! | [`config`] | [`SimulationConfig`](config::SimulationConfig), [`PoolConfig`](config::PoolConfig), [`ReplayConfig`](config::ReplayConfig) |
//! | [`traits`] | [`FromConfig`](traits::FromConfig) |
//! | [`error`] | [`BacktestError`](error::BacktestError) unified error enum |
//! | [`prelude`] | Convenience re-exports for common types and traits |

pub mod config;
pub mod domain;
pub mod error;
pub mod ledger;
pub mod math;
pub mod pool;
pub mod prelude;
pub mod simulation;
pub mod traits;
