//! Sequential replay of a trade stream against one pool and its ledger.
//!
//! # Per-trade flow
//!
//! 1. Reject the trade if its block does not follow the last one.
//! 2. Replay it through [`PoolState::replay`].
//! 3. Hand back a [`TradeStep`] whose [`Accruals`] iterator accrues, one
//!    position per item, every position whose range the price touched.
//!
//! Position requests go through the driver so the pool's tick map
//! always mirrors ledger liquidity.

use tracing::{debug, instrument};

use crate::config::{ReplayConfig, SimulationConfig};
use crate::domain::{Amount, Liquidity, PositionId, TradeData, V3LPPosition};
use crate::error::BacktestError;
use crate::ledger::PositionLedger;
use crate::pool::{PoolSnapshot, PoolState, ReplayOutcome};
use crate::traits::FromConfig;

/// Fees credited to one position by one accrual.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct AccrualDelta {
    /// The position accrued.
    pub position: PositionId,
    /// Token0 credited.
    pub earned0: Amount,
    /// Token1 credited.
    pub earned1: Amount,
}

/// Lazy, one-pass accrual of the positions a trade touched.
///
/// Each call to `next` accrues one position. Positions not reached
/// before the iterator is dropped keep their fees in the pool's
/// fee-growth accumulators and are credited by their next accrual.
#[derive(Debug)]
pub struct Accruals<'a> {
    ledger: &'a mut PositionLedger,
    pool: &'a PoolState,
    pending: std::vec::IntoIter<PositionId>,
    index: usize,
    block: u64,
}

impl Iterator for Accruals<'_> {
    type Item = crate::error::Result<AccrualDelta>;

    fn next(&mut self) -> Option<Self::Item> {
        let position = self.pending.next()?;
        let accrued = self
            .ledger
            .accrue(&position, self.pool)
            .map(|(earned0, earned1)| AccrualDelta {
                position,
                earned0,
                earned1,
            })
            .map_err(|e| e.at_trade(self.index, self.block));
        Some(accrued)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.pending.size_hint()
    }
}

/// Result of processing one trade.
#[derive(Debug)]
pub struct TradeStep<'a> {
    index: usize,
    block_number: u64,
    snapshot: PoolSnapshot,
    outcome: ReplayOutcome,
    accruals: Accruals<'a>,
}

impl<'a> TradeStep<'a> {
    /// Zero-based position of the trade in the processed sequence.
    #[must_use]
    pub const fn index(&self) -> usize {
        self.index
    }

    /// Block number of the trade.
    #[must_use]
    pub const fn block_number(&self) -> u64 {
        self.block_number
    }

    /// Pool state right after the trade.
    #[must_use]
    pub const fn snapshot(&self) -> PoolSnapshot {
        self.snapshot
    }

    /// What the replay did.
    #[must_use]
    pub const fn outcome(&self) -> &ReplayOutcome {
        &self.outcome
    }

    /// The pending accruals.
    pub fn accruals(&mut self) -> &mut Accruals<'a> {
        &mut self.accruals
    }

    /// Consumes the step, keeping only its accruals.
    #[must_use]
    pub fn into_accruals(self) -> Accruals<'a> {
        self.accruals
    }

    /// Runs every pending accrual and collects the step into a report.
    ///
    /// # Errors
    ///
    /// Returns the first accrual failure.
    pub fn into_report(self) -> crate::error::Result<TradeReport> {
        let accruals = self.accruals.collect::<crate::error::Result<Vec<_>>>()?;
        Ok(TradeReport {
            index: self.index,
            block_number: self.block_number,
            snapshot: self.snapshot,
            outcome: self.outcome,
            accruals,
        })
    }
}

/// Owned record of one processed trade.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct TradeReport {
    /// Zero-based position of the trade in the processed sequence.
    pub index: usize,
    /// Block number of the trade.
    pub block_number: u64,
    /// Pool state right after the trade.
    pub snapshot: PoolSnapshot,
    /// What the replay did.
    pub outcome: ReplayOutcome,
    /// Fees credited to each touched position.
    pub accruals: Vec<AccrualDelta>,
}

/// Drives one pool and its ledger through a trade stream.
///
/// Created from a [`SimulationConfig`] via [`FromConfig`]. Trades must
/// arrive in strictly increasing block order.
///
/// # Examples
///
/// ```
/// use clmm_backtest::config::{PoolConfig, ReplayConfig, SimulationConfig};
/// use clmm_backtest::domain::{FeeTier, Tick};
/// use clmm_backtest::simulation::SimulationDriver;
/// use clmm_backtest::traits::FromConfig;
///
/// let Ok(pool) = PoolConfig::at_tick(FeeTier::TIER_0_30_PERCENT, Tick::ZERO) else { return };
/// let Ok(config) = SimulationConfig::new(pool, ReplayConfig::default()) else { return };
/// let Ok(driver) = SimulationDriver::from_config(&config) else { return };
/// assert_eq!(driver.trades_processed(), 0);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimulationDriver {
    pool: PoolState,
    ledger: PositionLedger,
    replay: ReplayConfig,
    last_block: Option<u64>,
    trades_processed: usize,
}

impl FromConfig<SimulationConfig> for SimulationDriver {
    fn from_config(config: &SimulationConfig) -> crate::error::Result<Self> {
        Ok(Self {
            pool: PoolState::from_config(config.pool())?,
            ledger: PositionLedger::new(),
            replay: config.replay(),
            last_block: None,
            trades_processed: 0,
        })
    }
}

impl SimulationDriver {
    /// Returns the pool.
    #[must_use]
    pub const fn pool(&self) -> &PoolState {
        &self.pool
    }

    /// Returns the ledger.
    #[must_use]
    pub const fn ledger(&self) -> &PositionLedger {
        &self.ledger
    }

    /// Returns the replay settings.
    #[must_use]
    pub const fn replay_config(&self) -> ReplayConfig {
        self.replay
    }

    /// Block of the last processed trade.
    #[must_use]
    pub const fn last_block(&self) -> Option<u64> {
        self.last_block
    }

    /// Number of trades processed so far.
    #[must_use]
    pub const fn trades_processed(&self) -> usize {
        self.trades_processed
    }

    /// Opens a zero-liquidity position.
    ///
    /// # Errors
    ///
    /// - [`BacktestError::InvalidTickRange`] if the range is not aligned
    ///   to the pool's tick spacing.
    /// - [`BacktestError::PositionAlreadyExists`] if `id` is open.
    pub fn open_position(&mut self, id: PositionId) -> crate::error::Result<()> {
        let spacing = self.pool.tick_spacing();
        if !id.tick_lower().is_aligned(spacing) || !id.tick_upper().is_aligned(spacing) {
            return Err(BacktestError::InvalidTickRange(
                "ticks must be aligned to tick spacing",
            ));
        }
        self.ledger.open_position(id, &self.pool)
    }

    /// Deposits (`liquidity_delta > 0`) or withdraws liquidity.
    ///
    /// Fees earned so far are accrued at the old liquidity first. Returns
    /// the position's new liquidity.
    ///
    /// # Errors
    ///
    /// - [`BacktestError::PositionNotFound`] if `id` is not open.
    /// - [`BacktestError::InsufficientLiquidity`] if withdrawing more
    ///   than the position holds; nothing changes.
    /// - [`BacktestError::InvalidQuantity`] if a boundary tick would
    ///   exceed the per-tick cap; nothing changes.
    pub fn adjust_liquidity(
        &mut self,
        id: &PositionId,
        liquidity_delta: i128,
    ) -> crate::error::Result<Liquidity> {
        let next = self.ledger.liquidity_after(id, liquidity_delta)?;
        if liquidity_delta >= 0 {
            // boundary ticks exist before the snapshot is taken
            self.pool
                .update_liquidity(id.tick_lower(), id.tick_upper(), liquidity_delta)?;
            return self.ledger.adjust_liquidity(id, liquidity_delta, &self.pool);
        }
        // accrue while the boundary ticks still exist
        let (earned0, earned1) = self.ledger.accrue(id, &self.pool)?;
        self.pool
            .update_liquidity(id.tick_lower(), id.tick_upper(), liquidity_delta)?;
        self.ledger.set_liquidity(id, next)?;
        debug!(
            position = %id,
            delta = liquidity_delta,
            liquidity = %next,
            %earned0,
            %earned1,
            "position liquidity adjusted"
        );
        Ok(next)
    }

    /// Pays out up to `max0`/`max1` of what `id` is owed, accruing first.
    ///
    /// # Errors
    ///
    /// Returns [`BacktestError::PositionNotFound`] if `id` is not open.
    pub fn collect(
        &mut self,
        id: &PositionId,
        max0: Amount,
        max1: Amount,
    ) -> crate::error::Result<(Amount, Amount)> {
        self.ledger.collect(id, max0, max1, &self.pool)
    }

    /// Removes an empty position.
    ///
    /// # Errors
    ///
    /// - [`BacktestError::PositionNotFound`] if `id` is not open.
    /// - [`BacktestError::PositionNotEmpty`] if it still holds liquidity
    ///   or owed tokens.
    pub fn close_position(&mut self, id: &PositionId) -> crate::error::Result<V3LPPosition> {
        self.ledger.close_position(id)
    }

    /// Replays one trade.
    ///
    /// The returned step borrows the driver until its accruals are done
    /// with.
    ///
    /// # Errors
    ///
    /// Every error is wrapped in [`BacktestError::AtTrade`]:
    ///
    /// - [`BacktestError::OutOfOrderTrade`] if the block does not follow
    ///   the last processed one. Nothing changes.
    /// - Any [`PoolState::replay`] failure. Nothing changes.
    #[instrument(
        level = "debug",
        skip_all,
        fields(index = self.trades_processed, block = trade.block_number())
    )]
    pub fn process_trade(&mut self, trade: &TradeData) -> crate::error::Result<TradeStep<'_>> {
        let index = self.trades_processed;
        let block = trade.block_number();
        if let Some(previous) = self.last_block {
            if block <= previous {
                return Err(BacktestError::OutOfOrderTrade { block, previous }.at_trade(index, block));
            }
        }

        let tick_before = self.pool.tick();
        let outcome = self
            .pool
            .replay(trade, &self.replay)
            .map_err(|e| e.at_trade(index, block))?;
        self.last_block = Some(block);
        self.trades_processed += 1;

        let tick_after = self.pool.tick();
        let (low, high) = if tick_before <= tick_after {
            (tick_before, tick_after)
        } else {
            (tick_after, tick_before)
        };
        let pending: Vec<PositionId> = self
            .ledger
            .overlapping(low, high)
            .map(|(id, _)| *id)
            .collect();
        debug!(
            tick = %tick_after,
            touched = pending.len(),
            divergences = outcome.divergences().len(),
            "trade processed"
        );

        Ok(TradeStep {
            index,
            block_number: block,
            snapshot: self.pool.snapshot(),
            outcome,
            accruals: Accruals {
                ledger: &mut self.ledger,
                pool: &self.pool,
                pending: pending.into_iter(),
                index,
                block,
            },
        })
    }

    /// Replays every trade and runs every accrual, in order.
    ///
    /// # Errors
    ///
    /// Stops at the first failing trade; trades before it stay applied.
    pub fn run<'t, I>(&mut self, trades: I) -> crate::error::Result<Vec<TradeReport>>
    where
        I: IntoIterator<Item = &'t TradeData>,
    {
        let mut reports = Vec::new();
        for trade in trades {
            reports.push(self.process_trade(trade)?.into_report()?);
        }
        Ok(reports)
    }
}
