//! Position ledger and fee accrual.
//!
//! # Accrual
//!
//! A position's fees are never tracked swap by swap. Instead
//! [`PositionLedger::accrue`] reads the pool's fee growth inside the
//! position's range and credits
//! `liquidity · (inside − inside_last) / 2^128` of each token, then moves
//! the `inside_last` snapshots forward. Because the snapshot moves with
//! every credit, accruing twice without new fee growth credits nothing,
//! and the total credited does not depend on how often accrual runs.
//!
//! Accrual must happen before the position's liquidity changes, and
//! before the pool clears a boundary tick the position uses.

use std::collections::BTreeMap;

use tracing::{debug, trace};

use crate::domain::{Amount, Liquidity, PositionId, Tick, V3LPPosition};
use crate::error::BacktestError;
use crate::math::fees_earned;
use crate::pool::PoolState;

/// All open positions, keyed by owner and range.
///
/// The ledger only reads the pool. Keeping the pool's tick map in step
/// with ledger liquidity is the caller's job, normally
/// [`SimulationDriver`](crate::simulation::SimulationDriver)'s.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct PositionLedger {
    positions: BTreeMap<PositionId, V3LPPosition>,
}

impl PositionLedger {
    /// Creates an empty ledger.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            positions: BTreeMap::new(),
        }
    }

    /// Opens a zero-liquidity position, snapshotting the fee growth
    /// currently inside its range.
    ///
    /// # Errors
    ///
    /// Returns [`BacktestError::PositionAlreadyExists`] if `id` is open.
    pub fn open_position(&mut self, id: PositionId, pool: &PoolState) -> crate::error::Result<()> {
        if self.positions.contains_key(&id) {
            return Err(BacktestError::PositionAlreadyExists(id));
        }
        let mut position = V3LPPosition::new(id.tick_lower(), id.tick_upper())?;
        let inside = pool.fee_growth_inside(id.tick_lower(), id.tick_upper())?;
        position.credit((Amount::ZERO, Amount::ZERO), inside)?;
        self.positions.insert(id, position);
        debug!(position = %id, "position opened");
        Ok(())
    }

    /// Returns the position `id`, if open.
    #[must_use]
    pub fn get(&self, id: &PositionId) -> Option<&V3LPPosition> {
        self.positions.get(id)
    }

    /// Returns the position `id`.
    ///
    /// # Errors
    ///
    /// Returns [`BacktestError::PositionNotFound`] if `id` is not open.
    pub fn position(&self, id: &PositionId) -> crate::error::Result<&V3LPPosition> {
        self.positions
            .get(id)
            .ok_or(BacktestError::PositionNotFound(*id))
    }

    /// Credits fees earned by `id` since its last accrual.
    ///
    /// Returns the amounts credited by this call.
    ///
    /// # Errors
    ///
    /// - [`BacktestError::PositionNotFound`] if `id` is not open.
    /// - [`BacktestError::ArithmeticOverflow`] if owed tokens overflow.
    pub fn accrue(
        &mut self,
        id: &PositionId,
        pool: &PoolState,
    ) -> crate::error::Result<(Amount, Amount)> {
        let position = self
            .positions
            .get_mut(id)
            .ok_or(BacktestError::PositionNotFound(*id))?;
        let inside = pool.fee_growth_inside(position.tick_lower(), position.tick_upper())?;
        let earned0 = fees_earned(
            position.liquidity(),
            inside.0.wrapping_sub(&position.fee_growth_inside0_last()),
        )?;
        let earned1 = fees_earned(
            position.liquidity(),
            inside.1.wrapping_sub(&position.fee_growth_inside1_last()),
        )?;
        position.credit((earned0, earned1), inside)?;
        trace!(position = %id, %earned0, %earned1, "fees accrued");
        Ok((earned0, earned1))
    }

    /// Liquidity `id` would hold after `liquidity_delta`, without
    /// changing anything.
    ///
    /// # Errors
    ///
    /// - [`BacktestError::PositionNotFound`] if `id` is not open.
    /// - [`BacktestError::InsufficientLiquidity`] if the delta withdraws
    ///   more than the position holds.
    /// - [`BacktestError::ArithmeticOverflow`] if the result exceeds
    ///   `u128`.
    pub fn liquidity_after(
        &self,
        id: &PositionId,
        liquidity_delta: i128,
    ) -> crate::error::Result<Liquidity> {
        let available = self.position(id)?.liquidity();
        match available.checked_apply_delta(liquidity_delta) {
            Some(next) => Ok(next),
            None if liquidity_delta < 0 => Err(BacktestError::InsufficientLiquidity {
                position: *id,
                available,
                requested: liquidity_delta.unsigned_abs(),
            }),
            None => Err(BacktestError::ArithmeticOverflow("position liquidity")),
        }
    }

    /// Accrues `id`, then applies `liquidity_delta` to it.
    ///
    /// Returns the new liquidity. The position is unchanged on error.
    ///
    /// # Errors
    ///
    /// Same as [`liquidity_after`](Self::liquidity_after) and
    /// [`accrue`](Self::accrue).
    pub fn adjust_liquidity(
        &mut self,
        id: &PositionId,
        liquidity_delta: i128,
        pool: &PoolState,
    ) -> crate::error::Result<Liquidity> {
        let next = self.liquidity_after(id, liquidity_delta)?;
        let (earned0, earned1) = self.accrue(id, pool)?;
        self.set_liquidity(id, next)?;
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

    /// Sets `id`'s liquidity without accruing. Callers accrue first.
    pub(crate) fn set_liquidity(
        &mut self,
        id: &PositionId,
        liquidity: Liquidity,
    ) -> crate::error::Result<()> {
        let position = self
            .positions
            .get_mut(id)
            .ok_or(BacktestError::PositionNotFound(*id))?;
        position.set_liquidity(liquidity);
        Ok(())
    }

    /// Accrues `id`, then pays out up to `max0`/`max1` of what it is
    /// owed.
    ///
    /// # Errors
    ///
    /// Same as [`accrue`](Self::accrue).
    pub fn collect(
        &mut self,
        id: &PositionId,
        max0: Amount,
        max1: Amount,
        pool: &PoolState,
    ) -> crate::error::Result<(Amount, Amount)> {
        let (earned0, earned1) = self.accrue(id, pool)?;
        let position = self
            .positions
            .get_mut(id)
            .ok_or(BacktestError::PositionNotFound(*id))?;
        let paid = position.take_owed(max0, max1);
        debug!(
            position = %id,
            %earned0,
            %earned1,
            paid0 = %paid.0,
            paid1 = %paid.1,
            "fees collected"
        );
        Ok(paid)
    }

    /// Removes an empty position and returns its final state.
    ///
    /// # Errors
    ///
    /// - [`BacktestError::PositionNotFound`] if `id` is not open.
    /// - [`BacktestError::PositionNotEmpty`] if it still holds liquidity
    ///   or owed tokens.
    pub fn close_position(&mut self, id: &PositionId) -> crate::error::Result<V3LPPosition> {
        if !self.position(id)?.is_empty() {
            return Err(BacktestError::PositionNotEmpty(*id));
        }
        let position = self
            .positions
            .remove(id)
            .ok_or(BacktestError::PositionNotFound(*id))?;
        debug!(position = %id, "position closed");
        Ok(position)
    }

    /// Positions whose range contains `tick`.
    pub fn in_range(&self, tick: Tick) -> impl Iterator<Item = (&PositionId, &V3LPPosition)> + '_ {
        self.positions
            .iter()
            .filter(move |(_, position)| position.is_in_range(tick))
    }

    /// Positions whose range overlaps the ticks from `low` to `high`,
    /// both inclusive.
    pub fn overlapping(
        &self,
        low: Tick,
        high: Tick,
    ) -> impl Iterator<Item = (&PositionId, &V3LPPosition)> + '_ {
        self.positions.iter().filter(move |(_, position)| {
            position.tick_lower() <= high && position.tick_upper() > low
        })
    }

    /// Iterates over every open position in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&PositionId, &V3LPPosition)> + '_ {
        self.positions.iter()
    }

    /// Number of open positions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    /// Returns `true` if no position is open.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use crate::config::{PoolConfig, ReplayConfig};
    use crate::domain::{FeeTier, Owner, SqrtPriceX96, SwapAmounts, TradeData};
    use crate::math::tick_to_sqrt_price;
    use crate::traits::FromConfig;

    fn tick(v: i32) -> Tick {
        let Ok(t) = Tick::new(v) else {
            panic!("valid tick expected");
        };
        t
    }

    fn id(lower: i32, upper: i32) -> PositionId {
        let Ok(id) = PositionId::new(Owner::new([7u8; 20]), tick(lower), tick(upper)) else {
            panic!("expected Ok");
        };
        id
    }

    fn pool() -> PoolState {
        let Ok(cfg) = PoolConfig::at_tick(FeeTier::TIER_0_30_PERCENT, tick(0)) else {
            panic!("expected Ok");
        };
        let Ok(pool) = PoolState::from_config(&cfg) else {
            panic!("expected Ok");
        };
        pool
    }

    fn price(v: i32) -> SqrtPriceX96 {
        let Ok(p) = tick_to_sqrt_price(tick(v)) else {
            panic!("expected Ok");
        };
        p
    }

    /// Opens `id` with `liquidity`, mirroring it into the pool.
    fn fund(ledger: &mut PositionLedger, pool: &mut PoolState, id: PositionId, liquidity: i128) {
        let Ok(()) = pool.update_liquidity(id.tick_lower(), id.tick_upper(), liquidity) else {
            panic!("expected Ok");
        };
        let Ok(()) = ledger.open_position(id, pool) else {
            panic!("expected Ok");
        };
        let Ok(_) = ledger.adjust_liquidity(&id, liquidity, pool) else {
            panic!("expected Ok");
        };
    }

    fn trade_to(pool: &mut PoolState, to: i32, liquidity: u128, amount1_in: u128) {
        let trade = TradeData::new(
            1,
            price(to),
            Liquidity::new(liquidity),
            tick(to),
            SwapAmounts {
                amount1_in: Amount::new(amount1_in),
                ..SwapAmounts::default()
            },
        );
        let Ok(_) = pool.replay(&trade, &ReplayConfig::default()) else {
            panic!("expected Ok");
        };
    }

    // -- open / close ----------------------------------------------------------------

    #[test]
    fn open_twice_rejected() {
        let pool = pool();
        let mut ledger = PositionLedger::new();
        assert!(ledger.open_position(id(-60, 60), &pool).is_ok());
        assert_eq!(
            ledger.open_position(id(-60, 60), &pool),
            Err(BacktestError::PositionAlreadyExists(id(-60, 60)))
        );
        assert_eq!(ledger.len(), 1);
    }

    #[test]
    fn same_range_different_owner_is_distinct() {
        let pool = pool();
        let mut ledger = PositionLedger::new();
        let Ok(other) = PositionId::new(Owner::new([8u8; 20]), tick(-60), tick(60)) else {
            panic!("expected Ok");
        };
        assert!(ledger.open_position(id(-60, 60), &pool).is_ok());
        assert!(ledger.open_position(other, &pool).is_ok());
        assert_eq!(ledger.len(), 2);
    }

    #[test]
    fn close_requires_empty_position() {
        let mut pool = pool();
        let mut ledger = PositionLedger::new();
        fund(&mut ledger, &mut pool, id(-60, 60), 1_000);
        assert_eq!(
            ledger.close_position(&id(-60, 60)),
            Err(BacktestError::PositionNotEmpty(id(-60, 60)))
        );
        assert!(ledger.adjust_liquidity(&id(-60, 60), -1_000, &pool).is_ok());
        let Ok(closed) = ledger.close_position(&id(-60, 60)) else {
            panic!("expected Ok");
        };
        assert!(closed.is_empty());
        assert!(ledger.is_empty());
        assert_eq!(
            ledger.close_position(&id(-60, 60)),
            Err(BacktestError::PositionNotFound(id(-60, 60)))
        );
    }

    // -- adjust -----------------------------------------------------------------------

    #[test]
    fn withdraw_more_than_held_rejected() {
        let mut pool = pool();
        let mut ledger = PositionLedger::new();
        fund(&mut ledger, &mut pool, id(-60, 60), 1_000);
        let before = ledger.clone();
        let Err(e) = ledger.adjust_liquidity(&id(-60, 60), -1_001, &pool) else {
            panic!("expected Err");
        };
        assert_eq!(
            e,
            BacktestError::InsufficientLiquidity {
                position: id(-60, 60),
                available: Liquidity::new(1_000),
                requested: 1_001,
            }
        );
        assert_eq!(ledger, before);
    }

    #[test]
    fn adjust_unknown_position_rejected() {
        let pool = pool();
        let mut ledger = PositionLedger::new();
        assert_eq!(
            ledger.adjust_liquidity(&id(-60, 60), 5, &pool),
            Err(BacktestError::PositionNotFound(id(-60, 60)))
        );
    }

    #[test]
    fn adjust_accrues_before_changing_liquidity() {
        let mut pool = pool();
        let mut ledger = PositionLedger::new();
        fund(&mut ledger, &mut pool, id(-120, 120), 1_000);
        trade_to(&mut pool, 60, 1_000, 1_000_000);
        // fees earned at 1000 liquidity are credited before it doubles
        let Ok(_) = pool.update_liquidity(tick(-120), tick(120), 1_000) else {
            panic!("expected Ok");
        };
        let Ok(next) = ledger.adjust_liquidity(&id(-120, 120), 1_000, &pool) else {
            panic!("expected Ok");
        };
        assert_eq!(next, Liquidity::new(2_000));
        let Ok(position) = ledger.position(&id(-120, 120)) else {
            panic!("expected Ok");
        };
        assert_eq!(position.tokens_owed1(), Amount::new(3_000));
    }

    // -- accrue -----------------------------------------------------------------------

    #[test]
    fn accrue_credits_full_share_and_is_idempotent() {
        let mut pool = pool();
        let mut ledger = PositionLedger::new();
        fund(&mut ledger, &mut pool, id(-120, 120), 1_000);
        trade_to(&mut pool, 60, 1_000, 1_000_000);
        assert_eq!(
            ledger.accrue(&id(-120, 120), &pool),
            Ok((Amount::ZERO, Amount::new(3_000)))
        );
        assert_eq!(
            ledger.accrue(&id(-120, 120), &pool),
            Ok((Amount::ZERO, Amount::ZERO))
        );
    }

    #[test]
    fn out_of_range_position_earns_nothing() {
        let mut pool = pool();
        let mut ledger = PositionLedger::new();
        fund(&mut ledger, &mut pool, id(-120, 120), 1_000);
        fund(&mut ledger, &mut pool, id(120, 240), 500);
        trade_to(&mut pool, 60, 1_000, 1_000_000);
        assert_eq!(
            ledger.accrue(&id(120, 240), &pool),
            Ok((Amount::ZERO, Amount::ZERO))
        );
    }

    #[test]
    fn opening_late_does_not_earn_past_fees() {
        let mut pool = pool();
        let mut ledger = PositionLedger::new();
        fund(&mut ledger, &mut pool, id(-120, 120), 1_000);
        trade_to(&mut pool, 60, 1_000, 1_000_000);
        fund(&mut ledger, &mut pool, id(-60, 120), 1_000);
        assert_eq!(
            ledger.accrue(&id(-60, 120), &pool),
            Ok((Amount::ZERO, Amount::ZERO))
        );
    }

    // -- collect ----------------------------------------------------------------------

    #[test]
    fn collect_caps_and_resets() {
        let mut pool = pool();
        let mut ledger = PositionLedger::new();
        fund(&mut ledger, &mut pool, id(-120, 120), 1_000);
        trade_to(&mut pool, 60, 1_000, 1_000_000);
        let Ok(paid) = ledger.collect(&id(-120, 120), Amount::MAX, Amount::new(1_000), &pool) else {
            panic!("expected Ok");
        };
        assert_eq!(paid, (Amount::ZERO, Amount::new(1_000)));
        let Ok(paid) = ledger.collect(&id(-120, 120), Amount::MAX, Amount::MAX, &pool) else {
            panic!("expected Ok");
        };
        assert_eq!(paid, (Amount::ZERO, Amount::new(2_000)));
        let Ok(position) = ledger.position(&id(-120, 120)) else {
            panic!("expected Ok");
        };
        assert!(position.tokens_owed1().is_zero());
    }

    // -- iteration ---------------------------------------------------------------------

    #[test]
    fn in_range_and_overlapping() {
        let pool = pool();
        let mut ledger = PositionLedger::new();
        for (lower, upper) in [(-120, 0), (0, 60), (60, 180), (-600, 600)] {
            assert!(ledger.open_position(id(lower, upper), &pool).is_ok());
        }
        let at_zero: Vec<_> = ledger.in_range(tick(0)).map(|(id, _)| *id).collect();
        assert_eq!(at_zero, vec![id(-600, 600), id(0, 60)]);
        let crossed: Vec<_> = ledger
            .overlapping(tick(0), tick(90))
            .map(|(id, _)| *id)
            .collect();
        assert_eq!(crossed, vec![id(-600, 600), id(0, 60), id(60, 180)]);
    }
}
