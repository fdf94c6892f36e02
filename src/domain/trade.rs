//! Recorded swap events.

use super::{Amount, Liquidity, SqrtPriceX96, SwapDirection, Tick};
use crate::error::BacktestError;

/// Token flows of one swap, all from the pool's point of view of the
/// trader: `*_in` is paid into the pool, `*_out` is paid out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SwapAmounts {
    /// Token0 paid into the pool.
    pub amount0_in: Amount,
    /// Token0 paid out of the pool.
    pub amount0_out: Amount,
    /// Token1 paid into the pool.
    pub amount1_in: Amount,
    /// Token1 paid out of the pool.
    pub amount1_out: Amount,
}

/// One recorded swap, in the shape market-data ingestion produces it.
///
/// Immutable once built. `block_number` orders trades; the `*_after`
/// fields are the pool state the chain recorded after the swap and are
/// authoritative for replay.
///
/// # Examples
///
/// ```
/// use alloy_primitives::U256;
/// use clmm_backtest::domain::{
///     Amount, Liquidity, SqrtPriceX96, SwapDirection, Tick, TradeData,
/// };
///
/// let price = SqrtPriceX96::new(U256::from(1u8) << 96).unwrap_or(SqrtPriceX96::MIN);
/// // subgraph convention: positive amounts are paid into the pool
/// let trade = TradeData::from_signed_amounts(
///     17_000_000,
///     price,
///     Liquidity::new(10_000),
///     Tick::ZERO,
///     1_000,
///     -997,
/// );
/// let Ok(trade) = trade else { return };
/// assert_eq!(trade.direction(), Some(SwapDirection::ZeroForOne));
/// assert_eq!(trade.amount_in(), Amount::new(1_000));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TradeData {
    block_number: u64,
    sqrt_price_after: SqrtPriceX96,
    liquidity_after: Liquidity,
    tick_after: Tick,
    #[cfg_attr(feature = "serde", serde(flatten))]
    amounts: SwapAmounts,
}

impl TradeData {
    /// Creates a trade record from unsigned in/out flows.
    pub const fn new(
        block_number: u64,
        sqrt_price_after: SqrtPriceX96,
        liquidity_after: Liquidity,
        tick_after: Tick,
        amounts: SwapAmounts,
    ) -> Self {
        Self {
            block_number,
            sqrt_price_after,
            liquidity_after,
            tick_after,
            amounts,
        }
    }

    /// Creates a trade record from signed swap-event amounts, where a
    /// positive value is paid into the pool and a negative value out.
    ///
    /// # Errors
    ///
    /// Returns [`BacktestError::InvalidQuantity`] if both amounts are
    /// positive, which no swap can produce.
    pub const fn from_signed_amounts(
        block_number: u64,
        sqrt_price_after: SqrtPriceX96,
        liquidity_after: Liquidity,
        tick_after: Tick,
        amount0: i128,
        amount1: i128,
    ) -> crate::error::Result<Self> {
        if amount0 > 0 && amount1 > 0 {
            return Err(BacktestError::InvalidQuantity(
                "a swap cannot pay both tokens into the pool",
            ));
        }
        let (amount0_in, amount0_out) = split_signed(amount0);
        let (amount1_in, amount1_out) = split_signed(amount1);
        Ok(Self::new(
            block_number,
            sqrt_price_after,
            liquidity_after,
            tick_after,
            SwapAmounts {
                amount0_in,
                amount0_out,
                amount1_in,
                amount1_out,
            },
        ))
    }

    /// Returns the block the trade was mined in.
    #[must_use]
    pub const fn block_number(&self) -> u64 {
        self.block_number
    }

    /// Returns the recorded sqrt price after the trade.
    #[must_use]
    pub const fn sqrt_price_after(&self) -> SqrtPriceX96 {
        self.sqrt_price_after
    }

    /// Returns the recorded active liquidity after the trade.
    #[must_use]
    pub const fn liquidity_after(&self) -> Liquidity {
        self.liquidity_after
    }

    /// Returns the recorded tick after the trade.
    #[must_use]
    pub const fn tick_after(&self) -> Tick {
        self.tick_after
    }

    /// Returns the recorded token flows.
    #[must_use]
    pub const fn amounts(&self) -> SwapAmounts {
        self.amounts
    }

    /// Direction implied by the recorded flows: the token paid in.
    ///
    /// `None` when no token, or both tokens, were paid in.
    #[must_use]
    pub const fn direction(&self) -> Option<SwapDirection> {
        match (
            self.amounts.amount0_in.is_zero(),
            self.amounts.amount1_in.is_zero(),
        ) {
            (false, true) => Some(SwapDirection::ZeroForOne),
            (true, false) => Some(SwapDirection::OneForZero),
            _ => None,
        }
    }

    /// Gross input of the token paid in, fee included.
    ///
    /// Zero when [`direction`](Self::direction) is `None`.
    pub const fn amount_in(&self) -> Amount {
        match self.direction() {
            Some(direction) => self.amount_in_for(direction),
            None => Amount::ZERO,
        }
    }

    /// Gross input recorded for the token `direction` takes in.
    pub const fn amount_in_for(&self, direction: SwapDirection) -> Amount {
        match direction {
            SwapDirection::ZeroForOne => self.amounts.amount0_in,
            SwapDirection::OneForZero => self.amounts.amount1_in,
        }
    }
}

const fn split_signed(amount: i128) -> (Amount, Amount) {
    if amount >= 0 {
        (Amount::new(amount.unsigned_abs()), Amount::ZERO)
    } else {
        (Amount::ZERO, Amount::new(amount.unsigned_abs()))
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    fn trade(amount0: i128, amount1: i128) -> TradeData {
        let Ok(t) = TradeData::from_signed_amounts(
            1,
            SqrtPriceX96::MIN,
            Liquidity::ZERO,
            Tick::MIN,
            amount0,
            amount1,
        ) else {
            panic!("expected Ok");
        };
        t
    }

    #[test]
    fn signed_amounts_split_into_flows() {
        let t = trade(-500, 1_000);
        assert_eq!(
            t.amounts(),
            SwapAmounts {
                amount0_in: Amount::ZERO,
                amount0_out: Amount::new(500),
                amount1_in: Amount::new(1_000),
                amount1_out: Amount::ZERO,
            }
        );
        assert_eq!(t.direction(), Some(SwapDirection::OneForZero));
        assert_eq!(t.amount_in(), Amount::new(1_000));
        assert_eq!(t.amount_in_for(SwapDirection::ZeroForOne), Amount::ZERO);
    }

    #[test]
    fn i128_min_does_not_overflow() {
        let t = trade(i128::MIN, 1);
        assert_eq!(t.amounts().amount0_out.get(), 1u128 << 127);
    }

    #[test]
    fn both_positive_rejected() {
        let Err(e) = TradeData::from_signed_amounts(
            1,
            SqrtPriceX96::MIN,
            Liquidity::ZERO,
            Tick::MIN,
            1,
            1,
        ) else {
            panic!("expected Err");
        };
        assert_eq!(
            e,
            BacktestError::InvalidQuantity("a swap cannot pay both tokens into the pool")
        );
    }

    #[test]
    fn no_input_has_no_direction() {
        let t = trade(0, -5);
        assert_eq!(t.direction(), None);
        assert!(t.amount_in().is_zero());
    }

    #[test]
    fn both_inputs_have_no_direction() {
        let t = TradeData::new(
            1,
            SqrtPriceX96::MIN,
            Liquidity::ZERO,
            Tick::MIN,
            SwapAmounts {
                amount0_in: Amount::new(1),
                amount1_in: Amount::new(1),
                ..SwapAmounts::default()
            },
        );
        assert_eq!(t.direction(), None);
    }
}
