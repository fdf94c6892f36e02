//! Unified error types for the backtesting engine.
//!
//! All fallible operations across the crate return [`BacktestError`] as
//! their error type. Validation failures carry a static message; engine
//! failures carry the tick, position or trade they were raised for, and
//! errors raised while processing a trade are wrapped in
//! [`BacktestError::AtTrade`] with the trade's index and block.

use crate::domain::{Divergence, Liquidity, PositionId, Tick};

/// Convenience alias used by every fallible function in the crate.
pub type Result<T> = core::result::Result<T, BacktestError>;

/// Every failure the engine can report.
///
/// Fatal variants (`ArithmeticOverflow`, `LiquidityUnderflow`,
/// `OutOfOrderTrade`) indicate corrupted input or a precision limit and
/// halt the run. `InsufficientLiquidity`, `PositionAlreadyExists` and the
/// other position variants reject a single request and leave state as it
/// was. `ReplayDivergence` is only returned under
/// [`DivergencePolicy::Fail`](crate::config::DivergencePolicy::Fail).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum BacktestError {
    /// A tick index is outside `[-887272, 887272]` or misaligned.
    #[error("invalid tick: {0}")]
    InvalidTick(&'static str),

    /// A tick range is empty or inverted.
    #[error("invalid tick range: {0}")]
    InvalidTickRange(&'static str),

    /// A sqrt price is outside the representable ratio range.
    #[error("invalid sqrt price: {0}")]
    InvalidSqrtPrice(&'static str),

    /// A fee value cannot be represented as a pool fee tier.
    #[error("invalid fee: {0}")]
    InvalidFee(&'static str),

    /// A configuration blueprint failed validation.
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(&'static str),

    /// An amount or liquidity value is unusable for the operation.
    #[error("invalid quantity: {0}")]
    InvalidQuantity(&'static str),

    /// A fixed-point intermediate or accumulator exceeded its width.
    #[error("arithmetic overflow: {0}")]
    ArithmeticOverflow(&'static str),

    /// A fixed-point division had a zero denominator.
    #[error("division by zero: {0}")]
    DivisionByZero(&'static str),

    /// Active or tick liquidity would become negative.
    #[error("liquidity underflow at {tick}: liquidity {liquidity}, delta {delta}")]
    LiquidityUnderflow {
        /// Tick whose crossing or update underflowed.
        tick: Tick,
        /// Liquidity before the delta was applied.
        liquidity: Liquidity,
        /// The signed delta that could not be applied.
        delta: i128,
    },

    /// A withdrawal asked for more liquidity than the position holds.
    #[error("insufficient liquidity in {position}: holds {available}, requested {requested}")]
    InsufficientLiquidity {
        /// The position being adjusted.
        position: PositionId,
        /// Liquidity currently in the position.
        available: Liquidity,
        /// Liquidity the caller tried to remove.
        requested: u128,
    },

    /// A position with the same owner and range is already open.
    #[error("position already exists: {0}")]
    PositionAlreadyExists(PositionId),

    /// No position with this owner and range is open.
    #[error("position not found: {0}")]
    PositionNotFound(PositionId),

    /// A position still holds liquidity or uncollected tokens.
    #[error("position not empty: {0}")]
    PositionNotEmpty(PositionId),

    /// Trades were not supplied in strictly increasing block order.
    #[error("out-of-order trade: block {block} does not follow block {previous}")]
    OutOfOrderTrade {
        /// Block number of the rejected trade.
        block: u64,
        /// Block number of the last processed trade.
        previous: u64,
    },

    /// The simulated outcome of a trade disagrees with its record.
    #[error("replay divergence: {0}")]
    ReplayDivergence(Divergence),

    /// A failure raised while processing one trade of a sequence.
    #[error("trade #{index} (block {block}): {source}")]
    AtTrade {
        /// Zero-based position of the trade in the processed sequence.
        index: usize,
        /// Block number recorded on the trade.
        block: u64,
        /// The underlying failure.
        source: Box<BacktestError>,
    },
}

impl BacktestError {
    /// Attaches trade context to an error raised while processing it.
    #[must_use]
    pub fn at_trade(self, index: usize, block: u64) -> Self {
        Self::AtTrade {
            index,
            block,
            source: Box::new(self),
        }
    }

    /// Strips any [`AtTrade`](Self::AtTrade) wrapping and returns the
    /// underlying failure.
    #[must_use]
    pub fn root_cause(&self) -> &Self {
        match self {
            Self::AtTrade { source, .. } => source.root_cause(),
            other => other,
        }
    }

    /// Returns `true` for failures that leave the simulation unusable.
    #[must_use]
    pub fn is_fatal(&self) -> bool {
        matches!(
            self.root_cause(),
            Self::ArithmeticOverflow(_)
                | Self::DivisionByZero(_)
                | Self::LiquidityUnderflow { .. }
                | Self::OutOfOrderTrade { .. }
        )
    }
}
