//! Property-based tests using `proptest` for pool and ledger invariants.
//!
//! 1. **Tick consistency**: `sqrt_price_to_tick(tick_to_sqrt_price(t)) == t`
//!    and prices strictly increase with the tick.
//! 2. **Tick map balance**: liquidity net over all ticks sums to zero and
//!    active liquidity equals the positions in range.
//! 3. **Fee conservation**: global fee growth never decreases and
//!    positions never earn more than the fees the trades paid.
//! 4. **Replay determinism**: the same trades on the same start state
//!    give identical reports and final state.
//! 5. **Swap bounds**: an exact-input swap never takes more than asked.

use proptest::prelude::*;

use crate::config::{DivergencePolicy, PoolConfig, ReplayConfig, SimulationConfig};
use crate::domain::{
    Amount, FeeTier, Liquidity, Owner, PositionId, SqrtPriceX96, SwapAmounts, SwapDirection,
    SwapSpec, Tick, TradeData,
};
use crate::math::{sqrt_price_to_tick, tick_to_sqrt_price};
use crate::simulation::SimulationDriver;
use crate::traits::FromConfig;

// ---------------------------------------------------------------------------
// Shared helpers
// ---------------------------------------------------------------------------

const SPACING: i32 = 60;

fn tick(v: i32) -> Tick {
    let Ok(t) = Tick::new(v) else {
        panic!("valid tick expected");
    };
    t
}

fn price(v: i32) -> SqrtPriceX96 {
    let Ok(p) = tick_to_sqrt_price(tick(v)) else {
        panic!("valid price expected");
    };
    p
}

fn make_driver() -> SimulationDriver {
    let Ok(pool) = PoolConfig::at_tick(FeeTier::TIER_0_30_PERCENT, Tick::ZERO) else {
        panic!("valid pool config");
    };
    let replay = ReplayConfig::new(DivergencePolicy::Ignore, 0);
    let Ok(cfg) = SimulationConfig::new(pool, replay) else {
        panic!("valid simulation config");
    };
    let Ok(driver) = SimulationDriver::from_config(&cfg) else {
        panic!("valid driver");
    };
    driver
}

fn position(owner: u8, lower: i32, width: i32) -> PositionId {
    let lower = lower * SPACING;
    let Ok(id) = PositionId::new(Owner::new([owner; 20]), tick(lower), tick(lower + width * SPACING))
    else {
        panic!("valid position");
    };
    id
}

/// Opens and funds each `(lower, width, liquidity)` range, in units of
/// the tick spacing.
fn fund(driver: &mut SimulationDriver, ranges: &[(i32, i32, u64)]) {
    for (owner, &(lower, width, liquidity)) in ranges.iter().enumerate() {
        let id = position(owner as u8, lower, width);
        let Ok(()) = driver.open_position(id) else {
            panic!("open failed");
        };
        let Ok(_) = driver.adjust_liquidity(&id, i128::from(liquidity)) else {
            panic!("deposit failed");
        };
    }
}

/// Builds a block-ordered trade stream visiting `targets`; upward moves
/// pay token1 in, the rest pay token0 in.
fn trades(targets: &[(i32, u64)]) -> Vec<TradeData> {
    let mut previous = 0;
    targets
        .iter()
        .enumerate()
        .map(|(i, &(to, amount_in))| {
            let amounts = if to > previous {
                SwapAmounts {
                    amount1_in: Amount::new(u128::from(amount_in)),
                    ..SwapAmounts::default()
                }
            } else {
                SwapAmounts {
                    amount0_in: Amount::new(u128::from(amount_in)),
                    ..SwapAmounts::default()
                }
            };
            previous = to;
            TradeData::new(i as u64 + 1, price(to), Liquidity::ZERO, tick(to), amounts)
        })
        .collect()
}

fn ranges_strategy() -> impl Strategy<Value = Vec<(i32, i32, u64)>> {
    prop::collection::vec((-10i32..10, 1i32..8, 1u64..1_000_000_000), 1..6)
}

fn targets_strategy() -> impl Strategy<Value = Vec<(i32, u64)>> {
    prop::collection::vec((-900i32..900, 0u64..10_000_000_000), 1..12)
}

// ---------------------------------------------------------------------------
// Property 1: Tick Consistency
// ---------------------------------------------------------------------------

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    #[test]
    fn prop_tick_round_trip(tick_val in Tick::MIN.get()..=Tick::MAX.get()) {
        let t = tick(tick_val);
        let Ok(p) = tick_to_sqrt_price(t) else {
            return Err(TestCaseError::fail("price at a valid tick"));
        };
        let Ok(round_trip) = sqrt_price_to_tick(p) else {
            return Err(TestCaseError::fail("tick at a valid price"));
        };
        prop_assert_eq!(round_trip, t, "round trip of tick {}", tick_val);
    }

    #[test]
    fn prop_price_strictly_increasing(tick_val in Tick::MIN.get()..Tick::MAX.get()) {
        let (Ok(low), Ok(high)) = (
            tick_to_sqrt_price(tick(tick_val)),
            tick_to_sqrt_price(tick(tick_val + 1)),
        ) else {
            return Err(TestCaseError::fail("prices at valid ticks"));
        };
        prop_assert!(low < high, "price must increase past tick {}", tick_val);
    }
}

// ---------------------------------------------------------------------------
// Property 2: Tick Map Balance
// ---------------------------------------------------------------------------

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_tick_map_balanced(
        ranges in ranges_strategy(),
        withdraw_pct in 0u64..=100,
    ) {
        let mut driver = make_driver();
        fund(&mut driver, &ranges);
        for (owner, &(lower, width, liquidity)) in ranges.iter().enumerate() {
            let id = position(owner as u8, lower, width);
            let take = liquidity * withdraw_pct / 100;
            let Ok(_) = driver.adjust_liquidity(&id, -i128::from(take)) else {
                return Err(TestCaseError::fail("withdrawal within balance"));
            };
        }

        prop_assert_eq!(driver.pool().ticks().liquidity_net_sum(), Some(0));
        let current = driver.pool().tick();
        let in_range: u128 = driver
            .ledger()
            .in_range(current)
            .map(|(_, p)| p.liquidity().get())
            .sum();
        prop_assert_eq!(driver.pool().liquidity().get(), in_range);
    }
}

// ---------------------------------------------------------------------------
// Property 3: Fee Conservation
// ---------------------------------------------------------------------------

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_positions_never_earn_more_than_paid(
        ranges in ranges_strategy(),
        targets in targets_strategy(),
    ) {
        let mut driver = make_driver();
        fund(&mut driver, &ranges);
        let stream = trades(&targets);
        let Ok(reports) = driver.run(&stream) else {
            return Err(TestCaseError::fail("replay under the ignore policy"));
        };

        for pair in reports.windows(2) {
            prop_assert!(pair[1].snapshot.fee_growth_global0 >= pair[0].snapshot.fee_growth_global0);
            prop_assert!(pair[1].snapshot.fee_growth_global1 >= pair[0].snapshot.fee_growth_global1);
        }

        let (mut paid0, mut paid1) = (0u128, 0u128);
        for (report, trade) in reports.iter().zip(&stream) {
            let attributed = report.outcome.fee().get() - report.outcome.unattributed_fee().get();
            match trade.direction() {
                Some(SwapDirection::ZeroForOne) => paid0 += attributed,
                _ => paid1 += attributed,
            }
        }

        // accrue everything still pending
        let ids: Vec<PositionId> = driver.ledger().iter().map(|(id, _)| *id).collect();
        for id in &ids {
            let Ok(_) = driver.collect(id, Amount::ZERO, Amount::ZERO) else {
                return Err(TestCaseError::fail("accrual of an open position"));
            };
        }
        let (owed0, owed1) = driver.ledger().iter().fold((0u128, 0u128), |acc, (_, p)| {
            (acc.0 + p.tokens_owed0().get(), acc.1 + p.tokens_owed1().get())
        });
        prop_assert!(owed0 <= paid0, "token0: owed {} > paid {}", owed0, paid0);
        prop_assert!(owed1 <= paid1, "token1: owed {} > paid {}", owed1, paid1);
    }
}

// ---------------------------------------------------------------------------
// Property 4: Replay Determinism
// ---------------------------------------------------------------------------

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn prop_replay_deterministic(
        ranges in ranges_strategy(),
        targets in targets_strategy(),
    ) {
        let stream = trades(&targets);
        let mut first = make_driver();
        let mut second = make_driver();
        fund(&mut first, &ranges);
        fund(&mut second, &ranges);

        let a = first.run(&stream);
        let b = second.run(&stream);
        prop_assert_eq!(a, b);
        prop_assert_eq!(first, second);
    }
}

// ---------------------------------------------------------------------------
// Property 5: Swap Bounds
// ---------------------------------------------------------------------------

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_exact_in_swap_bounded(
        ranges in ranges_strategy(),
        amount in 1u64..1_000_000_000_000,
        zero_for_one in any::<bool>(),
    ) {
        let mut driver = make_driver();
        fund(&mut driver, &ranges);
        let mut pool = driver.pool().clone();
        let direction = if zero_for_one {
            SwapDirection::ZeroForOne
        } else {
            SwapDirection::OneForZero
        };
        let Ok(spec) = SwapSpec::exact_in(Amount::new(u128::from(amount))) else {
            return Err(TestCaseError::fail("non-zero exact input"));
        };
        let before = pool.sqrt_price();
        let Ok(result) = pool.swap(direction, spec, None) else {
            return Err(TestCaseError::fail("swap without a price limit"));
        };

        prop_assert!(result.amount_in().get() <= u128::from(amount));
        prop_assert!(result.fee() <= result.amount_in());
        if zero_for_one {
            prop_assert!(pool.sqrt_price() <= before);
        } else {
            prop_assert!(pool.sqrt_price() >= before);
        }
        prop_assert_eq!(pool.ticks().liquidity_net_sum(), Some(0));
    }
}
