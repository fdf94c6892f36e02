//! Tick ↔ sqrt-price conversion in Q64.96 fixed point.
//!
//! These helpers implement `sqrt_price = √(1.0001^tick) · 2^96` exactly as
//! the on-chain pools compute it, so replayed prices and ticks agree bit
//! for bit with recorded ones.
//!
//! # Functions
//!
//! - [`tick_to_sqrt_price`] multiplies precomputed `1/√1.0001^(2^i)`
//!   factors for each set bit of `|tick|`, then inverts for positive ticks.
//! - [`sqrt_price_to_tick`] returns the greatest tick whose price is ≤ the
//!   given price.
//!
//! # Examples
//!
//! ```
//! use clmm_backtest::domain::Tick;
//! use clmm_backtest::math::{sqrt_price_to_tick, tick_to_sqrt_price};
//!
//! let tick = Tick::new(100).unwrap_or(Tick::ZERO);
//! let Ok(price) = tick_to_sqrt_price(tick) else { return };
//! assert_eq!(sqrt_price_to_tick(price), Ok(tick));
//! ```

use alloy_primitives::U256;

use crate::domain::{SqrtPriceX96, Tick};

/// `2^128 / √1.0001`, the factor for bit 0 of `|tick|`.
const ODD_TICK_RATIO: u128 = 0xfffc_b933_bd6f_ad37_aa2d_162d_1a59_4001;

/// `2^128 / √1.0001^(2^i)` for bits 1 through 19 of `|tick|`.
const BIT_RATIOS: [(u32, u128); 19] = [
    (0x2, 0xfff9_7272_373d_4132_59a4_6990_580e_213a),
    (0x4, 0xfff2_e50f_5f65_6932_ef12_357c_f3c7_fdcc),
    (0x8, 0xffe5_caca_7e10_e4e6_1c36_24ea_a094_1cd0),
    (0x10, 0xffcb_9843_d60f_6159_c9db_5883_5c92_6644),
    (0x20, 0xff97_3b41_fa98_c081_472e_6896_dfb2_54c0),
    (0x40, 0xff2e_a164_66c9_6a38_43ec_78b3_26b5_2861),
    (0x80, 0xfe5d_ee04_6a99_a2a8_11c4_61f1_969c_3053),
    (0x100, 0xfcbe_86c7_900a_88ae_dcff_c83b_479a_a3a4),
    (0x200, 0xf987_a725_3ac4_1317_6f2b_074c_f781_5e54),
    (0x400, 0xf339_2b08_22b7_0005_940c_7a39_8e4b_70f3),
    (0x800, 0xe715_9475_a2c2_9b74_43b2_9c7f_a6e8_89d9),
    (0x1000, 0xd097_f3bd_fd20_22b8_845a_d8f7_92aa_5825),
    (0x2000, 0xa9f7_4646_2d87_0fdf_8a65_dc1f_90e0_61e5),
    (0x4000, 0x70d8_69a1_56d2_a1b8_90bb_3df6_2baf_32f7),
    (0x8000, 0x31be_135f_97d0_8fd9_8123_1505_542f_cfa6),
    (0x10000, 0x09aa_508b_5b7a_84e1_c677_de54_f3e9_9bc9),
    (0x20000, 0x005d_6af8_dedb_8119_6699_c329_225e_e604),
    (0x40000, 0x0000_2216_e584_f5fa_1ea9_2604_1bed_fe98),
    (0x80000, 0x0000_0000_048a_1703_91f7_dc42_444e_8fa2),
];

/// Q128.128 ratio for a tick index already known to be in range,
/// rounded up to Q64.96.
fn ratio_at(tick: i32) -> U256 {
    let abs_tick = tick.unsigned_abs();
    let mut ratio = if abs_tick & 0x1 != 0 {
        U256::from(ODD_TICK_RATIO)
    } else {
        U256::from(1u8) << 128
    };
    for (mask, factor) in BIT_RATIOS {
        if abs_tick & mask != 0 {
            // ratio <= 2^128 and factor < 2^128, so the product fits
            ratio = (ratio * U256::from(factor)) >> 128;
        }
    }
    if tick > 0 {
        ratio = U256::MAX / ratio;
    }
    let remainder = ratio & U256::from(u32::MAX);
    let shifted = ratio >> 32;
    if remainder.is_zero() {
        shifted
    } else {
        shifted + U256::from(1u8)
    }
}

/// Computes the Q64.96 sqrt price at `tick`.
///
/// # Errors
///
/// Never fails for a valid [`Tick`]; the result is checked against the
/// [`SqrtPriceX96`] bounds all the same.
pub fn tick_to_sqrt_price(tick: Tick) -> crate::error::Result<SqrtPriceX96> {
    SqrtPriceX96::new(ratio_at(tick.get()))
}

/// Computes the greatest tick whose sqrt price is ≤ `sqrt_price`.
///
/// Binary search over the exact forward function, so
/// `sqrt_price_to_tick(tick_to_sqrt_price(t)) == t` for every tick.
///
/// # Errors
///
/// Never fails for a valid [`SqrtPriceX96`]; the resulting index is
/// checked against the [`Tick`] bounds all the same.
pub fn sqrt_price_to_tick(sqrt_price: SqrtPriceX96) -> crate::error::Result<Tick> {
    let target = sqrt_price.get();
    let mut low = Tick::MIN.get();
    let mut high = Tick::MAX.get();
    while low < high {
        let mid = low + (high - low + 1) / 2;
        if ratio_at(mid) <= target {
            low = mid;
        } else {
            high = mid - 1;
        }
    }
    Tick::new(low)
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    fn tick(v: i32) -> Tick {
        let Ok(t) = Tick::new(v) else {
            panic!("valid tick expected");
        };
        t
    }

    fn price_at(v: i32) -> U256 {
        let Ok(p) = tick_to_sqrt_price(tick(v)) else {
            panic!("expected Ok");
        };
        p.get()
    }

    fn dec(s: &str) -> U256 {
        let Ok(v) = U256::from_str_radix(s, 10) else {
            panic!("valid literal");
        };
        v
    }

    // -- tick_to_sqrt_price ---------------------------------------------------

    #[test]
    fn tick_zero_is_q96() {
        assert_eq!(price_at(0), U256::from(1u8) << 96);
    }

    #[test]
    fn bounds_match_sqrt_price_limits() {
        assert_eq!(price_at(-887_272), SqrtPriceX96::MIN.get());
        assert_eq!(price_at(887_272), SqrtPriceX96::MAX.get());
    }

    #[test]
    fn known_values() {
        assert_eq!(price_at(1), dec("79232123823359799118286999568"));
        assert_eq!(price_at(-1), dec("79224201403219477170569942574"));
        assert_eq!(price_at(50), dec("79426470787362580746886972461"));
        assert_eq!(price_at(-60), dec("78990846045029531151608375686"));
        assert_eq!(price_at(6_932), dec("112046559425783515914356180039"));
    }

    #[test]
    fn strictly_increasing() {
        let mut previous = price_at(-1_000);
        for t in -999..=1_000 {
            let current = price_at(t);
            assert!(current > previous, "price not increasing at tick {t}");
            previous = current;
        }
    }

    // -- sqrt_price_to_tick ---------------------------------------------------

    #[test]
    fn exact_tick_prices_round_trip() {
        for v in [-887_272, -100, -1, 0, 1, 60, 887_272] {
            let Ok(p) = tick_to_sqrt_price(tick(v)) else {
                panic!("expected Ok");
            };
            assert_eq!(sqrt_price_to_tick(p), Ok(tick(v)));
        }
    }

    #[test]
    fn between_ticks_floors() {
        let Ok(p) = SqrtPriceX96::new(price_at(50) - U256::from(1u8)) else {
            panic!("expected Ok");
        };
        assert_eq!(sqrt_price_to_tick(p), Ok(tick(49)));
    }

    #[test]
    fn min_price_is_min_tick() {
        assert_eq!(sqrt_price_to_tick(SqrtPriceX96::MIN), Ok(Tick::MIN));
    }
}
