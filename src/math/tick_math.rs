//! Conversions between tick indices and Q64.64 sqrt prices.
//!
//! Prices are square roots of the token B / token A exchange rate, stored as
//! unsigned 64.64 fixed point. A tick index `t` corresponds to the sqrt price
//! `sqrt(1.0001^t)`, and both conversions here are bit-exact with the
//! on-chain program: the forward direction composes precomputed per-bit
//! ratios, the reverse direction runs a base-2 log approximation and picks
//! between the two candidate ticks it brackets.

use ethnum::U256;

use crate::constants::{MAX_SQRT_PRICE, MAX_TICK, MIN_SQRT_PRICE, MIN_TICK};
use crate::error::{QuoteError, SdkResult};

const LOG_B_2_X32: i128 = 59543866431248;
const BIT_PRECISION: u32 = 14;
const LOG_B_P_ERR_MARGIN_LOWER_X64: i128 = 184467440737095516;
const LOG_B_P_ERR_MARGIN_UPPER_X64: i128 = 15793534762490258745;

/// Q64.64 sqrt price for a tick index.
///
/// Errors with [`QuoteError::TickIndexOutOfBounds`] outside
/// `[MIN_TICK, MAX_TICK]`.
pub fn tick_index_to_sqrt_price(tick_index: i32) -> SdkResult<u128> {
    if !(MIN_TICK..=MAX_TICK).contains(&tick_index) {
        return Err(QuoteError::TickIndexOutOfBounds);
    }
    if tick_index >= 0 {
        Ok(get_sqrt_price_positive_tick(tick_index))
    } else {
        Ok(get_sqrt_price_negative_tick(tick_index))
    }
}

/// Largest tick index whose sqrt price does not exceed `sqrt_price`.
///
/// Errors with [`QuoteError::SqrtPriceOutOfBounds`] outside
/// `[MIN_SQRT_PRICE, MAX_SQRT_PRICE]`.
pub fn sqrt_price_to_tick_index(sqrt_price: u128) -> SdkResult<i32> {
    if !(MIN_SQRT_PRICE..=MAX_SQRT_PRICE).contains(&sqrt_price) {
        return Err(QuoteError::SqrtPriceOutOfBounds);
    }

    // Integer part of log2(price) relative to the 64-bit binary point.
    let msb: u32 = 127 - sqrt_price.leading_zeros();
    let log2p_integer_x32 = ((msb as i128) - 64) << 32;

    // Fractional part, one bit per squaring round.
    let mut bit: i128 = 0x8000_0000_0000_0000;
    let mut precision = 0;
    let mut log2p_fraction_x64: i128 = 0;
    let mut r = if msb >= 64 {
        sqrt_price >> (msb - 63)
    } else {
        sqrt_price << (63 - msb)
    };
    while bit > 0 && precision < BIT_PRECISION {
        r *= r;
        let is_r_more_than_two = (r >> 127) as u32;
        r >>= 63 + is_r_more_than_two;
        log2p_fraction_x64 += bit * is_r_more_than_two as i128;
        bit >>= 1;
        precision += 1;
    }

    let log2p_fraction_x32 = log2p_fraction_x64 >> 32;
    let log2p_x32 = log2p_integer_x32 + log2p_fraction_x32;

    // Change of base to log_sqrt(1.0001), with the approximation error
    // bracketed by fixed margins.
    let logbp_x64 = log2p_x32 * LOG_B_2_X32;
    let tick_low = ((logbp_x64 - LOG_B_P_ERR_MARGIN_LOWER_X64) >> 64) as i32;
    let tick_high = ((logbp_x64 + LOG_B_P_ERR_MARGIN_UPPER_X64) >> 64) as i32;

    if tick_low == tick_high {
        return Ok(tick_low);
    }
    let derived_sqrt_price_high = tick_index_to_sqrt_price(tick_high)?;
    if derived_sqrt_price_high <= sqrt_price {
        Ok(tick_high)
    } else {
        Ok(tick_low)
    }
}

fn mul_shift_96(n0: u128, n1: u128) -> u128 {
    let mul: U256 = (<U256>::from(n0) * <U256>::from(n1)) >> 96;
    mul.as_u128()
}

fn get_sqrt_price_positive_tick(tick: i32) -> u128 {
    let mut ratio: u128 = if tick & 1 != 0 {
        79232123823359799118286999567
    } else {
        79228162514264337593543950336
    };

    if tick & 2 != 0 {
        ratio = mul_shift_96(ratio, 79236085330515764027303304731);
    }
    if tick & 4 != 0 {
        ratio = mul_shift_96(ratio, 79244008939048815603706035061);
    }
    if tick & 8 != 0 {
        ratio = mul_shift_96(ratio, 79259858533276714757314932305);
    }
    if tick & 16 != 0 {
        ratio = mul_shift_96(ratio, 79291567232598584799939703904);
    }
    if tick & 32 != 0 {
        ratio = mul_shift_96(ratio, 79355022692464371645785046466);
    }
    if tick & 64 != 0 {
        ratio = mul_shift_96(ratio, 79482085999252804386437311141);
    }
    if tick & 128 != 0 {
        ratio = mul_shift_96(ratio, 79736823300114093921829183326);
    }
    if tick & 256 != 0 {
        ratio = mul_shift_96(ratio, 80248749790819932309965073892);
    }
    if tick & 512 != 0 {
        ratio = mul_shift_96(ratio, 81282483887344747381513967011);
    }
    if tick & 1024 != 0 {
        ratio = mul_shift_96(ratio, 83390072131320151908154831281);
    }
    if tick & 2048 != 0 {
        ratio = mul_shift_96(ratio, 87770609709833776024991924138);
    }
    if tick & 4096 != 0 {
        ratio = mul_shift_96(ratio, 97234110755111693312479820773);
    }
    if tick & 8192 != 0 {
        ratio = mul_shift_96(ratio, 119332217159966728226237229890);
    }
    if tick & 16384 != 0 {
        ratio = mul_shift_96(ratio, 179736315981702064433883588727);
    }
    if tick & 32768 != 0 {
        ratio = mul_shift_96(ratio, 407748233172238350107850275304);
    }
    if tick & 65536 != 0 {
        ratio = mul_shift_96(ratio, 2098478828474011932436660412517);
    }
    if tick & 131072 != 0 {
        ratio = mul_shift_96(ratio, 55581415166113811149459800483533);
    }
    if tick & 262144 != 0 {
        ratio = mul_shift_96(ratio, 38992368544603139932233054999993551);
    }

    ratio >> 32
}

fn get_sqrt_price_negative_tick(tick: i32) -> u128 {
    let abs_tick = tick.abs();
    let mut ratio: u128 = if abs_tick & 1 != 0 {
        18445821805675392311
    } else {
        18446744073709551616
    };

    if abs_tick & 2 != 0 {
        ratio = (ratio * 18444899583751176498) >> 64;
    }
    if abs_tick & 4 != 0 {
        ratio = (ratio * 18443055278223354162) >> 64;
    }
    if abs_tick & 8 != 0 {
        ratio = (ratio * 18439367220385604838) >> 64;
    }
    if abs_tick & 16 != 0 {
        ratio = (ratio * 18431993317065449817) >> 64;
    }
    if abs_tick & 32 != 0 {
        ratio = (ratio * 18417254355718160513) >> 64;
    }
    if abs_tick & 64 != 0 {
        ratio = (ratio * 18387811781193591352) >> 64;
    }
    if abs_tick & 128 != 0 {
        ratio = (ratio * 18329067761203520168) >> 64;
    }
    if abs_tick & 256 != 0 {
        ratio = (ratio * 18212142134806087854) >> 64;
    }
    if abs_tick & 512 != 0 {
        ratio = (ratio * 17980523815641551639) >> 64;
    }
    if abs_tick & 1024 != 0 {
        ratio = (ratio * 17526086738831147013) >> 64;
    }
    if abs_tick & 2048 != 0 {
        ratio = (ratio * 16651378430235024244) >> 64;
    }
    if abs_tick & 4096 != 0 {
        ratio = (ratio * 15030750278693429944) >> 64;
    }
    if abs_tick & 8192 != 0 {
        ratio = (ratio * 12247334978882834399) >> 64;
    }
    if abs_tick & 16384 != 0 {
        ratio = (ratio * 8131365268884726200) >> 64;
    }
    if abs_tick & 32768 != 0 {
        ratio = (ratio * 3584323654723342297) >> 64;
    }
    if abs_tick & 65536 != 0 {
        ratio = (ratio * 696457651847595233) >> 64;
    }
    if abs_tick & 131072 != 0 {
        ratio = (ratio * 26294789957452057) >> 64;
    }
    if abs_tick & 262144 != 0 {
        ratio = (ratio * 37481735321082) >> 64;
    }

    ratio
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sqrt_price_at_bounds_matches_constants() {
        assert_eq!(tick_index_to_sqrt_price(MIN_TICK).unwrap(), MIN_SQRT_PRICE);
        assert_eq!(tick_index_to_sqrt_price(MAX_TICK).unwrap(), MAX_SQRT_PRICE);
        assert_eq!(tick_index_to_sqrt_price(0).unwrap(), 1u128 << 64);
    }

    #[test]
    fn known_sqrt_prices() {
        assert_eq!(tick_index_to_sqrt_price(64).unwrap(), 18505865242158250041);
        assert_eq!(tick_index_to_sqrt_price(-64).unwrap(), 18387811781193591352);
        assert_eq!(sqrt_price_to_tick_index(30954288334991641).unwrap(), -127810);
    }

    #[test]
    fn out_of_bounds_inputs_are_rejected() {
        assert_eq!(
            tick_index_to_sqrt_price(MAX_TICK + 1),
            Err(QuoteError::TickIndexOutOfBounds)
        );
        assert_eq!(
            tick_index_to_sqrt_price(MIN_TICK - 1),
            Err(QuoteError::TickIndexOutOfBounds)
        );
        assert_eq!(
            sqrt_price_to_tick_index(MIN_SQRT_PRICE - 1),
            Err(QuoteError::SqrtPriceOutOfBounds)
        );
        assert_eq!(
            sqrt_price_to_tick_index(MAX_SQRT_PRICE + 1),
            Err(QuoteError::SqrtPriceOutOfBounds)
        );
    }

    #[test]
    fn round_trip_over_sampled_ticks() {
        let mut ticks: Vec<i32> = (MIN_TICK..=MAX_TICK).step_by(8191).collect();
        ticks.extend([MIN_TICK, -1, 0, 1, MAX_TICK]);
        for tick in ticks {
            let sqrt_price = tick_index_to_sqrt_price(tick).unwrap();
            assert_eq!(sqrt_price_to_tick_index(sqrt_price).unwrap(), tick);
        }
    }

    #[test]
    fn sqrt_price_is_strictly_increasing_in_tick() {
        let mut prev = tick_index_to_sqrt_price(MIN_TICK).unwrap();
        for tick in (MIN_TICK + 1..=MAX_TICK).step_by(4099) {
            let sqrt_price = tick_index_to_sqrt_price(tick).unwrap();
            assert!(sqrt_price > prev, "not increasing at tick {tick}");
            prev = sqrt_price;
        }
    }

    #[test]
    fn reverse_conversion_floors_between_ticks() {
        let at_tick = tick_index_to_sqrt_price(100).unwrap();
        assert_eq!(sqrt_price_to_tick_index(at_tick).unwrap(), 100);
        assert_eq!(sqrt_price_to_tick_index(at_tick + 1).unwrap(), 100);
        assert_eq!(sqrt_price_to_tick_index(at_tick - 1).unwrap(), 99);
    }
}
