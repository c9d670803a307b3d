//! Token amount deltas, price updates, and fee arithmetic.
//!
//! All intermediates are widened to 256 bits so the only failure modes are
//! results that genuinely do not fit: a token amount above `u64::MAX`
//! surfaces as [`QuoteError::AmountExceedsMax`], a sqrt price above
//! `u128::MAX` as [`QuoteError::SqrtPriceOutOfBounds`].
//!
//! Rounding always favors the pool: amounts paid in round up, amounts paid
//! out round down, and price updates round toward the starting price.

use ethnum::U256;

use crate::constants::FEE_RATE_MUL_VALUE;
use crate::error::{QuoteError, SdkResult};
use crate::types::Percentage;

/// Amount of token A held between two sqrt prices at the given liquidity.
///
/// `delta_a = liquidity * (upper - lower) / (lower * upper)`, in token units.
pub fn try_get_amount_delta_a(
    sqrt_price_1: u128,
    sqrt_price_2: u128,
    liquidity: u128,
    round_up: bool,
) -> SdkResult<u64> {
    let (lower, upper) = order_prices(sqrt_price_1, sqrt_price_2);
    let numerator = shift_left_64(U256::from(liquidity) * U256::from(upper - lower))?;
    let denominator = U256::from(lower) * U256::from(upper);
    let amount = div_round(numerator, denominator, round_up)?;
    to_token_amount(amount)
}

/// Amount of token B held between two sqrt prices at the given liquidity.
///
/// `delta_b = liquidity * (upper - lower)`, shifted out of the Q64.64 domain.
pub fn try_get_amount_delta_b(
    sqrt_price_1: u128,
    sqrt_price_2: u128,
    liquidity: u128,
    round_up: bool,
) -> SdkResult<u64> {
    let (lower, upper) = order_prices(sqrt_price_1, sqrt_price_2);
    let product = U256::from(liquidity) * U256::from(upper - lower);
    let mut quotient = product >> 64;
    if round_up && product & U256::from(u64::MAX) != U256::ZERO {
        quotient += U256::ONE;
    }
    to_token_amount(quotient)
}

/// Sqrt price after trading `amount` of token A against `liquidity`.
///
/// Token A moves the price down when paid in and up when taken out. The
/// result always rounds up, which rounds toward the starting price for an
/// input and away from it for an output.
pub fn try_get_next_sqrt_price_from_a(
    sqrt_price: u128,
    liquidity: u128,
    amount: u64,
    specified_input: bool,
) -> SdkResult<u128> {
    if amount == 0 {
        return Ok(sqrt_price);
    }
    let price = U256::from(sqrt_price);
    let numerator = shift_left_64(U256::from(liquidity) * price)?;
    let product = U256::from(amount) * price;
    let liquidity_shifted = shift_left_64(U256::from(liquidity))?;
    let denominator = if specified_input {
        liquidity_shifted
            .checked_add(product)
            .ok_or(QuoteError::ArithmeticOverflow)?
    } else {
        liquidity_shifted
            .checked_sub(product)
            .ok_or(QuoteError::ArithmeticOverflow)?
    };
    let next = div_round(numerator, denominator, true)?;
    if next.leading_zeros() < 128 {
        return Err(QuoteError::SqrtPriceOutOfBounds);
    }
    Ok(next.as_u128())
}

/// Sqrt price after trading `amount` of token B against `liquidity`.
///
/// Token B moves the price up when paid in and down when taken out. The
/// price delta rounds down for an input and up for an output, again toward
/// the starting price.
pub fn try_get_next_sqrt_price_from_b(
    sqrt_price: u128,
    liquidity: u128,
    amount: u64,
    specified_input: bool,
) -> SdkResult<u128> {
    if amount == 0 {
        return Ok(sqrt_price);
    }
    if liquidity == 0 {
        return Err(QuoteError::ArithmeticOverflow);
    }
    let numerator = U256::from(amount) << 64;
    let delta = div_round(numerator, U256::from(liquidity), !specified_input)?;
    // amount < 2^64 and liquidity >= 1, so the delta fits in 128 bits
    let delta = delta.as_u128();
    if specified_input {
        sqrt_price
            .checked_add(delta)
            .ok_or(QuoteError::SqrtPriceOutOfBounds)
    } else {
        sqrt_price
            .checked_sub(delta)
            .ok_or(QuoteError::SqrtPriceOutOfBounds)
    }
}

/// Input amount net of the swap fee, rounded down.
pub fn apply_swap_fee(amount: u64, fee_rate: u16) -> u64 {
    let remaining =
        u128::from(amount) * (FEE_RATE_MUL_VALUE - u128::from(fee_rate)) / FEE_RATE_MUL_VALUE;
    remaining as u64
}

/// Smallest pre-fee amount whose post-fee value is at least `amount`.
pub fn try_reverse_apply_swap_fee(amount: u64, fee_rate: u16) -> SdkResult<u64> {
    let numerator = u128::from(amount) * FEE_RATE_MUL_VALUE;
    let denominator = FEE_RATE_MUL_VALUE - u128::from(fee_rate);
    let pre_fee = numerator / denominator + u128::from(numerator % denominator != 0);
    u64::try_from(pre_fee).map_err(|_| QuoteError::AmountExceedsMax)
}

/// Lower bound on an estimated output after applying a slippage tolerance.
pub fn min_amount_with_slippage(amount: u64, tolerance: Percentage) -> SdkResult<u64> {
    let numerator = tolerance
        .denominator
        .checked_sub(tolerance.numerator)
        .ok_or(QuoteError::ArithmeticOverflow)?;
    try_mul_div(
        amount,
        u128::from(numerator),
        u128::from(tolerance.denominator),
        false,
    )
}

/// Upper bound on an estimated input after applying a slippage tolerance.
pub fn max_amount_with_slippage(amount: u64, tolerance: Percentage) -> SdkResult<u64> {
    let numerator = u128::from(tolerance.denominator) + u128::from(tolerance.numerator);
    try_mul_div(amount, numerator, u128::from(tolerance.denominator), true)
}

fn try_mul_div(amount: u64, numerator: u128, denominator: u128, round_up: bool) -> SdkResult<u64> {
    let product = U256::from(amount) * U256::from(numerator);
    let result = div_round(product, U256::from(denominator), round_up)?;
    to_token_amount(result)
}

fn order_prices(sqrt_price_1: u128, sqrt_price_2: u128) -> (u128, u128) {
    if sqrt_price_1 < sqrt_price_2 {
        (sqrt_price_1, sqrt_price_2)
    } else {
        (sqrt_price_2, sqrt_price_1)
    }
}

fn div_round(numerator: U256, denominator: U256, round_up: bool) -> SdkResult<U256> {
    if denominator == U256::ZERO {
        return Err(QuoteError::ArithmeticOverflow);
    }
    let quotient = numerator / denominator;
    if round_up && numerator % denominator != U256::ZERO {
        quotient
            .checked_add(U256::ONE)
            .ok_or(QuoteError::ArithmeticOverflow)
    } else {
        Ok(quotient)
    }
}

fn shift_left_64(value: U256) -> SdkResult<U256> {
    if value.leading_zeros() < 64 {
        return Err(QuoteError::ArithmeticOverflow);
    }
    Ok(value << 64)
}

fn to_token_amount(value: U256) -> SdkResult<u64> {
    if value > U256::from(u64::MAX) {
        return Err(QuoteError::AmountExceedsMax);
    }
    Ok(value.as_u64())
}

#[cfg(test)]
mod tests {
    use super::*;

    const ONE_X64: u128 = 1 << 64;

    #[test]
    fn amount_delta_a_between_prices() {
        assert_eq!(
            try_get_amount_delta_a(ONE_X64, ONE_X64 * 2, 100, false).unwrap(),
            50
        );
        assert_eq!(
            try_get_amount_delta_a(ONE_X64 * 2, ONE_X64, 100, true).unwrap(),
            50
        );
        // sub-unit delta: floor gives 0, ceil gives 1
        assert_eq!(
            try_get_amount_delta_a(ONE_X64, ONE_X64 + (1 << 40), 1_000_000, false).unwrap(),
            0
        );
        assert_eq!(
            try_get_amount_delta_a(ONE_X64, ONE_X64 + (1 << 40), 1_000_000, true).unwrap(),
            1
        );
    }

    #[test]
    fn amount_delta_b_between_prices() {
        assert_eq!(
            try_get_amount_delta_b(ONE_X64, ONE_X64 + (1 << 40), 1 << 44, false).unwrap(),
            1048576
        );
        assert_eq!(
            try_get_amount_delta_b(ONE_X64, ONE_X64 + (1 << 40), 1 << 44, true).unwrap(),
            1048576
        );
        assert_eq!(try_get_amount_delta_b(ONE_X64, ONE_X64, 1 << 44, true).unwrap(), 0);
    }

    #[test]
    fn amount_delta_overflow_is_reported() {
        assert_eq!(
            try_get_amount_delta_a(
                crate::constants::MIN_SQRT_PRICE,
                crate::constants::MAX_SQRT_PRICE,
                u128::from(u64::MAX),
                false
            ),
            Err(QuoteError::AmountExceedsMax)
        );
    }

    #[test]
    fn next_sqrt_price_from_a() {
        assert_eq!(
            try_get_next_sqrt_price_from_a(ONE_X64, 100001000, 997, true).unwrap(),
            18446560163343826736
        );
        assert_eq!(
            try_get_next_sqrt_price_from_a(ONE_X64, 100001000, 997, false).unwrap(),
            18446927987742449080
        );
        assert_eq!(
            try_get_next_sqrt_price_from_a(ONE_X64, 100001000, 0, true).unwrap(),
            ONE_X64
        );
    }

    #[test]
    fn next_sqrt_price_from_b() {
        assert_eq!(
            try_get_next_sqrt_price_from_b(ONE_X64, ONE_X64, 1000, true).unwrap(),
            18446744073709552616
        );
        assert_eq!(
            try_get_next_sqrt_price_from_b(ONE_X64, ONE_X64, 1000, false).unwrap(),
            18446744073709550616
        );
        assert_eq!(
            try_get_next_sqrt_price_from_b(ONE_X64, 0, 1000, true),
            Err(QuoteError::ArithmeticOverflow)
        );
    }

    #[test]
    fn swap_fee_round_trip() {
        assert_eq!(apply_swap_fee(1000, 3000), 997);
        assert_eq!(try_reverse_apply_swap_fee(997, 3000).unwrap(), 1000);
        // ceil keeps the reverse direction an upper bound
        assert_eq!(try_reverse_apply_swap_fee(1, 3000).unwrap(), 2);
        assert_eq!(apply_swap_fee(0, 3000), 0);
    }

    #[test]
    fn slippage_bounds() {
        let tolerance = Percentage::from_bps(1000);
        assert_eq!(min_amount_with_slippage(996, tolerance).unwrap(), 896);
        assert_eq!(max_amount_with_slippage(1005, tolerance).unwrap(), 1106);
        let one_percent = Percentage::from_fraction(1, 100);
        assert_eq!(
            min_amount_with_slippage(34786881713931, one_percent).unwrap(),
            34439012896791
        );
    }
}
