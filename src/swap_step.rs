//! Single swap step between the current price and a target price.
//!
//! A step trades against constant liquidity, so it never crosses a tick. The
//! caller picks the target as the nearer of the next initialized tick and
//! the price limit; the step either reaches it or consumes the remaining
//! amount first.

use crate::error::{QuoteError, SdkResult};
use crate::math::{
    apply_swap_fee, try_get_amount_delta_a, try_get_amount_delta_b,
    try_get_next_sqrt_price_from_a, try_get_next_sqrt_price_from_b,
    try_reverse_apply_swap_fee,
};

/// Outcome of one swap step.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StepResult {
    pub amount_in: u64,
    pub amount_out: u64,
    pub fee_amount: u64,
    pub next_sqrt_price: u128,
    /// True when the step ran all the way to `target_sqrt_price`.
    pub boundary_reached: bool,
}

/// Simulates one constant-liquidity step.
///
/// `amount_remaining` is the untraded part of the specified amount, fees
/// included when the input side is specified. The fixed side of the trade is
/// the specified one; the other side is derived from the realized price
/// move. When the full distance to the target needs more than `u64::MAX` of
/// the fixed token, the step falls back to pricing the remaining amount
/// directly.
pub fn compute_swap_step(
    amount_remaining: u64,
    fee_rate: u16,
    liquidity: u128,
    current_sqrt_price: u128,
    target_sqrt_price: u128,
    a_to_b: bool,
    specified_input: bool,
) -> SdkResult<StepResult> {
    let initial_fixed_delta = match try_get_amount_fixed_delta(
        current_sqrt_price,
        target_sqrt_price,
        liquidity,
        a_to_b,
        specified_input,
    ) {
        Ok(amount) => Some(amount),
        Err(QuoteError::AmountExceedsMax) => None,
        Err(err) => return Err(err),
    };

    let amount_calculated = if specified_input {
        apply_swap_fee(amount_remaining, fee_rate)
    } else {
        amount_remaining
    };

    let next_sqrt_price = match initial_fixed_delta {
        Some(fixed) if fixed <= amount_calculated => target_sqrt_price,
        _ => try_get_next_sqrt_price(
            current_sqrt_price,
            liquidity,
            amount_calculated,
            a_to_b,
            specified_input,
        )?,
    };
    let boundary_reached = next_sqrt_price == target_sqrt_price;

    let amount_unfixed = try_get_amount_unfixed_delta(
        current_sqrt_price,
        next_sqrt_price,
        liquidity,
        a_to_b,
        specified_input,
    )?;
    let amount_fixed = match initial_fixed_delta {
        Some(amount) if boundary_reached => amount,
        _ => try_get_amount_fixed_delta(
            current_sqrt_price,
            next_sqrt_price,
            liquidity,
            a_to_b,
            specified_input,
        )?,
    };

    let (amount_in, mut amount_out) = if specified_input {
        (amount_fixed, amount_unfixed)
    } else {
        (amount_unfixed, amount_fixed)
    };
    // rounding must never hand out more than was asked for
    if !specified_input && amount_out > amount_remaining {
        amount_out = amount_remaining;
    }

    let fee_amount = if specified_input && !boundary_reached {
        // everything left over is fee
        amount_remaining
            .checked_sub(amount_in)
            .ok_or(QuoteError::ArithmeticOverflow)?
    } else {
        try_reverse_apply_swap_fee(amount_in, fee_rate)? - amount_in
    };

    Ok(StepResult {
        amount_in,
        amount_out,
        fee_amount,
        next_sqrt_price,
        boundary_reached,
    })
}

/// Delta of the specified token over a price move: token A on a downward
/// swap input or upward swap output, token B otherwise. Rounds up for
/// inputs, down for outputs.
fn try_get_amount_fixed_delta(
    current_sqrt_price: u128,
    target_sqrt_price: u128,
    liquidity: u128,
    a_to_b: bool,
    specified_input: bool,
) -> SdkResult<u64> {
    if a_to_b == specified_input {
        try_get_amount_delta_a(current_sqrt_price, target_sqrt_price, liquidity, specified_input)
    } else {
        try_get_amount_delta_b(current_sqrt_price, target_sqrt_price, liquidity, specified_input)
    }
}

/// Delta of the unspecified token over a price move, with the opposite
/// rounding.
fn try_get_amount_unfixed_delta(
    current_sqrt_price: u128,
    target_sqrt_price: u128,
    liquidity: u128,
    a_to_b: bool,
    specified_input: bool,
) -> SdkResult<u64> {
    if a_to_b == specified_input {
        try_get_amount_delta_b(current_sqrt_price, target_sqrt_price, liquidity, !specified_input)
    } else {
        try_get_amount_delta_a(current_sqrt_price, target_sqrt_price, liquidity, !specified_input)
    }
}

fn try_get_next_sqrt_price(
    current_sqrt_price: u128,
    liquidity: u128,
    amount: u64,
    a_to_b: bool,
    specified_input: bool,
) -> SdkResult<u128> {
    if a_to_b == specified_input {
        try_get_next_sqrt_price_from_a(current_sqrt_price, liquidity, amount, specified_input)
    } else {
        try_get_next_sqrt_price_from_b(current_sqrt_price, liquidity, amount, specified_input)
    }
}
