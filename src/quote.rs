//! Swap quote computation over a pool snapshot and loaded tick windows.
//!
//! The engine walks the price from the pool's current sqrt price toward the
//! limit, one initialized tick at a time, and reports how it terminated
//! instead of erroring on partial fills: running out of loaded tick data or
//! hitting the price limit both yield a quote for the portion that traded.

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::constants::{MAX_SQRT_PRICE, MIN_SQRT_PRICE};
use crate::error::{QuoteError, SdkResult};
use crate::math::{
    max_amount_with_slippage, min_amount_with_slippage, sqrt_price_to_tick_index,
    tick_index_to_sqrt_price,
};
use crate::swap_step::compute_swap_step;
use crate::tick_sequence::TickWindowSequence;
use crate::types::{
    Percentage, PoolSnapshot, SpecifiedAmount, SwapDirection, TickArrayReduction, TickWindow,
};

/// Why the quote loop stopped.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum QuoteTermination {
    /// The specified amount traded in full.
    AmountSatisfied,
    /// The price reached the caller's sqrt price limit first.
    PriceLimitReached,
    /// The swap walked past the last initialized tick in the loaded windows.
    LiquidityExhausted,
}

/// Caller inputs for a swap quote.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwapParams {
    pub amount: u64,
    pub direction: SwapDirection,
    pub specified_amount: SpecifiedAmount,
    /// Zero selects the direction's extreme bound.
    pub sqrt_price_limit: u128,
    pub slippage_tolerance: Percentage,
}

/// A computed swap quote.
///
/// The estimated amounts describe the portion that actually traded; compare
/// `termination` against [`QuoteTermination::AmountSatisfied`] to see
/// whether that is the whole request.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwapQuote {
    pub amount: u64,
    pub direction: SwapDirection,
    pub specified_amount: SpecifiedAmount,
    pub sqrt_price_limit: u128,
    pub estimated_amount_in: u64,
    pub estimated_amount_out: u64,
    pub estimated_fee_amount: u64,
    pub estimated_end_tick_index: i32,
    pub estimated_end_sqrt_price: u128,
    /// Worst acceptable counter-amount under the slippage tolerance: a floor
    /// on the output when the input is specified, a cap on the input
    /// otherwise.
    pub other_amount_threshold: u64,
    pub termination: QuoteTermination,
    /// Start indices of the windows the traversal read, in traversal order.
    pub windows_touched: Vec<i32>,
}

/// Computes a swap quote against a pool snapshot.
///
/// `tick_windows` holds the windows fetched for the traversal, in traversal
/// order, with `None` for any account that was missing. The quote is purely
/// a function of its inputs; nothing is fetched here.
pub fn compute_swap_quote(
    pool: &PoolSnapshot,
    tick_windows: &[Option<&TickWindow>],
    params: &SwapParams,
    reduction: TickArrayReduction,
) -> SdkResult<SwapQuote> {
    validate_pool_snapshot(pool)?;

    let a_to_b = params.direction.is_a_to_b();
    let specified_input = params.specified_amount.is_input();
    let sqrt_price_limit = match params.sqrt_price_limit {
        0 if a_to_b => MIN_SQRT_PRICE,
        0 => MAX_SQRT_PRICE,
        limit => limit,
    };
    if !(MIN_SQRT_PRICE..=MAX_SQRT_PRICE).contains(&sqrt_price_limit) {
        return Err(QuoteError::SqrtPriceOutOfBounds);
    }
    trace!(
        amount = params.amount,
        direction = ?params.direction,
        specified_amount = ?params.specified_amount,
        sqrt_price_limit,
        "computing swap quote"
    );

    if sqrt_price_limit == pool.sqrt_price {
        return finish_quote(
            params,
            sqrt_price_limit,
            0,
            0,
            0,
            pool.tick_current_index,
            pool.sqrt_price,
            QuoteTermination::PriceLimitReached,
            Vec::new(),
        );
    }
    if a_to_b != (sqrt_price_limit < pool.sqrt_price) {
        return Err(QuoteError::InvalidSqrtPriceLimit);
    }
    if params.amount == 0 {
        return finish_quote(
            params,
            sqrt_price_limit,
            0,
            0,
            0,
            pool.tick_current_index,
            pool.sqrt_price,
            QuoteTermination::AmountSatisfied,
            Vec::new(),
        );
    }

    let sequence = TickWindowSequence::new(tick_windows, pool.tick_spacing, reduction)?;

    let mut amount_remaining = params.amount;
    let mut amount_calculated: u64 = 0;
    let mut fee_total: u64 = 0;
    let mut current_sqrt_price = pool.sqrt_price;
    let mut current_tick_index = pool.tick_current_index;
    let mut current_liquidity = pool.liquidity;
    let mut windows_touched: Vec<i32> = Vec::new();
    if let Some(start) = sequence.window_start_index(current_tick_index) {
        windows_touched.push(start);
    }

    let termination = loop {
        if amount_remaining == 0 {
            break QuoteTermination::AmountSatisfied;
        }
        if current_sqrt_price == sqrt_price_limit {
            break QuoteTermination::PriceLimitReached;
        }

        let boundary = if a_to_b {
            sequence.prev_initialized_tick(current_tick_index)
        } else {
            sequence.next_initialized_tick(current_tick_index)
        };
        let Some((boundary_tick, tick_data)) = boundary else {
            break QuoteTermination::LiquidityExhausted;
        };
        if let Some(start) = sequence.window_start_index(boundary_tick) {
            if windows_touched.last() != Some(&start) {
                windows_touched.push(start);
            }
        }

        let boundary_sqrt_price = tick_index_to_sqrt_price(boundary_tick)?;
        let target_sqrt_price = if a_to_b {
            boundary_sqrt_price.max(sqrt_price_limit)
        } else {
            boundary_sqrt_price.min(sqrt_price_limit)
        };

        let step = compute_swap_step(
            amount_remaining,
            pool.fee_rate,
            current_liquidity,
            current_sqrt_price,
            target_sqrt_price,
            a_to_b,
            specified_input,
        )?;
        fee_total = fee_total
            .checked_add(step.fee_amount)
            .ok_or(QuoteError::ArithmeticOverflow)?;
        if specified_input {
            amount_remaining = amount_remaining
                .checked_sub(step.amount_in)
                .and_then(|rest| rest.checked_sub(step.fee_amount))
                .ok_or(QuoteError::ArithmeticOverflow)?;
            amount_calculated = amount_calculated
                .checked_add(step.amount_out)
                .ok_or(QuoteError::ArithmeticOverflow)?;
        } else {
            amount_remaining = amount_remaining
                .checked_sub(step.amount_out)
                .ok_or(QuoteError::ArithmeticOverflow)?;
            amount_calculated = amount_calculated
                .checked_add(step.amount_in)
                .and_then(|total| total.checked_add(step.fee_amount))
                .ok_or(QuoteError::ArithmeticOverflow)?;
        }

        if step.next_sqrt_price == boundary_sqrt_price {
            current_liquidity =
                cross_tick_liquidity(current_liquidity, tick_data.liquidity_net, a_to_b)?;
            current_tick_index = if a_to_b { boundary_tick - 1 } else { boundary_tick };
        } else if step.next_sqrt_price != current_sqrt_price {
            current_tick_index = sqrt_price_to_tick_index(step.next_sqrt_price)?;
        }
        current_sqrt_price = step.next_sqrt_price;
    };

    let amount_swapped = params.amount - amount_remaining;
    let (estimated_amount_in, estimated_amount_out) = if specified_input {
        (amount_swapped, amount_calculated)
    } else {
        (amount_calculated, amount_swapped)
    };
    debug!(
        ?termination,
        estimated_amount_in,
        estimated_amount_out,
        fee_total,
        end_tick_index = current_tick_index,
        "swap quote computed"
    );
    finish_quote(
        params,
        sqrt_price_limit,
        estimated_amount_in,
        estimated_amount_out,
        fee_total,
        current_tick_index,
        current_sqrt_price,
        termination,
        windows_touched,
    )
}

#[allow(clippy::too_many_arguments)]
fn finish_quote(
    params: &SwapParams,
    sqrt_price_limit: u128,
    estimated_amount_in: u64,
    estimated_amount_out: u64,
    estimated_fee_amount: u64,
    estimated_end_tick_index: i32,
    estimated_end_sqrt_price: u128,
    termination: QuoteTermination,
    windows_touched: Vec<i32>,
) -> SdkResult<SwapQuote> {
    let other_amount_threshold = match params.specified_amount {
        SpecifiedAmount::Input => {
            min_amount_with_slippage(estimated_amount_out, params.slippage_tolerance)?
        }
        SpecifiedAmount::Output => {
            max_amount_with_slippage(estimated_amount_in, params.slippage_tolerance)?
        }
    };
    Ok(SwapQuote {
        amount: params.amount,
        direction: params.direction,
        specified_amount: params.specified_amount,
        sqrt_price_limit,
        estimated_amount_in,
        estimated_amount_out,
        estimated_fee_amount,
        estimated_end_tick_index,
        estimated_end_sqrt_price,
        other_amount_threshold,
        termination,
        windows_touched,
    })
}

/// Pool liquidity after crossing an initialized tick. Moving up adds the
/// tick's net liquidity, moving down removes it.
fn cross_tick_liquidity(liquidity: u128, liquidity_net: i128, a_to_b: bool) -> SdkResult<u128> {
    let magnitude = liquidity_net.unsigned_abs();
    let adding = (liquidity_net > 0) != a_to_b;
    if adding {
        liquidity
            .checked_add(magnitude)
            .ok_or(QuoteError::ArithmeticOverflow)
    } else {
        liquidity
            .checked_sub(magnitude)
            .ok_or(QuoteError::ArithmeticOverflow)
    }
}

/// The stored tick index must agree with the stored sqrt price. The index
/// may sit one below the derived tick when the price rests exactly on a
/// tick boundary after a downward crossing.
fn validate_pool_snapshot(pool: &PoolSnapshot) -> SdkResult<()> {
    let derived = sqrt_price_to_tick_index(pool.sqrt_price)?;
    if pool.tick_current_index == derived
        || pool.tick_current_index.checked_add(1) == Some(derived)
    {
        Ok(())
    } else {
        Err(QuoteError::InconsistentPoolSnapshot)
    }
}
