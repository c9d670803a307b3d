//! Tick window addressing helpers.

use solana_sdk::pubkey::Pubkey;

use crate::constants::TICK_WINDOW_SIZE;
use crate::types::SwapDirection;

pub const TICK_WINDOW_SEED: &[u8] = b"tick_array";

/// Start index of the window containing `tick_index`.
pub fn tick_window_start_index(tick_index: i32, tick_spacing: u16) -> i32 {
    let span = window_span(tick_spacing);
    tick_index.div_euclid(span) * span
}

/// Start indices of the three windows a swap from `current_tick_index` can
/// traverse, in traversal order.
pub fn swap_tick_window_start_indices(
    current_tick_index: i32,
    tick_spacing: u16,
    direction: SwapDirection,
) -> [i32; 3] {
    // an upward swap scans strictly above the current tick, so the first
    // candidate sits one spacing up
    let anchor = if direction.is_a_to_b() {
        current_tick_index
    } else {
        current_tick_index + i32::from(tick_spacing)
    };
    let start = tick_window_start_index(anchor, tick_spacing);
    let step = if direction.is_a_to_b() {
        -window_span(tick_spacing)
    } else {
        window_span(tick_spacing)
    };
    [start, start + step, start + 2 * step]
}

/// Program-derived address of the tick window account starting at
/// `start_tick_index`.
pub fn derive_tick_window_address(
    program_id: &Pubkey,
    pool_address: &Pubkey,
    start_tick_index: i32,
) -> (Pubkey, u8) {
    Pubkey::find_program_address(
        &[
            TICK_WINDOW_SEED,
            pool_address.as_ref(),
            start_tick_index.to_string().as_bytes(),
        ],
        program_id,
    )
}

fn window_span(tick_spacing: u16) -> i32 {
    i32::from(tick_spacing) * TICK_WINDOW_SIZE as i32
}
