use serde::{Deserialize, Serialize};

use crate::constants::TICK_WINDOW_SIZE;

/// Direction of a swap in terms of the pool's token pair.
///
/// `AtoB` sells token A for token B and moves the sqrt price down;
/// `BtoA` sells token B for token A and moves it up.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum SwapDirection {
    AtoB,
    BtoA,
}

impl SwapDirection {
    pub fn is_a_to_b(self) -> bool {
        self == SwapDirection::AtoB
    }
}

/// Which side of the swap the caller fixed: the amount they pay in, or the
/// amount they want out. The other side is estimated by the quote.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum SpecifiedAmount {
    Input,
    Output,
}

impl SpecifiedAmount {
    pub fn is_input(self) -> bool {
        self == SpecifiedAmount::Input
    }
}

/// How to treat gaps in the tick window data handed to the quote engine.
///
/// `Conservative` keeps the contiguous prefix of loaded windows and lets the
/// quote terminate early if the swap walks past them. `No` rejects any gap
/// up front.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TickArrayReduction {
    No,
    Conservative,
}

/// Exact rational percentage, e.g. `Percentage::from_bps(100)` for 1%.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Percentage {
    pub numerator: u32,
    pub denominator: u32,
}

impl Percentage {
    pub fn from_fraction(numerator: u32, denominator: u32) -> Self {
        Self {
            numerator,
            denominator,
        }
    }

    pub fn from_bps(bps: u32) -> Self {
        Self {
            numerator: bps,
            denominator: 10_000,
        }
    }
}

/// Point-in-time view of the pool fields that drive a swap quote.
///
/// All fields are read from the same account snapshot; mixing fields from
/// different slots makes the quote meaningless.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolSnapshot {
    pub tick_spacing: u16,
    pub tick_current_index: i32,
    pub sqrt_price: u128,
    pub liquidity: u128,
    /// Hundredths of a basis point, so 3000 is 30 bps.
    pub fee_rate: u16,
    /// The protocol's share of collected fees. Quoting reports the total
    /// fee, so this does not change any estimate.
    pub protocol_fee_rate: u16,
}

/// Per-tick liquidity data. `liquidity_net` is added to the pool liquidity
/// when the price crosses the tick moving up and subtracted moving down; a
/// zero net means the tick is uninitialized.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TickData {
    pub liquidity_net: i128,
}

/// One loaded tick window account: `TICK_WINDOW_SIZE` consecutive tick slots
/// starting at `start_tick_index`, each `tick_spacing` apart.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TickWindow {
    pub start_tick_index: i32,
    pub ticks: [TickData; TICK_WINDOW_SIZE],
}

impl TickWindow {
    pub fn new(start_tick_index: i32) -> Self {
        Self {
            start_tick_index,
            ticks: [TickData::default(); TICK_WINDOW_SIZE],
        }
    }
}
