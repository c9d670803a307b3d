//! Off-chain swap quote engine for concentrated-liquidity pools.
//!
//! Computes swap quotes against point-in-time snapshots of a pool and its
//! tick window accounts, bit-exact with the on-chain program:
//!
//! - Q64.64 tick index / sqrt price conversions
//! - token deltas, price updates, and fee arithmetic with pool-favoring
//!   rounding
//! - tick window sequences that never guess about unloaded data
//! - a stepping quote engine that reports partial fills instead of erroring
//! - slippage threshold derivation and tick window addressing helpers
//!
//! The engine is a pure function of its inputs; the [`fetcher`] module
//! defines the seam where account snapshots come from.

pub mod constants;
pub mod error;
pub mod fetcher;
pub mod math;
pub mod quote;
pub mod swap_step;
pub mod tick_sequence;
pub mod types;
pub mod utils;

pub use constants::*;
pub use error::*;
pub use fetcher::*;
pub use math::*;
pub use quote::*;
pub use swap_step::*;
pub use tick_sequence::*;
pub use types::*;
pub use utils::*;
