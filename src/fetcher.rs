//! Account retrieval boundary.
//!
//! The quote engine itself never touches the network; callers hand it
//! decoded snapshots. [`AccountFetcher`] is the seam where those snapshots
//! come from, typically backed by an RPC client with a slot-tagged cache.

use solana_sdk::{clock::Slot, pubkey::Pubkey};

use crate::error::SdkResult;
use crate::types::{PoolSnapshot, TickWindow};

/// Whether a value came from the fetcher's cache or a fresh RPC read.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DataSource {
    Fresh,
    Cache,
}

/// A decoded account value tagged with its address and the slot it was
/// observed at.
#[derive(Clone, Copy, Debug)]
pub struct Keyed<T> {
    pub address: Pubkey,
    pub slot: Slot,
    pub source: DataSource,
    pub value: T,
}

/// Supplies the pool and tick window snapshots a quote is computed from.
///
/// `refresh` forces a fresh read even when a cached value exists.
/// Implementations must return tick windows in the same order as the
/// requested addresses, with `None` for accounts that do not exist, and
/// should serve one quote's worth of accounts from a consistent slot.
#[allow(async_fn_in_trait)]
pub trait AccountFetcher {
    async fn get_pool_snapshot(
        &self,
        pool_address: &Pubkey,
        refresh: bool,
    ) -> SdkResult<Option<Keyed<PoolSnapshot>>>;

    async fn list_tick_windows(
        &self,
        addresses: &[Pubkey],
        refresh: bool,
    ) -> SdkResult<Vec<Option<Keyed<TickWindow>>>>;
}
