//! Recording supplier decorator
//!
//! Wraps any [`BlockSupplier`] and keeps a ledger of every block it handed out
//! and got back. Useful for memory inventory reports and for verifying that
//! arena teardown returns each block exactly once.

use core::num::NonZeroUsize;

use parking_lot::Mutex;
use tracing::warn;

use super::{Block, BlockSupplier, SystemSupplier};
use crate::error::{ArenaError, ArenaResult};

/// Address and size of a block, detached from its ownership
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BlockRecord {
    /// Base address of the block
    pub start: usize,
    /// Size of the block in block units
    pub units: usize,
}

#[derive(Debug, Default)]
struct Ledger {
    fetched: Vec<BlockRecord>,
    released: Vec<BlockRecord>,
    live: Vec<BlockRecord>,
    live_units: usize,
    units_fetched: usize,
    double_releases: usize,
}

/// Supplier decorator that records every fetch and release
///
/// With [`with_unit_limit`](Self::with_unit_limit) it also refuses fetches
/// that would push the number of live block units over the limit, reporting
/// [`ArenaError::SupplierExhausted`] like a real supplier running dry.
#[derive(Debug)]
pub struct TrackingSupplier<S = SystemSupplier> {
    inner: S,
    unit_limit: Option<usize>,
    ledger: Mutex<Ledger>,
}

impl<S: BlockSupplier> TrackingSupplier<S> {
    /// Wraps `inner` without any limit
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            unit_limit: None,
            ledger: Mutex::new(Ledger::default()),
        }
    }

    /// Wraps `inner`, allowing at most `limit` live block units at a time
    pub fn with_unit_limit(inner: S, limit: usize) -> Self {
        Self {
            unit_limit: Some(limit),
            ..Self::new(inner)
        }
    }

    /// The wrapped supplier
    pub fn inner(&self) -> &S {
        &self.inner
    }

    /// Every block fetched so far, in fetch order
    pub fn fetched(&self) -> Vec<BlockRecord> {
        self.ledger.lock().fetched.clone()
    }

    /// Every block released so far, in release order
    pub fn released(&self) -> Vec<BlockRecord> {
        self.ledger.lock().released.clone()
    }

    /// Blocks fetched and not yet released
    pub fn live(&self) -> Vec<BlockRecord> {
        self.ledger.lock().live.clone()
    }

    /// Number of successful fetches
    pub fn fetch_count(&self) -> usize {
        self.ledger.lock().fetched.len()
    }

    /// Number of accepted releases
    pub fn release_count(&self) -> usize {
        self.ledger.lock().released.len()
    }

    /// Total block units fetched over the supplier's lifetime
    pub fn units_fetched(&self) -> usize {
        self.ledger.lock().units_fetched
    }

    /// Block units currently out on loan
    pub fn live_units(&self) -> usize {
        self.ledger.lock().live_units
    }

    /// Releases of blocks that were not live; these are never forwarded
    pub fn double_releases(&self) -> usize {
        self.ledger.lock().double_releases
    }
}

impl Default for TrackingSupplier<SystemSupplier> {
    fn default() -> Self {
        Self::new(SystemSupplier::default())
    }
}

impl<S: BlockSupplier> BlockSupplier for TrackingSupplier<S> {
    fn unit_size(&self) -> usize {
        self.inner.unit_size()
    }

    fn fetch(&self, units: NonZeroUsize) -> ArenaResult<Block> {
        let mut ledger = self.ledger.lock();

        let requested = ledger.live_units.saturating_add(units.get());
        if self.unit_limit.is_some_and(|limit| requested > limit) {
            return Err(ArenaError::supplier_exhausted(
                units.get(),
                self.inner.unit_size(),
            ));
        }

        let block = self.inner.fetch(units)?;
        let record = block.record();

        ledger.fetched.push(record);
        ledger.live.push(record);
        ledger.live_units += record.units;
        ledger.units_fetched += record.units;

        Ok(block)
    }

    unsafe fn release(&self, block: Block) {
        let record = block.record();
        let mut ledger = self.ledger.lock();

        let Some(index) = ledger.live.iter().position(|live| *live == record) else {
            warn!(start = record.start, units = record.units, "release of a block that is not live");
            ledger.double_releases += 1;
            return;
        };

        ledger.live.swap_remove(index);
        ledger.live_units -= record.units;
        ledger.released.push(record);
        drop(ledger);

        // SAFETY: The block was live in our ledger, so it came from
        // inner.fetch() and has not been released before.
        unsafe { self.inner.release(block) };
    }
}
