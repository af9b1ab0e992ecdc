//! Process-wide block unit accounting
//!
//! Every block fetched by any arena is recorded here, in block units. The
//! total is a lifetime figure for memory inventory reports: it grows on every
//! fetch and is never decremented when arenas are destroyed.

use core::sync::atomic::{AtomicU64, Ordering};

/// Global counter used by arenas that are not bound to their own counter
static GLOBAL_BLOCK_UNITS: BlockUnitCounter = BlockUnitCounter::new();

/// Atomic, monotonically increasing block unit counter
///
/// Arenas may be created and grown from many threads at once, each owning its
/// own arena; the counter is the only state they share.
#[derive(Debug, Default)]
pub struct BlockUnitCounter {
    units: AtomicU64,
}

impl BlockUnitCounter {
    /// Creates a counter starting at zero
    pub const fn new() -> Self {
        Self {
            units: AtomicU64::new(0),
        }
    }

    /// The process-wide counter behind [`block_units_in_use`]
    pub fn global() -> &'static Self {
        &GLOBAL_BLOCK_UNITS
    }

    /// Adds `units` to the lifetime total
    #[inline]
    pub fn record(&self, units: usize) {
        self.units.fetch_add(units as u64, Ordering::Relaxed);
    }

    /// Returns the lifetime total
    #[inline]
    pub fn get(&self) -> u64 {
        self.units.load(Ordering::Relaxed)
    }
}

/// Cumulative number of block units fetched by every arena using the global counter
pub fn block_units_in_use() -> u64 {
    GLOBAL_BLOCK_UNITS.get()
}
