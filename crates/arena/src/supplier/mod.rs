//! Block supply for arenas
//!
//! An arena never talks to the system allocator directly for its data. It asks
//! a [`BlockSupplier`] for regions measured in whole *block units* and hands
//! every region back in one pass when it is destroyed.
//!
//! - [`SystemSupplier`]: page-aligned regions from the global allocator
//! - [`TrackingSupplier`]: decorator that records every fetch and release,
//!   and can simulate exhaustion
//!
//! Suppliers are fail-fast from the arena's point of view: a fetch either
//! returns a block or an exhaustion error, it never blocks or retries.

use core::num::NonZeroUsize;
use core::ptr::NonNull;
use std::sync::Arc;

use crate::error::ArenaResult;

mod system;
mod tracking;

pub use self::system::{PAGE_SIZE, SystemSupplier};
pub use self::tracking::{BlockRecord, TrackingSupplier};

/// A contiguous region of `units * unit_size` bytes owned by whoever holds it
///
/// `Block` is an ownership token: it is not `Clone`, and the only way to give
/// its memory back is [`BlockSupplier::release`].
#[derive(Debug, PartialEq, Eq)]
pub struct Block {
    start: NonNull<u8>,
    units: NonZeroUsize,
    unit_size: usize,
}

// SAFETY: Block is a unique handle to a heap region.
// - No other Block refers to the same region (suppliers hand each out once)
// - The region is plain bytes with no thread affinity
unsafe impl Send for Block {}

impl Block {
    /// Assembles a block descriptor for a region produced by a supplier.
    ///
    /// # Safety
    ///
    /// `start` must point to a live allocation of at least
    /// `units * unit_size` bytes that nothing else owns.
    #[inline]
    pub unsafe fn from_raw_parts(start: NonNull<u8>, units: NonZeroUsize, unit_size: usize) -> Self {
        Self {
            start,
            units,
            unit_size,
        }
    }

    /// Base address of the region
    #[inline]
    pub fn start(&self) -> NonNull<u8> {
        self.start
    }

    /// One past the last byte of the region
    #[inline]
    pub fn end(&self) -> *mut u8 {
        // SAFETY: Computing one-past-end pointer.
        // - len() is the size of the allocation behind start
        // - one-past-end is a valid pointer for comparison
        unsafe { self.start.as_ptr().add(self.len()) }
    }

    /// Number of block units in the region
    #[inline]
    pub fn units(&self) -> usize {
        self.units.get()
    }

    /// Size of one block unit in bytes
    #[inline]
    pub fn unit_size(&self) -> usize {
        self.unit_size
    }

    /// Size of the region in bytes
    #[inline]
    pub fn len(&self) -> usize {
        self.units.get() * self.unit_size
    }

    /// A block is never empty; provided for API completeness
    #[inline]
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Whether `ptr` falls in `[start, end)`
    #[inline]
    pub fn contains(&self, ptr: *const u8) -> bool {
        let addr = ptr as usize;
        let start = self.start.as_ptr() as usize;
        addr >= start && addr < start + self.len()
    }

    /// Address-level record of this block, for accounting
    #[inline]
    pub fn record(&self) -> BlockRecord {
        BlockRecord {
            start: self.start.as_ptr() as usize,
            units: self.units.get(),
        }
    }
}

/// Source of fixed-granularity memory blocks
pub trait BlockSupplier {
    /// Size of one block unit in bytes. Constant for the supplier's lifetime.
    fn unit_size(&self) -> usize;

    /// Fetches a block of exactly `units` block units
    fn fetch(&self, units: NonZeroUsize) -> ArenaResult<Block>;

    /// Returns a block to the supplier
    ///
    /// # Safety
    ///
    /// `block` must have been produced by [`fetch`](Self::fetch) on this
    /// supplier, and no pointer into it may be used afterwards.
    unsafe fn release(&self, block: Block);
}

impl<S: BlockSupplier + ?Sized> BlockSupplier for &S {
    fn unit_size(&self) -> usize {
        (**self).unit_size()
    }

    fn fetch(&self, units: NonZeroUsize) -> ArenaResult<Block> {
        (**self).fetch(units)
    }

    unsafe fn release(&self, block: Block) {
        // SAFETY: Forwarding the caller's contract unchanged.
        unsafe { (**self).release(block) }
    }
}

impl<S: BlockSupplier + ?Sized> BlockSupplier for Arc<S> {
    fn unit_size(&self) -> usize {
        (**self).unit_size()
    }

    fn fetch(&self, units: NonZeroUsize) -> ArenaResult<Block> {
        (**self).fetch(units)
    }

    unsafe fn release(&self, block: Block) {
        // SAFETY: Forwarding the caller's contract unchanged.
        unsafe { (**self).release(block) }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_block_geometry() {
        let supplier = SystemSupplier::new(4096).unwrap();
        let block = supplier.fetch(NonZeroUsize::new(3).unwrap()).unwrap();

        assert_eq!(block.units(), 3);
        assert_eq!(block.unit_size(), 4096);
        assert_eq!(block.len(), 3 * 4096);
        assert_eq!(block.end() as usize - block.start().as_ptr() as usize, block.len());

        assert!(block.contains(block.start().as_ptr()));
        // SAFETY: Last byte of the block is in bounds.
        assert!(block.contains(unsafe { block.start().as_ptr().add(block.len() - 1) }));
        assert!(!block.contains(block.end()));

        let record = block.record();
        assert_eq!(record.start, block.start().as_ptr() as usize);
        assert_eq!(record.units, 3);

        // SAFETY: Block came from this supplier.
        unsafe { supplier.release(block) };
    }

    #[test]
    fn test_shared_supplier_forwards() {
        let supplier = Arc::new(TrackingSupplier::new(SystemSupplier::default()));
        let shared: &dyn BlockSupplier = &supplier;

        let block = shared.fetch(NonZeroUsize::MIN).unwrap();
        assert_eq!(supplier.fetch_count(), 1);

        // SAFETY: Block came from this supplier.
        unsafe { shared.release(block) };
        assert_eq!(supplier.release_count(), 1);
        assert!(supplier.live().is_empty());
    }
}
