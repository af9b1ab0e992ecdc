//! Block supplier backed by the global allocator

use core::num::NonZeroUsize;
use core::ptr::NonNull;
use std::alloc::{Layout, alloc, dealloc};

use tracing::trace;

use super::{Block, BlockSupplier};
use crate::config::{DEFAULT_BLOCK_UNIT_SIZE, MIN_ALIGN};
use crate::error::{ArenaError, ArenaResult};

/// Alignment of every block handed out by [`SystemSupplier`]
pub const PAGE_SIZE: usize = 4096;

/// Page-aligned blocks from [`std::alloc`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SystemSupplier {
    unit_size: usize,
}

impl SystemSupplier {
    /// Creates a supplier with the given block unit size
    pub fn new(unit_size: usize) -> ArenaResult<Self> {
        if !unit_size.is_power_of_two() || unit_size < MIN_ALIGN {
            return Err(ArenaError::invalid_config(
                "Block unit size must be a power of 2 and at least the minimum alignment",
            ));
        }

        Ok(Self { unit_size })
    }

    fn layout(self, units: usize) -> ArenaResult<Layout> {
        let size = units
            .checked_mul(self.unit_size)
            .ok_or_else(|| ArenaError::size_overflow("block size"))?;
        Layout::from_size_align(size, PAGE_SIZE)
            .map_err(|_| ArenaError::size_overflow("block layout"))
    }
}

impl Default for SystemSupplier {
    fn default() -> Self {
        Self {
            unit_size: DEFAULT_BLOCK_UNIT_SIZE,
        }
    }
}

impl BlockSupplier for SystemSupplier {
    #[inline]
    fn unit_size(&self) -> usize {
        self.unit_size
    }

    fn fetch(&self, units: NonZeroUsize) -> ArenaResult<Block> {
        let layout = self.layout(units.get())?;

        // SAFETY: Allocating via global allocator.
        // - layout has non-zero size (units >= 1, unit_size >= MIN_ALIGN)
        // - alloc returns null on failure (handled below)
        let ptr = unsafe { alloc(layout) };
        let start = NonNull::new(ptr)
            .ok_or_else(|| ArenaError::supplier_exhausted(units.get(), self.unit_size))?;

        trace!(units = units.get(), bytes = layout.size(), "fetched system block");

        // SAFETY: start points to a fresh allocation of units * unit_size bytes.
        Ok(unsafe { Block::from_raw_parts(start, units, self.unit_size) })
    }

    unsafe fn release(&self, block: Block) {
        // SAFETY: Deallocating block memory.
        // - Caller guarantees block came from fetch() on this supplier
        // - unit_size is constant, so the layout matches the one used in fetch()
        // - fetch() already proved this layout is valid
        unsafe {
            dealloc(
                block.start().as_ptr(),
                Layout::from_size_align_unchecked(block.len(), PAGE_SIZE),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::is_aligned;

    #[test]
    fn test_blocks_are_page_aligned() {
        let supplier = SystemSupplier::new(1024).unwrap();
        let blocks: Vec<_> = (1..=4)
            .map(|units| supplier.fetch(NonZeroUsize::new(units).unwrap()).unwrap())
            .collect();

        for block in blocks {
            assert!(is_aligned(block.start().as_ptr() as usize, PAGE_SIZE));
            assert_eq!(block.len() % 1024, 0);
            // SAFETY: Block came from this supplier.
            unsafe { supplier.release(block) };
        }
    }

    #[test]
    fn test_rejects_bad_unit_size() {
        assert!(SystemSupplier::new(0).is_err());
        assert!(SystemSupplier::new(4).is_err());
        assert!(SystemSupplier::new(3000).is_err());
        assert!(SystemSupplier::new(8).is_ok());
    }

    #[test]
    fn test_oversized_fetch_overflows() {
        let supplier = SystemSupplier::default();
        let err = supplier.fetch(NonZeroUsize::MAX).unwrap_err();
        assert_eq!(err.code(), "ARENA:ALLOC:OVERFLOW");
    }
}
