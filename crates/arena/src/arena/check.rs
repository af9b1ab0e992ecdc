//! Pointer membership check for consistency-checking builds
//!
//! Only the current block knows how far it has been filled. Older blocks are
//! treated as used up to their full size, so a pointer into the unused tail of
//! an older block is reported as owned. Memory the arena really handed out is
//! never reported as foreign.

use core::ptr;

use tracing::error;

use super::Arena;
use crate::error::{ArenaError, ArenaResult, fatal};
use crate::supplier::BlockSupplier;

impl<S: BlockSupplier> Arena<S> {
    /// Whether `ptr` lies in memory this arena handed out
    pub fn contains_pointer(&self, ptr: *const u8) -> bool {
        let blocks = self.blocks.borrow();
        let Some((current, older)) = blocks.split_last() else {
            return false;
        };

        let addr = ptr as usize;
        if addr >= current.start().as_ptr() as usize && addr < self.free.get().as_ptr() as usize {
            return true;
        }

        older.iter().rev().any(|block| block.contains(ptr))
    }

    /// Checks that `ptr` lies in memory this arena handed out
    pub fn try_check_pointer(&self, ptr: *const u8) -> ArenaResult<()> {
        if self.contains_pointer(ptr) {
            return Ok(());
        }

        error!(ptr = ?ptr, blocks = self.block_count(), "pointer outside arena");
        Err(ArenaError::foreign_pointer(ptr, ptr::from_ref(self).cast()))
    }

    /// Checks that `ptr` lies in memory this arena handed out; a foreign
    /// pointer is a fatal consistency failure.
    #[track_caller]
    pub fn check_pointer(&self, ptr: *const u8) {
        if let Err(err) = self.try_check_pointer(ptr) {
            fatal(err);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use crate::config::ArenaConfig;
    use crate::supplier::{SystemSupplier, TrackingSupplier};

    use super::*;

    #[test]
    fn test_current_block_live_range() {
        let arena = Arena::create();
        let a = arena.allocate(64);

        assert!(arena.contains_pointer(a.as_ptr()));
        // SAFETY: Offset stays inside the 64-byte allocation.
        assert!(arena.contains_pointer(unsafe { a.as_ptr().add(63) }));
        // The free pointer itself has not been handed out yet.
        // SAFETY: One past the allocation is still inside the block.
        assert!(!arena.contains_pointer(unsafe { a.as_ptr().add(64) }));
    }

    #[test]
    fn test_older_blocks_count_in_full() {
        let supplier = Arc::new(TrackingSupplier::new(SystemSupplier::new(1024).unwrap()));
        let arena = Arena::with_supplier(Arc::clone(&supplier), ArenaConfig::default());

        let first = arena.allocate(16);
        let big = arena.allocate(3000);
        arena.allocate(2048);
        assert_eq!(arena.block_count(), 3);

        assert!(arena.contains_pointer(first.as_ptr()));
        // Unused tail of the first block: accepted imprecision.
        // SAFETY: Offset stays inside the first 1024-byte block.
        assert!(arena.contains_pointer(unsafe { first.as_ptr().add(1000) }));
        // Multi-unit block is covered for its full size.
        // SAFETY: Offset stays inside the 3-unit block.
        assert!(arena.contains_pointer(unsafe { big.as_ptr().add(2999) }));
    }

    #[test]
    fn test_foreign_pointer() {
        let arena = Arena::create();
        let other = Arena::create();
        let foreign = other.allocate(8);

        assert!(!arena.contains_pointer(foreign.as_ptr()));

        let local = 0u64;
        let err = arena
            .try_check_pointer(ptr::from_ref(&local).cast())
            .unwrap_err();
        assert_eq!(err.code(), "ARENA:CHECK:FOREIGN");
    }

    #[test]
    #[should_panic(expected = "is not in arena")]
    fn test_check_pointer_is_fatal() {
        let arena = Arena::create();
        let other = Arena::create();
        arena.check_pointer(other.allocate(8).as_ptr());
    }
}
