//! Single-owner bump arena over a chain of supplier blocks
//!
//! # Safety
//!
//! - Cell for the free/limit pointers (no synchronization, single-threaded)
//! - RefCell for the block list (runtime borrow checking)
//! - Blocks are kept oldest first; the last one is the current block
//!
//! ## Invariants
//!
//! - `current.start <= free <= limit == current.end`
//! - `free` only moves forward until a new block replaces the current one
//! - Allocations never overlap (bump pointer moves forward monotonically)
//! - Every block in the list is released exactly once, on destroy or drop
//!
//! ## Not Thread-Safe
//!
//! - `Arena` is `!Sync`; it can be moved to another thread when its supplier
//!   can, but never shared

use core::alloc::Layout;
use core::cell::{Cell, RefCell};
use core::fmt;
use core::mem;
use core::num::NonZeroUsize;
use core::ptr::{self, NonNull};

use tracing::{debug, trace};

use super::ArenaStats;
use crate::config::{ArenaConfig, MIN_ALIGN};
use crate::counter::BlockUnitCounter;
use crate::error::{ArenaError, ArenaResult, fatal};
use crate::supplier::{Block, BlockSupplier, SystemSupplier};
use crate::utils::{checked_align_up, units_for};

/// Region-based bump allocator
///
/// Hands out raw, uninitialized, [`MIN_ALIGN`]-aligned memory from the
/// current block and fetches a new block from its [`BlockSupplier`] when the
/// current one runs out. Nothing is freed individually: every block goes back
/// to the supplier when the arena is [destroyed](Self::destroy) or dropped.
///
/// Memory handed out is valid exactly as long as the arena. Destruction
/// consumes the arena, so a destroyed arena cannot be used again.
pub struct Arena<S: BlockSupplier = SystemSupplier> {
    pub(super) supplier: S,
    pub(super) blocks: RefCell<Vec<Block>>,
    pub(super) free: Cell<NonNull<u8>>,
    pub(super) limit: Cell<NonNull<u8>>,
    config: ArenaConfig,
    counter: &'static BlockUnitCounter,
    stats: ArenaStats,
}

// SAFETY: Arena owns its blocks exclusively.
// - free/limit only point into blocks owned by this arena
// - Cell/RefCell keep Arena !Sync, so it is never shared between threads
// - The only state shared with other arenas is the atomic counter
unsafe impl<S: BlockSupplier + Send> Send for Arena<S> {}

impl Arena<SystemSupplier> {
    /// Creates an arena with the default configuration.
    ///
    /// Exhaustion is fatal, see [`try_create`](Self::try_create) for the
    /// fallible form.
    ///
    /// # Examples
    ///
    /// ```
    /// use region_arena::Arena;
    ///
    /// let arena = Arena::create();
    /// let ptr = arena.allocate(100);
    /// assert_eq!(ptr.as_ptr() as usize % 8, 0);
    /// arena.destroy();
    /// ```
    pub fn create() -> Self {
        Self::try_create().unwrap_or_else(|err| fatal(err))
    }

    /// Creates an arena with the default configuration
    pub fn try_create() -> ArenaResult<Self> {
        Self::try_with_config(ArenaConfig::default())
    }

    /// Creates an arena over a [`SystemSupplier`] built from `config`
    pub fn with_config(config: ArenaConfig) -> Self {
        Self::try_with_config(config).unwrap_or_else(|err| fatal(err))
    }

    /// Creates an arena over a [`SystemSupplier`] built from `config`
    pub fn try_with_config(config: ArenaConfig) -> ArenaResult<Self> {
        config.validate()?;
        let supplier = SystemSupplier::new(config.block_unit_size)?;
        Self::try_with_supplier(supplier, config)
    }
}

impl<S: BlockSupplier> Arena<S> {
    /// Creates an arena drawing blocks from `supplier`.
    ///
    /// The supplier's unit size overrides `config.block_unit_size`.
    pub fn with_supplier(supplier: S, config: ArenaConfig) -> Self {
        Self::try_with_supplier(supplier, config).unwrap_or_else(|err| fatal(err))
    }

    /// Creates an arena drawing blocks from `supplier`, counted globally
    pub fn try_with_supplier(supplier: S, config: ArenaConfig) -> ArenaResult<Self> {
        Self::try_with_counter(supplier, config, BlockUnitCounter::global())
    }

    /// Creates an arena that records its block units in `counter` instead of
    /// the process-wide counter
    pub fn try_with_counter(
        supplier: S,
        mut config: ArenaConfig,
        counter: &'static BlockUnitCounter,
    ) -> ArenaResult<Self> {
        config.block_unit_size = supplier.unit_size();

        let units = NonZeroUsize::new(config.initial_units).ok_or_else(|| {
            ArenaError::invalid_config("Initial block must hold at least one unit")
        })?;

        let mut blocks = Vec::new();
        blocks
            .try_reserve(4)
            .map_err(|_| ArenaError::bookkeeping_exhausted(4 * size_of::<Block>()))?;

        let block = supplier.fetch(units)?;
        if config.zero_memory {
            zero_block(&block);
        }

        let start = block.start();
        let end = block_end(&block);

        counter.record(block.units());
        let stats = ArenaStats::new();
        if config.track_stats {
            stats.record_block(block.units(), block.len());
        }

        debug!(
            units = block.units(),
            unit_size = supplier.unit_size(),
            "arena created"
        );

        blocks.push(block);

        Ok(Self {
            supplier,
            blocks: RefCell::new(blocks),
            free: Cell::new(start),
            limit: Cell::new(end),
            config,
            counter,
            stats,
        })
    }

    /// Allocates `size` bytes; exhaustion is fatal.
    ///
    /// See [`try_allocate`](Self::try_allocate).
    #[inline]
    pub fn allocate(&self, size: usize) -> NonNull<u8> {
        self.try_allocate(size).unwrap_or_else(|err| fatal(err))
    }

    /// Allocates `size` bytes of uninitialized memory.
    ///
    /// The size is rounded up to [`MIN_ALIGN`]; a zero-byte request takes
    /// [`MIN_ALIGN`] bytes so that every returned pointer is distinct. The
    /// returned pointer is [`MIN_ALIGN`]-aligned and valid for `size` bytes
    /// until the arena is destroyed. No stronger alignment, no zeroing and no
    /// adjacency between successive allocations is promised.
    ///
    /// # Errors
    ///
    /// - [`ArenaError::SizeOverflow`] if rounding overflows `usize`
    /// - [`ArenaError::SupplierExhausted`] / [`ArenaError::BookkeepingExhausted`]
    ///   if a new block is needed and cannot be obtained
    #[inline]
    pub fn try_allocate(&self, size: usize) -> ArenaResult<NonNull<u8>> {
        let rounded = checked_align_up(size, MIN_ALIGN)?.max(MIN_ALIGN);

        let free = self.free.get();
        let room = self.limit.get().as_ptr() as usize - free.as_ptr() as usize;

        // Strictly less: a request that would land exactly on the limit takes
        // the slow path.
        if rounded < room {
            // SAFETY: Advancing bump pointer within the current block.
            // - free + rounded < limit (checked above)
            // - limit is one past the end of the current block
            self.free.set(unsafe { free.add(rounded) });

            if self.config.track_stats {
                self.stats.record_allocation(size, rounded);
            }
            return Ok(free);
        }

        self.allocate_block(size, rounded)
    }

    /// Slow path: fetches a block big enough for `rounded` bytes and makes it current
    #[cold]
    #[inline(never)]
    fn allocate_block(&self, size: usize, rounded: usize) -> ArenaResult<NonNull<u8>> {
        let mut blocks = self.blocks.borrow_mut();
        blocks
            .try_reserve(1)
            .map_err(|_| ArenaError::bookkeeping_exhausted(size_of::<Block>()))?;

        let units = units_for(rounded, self.supplier.unit_size());
        let block = self.supplier.fetch(units)?;
        if self.config.zero_memory {
            zero_block(&block);
        }

        let wasted = self.remaining();
        let start = block.start();

        // SAFETY: rounded <= units * unit_size == block.len(), so start +
        // rounded is at most one past the end of the block.
        self.free.set(unsafe { start.add(rounded) });
        self.limit.set(block_end(&block));

        self.counter.record(block.units());
        if self.config.track_stats {
            self.stats.record_block(block.units(), block.len());
            self.stats.record_waste(wasted);
            self.stats.record_slow_allocation();
            self.stats.record_allocation(size, rounded);
        }

        trace!(
            requested = size,
            units = block.units(),
            wasted,
            blocks = blocks.len() + 1,
            "arena fetched new block"
        );

        blocks.push(block);
        Ok(start)
    }

    /// Allocates and initializes a value
    ///
    /// The value is never dropped; the arena only reclaims its bytes.
    #[allow(clippy::mut_from_ref)]
    #[must_use = "allocated memory must be used"]
    pub fn alloc<T>(&self, value: T) -> ArenaResult<&mut T> {
        let ptr = self.alloc_layout(Layout::new::<T>())?.cast::<T>();

        // SAFETY: Initializing allocated memory and creating reference.
        // - ptr is fresh, disjoint from every other allocation
        // - ptr is aligned for T (alloc_layout checked align <= MIN_ALIGN)
        // - ptr has space for T (size_of::<T>() bytes allocated)
        // - Reference lifetime bound to &self (arena lifetime)
        unsafe {
            ptr.as_ptr().write(value);
            Ok(&mut *ptr.as_ptr())
        }
    }

    /// Allocates and copies a slice
    #[allow(clippy::mut_from_ref)]
    #[must_use = "allocated memory must be used"]
    pub fn alloc_slice<T: Copy>(&self, slice: &[T]) -> ArenaResult<&mut [T]> {
        if slice.is_empty() {
            return Ok(&mut []);
        }

        let ptr = self.alloc_layout(Layout::for_value(slice))?.cast::<T>();

        // SAFETY: Copying slice to allocated memory and creating slice reference.
        // - ptr is fresh, aligned for T and has room for slice.len() elements
        // - Source and destination don't overlap (new allocation)
        // - Reference lifetime bound to &self (arena lifetime)
        unsafe {
            ptr::copy_nonoverlapping(slice.as_ptr(), ptr.as_ptr(), slice.len());
            Ok(&mut *ptr::slice_from_raw_parts_mut(ptr.as_ptr(), slice.len()))
        }
    }

    /// Allocates a string
    #[must_use = "allocated memory must be used"]
    pub fn alloc_str(&self, s: &str) -> ArenaResult<&str> {
        let bytes = self.alloc_slice(s.as_bytes())?;
        // SAFETY: bytes were copied from a valid &str.
        unsafe { Ok(core::str::from_utf8_unchecked(bytes)) }
    }

    fn alloc_layout(&self, layout: Layout) -> ArenaResult<NonNull<u8>> {
        if layout.align() > MIN_ALIGN {
            return Err(ArenaError::invalid_alignment(layout.align(), MIN_ALIGN));
        }
        self.try_allocate(layout.size())
    }

    /// Destroys the arena, returning every block to the supplier.
    ///
    /// Returns the number of blocks released. Dropping the arena does the
    /// same teardown silently.
    pub fn destroy(mut self) -> usize {
        let units = self.units_held();
        let released = self.release_blocks();

        debug!(blocks = released, units, "arena destroyed");
        released
    }

    /// Releases blocks newest first and leaves the list empty
    fn release_blocks(&mut self) -> usize {
        let blocks = mem::take(self.blocks.get_mut());
        let count = blocks.len();

        for block in blocks.into_iter().rev() {
            // SAFETY: Every block in the list came from self.supplier.fetch()
            // and is released exactly once (the list is taken above).
            unsafe { self.supplier.release(block) };
        }

        count
    }

    /// Number of blocks the arena holds
    pub fn block_count(&self) -> usize {
        self.blocks.borrow().len()
    }

    /// Number of block units the arena holds
    pub fn units_held(&self) -> usize {
        self.blocks.borrow().iter().map(Block::units).sum()
    }

    /// Total size in bytes of every block the arena holds
    pub fn capacity(&self) -> usize {
        self.blocks.borrow().iter().map(Block::len).sum()
    }

    /// Bytes left between the free pointer and the end of the current block
    #[inline]
    pub fn remaining(&self) -> usize {
        self.limit.get().as_ptr() as usize - self.free.get().as_ptr() as usize
    }

    /// Size of one block unit of the underlying supplier
    pub fn unit_size(&self) -> usize {
        self.supplier.unit_size()
    }

    /// The arena's configuration
    pub fn config(&self) -> &ArenaConfig {
        &self.config
    }

    /// Returns reference to statistics
    pub fn stats(&self) -> &ArenaStats {
        &self.stats
    }

    /// The supplier blocks are drawn from
    pub fn supplier(&self) -> &S {
        &self.supplier
    }
}

impl<S: BlockSupplier> Drop for Arena<S> {
    fn drop(&mut self) {
        self.release_blocks();
    }
}

impl<S: BlockSupplier> fmt::Debug for Arena<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Arena")
            .field("blocks", &self.block_count())
            .field("units", &self.units_held())
            .field("unit_size", &self.unit_size())
            .field("remaining", &self.remaining())
            .finish_non_exhaustive()
    }
}

fn block_end(block: &Block) -> NonNull<u8> {
    // SAFETY: A block's end is derived from its non-null start by a
    // non-wrapping offset.
    unsafe { NonNull::new_unchecked(block.end()) }
}

fn zero_block(block: &Block) {
    // SAFETY: Zeroing a freshly fetched block.
    // - start is valid for len bytes
    // - nothing else references the block yet
    unsafe { ptr::write_bytes(block.start().as_ptr(), 0, block.len()) };
}
