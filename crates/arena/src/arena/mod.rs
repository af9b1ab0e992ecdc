//! Region-based arena allocation
//!
//! An [`Arena`] owns a chain of blocks obtained from a
//! [`BlockSupplier`](crate::supplier::BlockSupplier). Allocation bumps a free
//! pointer through the current block; when the current block cannot hold a
//! request, a new block sized to a whole number of block units is fetched and
//! the unused tail of the old block is abandoned. Individual allocations are
//! never freed: all blocks go back to the supplier at once when the arena is
//! destroyed.
//!
//! # Examples
//!
//! ```rust
//! use region_arena::arena::Arena;
//! use region_arena::ArenaConfig;
//!
//! let arena = Arena::with_config(ArenaConfig::default().with_block_unit_size(4096));
//!
//! let small = arena.allocate(100);
//! let large = arena.allocate(10_000); // fetches a 3-unit block
//! assert_ne!(small, large);
//!
//! let name = arena.alloc_str("phase-1").unwrap();
//! assert_eq!(name, "phase-1");
//!
//! assert_eq!(arena.destroy(), 2);
//! ```

#[allow(clippy::module_inception)]
mod arena;
#[cfg(any(debug_assertions, feature = "debug-check"))]
mod check;
mod stats;

pub use self::arena::Arena;
pub use self::stats::{ArenaStats, ArenaStatsSnapshot};
