//! # region-arena
//!
//! Region-based (arena) memory allocation: fast, unprotected allocations from
//! a growable chain of fixed-size blocks, all reclaimed at once when the arena
//! is destroyed.
//!
//! Suited to many short-lived, differently sized objects whose lifetimes all
//! end with one logical phase, where per-object deallocation bookkeeping is
//! not worth paying for.
//!
//! ## Quick Start
//!
//! ```rust
//! use region_arena::prelude::*;
//!
//! let arena = Arena::create();
//!
//! let raw = arena.allocate(100);
//! let value = arena.alloc(42u64)?;
//! assert_eq!(*value, 42);
//!
//! // every block goes back to the supplier at once
//! arena.destroy();
//! assert!(block_units_in_use() >= 1);
//! # let _ = raw;
//! # Ok::<(), ArenaError>(())
//! ```
//!
//! ## Features
//!
//! - `debug-check`: Keep [`Arena::contains_pointer`] and friends in release
//!   builds (always available with `debug_assertions`)
//!
//! ## Architecture
//!
//! - [`arena`]: the [`Arena`] itself, with per-arena statistics
//! - [`supplier`]: where blocks come from ([`SystemSupplier`],
//!   [`TrackingSupplier`])
//! - [`counter`]: process-wide block unit accounting
//! - [`error`]: standalone error handling; `try_*` methods return
//!   [`ArenaResult`], the others treat failure as fatal

#![cfg_attr(docsrs, feature(doc_cfg))]
#![allow(unsafe_code)]
#![warn(missing_docs)]
#![warn(rust_2018_idioms)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_possible_truncation)]

pub mod arena;
pub mod config;
pub mod counter;
#[allow(missing_docs)]
pub mod error;
pub mod supplier;
pub mod utils;

pub use crate::arena::{Arena, ArenaStats, ArenaStatsSnapshot};
pub use crate::config::{ArenaConfig, MIN_ALIGN};
pub use crate::counter::{BlockUnitCounter, block_units_in_use};
pub use crate::error::{ArenaError, ArenaResult, Result};
pub use crate::supplier::{Block, BlockRecord, BlockSupplier, SystemSupplier, TrackingSupplier};

// Public API exports
pub mod prelude {
    //! Convenient re-exports of commonly used types and traits.

    pub use crate::arena::{Arena, ArenaStats};
    pub use crate::config::{ArenaConfig, MIN_ALIGN};
    pub use crate::counter::block_units_in_use;
    pub use crate::error::{ArenaError, ArenaResult};
    pub use crate::supplier::{BlockSupplier, SystemSupplier, TrackingSupplier};
}
