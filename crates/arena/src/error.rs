//! Standalone error types for region-arena
//!
//! Uses thiserror for clean, idiomatic Rust error definitions.
//!
//! Every fallible operation in the crate has a `try_*` form returning
//! [`ArenaResult`]. The non-`try` forms treat any error as fatal, see
//! [`fatal`].

use core::alloc::Layout;
use std::alloc::handle_alloc_error;

use thiserror::Error;
use tracing::error;

// ============================================================================
// Main Error Types
// ============================================================================

/// Arena allocation errors
#[must_use = "errors should be handled"]
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ArenaError {
    // --- Exhaustion ---
    #[error("Block supplier exhausted: {units} block units of {unit_size} bytes requested")]
    SupplierExhausted { units: usize, unit_size: usize },

    #[error("Bookkeeping allocation failed: {bytes} bytes")]
    BookkeepingExhausted { bytes: usize },

    // --- Requests ---
    #[error("Size overflow during operation: {operation}")]
    SizeOverflow { operation: String },

    #[error("Invalid alignment: {alignment} (arena guarantees at most {max})")]
    InvalidAlignment { alignment: usize, max: usize },

    // --- Configuration ---
    #[error("Invalid configuration: {reason}")]
    InvalidConfig { reason: String },

    // --- Consistency ---
    #[error("Location {ptr:#x} is not in arena {arena:#x}")]
    ForeignPointer { ptr: usize, arena: usize },
}

impl ArenaError {
    /// Whether the error means one of the memory sources ran dry
    #[must_use]
    pub fn is_exhaustion(&self) -> bool {
        matches!(
            self,
            Self::SupplierExhausted { .. } | Self::BookkeepingExhausted { .. }
        )
    }

    /// Get error code for categorization
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::SupplierExhausted { .. } => "ARENA:SUPPLY:EXHAUSTED",
            Self::BookkeepingExhausted { .. } => "ARENA:BOOKKEEPING:EXHAUSTED",
            Self::SizeOverflow { .. } => "ARENA:ALLOC:OVERFLOW",
            Self::InvalidAlignment { .. } => "ARENA:ALLOC:ALIGN",
            Self::InvalidConfig { .. } => "ARENA:CONFIG:INVALID",
            Self::ForeignPointer { .. } => "ARENA:CHECK:FOREIGN",
        }
    }

    /// Layout reported to the allocation error handler when this error is fatal
    pub(crate) fn exhausted_layout(&self) -> Option<Layout> {
        let size = match *self {
            Self::SupplierExhausted { units, unit_size } => units.saturating_mul(unit_size),
            Self::BookkeepingExhausted { bytes } => bytes,
            _ => return None,
        };
        // Layout caps sizes at isize::MAX
        Layout::from_size_align(size.min(isize::MAX as usize), 1).ok()
    }

    // ============================================================================
    // Convenience Constructors
    // ============================================================================

    /// Create supplier exhausted error
    pub fn supplier_exhausted(units: usize, unit_size: usize) -> Self {
        error!(units, unit_size, "Block supplier exhausted");

        Self::SupplierExhausted { units, unit_size }
    }

    /// Create bookkeeping exhausted error
    pub fn bookkeeping_exhausted(bytes: usize) -> Self {
        error!(bytes, "Arena bookkeeping allocation failed");

        Self::BookkeepingExhausted { bytes }
    }

    /// Create size overflow error
    pub fn size_overflow(operation: &str) -> Self {
        Self::SizeOverflow {
            operation: operation.to_string(),
        }
    }

    /// Create invalid alignment error
    pub fn invalid_alignment(alignment: usize, max: usize) -> Self {
        Self::InvalidAlignment { alignment, max }
    }

    /// Create invalid config error
    pub fn invalid_config(reason: &str) -> Self {
        Self::InvalidConfig {
            reason: reason.to_string(),
        }
    }

    /// Create foreign pointer error
    pub fn foreign_pointer(ptr: *const u8, arena: *const ()) -> Self {
        Self::ForeignPointer {
            ptr: ptr as usize,
            arena: arena as usize,
        }
    }
}

/// Terminates on an error the caller chose not to handle.
///
/// Exhaustion goes through [`handle_alloc_error`], which aborts the process.
/// Anything else is a broken invariant and panics with the diagnostic; the
/// release profile builds with `panic = "abort"`.
#[cold]
#[track_caller]
#[allow(clippy::needless_pass_by_value)]
pub(crate) fn fatal(err: ArenaError) -> ! {
    error!(code = err.code(), "fatal arena error: {err}");

    if let Some(layout) = err.exhausted_layout() {
        handle_alloc_error(layout);
    }
    panic!("{err}");
}

// ============================================================================
// Result Types
// ============================================================================

/// Result type for arena operations
pub type ArenaResult<T> = core::result::Result<T, ArenaError>;

/// Generic result type alias
pub type Result<T> = ArenaResult<T>;

// ============================================================================
// Tests
// ============================================================================
