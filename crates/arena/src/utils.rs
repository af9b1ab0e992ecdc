//! Alignment and rounding helpers

use core::num::NonZeroUsize;

use crate::error::{ArenaError, ArenaResult};

/// Aligns a value up to the nearest multiple of alignment
///
/// # Examples
/// ```
/// use region_arena::utils::align_up;
///
/// assert_eq!(align_up(1, 8), 8);
/// assert_eq!(align_up(16, 8), 16);
/// ```
#[inline]
pub const fn align_up(value: usize, alignment: usize) -> usize {
    debug_assert!(alignment.is_power_of_two());
    (value + alignment - 1) & !(alignment - 1)
}

/// Overflow-checked [`align_up`]
#[inline]
pub fn checked_align_up(value: usize, alignment: usize) -> ArenaResult<usize> {
    debug_assert!(alignment.is_power_of_two());
    value
        .checked_add(alignment - 1)
        .map(|v| v & !(alignment - 1))
        .ok_or_else(|| ArenaError::size_overflow("align_up"))
}

/// Checks if a value is aligned to the given alignment
#[inline]
pub const fn is_aligned(value: usize, alignment: usize) -> bool {
    debug_assert!(alignment.is_power_of_two());
    value & (alignment - 1) == 0
}

/// Number of whole `unit_size` units needed to hold `bytes`, never less than one
#[inline]
pub fn units_for(bytes: usize, unit_size: usize) -> NonZeroUsize {
    NonZeroUsize::new(bytes.div_ceil(unit_size)).unwrap_or(NonZeroUsize::MIN)
}
