//! Arena configuration

use crate::error::{ArenaError, ArenaResult};

/// Minimum alignment of every arena allocation, in bytes
pub const MIN_ALIGN: usize = 8;

/// Default block unit size: one 4 KiB page
pub const DEFAULT_BLOCK_UNIT_SIZE: usize = 4096;

/// Arena configuration builder
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArenaConfig {
    /// Granularity, in bytes, of blocks obtained from the system supplier
    pub block_unit_size: usize,
    /// Number of block units fetched when the arena is created
    pub initial_units: usize,
    /// Whether to track per-arena statistics
    pub track_stats: bool,
    /// Whether to zero every freshly fetched block
    pub zero_memory: bool,
}

impl ArenaConfig {
    /// Creates new config with default values
    pub fn new() -> Self {
        Self {
            block_unit_size: DEFAULT_BLOCK_UNIT_SIZE,
            initial_units: 1,
            track_stats: cfg!(debug_assertions),
            zero_memory: false,
        }
    }

    /// Debug configuration: full statistics, zeroed blocks
    pub fn debug() -> Self {
        Self {
            track_stats: true,
            zero_memory: true,
            ..Self::new()
        }
    }

    /// Production configuration: no statistics or zeroing overhead
    pub fn production() -> Self {
        Self {
            track_stats: false,
            zero_memory: false,
            ..Self::new()
        }
    }

    /// Small blocks for arenas that only ever hold a handful of objects
    pub fn small_blocks() -> Self {
        Self {
            block_unit_size: 1024,
            ..Self::new()
        }
    }

    /// Large blocks (64 KiB) for arenas with many or bigger objects
    pub fn large_blocks() -> Self {
        Self {
            block_unit_size: 64 * 1024,
            ..Self::new()
        }
    }

    /// Sets the block unit size (must be a power of two, at least [`MIN_ALIGN`])
    #[must_use = "builder methods must be chained or built"]
    pub fn with_block_unit_size(mut self, size: usize) -> Self {
        self.block_unit_size = size;
        self
    }

    /// Sets the number of units in the first block
    #[must_use = "builder methods must be chained or built"]
    pub fn with_initial_units(mut self, units: usize) -> Self {
        self.initial_units = units;
        self
    }

    /// Enables/disables statistics tracking
    #[must_use = "builder methods must be chained or built"]
    pub fn with_stats(mut self, enabled: bool) -> Self {
        self.track_stats = enabled;
        self
    }

    /// Enables/disables zeroing of fresh blocks
    #[must_use = "builder methods must be chained or built"]
    pub fn with_zero_memory(mut self, enabled: bool) -> Self {
        self.zero_memory = enabled;
        self
    }

    /// Validates the configuration
    pub fn validate(&self) -> ArenaResult<()> {
        if !self.block_unit_size.is_power_of_two() {
            return Err(ArenaError::invalid_config(
                "Block unit size must be a power of 2",
            ));
        }

        if self.block_unit_size < MIN_ALIGN {
            return Err(ArenaError::invalid_config(
                "Block unit size must be at least the minimum alignment",
            ));
        }

        if self.initial_units == 0 {
            return Err(ArenaError::invalid_config(
                "Initial block must hold at least one unit",
            ));
        }

        if self.block_unit_size.checked_mul(self.initial_units).is_none() {
            return Err(ArenaError::invalid_config("Initial block size overflows"));
        }

        Ok(())
    }
}

impl Default for ArenaConfig {
    fn default() -> Self {
        Self::new()
    }
}
