//! Statistics tracking for a single arena

use std::fmt;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

/// Statistics for one arena
///
/// Only recorded when [`ArenaConfig::track_stats`](crate::ArenaConfig) is on.
#[derive(Debug, Default)]
pub struct ArenaStats {
    // Allocation statistics
    allocations: AtomicU64,
    slow_allocations: AtomicU64,
    bytes_requested: AtomicUsize,
    bytes_bumped: AtomicUsize,

    // Block statistics
    blocks_fetched: AtomicUsize,
    units_fetched: AtomicUsize,
    bytes_reserved: AtomicUsize,
    bytes_wasted: AtomicUsize,
}

impl ArenaStats {
    /// Creates a new ArenaStats instance
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of successful allocations
    pub fn allocations(&self) -> u64 {
        self.allocations.load(Ordering::Relaxed)
    }

    /// Allocations that had to fetch a new block
    pub fn slow_allocations(&self) -> u64 {
        self.slow_allocations.load(Ordering::Relaxed)
    }

    /// Bytes asked for by callers, before rounding
    pub fn bytes_requested(&self) -> usize {
        self.bytes_requested.load(Ordering::Relaxed)
    }

    /// Bytes handed out after rounding to the minimum alignment
    pub fn bytes_bumped(&self) -> usize {
        self.bytes_bumped.load(Ordering::Relaxed)
    }

    /// Blocks fetched, including the initial one
    pub fn blocks_fetched(&self) -> usize {
        self.blocks_fetched.load(Ordering::Relaxed)
    }

    /// Block units fetched, including the initial block
    pub fn units_fetched(&self) -> usize {
        self.units_fetched.load(Ordering::Relaxed)
    }

    /// Total size of every block the arena holds
    pub fn bytes_reserved(&self) -> usize {
        self.bytes_reserved.load(Ordering::Relaxed)
    }

    /// Unused tails of blocks abandoned when a new block was fetched
    pub fn bytes_wasted(&self) -> usize {
        self.bytes_wasted.load(Ordering::Relaxed)
    }

    /// Calculates memory utilization ratio (0..1)
    pub fn utilization_ratio(&self) -> f64 {
        let reserved = self.bytes_reserved() as f64;
        if reserved == 0.0 {
            0.0
        } else {
            self.bytes_bumped() as f64 / reserved
        }
    }

    // Internal update methods
    pub(crate) fn record_allocation(&self, requested: usize, bumped: usize) {
        self.allocations.fetch_add(1, Ordering::Relaxed);
        self.bytes_requested.fetch_add(requested, Ordering::Relaxed);
        self.bytes_bumped.fetch_add(bumped, Ordering::Relaxed);
    }

    pub(crate) fn record_slow_allocation(&self) {
        self.slow_allocations.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_block(&self, units: usize, bytes: usize) {
        self.blocks_fetched.fetch_add(1, Ordering::Relaxed);
        self.units_fetched.fetch_add(units, Ordering::Relaxed);
        self.bytes_reserved.fetch_add(bytes, Ordering::Relaxed);
    }

    pub(crate) fn record_waste(&self, bytes: usize) {
        self.bytes_wasted.fetch_add(bytes, Ordering::Relaxed);
    }

    /// Creates a snapshot of current statistics
    pub fn snapshot(&self) -> ArenaStatsSnapshot {
        ArenaStatsSnapshot {
            allocations: self.allocations(),
            slow_allocations: self.slow_allocations(),
            bytes_requested: self.bytes_requested(),
            bytes_bumped: self.bytes_bumped(),
            blocks_fetched: self.blocks_fetched(),
            units_fetched: self.units_fetched(),
            bytes_reserved: self.bytes_reserved(),
            bytes_wasted: self.bytes_wasted(),
            utilization_ratio: self.utilization_ratio(),
        }
    }
}

/// Immutable snapshot of arena statistics
#[allow(missing_docs)]
#[derive(Debug, Clone, PartialEq)]
pub struct ArenaStatsSnapshot {
    pub allocations: u64,
    pub slow_allocations: u64,
    pub bytes_requested: usize,
    pub bytes_bumped: usize,
    pub blocks_fetched: usize,
    pub units_fetched: usize,
    pub bytes_reserved: usize,
    pub bytes_wasted: usize,
    pub utilization_ratio: f64,
}

impl fmt::Display for ArenaStatsSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Arena Statistics:")?;
        writeln!(f, "  Memory:")?;
        writeln!(f, "    Reserved: {} bytes", self.bytes_reserved)?;
        writeln!(f, "    Requested: {} bytes", self.bytes_requested)?;
        writeln!(f, "    Handed out: {} bytes", self.bytes_bumped)?;
        writeln!(f, "    Wasted: {} bytes", self.bytes_wasted)?;
        writeln!(f, "    Utilization: {:.1}%", self.utilization_ratio * 100.0)?;
        writeln!(f, "  Operations:")?;
        writeln!(f, "    Allocations: {}", self.allocations)?;
        writeln!(f, "    Block fetches on allocation: {}", self.slow_allocations)?;
        writeln!(f, "  Blocks:")?;
        writeln!(f, "    Fetched: {}", self.blocks_fetched)?;
        writeln!(f, "    Units: {}", self.units_fetched)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_state() {
        let stats = ArenaStats::new();
        assert_eq!(stats.allocations(), 0);
        assert_eq!(stats.bytes_reserved(), 0);
        assert_eq!(stats.utilization_ratio(), 0.0);
    }

    #[test]
    fn test_allocation_tracking() {
        let stats = ArenaStats::new();
        stats.record_block(1, 4096);
        stats.record_allocation(100, 104);
        stats.record_allocation(3, 8);

        assert_eq!(stats.allocations(), 2);
        assert_eq!(stats.bytes_requested(), 103);
        assert_eq!(stats.bytes_bumped(), 112);
        assert_eq!(stats.blocks_fetched(), 1);
    }

    #[test]
    fn test_utilization_calculation() {
        let stats = ArenaStats::new();
        stats.record_block(1, 1000);
        stats.record_allocation(750, 750);

        assert!((stats.utilization_ratio() - 0.75).abs() < f64::EPSILON);
    }

    #[test]
    fn test_snapshot_display() {
        let stats = ArenaStats::new();
        stats.record_block(3, 12288);
        stats.record_slow_allocation();
        stats.record_waste(40);

        let snapshot = stats.snapshot();
        assert_eq!(snapshot.units_fetched, 3);
        assert_eq!(snapshot.bytes_wasted, 40);

        let report = snapshot.to_string();
        assert!(report.contains("Reserved: 12288 bytes"));
        assert!(report.contains("Wasted: 40 bytes"));
    }
}
