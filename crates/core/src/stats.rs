//! Cache statistics collection and reporting.
//!
//! Tracks access outcomes for one simulated cache: hits, misses, evictions of valid lines,
//! dirty write-backs, and explicit invalidations.

use serde::Serialize;

/// Counters for one cache instance.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    /// Total accesses (hits + misses).
    pub accesses: u64,
    /// Accesses that found their line resident.
    pub hits: u64,
    /// Accesses that had to install a line.
    pub misses: u64,
    /// Misses that displaced a valid line.
    pub evictions: u64,
    /// Dirty lines written back on eviction, invalidation, or flush.
    pub writebacks: u64,
    /// Lines invalidated by `invalidate` or `flush`.
    pub invalidations: u64,
}

impl CacheStats {
    /// Fraction of accesses that hit, or 0.0 before the first access.
    pub fn hit_rate(&self) -> f64 {
        if self.accesses == 0 {
            0.0
        } else {
            self.hits as f64 / self.accesses as f64
        }
    }
}
