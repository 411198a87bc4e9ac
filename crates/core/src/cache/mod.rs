//! Set-Associative Cache Simulator.
//!
//! This module implements a configurable set-associative cache driven by a pluggable
//! replacement policy. The cache owns the lines and one policy handle per way; the policy
//! owns the per-set ordering and is told about every hit, fill, and invalidation.

/// Insertion/promotion vector validation and presets.
pub mod ipv;

/// Cache replacement policy implementations (LRU-IPV, LRU, FIFO, Random).
pub mod policies;

/// Per-set rank stores and line handles.
pub mod rank;

use tracing::{debug, trace};

use self::policies::{ReplacementPolicy, build_policy};
use self::rank::LineHandle;
use crate::common::{ConfigError, PolicyError};
use crate::config::CacheConfig;
use crate::stats::CacheStats;

/// Cache line entry containing tag, validity, and dirty bits.
#[derive(Debug, Clone, Default)]
struct CacheLine {
    tag: u64,
    valid: bool,
    dirty: bool,
}

/// Result of one cache access.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AccessOutcome {
    /// The line was already resident.
    pub hit: bool,
    /// Extra cycles spent writing back a dirty victim (0 on hit).
    pub penalty: u64,
    /// Way that now holds the line.
    pub way: usize,
}

/// Cache simulator implementing a set-associative cache with a configurable policy.
#[derive(Debug)]
pub struct CacheSim {
    /// Access latency in cycles (added on hit; miss adds next-level latency).
    pub latency: u64,
    lines: Vec<CacheLine>,
    handles: Vec<LineHandle>,
    num_sets: usize,
    ways: usize,
    line_bytes: usize,
    policy: Box<dyn ReplacementPolicy>,
    stats: CacheStats,
}

impl CacheSim {
    /// Creates a new cache simulator with the specified configuration.
    ///
    /// One policy handle is created per way, set by set, so the handles of set `s` form
    /// the policy's `s`-th rank store and handle `w` of that store is way `w`.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if the geometry or the replacement configuration is invalid.
    pub fn new(config: &CacheConfig) -> Result<Self, ConfigError> {
        let num_sets = config.num_sets()?;
        let mut policy = build_policy(config)?;
        let handles: Vec<LineHandle> = (0..num_sets * config.ways)
            .map(|_| policy.create_handle())
            .collect();

        debug!(
            size = config.size_bytes,
            line = config.line_bytes,
            ways = config.ways,
            sets = num_sets,
            policy = ?config.policy,
            "cache constructed"
        );

        Ok(Self {
            latency: config.latency,
            lines: vec![CacheLine::default(); num_sets * config.ways],
            handles,
            num_sets,
            ways: config.ways,
            line_bytes: config.line_bytes,
            policy,
            stats: CacheStats::default(),
        })
    }

    /// Number of sets.
    pub const fn num_sets(&self) -> usize {
        self.num_sets
    }

    /// Associativity.
    pub const fn ways(&self) -> usize {
        self.ways
    }

    /// Counters accumulated so far.
    pub const fn stats(&self) -> &CacheStats {
        &self.stats
    }

    /// The replacement policy driving this cache.
    pub fn policy(&self) -> &dyn ReplacementPolicy {
        self.policy.as_ref()
    }

    /// Splits an address into its set index and tag.
    fn locate(&self, addr: u64) -> (usize, u64) {
        let line = addr / self.line_bytes as u64;
        let sets = self.num_sets as u64;
        ((line % sets) as usize, line / sets)
    }

    /// Way holding `tag` in `set`, if resident.
    fn find(&self, set: usize, tag: u64) -> Option<usize> {
        let base = set * self.ways;
        self.lines[base..base + self.ways]
            .iter()
            .position(|line| line.valid && line.tag == tag)
    }

    /// Checks if the cache contains the specified address.
    pub fn contains(&self, addr: u64) -> bool {
        let (set, tag) = self.locate(addr);
        self.find(set, tag).is_some()
    }

    /// Current policy rank of every way in `set`, indexed by way.
    ///
    /// # Errors
    ///
    /// Returns [`PolicyError::UnknownSet`] if `set` is not below [`CacheSim::num_sets`].
    pub fn set_ranks(&self, set: usize) -> Result<Vec<usize>, PolicyError> {
        let unknown = PolicyError::UnknownSet {
            set,
            sets: self.num_sets,
        };
        if set >= self.num_sets {
            return Err(unknown);
        }
        let base = set * self.ways;
        self.handles
            .get(base..base + self.ways)
            .ok_or(unknown)?
            .iter()
            .map(|handle| self.policy.rank(handle))
            .collect()
    }

    /// Installs `tag` into `set`, returning the way used and the write-back penalty.
    ///
    /// An invalid way is filled first; only a full set consults the policy for a victim.
    fn install_line(
        &mut self,
        set: usize,
        tag: u64,
        is_write: bool,
        next_level_latency: u64,
    ) -> Result<(usize, u64), PolicyError> {
        let base = set * self.ways;
        let set_lines = &self.lines[base..base + self.ways];

        let way = match set_lines.iter().position(|line| !line.valid) {
            Some(way) => way,
            None => {
                let candidates: Vec<&LineHandle> =
                    self.handles[base..base + self.ways].iter().collect();
                self.policy.get_victim(&candidates)?.index()
            }
        };

        let victim = &mut self.lines[base + way];
        let mut penalty = 0;
        if victim.valid {
            self.stats.evictions += 1;
            if victim.dirty {
                self.stats.writebacks += 1;
                penalty += next_level_latency;
            }
            trace!(set, way, tag = victim.tag, dirty = victim.dirty, "evicting line");
        }

        *victim = CacheLine {
            tag,
            valid: true,
            dirty: is_write,
        };
        self.policy.reset(&self.handles[base + way])?;

        Ok((way, penalty))
    }

    /// Accesses the cache for the specified address.
    ///
    /// A hit touches the line in the policy; a miss installs the line and resets it.
    ///
    /// # Arguments
    ///
    /// * `addr` - The address to access
    /// * `is_write` - Whether this is a write operation
    /// * `next_level_latency` - Latency of the next cache level (write-back penalty)
    ///
    /// # Errors
    ///
    /// Propagates [`PolicyError`] from the policy (cannot happen for an intact cache).
    pub fn access(
        &mut self,
        addr: u64,
        is_write: bool,
        next_level_latency: u64,
    ) -> Result<AccessOutcome, PolicyError> {
        let (set, tag) = self.locate(addr);
        self.stats.accesses += 1;

        if let Some(way) = self.find(set, tag) {
            let idx = set * self.ways + way;
            self.policy.touch(&self.handles[idx])?;
            if is_write {
                self.lines[idx].dirty = true;
            }
            self.stats.hits += 1;
            return Ok(AccessOutcome {
                hit: true,
                penalty: 0,
                way,
            });
        }

        self.stats.misses += 1;
        let (way, penalty) = self.install_line(set, tag, is_write, next_level_latency)?;
        Ok(AccessOutcome {
            hit: false,
            penalty,
            way,
        })
    }

    /// Drops the line at `idx` and tells the policy.
    fn invalidate_index(&mut self, idx: usize) -> Result<(), PolicyError> {
        let line = &mut self.lines[idx];
        if line.dirty {
            self.stats.writebacks += 1;
        }
        line.valid = false;
        line.dirty = false;
        self.stats.invalidations += 1;
        self.policy.invalidate(&self.handles[idx])
    }

    /// Invalidates the line holding `addr`, returning whether one was resident.
    ///
    /// # Errors
    ///
    /// Propagates [`PolicyError`] from the policy (cannot happen for an intact cache).
    pub fn invalidate(&mut self, addr: u64) -> Result<bool, PolicyError> {
        let (set, tag) = self.locate(addr);
        match self.find(set, tag) {
            Some(way) => {
                self.invalidate_index(set * self.ways + way)?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Invalidates every valid line, writing back the dirty ones.
    ///
    /// # Errors
    ///
    /// Propagates [`PolicyError`] from the policy (cannot happen for an intact cache).
    pub fn flush(&mut self) -> Result<(), PolicyError> {
        for idx in 0..self.lines.len() {
            if self.lines[idx].valid {
                self.invalidate_index(idx)?;
            }
        }
        Ok(())
    }

    /// Deallocates the cache, releasing every handle back to the policy.
    ///
    /// # Errors
    ///
    /// Propagates [`PolicyError`] from the policy (cannot happen for an intact cache).
    pub fn teardown(mut self) -> Result<Box<dyn ReplacementPolicy>, PolicyError> {
        for handle in self.handles.drain(..) {
            self.policy.release_handle(handle)?;
        }
        Ok(self.policy)
    }
}
