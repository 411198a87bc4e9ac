//! Configuration system for the cache replacement simulator.
//!
//! This module defines the configuration structures and enums used to parameterize
//! a simulated cache. It provides:
//! 1. **Defaults:** Baseline cache geometry and latency constants.
//! 2. **Structures:** [`CacheConfig`], deserializable from JSON with per-field defaults.
//! 3. **Enums:** [`ReplacementPolicy`], the closed set of selectable policies.

use serde::Deserialize;

use crate::common::ConfigError;

/// Default configuration constants.
///
/// These values define the baseline cache when not explicitly overridden in the JSON
/// configuration.
mod defaults {
    /// Default cache size in bytes (32 KiB).
    pub const CACHE_SIZE: usize = 32 * 1024;

    /// Default cache line size in bytes (64 bytes).
    ///
    /// Matches typical modern processor cache line sizes and DRAM burst length.
    pub const CACHE_LINE: usize = 64;

    /// Default cache associativity (16 ways).
    pub const CACHE_WAYS: usize = 16;

    /// Default cache access latency in cycles.
    pub const CACHE_LATENCY: u64 = 1;
}

/// Cache replacement policy algorithms.
///
/// Specifies the algorithm used to select which cache line to evict
/// when a new line must be installed in a full cache set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ReplacementPolicy {
    /// LRU generalised by an insertion/promotion vector.
    ///
    /// Hits and fills move lines to positions read from the configured vector.
    #[default]
    #[serde(rename = "LRU_IPV", alias = "LruIpv")]
    LruIpv,
    /// Least Recently Used replacement policy.
    ///
    /// Evicts the cache line that was accessed least recently.
    #[serde(alias = "Lru")]
    Lru,
    /// First In First Out replacement policy.
    ///
    /// Evicts the oldest cache line in the set.
    #[serde(alias = "Fifo")]
    Fifo,
    /// Random replacement policy.
    ///
    /// Evicts a randomly selected cache line from the set.
    #[serde(alias = "Random")]
    Random,
}

/// Cache geometry and replacement configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct CacheConfig {
    /// Total cache size in bytes
    #[serde(default = "CacheConfig::default_size")]
    pub size_bytes: usize,

    /// Cache line size in bytes
    #[serde(default = "CacheConfig::default_line")]
    pub line_bytes: usize,

    /// Associativity (number of ways)
    #[serde(default = "CacheConfig::default_ways")]
    pub ways: usize,

    /// Replacement policy
    #[serde(default)]
    pub policy: ReplacementPolicy,

    /// Insertion/promotion vector (`ways + 1` entries) for `LRU_IPV`
    #[serde(default)]
    pub ipv: Option<Vec<usize>>,

    /// Access latency in cycles
    #[serde(default = "CacheConfig::default_latency")]
    pub latency: u64,
}

impl CacheConfig {
    /// Returns the default cache size in bytes.
    const fn default_size() -> usize {
        defaults::CACHE_SIZE
    }

    /// Returns the default cache line size in bytes.
    const fn default_line() -> usize {
        defaults::CACHE_LINE
    }

    /// Returns the default cache associativity (number of ways).
    const fn default_ways() -> usize {
        defaults::CACHE_WAYS
    }

    /// Returns the default cache access latency in cycles.
    const fn default_latency() -> u64 {
        defaults::CACHE_LATENCY
    }

    /// Parses a configuration from a JSON document; missing fields take their defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Json`] if the document is malformed.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Number of sets implied by the geometry.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ZeroWays`] for zero associativity and
    /// [`ConfigError::Geometry`] when the sizes do not divide into whole sets.
    pub fn num_sets(&self) -> Result<usize, ConfigError> {
        if self.ways == 0 {
            return Err(ConfigError::ZeroWays);
        }
        if self.line_bytes == 0 || !self.line_bytes.is_power_of_two() {
            return Err(ConfigError::Geometry(format!(
                "line size {} is not a non-zero power of two",
                self.line_bytes
            )));
        }
        let set_bytes = self.line_bytes.checked_mul(self.ways).ok_or_else(|| {
            ConfigError::Geometry(format!(
                "{} ways x {} bytes per line overflows the address space",
                self.ways, self.line_bytes
            ))
        })?;
        if self.size_bytes == 0 || self.size_bytes % set_bytes != 0 {
            return Err(ConfigError::Geometry(format!(
                "cache size {} is not a non-zero multiple of {} ({} ways x {} bytes)",
                self.size_bytes, set_bytes, self.ways, self.line_bytes
            )));
        }
        Ok(self.size_bytes / set_bytes)
    }
}

impl Default for CacheConfig {
    /// Creates a default cache configuration.
    ///
    /// 32 KiB, 64-byte lines, 16 ways, LRU-IPV with the tuned 16-way vector.
    fn default() -> Self {
        Self {
            size_bytes: defaults::CACHE_SIZE,
            line_bytes: defaults::CACHE_LINE,
            ways: defaults::CACHE_WAYS,
            policy: ReplacementPolicy::default(),
            ipv: None,
            latency: defaults::CACHE_LATENCY,
        }
    }
}
