//! Cache replacement policy library.
//!
//! This crate models the replacement side of a set-associative cache:
//! 1. **Policies:** LRU generalised by an insertion/promotion vector (LRU-IPV), plus LRU,
//!    FIFO, and Random behind one [`ReplacementPolicy`] trait.
//! 2. **Rank stores:** Per-set rank arrays shared by the handles of one set.
//! 3. **Cache:** A set-associative cache container that drives a policy from an address
//!    stream.
//! 4. **Configuration and statistics:** JSON-deserializable config and hit/miss counters.

/// Set-associative cache, replacement policies, rank stores, and promotion vectors.
pub mod cache;
/// Common types (errors).
pub mod common;
/// Cache configuration (defaults, policy selection, geometry).
pub mod config;
/// Cache statistics collection.
pub mod stats;

/// Set-associative cache container; construct with `CacheSim::new`.
pub use crate::cache::CacheSim;
/// Insertion/promotion vector.
pub use crate::cache::ipv::PromotionVector;
/// Policy trait and the closed set of implementations.
pub use crate::cache::policies::{
    FifoPolicy, LruIpvPolicy, LruPolicy, RandomPolicy, ReplacementPolicy, build_policy,
};
/// Per-way handle into a rank store.
pub use crate::cache::rank::{GroupId, LineHandle, RankArena};
/// Error types.
pub use crate::common::{ConfigError, PolicyError};
/// Root configuration type; use `CacheConfig::default()` or `CacheConfig::from_json`.
pub use crate::config::CacheConfig;
/// Cache counters.
pub use crate::stats::CacheStats;
