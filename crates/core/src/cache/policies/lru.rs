//! Least Recently Used (LRU) Replacement Policy.
//!
//! This policy evicts the cache line that has not been accessed for the longest time.
//! The rank store of each set is kept as a strict recency permutation: rank 0 is MRU and
//! rank `W - 1` is LRU. Both hits and fills move the line to rank 0.
//!
//! # Performance
//!
//! - **Time Complexity:**
//!   - `touch()` / `reset()`: O(W) where W is the number of ways (associativity)
//!   - `get_victim()`: O(C) where C is the number of candidates
//! - **Space Complexity:** O(S × W) where S is the number of sets
//! - **Best Case:** Workloads with good temporal locality
//! - **Worst Case:** Scanning patterns larger than cache capacity (thrashing)

use super::ReplacementPolicy;
use crate::cache::rank::{self, LineHandle, RankArena};
use crate::common::{ConfigError, PolicyError};

/// LRU Policy state.
#[derive(Debug)]
pub struct LruPolicy {
    arena: RankArena,
}

impl LruPolicy {
    /// Creates a new LRU policy instance.
    ///
    /// # Arguments
    ///
    /// * `ways` - The associativity (number of ways) of the cache.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ZeroWays`] if `ways` is zero.
    pub fn new(ways: usize) -> Result<Self, ConfigError> {
        Ok(Self {
            arena: RankArena::new(ways)?,
        })
    }
}

impl ReplacementPolicy for LruPolicy {
    fn ways(&self) -> usize {
        self.arena.ways()
    }

    fn create_handle(&mut self) -> LineHandle {
        self.arena.create_handle()
    }

    fn release_handle(&mut self, handle: LineHandle) -> Result<(), PolicyError> {
        self.arena.release_handle(handle)
    }

    /// Moves the accessed way to the MRU position, shifting the more recent ways down.
    fn touch(&mut self, handle: &LineHandle) -> Result<(), PolicyError> {
        rank::move_to_front(self.arena.ranks_mut(handle)?, handle.index());
        Ok(())
    }

    /// A fill is the most recent access to its way.
    fn reset(&mut self, handle: &LineHandle) -> Result<(), PolicyError> {
        self.touch(handle)
    }

    /// Moves the invalidated way to the LRU position so it is the next victim.
    fn invalidate(&mut self, handle: &LineHandle) -> Result<(), PolicyError> {
        rank::move_to_back(self.arena.ranks_mut(handle)?, handle.index());
        Ok(())
    }

    /// Returns the least recently used candidate.
    fn get_victim<'a>(
        &mut self,
        candidates: &[&'a LineHandle],
    ) -> Result<&'a LineHandle, PolicyError> {
        let pos = rank::oldest(&self.arena, candidates)?;
        Ok(candidates[pos])
    }

    fn rank(&self, handle: &LineHandle) -> Result<usize, PolicyError> {
        self.arena.rank(handle)
    }
}
