//! First-In, First-Out (FIFO) Replacement Policy.
//!
//! This policy evicts the oldest cache line in a set, regardless of how recently
//! it was accessed. Fills move a way to rank 0 and age every way filled before it;
//! hits leave the ordering alone.
//!
//! # Performance
//!
//! - **Time Complexity:**
//!   - `touch()`: O(1)
//!   - `reset()`: O(W)
//!   - `get_victim()`: O(C) where C is the number of candidates
//! - **Space Complexity:** O(S × W) where S is the number of sets
//! - **Best Case:** Streaming accesses where all lines have equal importance
//! - **Worst Case:** Workloads with strong temporal locality (may evict frequently-used lines)

use super::ReplacementPolicy;
use crate::cache::rank::{self, LineHandle, RankArena};
use crate::common::{ConfigError, PolicyError};

/// FIFO Policy state.
#[derive(Debug)]
pub struct FifoPolicy {
    arena: RankArena,
}

impl FifoPolicy {
    /// Creates a new FIFO policy instance.
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

impl ReplacementPolicy for FifoPolicy {
    fn ways(&self) -> usize {
        self.arena.ways()
    }

    fn create_handle(&mut self) -> LineHandle {
        self.arena.create_handle()
    }

    fn release_handle(&mut self, handle: LineHandle) -> Result<(), PolicyError> {
        self.arena.release_handle(handle)
    }

    /// Hits do not change insertion order; the handle is still checked.
    fn touch(&mut self, handle: &LineHandle) -> Result<(), PolicyError> {
        self.arena.rank(handle).map(|_| ())
    }

    fn reset(&mut self, handle: &LineHandle) -> Result<(), PolicyError> {
        rank::move_to_front(self.arena.ranks_mut(handle)?, handle.index());
        Ok(())
    }

    fn invalidate(&mut self, handle: &LineHandle) -> Result<(), PolicyError> {
        rank::move_to_back(self.arena.ranks_mut(handle)?, handle.index());
        Ok(())
    }

    /// Returns the candidate that was filled first.
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
