//! LRU with an Insertion/Promotion Vector (LRU-IPV).
//!
//! Each set keeps a rank per way, seeded `0..W`. Instead of always moving a touched line to
//! rank 0 as LRU does, the destination of a hit and the position of a newly filled line are
//! read from a [`PromotionVector`]:
//!
//! - **Hit:** a line at rank `p` moves to `c = IPV[p]`; every way ranked in `[c, p)` slides
//!   back by one to make room.
//! - **Fill:** the new line takes rank `IPV[W]`; every way ranked at or above it slides back.
//! - **Invalidate:** the line is parked at rank `W + 1`, outside the live ordering.
//! - **Victim:** the candidate ranked exactly `W - 1`. If several match the last one wins;
//!   if none does the first candidate is returned.
//!
//! Ranks are never compacted. A long run of fills that do not replace the bottom-ranked way
//! can leave no way at `W - 1`, at which point victim selection degrades to the fallback;
//! [`LruIpvPolicy::fallback_victims`] counts how often that happens.
//!
//! # Performance
//!
//! - **Time Complexity:**
//!   - `touch()` / `reset()`: O(W)
//!   - `invalidate()`: O(1)
//!   - `get_victim()`: O(C) where C is the number of candidates
//! - **Space Complexity:** O(S × W) where S is the number of sets

use tracing::trace;

use super::ReplacementPolicy;
use crate::cache::ipv::PromotionVector;
use crate::cache::rank::{LineHandle, RankArena};
use crate::common::{ConfigError, PolicyError};

/// LRU-IPV policy state.
#[derive(Debug)]
pub struct LruIpvPolicy {
    ipv: PromotionVector,
    arena: RankArena,
    fallbacks: u64,
}

impl LruIpvPolicy {
    /// Creates a policy driven by `ipv`; associativity is taken from the vector.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ZeroWays`] if the vector describes zero ways.
    pub fn new(ipv: PromotionVector) -> Result<Self, ConfigError> {
        let arena = RankArena::new(ipv.ways())?;
        Ok(Self {
            ipv,
            arena,
            fallbacks: 0,
        })
    }

    /// The promotion vector this policy was built with.
    pub const fn ipv(&self) -> &PromotionVector {
        &self.ipv
    }

    /// Rank store arena, for inspecting whole sets.
    pub const fn arena(&self) -> &RankArena {
        &self.arena
    }

    /// Number of victim selections that found no candidate at rank `W - 1`.
    pub const fn fallback_victims(&self) -> u64 {
        self.fallbacks
    }
}

impl ReplacementPolicy for LruIpvPolicy {
    fn ways(&self) -> usize {
        self.arena.ways()
    }

    fn create_handle(&mut self) -> LineHandle {
        self.arena.create_handle()
    }

    fn release_handle(&mut self, handle: LineHandle) -> Result<(), PolicyError> {
        self.arena.release_handle(handle)
    }

    /// Moves the line to `IPV[rank]`, demoting every way in `[IPV[rank], rank)` by one.
    fn touch(&mut self, handle: &LineHandle) -> Result<(), PolicyError> {
        let ranks = self.arena.ranks_mut(handle)?;
        let previous = ranks[handle.index()];
        let target = self.ipv.target(previous);

        if target != previous {
            for rank in ranks.iter_mut() {
                if *rank >= target && *rank < previous {
                    *rank += 1;
                }
            }
        }
        ranks[handle.index()] = target;
        Ok(())
    }

    /// Inserts the line at `IPV[W]`, demoting every way at or above that rank by one.
    fn reset(&mut self, handle: &LineHandle) -> Result<(), PolicyError> {
        let insert = self.ipv.insertion_rank();
        let ranks = self.arena.ranks_mut(handle)?;
        for rank in ranks.iter_mut() {
            if *rank >= insert {
                *rank += 1;
            }
        }
        ranks[handle.index()] = insert;
        Ok(())
    }

    /// Parks the line at rank `W + 1`; no other way moves.
    fn invalidate(&mut self, handle: &LineHandle) -> Result<(), PolicyError> {
        let parked = self.arena.ways() + 1;
        let ranks = self.arena.ranks_mut(handle)?;
        ranks[handle.index()] = parked;
        Ok(())
    }

    fn get_victim<'a>(
        &mut self,
        candidates: &[&'a LineHandle],
    ) -> Result<&'a LineHandle, PolicyError> {
        let first = *candidates.first().ok_or(PolicyError::EmptyCandidates)?;
        let bottom = self.arena.ways() - 1;

        let mut victim = None;
        for &candidate in candidates {
            if self.arena.rank(candidate)? == bottom {
                victim = Some(candidate);
            }
        }

        if let Some(victim) = victim {
            return Ok(victim);
        }
        self.fallbacks += 1;
        trace!(
            group = %first.group(),
            candidates = candidates.len(),
            "no candidate at bottom rank, evicting first candidate"
        );
        Ok(first)
    }

    fn rank(&self, handle: &LineHandle) -> Result<usize, PolicyError> {
        self.arena.rank(handle)
    }
}
