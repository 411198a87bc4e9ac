//! Random Replacement Policy.
//!
//! This policy evicts a random candidate. It uses a xorshift generator to produce
//! pseudo-random numbers, avoiding the overhead of a complex RNG. The rank store is only
//! used to hand out and validate handles.

use super::ReplacementPolicy;
use crate::cache::rank::{LineHandle, RankArena};
use crate::common::{ConfigError, PolicyError};

/// Seed used when none is supplied.
const DEFAULT_SEED: u64 = 123456789;

/// Random Policy state.
#[derive(Debug)]
pub struct RandomPolicy {
    arena: RankArena,
    /// Internal state for the pseudo-random number generator.
    state: u64,
}

impl RandomPolicy {
    /// Creates a new Random policy instance with the default seed.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ZeroWays`] if `ways` is zero.
    pub fn new(ways: usize) -> Result<Self, ConfigError> {
        Self::with_seed(ways, DEFAULT_SEED)
    }

    /// Creates a new Random policy instance with an explicit seed.
    ///
    /// A zero seed would lock xorshift at zero and is replaced by the default.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ZeroWays`] if `ways` is zero.
    pub fn with_seed(ways: usize, seed: u64) -> Result<Self, ConfigError> {
        Ok(Self {
            arena: RankArena::new(ways)?,
            state: if seed == 0 { DEFAULT_SEED } else { seed },
        })
    }

    fn next(&mut self) -> u64 {
        let mut x = self.state;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.state = x;
        x
    }
}

impl ReplacementPolicy for RandomPolicy {
    fn ways(&self) -> usize {
        self.arena.ways()
    }

    fn create_handle(&mut self) -> LineHandle {
        self.arena.create_handle()
    }

    fn release_handle(&mut self, handle: LineHandle) -> Result<(), PolicyError> {
        self.arena.release_handle(handle)
    }

    fn touch(&mut self, handle: &LineHandle) -> Result<(), PolicyError> {
        self.arena.rank(handle).map(|_| ())
    }

    fn reset(&mut self, handle: &LineHandle) -> Result<(), PolicyError> {
        self.arena.rank(handle).map(|_| ())
    }

    fn invalidate(&mut self, handle: &LineHandle) -> Result<(), PolicyError> {
        self.arena.rank(handle).map(|_| ())
    }

    /// Maps the next pseudo-random number onto the candidate list.
    fn get_victim<'a>(
        &mut self,
        candidates: &[&'a LineHandle],
    ) -> Result<&'a LineHandle, PolicyError> {
        if candidates.is_empty() {
            return Err(PolicyError::EmptyCandidates);
        }
        for candidate in candidates {
            let _ = self.arena.rank(candidate)?;
        }
        let pos = (self.next() % candidates.len() as u64) as usize;
        Ok(candidates[pos])
    }

    fn rank(&self, handle: &LineHandle) -> Result<usize, PolicyError> {
        self.arena.rank(handle)
    }
}
