//! Cache Replacement Policies.
//!
//! Every policy ranks the ways of each set through a shared rank store and answers two
//! questions: how an access changes that ordering, and which resident way to evict next.
//!
//! # Policies
//!
//! - `LruIpv`: LRU generalised by an insertion/promotion vector.
//! - `Lru`: Least Recently Used.
//! - `Fifo`: First-In, First-Out.
//! - `Random`: Random selection.

/// First-In, First-Out replacement policy.
pub mod fifo;

/// Least Recently Used replacement policy.
pub mod lru;

/// LRU with a configurable insertion/promotion vector.
pub mod lru_ipv;

/// Random replacement policy.
pub mod random;

use std::fmt;

use tracing::{debug, warn};

pub use fifo::FifoPolicy;
pub use lru::LruPolicy;
pub use lru_ipv::LruIpvPolicy;
pub use random::RandomPolicy;

use super::ipv::PromotionVector;
use super::rank::LineHandle;
use crate::common::{ConfigError, PolicyError};
use crate::config::{CacheConfig, ReplacementPolicy as PolicyType};

/// Trait for cache replacement policies.
///
/// The owning cache creates one handle per way when it allocates capacity and then calls
/// exactly one policy operation per access or replacement event. Calls against the same
/// set must be serialized by the caller; different sets never share state.
pub trait ReplacementPolicy: Send + Sync + fmt::Debug {
    /// Associativity the policy was built for.
    fn ways(&self) -> usize;

    /// Creates the handle for the next way, opening a new set after every `ways` handles.
    fn create_handle(&mut self) -> LineHandle;

    /// Gives a way's handle back when the way is deallocated.
    ///
    /// # Errors
    ///
    /// Returns [`PolicyError::UnknownHandle`] if the handle's set was already released.
    fn release_handle(&mut self, handle: LineHandle) -> Result<(), PolicyError>;

    /// Updates the ordering after a hit on the handle's way.
    ///
    /// # Errors
    ///
    /// Returns [`PolicyError::UnknownHandle`] for a handle this policy does not own.
    fn touch(&mut self, handle: &LineHandle) -> Result<(), PolicyError>;

    /// Updates the ordering after a new line has been filled into the handle's way.
    ///
    /// # Errors
    ///
    /// Returns [`PolicyError::UnknownHandle`] for a handle this policy does not own.
    fn reset(&mut self, handle: &LineHandle) -> Result<(), PolicyError>;

    /// Updates the ordering after the handle's line was invalidated outside the hit/fill cycle.
    ///
    /// # Errors
    ///
    /// Returns [`PolicyError::UnknownHandle`] for a handle this policy does not own.
    fn invalidate(&mut self, handle: &LineHandle) -> Result<(), PolicyError>;

    /// Chooses which of `candidates` to evict.
    ///
    /// # Errors
    ///
    /// Returns [`PolicyError::EmptyCandidates`] if `candidates` is empty, or
    /// [`PolicyError::UnknownHandle`] if a candidate is not owned by this policy.
    fn get_victim<'a>(
        &mut self,
        candidates: &[&'a LineHandle],
    ) -> Result<&'a LineHandle, PolicyError>;

    /// Current rank of the handle's way (lower ranks are kept longer).
    ///
    /// # Errors
    ///
    /// Returns [`PolicyError::UnknownHandle`] for a handle this policy does not own.
    fn rank(&self, handle: &LineHandle) -> Result<usize, PolicyError>;
}

/// Builds the replacement policy selected by `config`.
///
/// For [`PolicyType::LruIpv`] without an explicit vector, 16-way caches get
/// [`PromotionVector::tuned_16way`] and every other associativity gets
/// [`PromotionVector::lru`].
///
/// # Errors
///
/// Returns a [`ConfigError`] if the associativity is zero or the vector is invalid.
pub fn build_policy(config: &CacheConfig) -> Result<Box<dyn ReplacementPolicy>, ConfigError> {
    let ways = config.ways;
    if config.ipv.is_some() && config.policy != PolicyType::LruIpv {
        warn!(policy = ?config.policy, "promotion vector ignored by non-IPV policy");
    }
    let policy: Box<dyn ReplacementPolicy> = match config.policy {
        PolicyType::LruIpv => {
            let ipv = match &config.ipv {
                Some(entries) => PromotionVector::new(ways, entries.clone())?,
                None if ways == 16 => PromotionVector::tuned_16way(),
                None => PromotionVector::lru(ways)?,
            };
            Box::new(LruIpvPolicy::new(ipv)?)
        }
        PolicyType::Lru => Box::new(LruPolicy::new(ways)?),
        PolicyType::Fifo => Box::new(FifoPolicy::new(ways)?),
        PolicyType::Random => Box::new(RandomPolicy::new(ways)?),
    };
    debug!(policy = ?config.policy, ways, "built replacement policy");
    Ok(policy)
}
