//! Error definitions.
//!
//! Two classes of failure exist and neither is retryable:
//! 1. **Configuration errors:** A promotion vector or cache geometry that cannot describe a
//!    valid policy. These are reported when the policy or cache is constructed.
//! 2. **Usage errors:** A caller broke the handle contract (a handle whose group was released,
//!    an index outside its rank store, or an empty candidate list).

use thiserror::Error;

/// Errors raised while building a policy, a promotion vector, or a cache.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Associativity must be at least one way.
    #[error("associativity must be at least 1 way")]
    ZeroWays,

    /// Associativity is too large for `ways + 1` table entries to be addressable.
    #[error("associativity {ways} is too large")]
    WaysOverflow {
        /// Associativity that was supplied.
        ways: usize,
    },

    /// The promotion vector must hold exactly `ways + 1` entries.
    #[error("promotion vector has {actual} entries, expected {expected} (ways + 1)")]
    IpvLength {
        /// Required length (`ways + 1`).
        expected: usize,
        /// Length that was supplied.
        actual: usize,
    },

    /// An entry points past the last legal rank.
    #[error("promotion vector entry {index} is {value}, outside 0..={max}")]
    IpvOutOfRange {
        /// Position of the offending entry.
        index: usize,
        /// Value found at that position.
        value: usize,
        /// Largest legal value (`ways`).
        max: usize,
    },

    /// An entry would move a line to a rank further from rank 0 than the one it holds.
    #[error("promotion vector entry {index} is {value}; hits may not demote (entry must be <= index)")]
    IpvPromotesAway {
        /// Position of the offending entry.
        index: usize,
        /// Value found at that position.
        value: usize,
    },

    /// Cache size, line size, and associativity do not describe a whole number of sets.
    #[error("invalid cache geometry: {0}")]
    Geometry(String),

    /// The configuration document could not be parsed.
    #[error("invalid configuration JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Errors raised when a replacement policy is driven outside its contract.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PolicyError {
    /// The handle does not refer to a live slot of any rank store owned by this policy.
    #[error("line handle (group {group}, index {index}) does not belong to a live rank store")]
    UnknownHandle {
        /// Group the handle claims to belong to.
        group: usize,
        /// Way index within that group.
        index: usize,
    },

    /// The set index is past the last set of the cache.
    #[error("set {set} out of range for a cache with {sets} sets")]
    UnknownSet {
        /// Requested set.
        set: usize,
        /// Number of sets in the cache.
        sets: usize,
    },

    /// Victim selection needs at least one candidate.
    #[error("victim selection called with an empty candidate list")]
    EmptyCandidates,
}
