//! Shared test infrastructure.
//!
//! Builders for policies with one fully-populated set, and helpers that read a set's
//! ranks back in way order.

use ipvsim_core::{LineHandle, LruIpvPolicy, PromotionVector, ReplacementPolicy};

/// Builds an LRU-IPV policy from `entries` and creates one full set of handles.
pub fn ipv_set(ways: usize, entries: &[usize]) -> (LruIpvPolicy, Vec<LineHandle>) {
    let ipv = PromotionVector::new(ways, entries.to_vec()).unwrap();
    let mut policy = LruIpvPolicy::new(ipv).unwrap();
    let handles = (0..ways).map(|_| policy.create_handle()).collect();
    (policy, handles)
}

/// Creates `count` handles on any policy.
pub fn handles(policy: &mut dyn ReplacementPolicy, count: usize) -> Vec<LineHandle> {
    (0..count).map(|_| policy.create_handle()).collect()
}

/// Ranks of `handles`, in order.
pub fn ranks(policy: &dyn ReplacementPolicy, handles: &[LineHandle]) -> Vec<usize> {
    handles.iter().map(|h| policy.rank(h).unwrap()).collect()
}

/// Borrowed candidate list over `handles`.
pub fn refs(handles: &[LineHandle]) -> Vec<&LineHandle> {
    handles.iter().collect()
}
