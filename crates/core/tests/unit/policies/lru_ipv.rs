//! LRU-IPV Policy Tests.
//!
//! Verifies hit promotion, insertion, invalidation, and victim selection against
//! hand-computed rank arrays, plus the long-run drift of ranks under repeated fills.

use pretty_assertions::assert_eq;
use proptest::collection::vec;
use proptest::prelude::*;
use rstest::rstest;

use ipvsim_core::{LruIpvPolicy, PolicyError, PromotionVector, ReplacementPolicy};

use crate::common::{handles, ipv_set, ranks, refs};

/// 4-way vector with hits at rank 3 going to 1, rank 2 going to 1, fills at rank 3.
const IPV4: [usize; 5] = [0, 0, 1, 1, 3];

/// All-zero vector: classic LRU.
const LRU4: [usize; 5] = [0, 0, 0, 0, 0];

// ══════════════════════════════════════════════════════════
// 1. Seeding
// ══════════════════════════════════════════════════════════

/// Handle k of a fresh set starts at rank k.
#[test]
fn fresh_set_is_identity_permutation() {
    let (policy, set) = ipv_set(4, &IPV4);
    assert_eq!(ranks(&policy, &set), vec![0, 1, 2, 3]);
}

// ══════════════════════════════════════════════════════════
// 2. Touch
// ══════════════════════════════════════════════════════════

/// A rank that maps to itself leaves the whole set untouched.
#[rstest]
#[case(0)]
#[case(1)]
#[case(2)]
fn touch_on_fixed_point_is_noop(#[case] way: usize) {
    let (mut policy, set) = ipv_set(4, &[0, 1, 2, 0, 3]);
    policy.touch(&set[way]).unwrap();
    assert_eq!(ranks(&policy, &set), vec![0, 1, 2, 3]);
}

/// Touching the way at rank 3 with IPV[3] = 1 moves it to 1 and demotes ranks 1 and 2.
#[test]
fn touch_promotes_and_demotes_interval() {
    let (mut policy, set) = ipv_set(4, &IPV4);

    policy.touch(&set[3]).unwrap();
    // [1, 3) shifts back by one; way 0 at rank 0 is outside the interval.
    assert_eq!(ranks(&policy, &set), vec![0, 2, 3, 1]);

    // Way 2 is now at rank 3 and follows the same path.
    policy.touch(&set[2]).unwrap();
    assert_eq!(ranks(&policy, &set), vec![0, 3, 1, 2]);
}

/// With the all-zero vector, touches reorder the set exactly like an LRU stack.
#[test]
fn touch_with_zero_vector_is_lru() {
    let (mut policy, set) = ipv_set(4, &LRU4);

    policy.touch(&set[3]).unwrap();
    assert_eq!(ranks(&policy, &set), vec![1, 2, 3, 0]);
    policy.touch(&set[2]).unwrap();
    assert_eq!(ranks(&policy, &set), vec![2, 3, 0, 1]);
    policy.touch(&set[1]).unwrap();
    assert_eq!(ranks(&policy, &set), vec![3, 0, 1, 2]);
}

/// A touched line parked above `ways` is looked up as rank `ways`.
#[test]
fn touch_after_invalidate_uses_insertion_entry() {
    let (mut policy, set) = ipv_set(4, &IPV4);

    policy.invalidate(&set[0]).unwrap();
    assert_eq!(ranks(&policy, &set), vec![5, 1, 2, 3]);

    // IPV[4] = 3: ways in [3, 5) move back, way 0 lands on 3.
    policy.touch(&set[0]).unwrap();
    assert_eq!(ranks(&policy, &set), vec![3, 1, 2, 4]);
}

// ══════════════════════════════════════════════════════════
// 3. Reset
// ══════════════════════════════════════════════════════════

/// Insertion at rank 1 demotes every way at or above 1.
#[test]
fn reset_inserts_at_configured_rank() {
    let (mut policy, set) = ipv_set(4, &[0, 0, 1, 1, 1]);

    policy.reset(&set[3]).unwrap();
    assert_eq!(ranks(&policy, &set), vec![0, 2, 3, 1]);
}

/// Refilling the bottom-ranked way with insertion at `ways - 1` changes nothing else.
#[test]
fn reset_of_victim_at_bottom_insertion() {
    let (mut policy, set) = ipv_set(4, &IPV4);
    policy.touch(&set[3]).unwrap();
    policy.touch(&set[2]).unwrap();
    assert_eq!(ranks(&policy, &set), vec![0, 3, 1, 2]);

    let victim = policy.get_victim(&refs(&set)).unwrap().index();
    assert_eq!(victim, 1);
    policy.reset(&set[victim]).unwrap();
    assert_eq!(ranks(&policy, &set), vec![0, 3, 1, 2]);
}

// ══════════════════════════════════════════════════════════
// 4. Invalidate
// ══════════════════════════════════════════════════════════

/// Invalidation parks the line at `ways + 1` whatever its prior rank, and moves nobody else.
#[rstest]
#[case(0, vec![5, 1, 2, 3])]
#[case(2, vec![0, 1, 5, 3])]
#[case(3, vec![0, 1, 2, 5])]
fn invalidate_sets_sentinel(#[case] way: usize, #[case] expected: Vec<usize>) {
    let (mut policy, set) = ipv_set(4, &IPV4);
    policy.invalidate(&set[way]).unwrap();
    assert_eq!(ranks(&policy, &set), expected);

    policy.invalidate(&set[way]).unwrap();
    assert_eq!(policy.rank(&set[way]).unwrap(), 5);
}

// ══════════════════════════════════════════════════════════
// 5. Victim selection
// ══════════════════════════════════════════════════════════

/// Ranks [3, 0, 1, 2]: the only way at rank 3 is way 0.
#[test]
fn victim_is_way_at_bottom_rank() {
    let (mut policy, set) = ipv_set(4, &LRU4);
    for way in [3, 2, 1] {
        policy.touch(&set[way]).unwrap();
    }
    assert_eq!(ranks(&policy, &set), vec![3, 0, 1, 2]);

    let victim = policy.get_victim(&refs(&set)).unwrap();
    assert!(std::ptr::eq(victim, &set[0]));
    assert_eq!(policy.fallback_victims(), 0);
}

/// No candidate at rank 3: the first candidate in the list is returned.
#[test]
fn victim_falls_back_to_first_candidate() {
    let (mut policy, set) = ipv_set(4, &IPV4);
    for h in &set {
        policy.invalidate(h).unwrap();
    }
    assert_eq!(ranks(&policy, &set), vec![5, 5, 5, 5]);

    let reordered = vec![&set[2], &set[0], &set[3], &set[1]];
    let victim = policy.get_victim(&reordered).unwrap();
    assert_eq!(victim.index(), 2);
    assert_eq!(policy.fallback_victims(), 1);
}

/// Several candidates at the bottom rank: the last one listed wins.
#[test]
fn victim_ties_go_to_last_match() {
    let ipv = PromotionVector::new(4, IPV4.to_vec()).unwrap();
    let mut policy = LruIpvPolicy::new(ipv).unwrap();
    let hs = handles(&mut policy, 8);

    // Way 3 of each set sits at rank 3.
    let candidates = vec![&hs[0], &hs[3], &hs[5], &hs[7]];
    let victim = policy.get_victim(&candidates).unwrap();
    assert!(std::ptr::eq(victim, &hs[7]));

    let candidates = vec![&hs[7], &hs[3], &hs[0]];
    let victim = policy.get_victim(&candidates).unwrap();
    assert!(std::ptr::eq(victim, &hs[3]));
}

/// Victim selection never writes to the rank store.
#[test]
fn victim_selection_is_read_only() {
    let (mut policy, set) = ipv_set(4, &IPV4);
    policy.touch(&set[3]).unwrap();
    let before = ranks(&policy, &set);
    let _ = policy.get_victim(&refs(&set)).unwrap();
    let _ = policy.get_victim(&refs(&set[..2])).unwrap();
    assert_eq!(ranks(&policy, &set), before);
}

/// An empty candidate list is a usage error.
#[test]
fn victim_requires_candidates() {
    let (mut policy, _set) = ipv_set(4, &IPV4);
    assert_eq!(policy.get_victim(&[]), Err(PolicyError::EmptyCandidates));
}

// ══════════════════════════════════════════════════════════
// 6. End-to-end and long-run behaviour
// ══════════════════════════════════════════════════════════

/// Walk the tuned 16-way vector through a touch of the bottom way.
#[test]
fn tuned_16way_touch_of_bottom_way() {
    let mut policy = LruIpvPolicy::new(PromotionVector::tuned_16way()).unwrap();
    let set = handles(&mut policy, 16);

    // IPV[15] = 11: ways 11..=14 move back one, way 15 lands on 11.
    policy.touch(&set[15]).unwrap();
    let mut expected: Vec<usize> = (0..16).collect();
    for (way, rank) in expected.iter_mut().enumerate() {
        if (11..15).contains(&way) {
            *rank += 1;
        }
    }
    expected[15] = 11;
    assert_eq!(ranks(&policy, &set), expected);

    // Way 14 is now at rank 15 and is the victim.
    let victim = policy.get_victim(&refs(&set)).unwrap();
    assert_eq!(victim.index(), 14);
}

/// Ranks are never compacted: refilling a way that is not at the bottom pushes the rest
/// upward until nobody holds rank `ways - 1` and selection falls back.
#[test]
fn repeated_resets_drift_into_fallback() {
    let (mut policy, set) = ipv_set(4, &LRU4);

    policy.reset(&set[0]).unwrap();
    assert_eq!(ranks(&policy, &set), vec![0, 2, 3, 4]);
    assert_eq!(policy.get_victim(&refs(&set)).unwrap().index(), 2);

    policy.reset(&set[0]).unwrap();
    assert_eq!(ranks(&policy, &set), vec![0, 3, 4, 5]);
    assert_eq!(policy.get_victim(&refs(&set)).unwrap().index(), 1);

    policy.reset(&set[0]).unwrap();
    assert_eq!(ranks(&policy, &set), vec![0, 4, 5, 6]);
    assert_eq!(policy.fallback_victims(), 0);

    // Fallback picks way 0, the line that was just filled.
    assert_eq!(policy.get_victim(&refs(&set)).unwrap().index(), 0);
    assert_eq!(policy.fallback_victims(), 1);

    for _ in 0..100 {
        policy.reset(&set[0]).unwrap();
        let _ = policy.get_victim(&refs(&set)).unwrap();
    }
    assert_eq!(policy.fallback_victims(), 101);
    assert_eq!(ranks(&policy, &set), vec![0, 104, 105, 106]);
}

/// Inserting at rank `ways` leaves rank `ways - 1` empty after the first refill.
#[test]
fn insertion_at_ways_empties_bottom_rank() {
    let (mut policy, set) = ipv_set(2, &[0, 0, 2]);
    let victim = policy.get_victim(&refs(&set)).unwrap().index();
    assert_eq!(victim, 1);

    policy.reset(&set[victim]).unwrap();
    assert_eq!(ranks(&policy, &set), vec![0, 2]);
    assert_eq!(policy.get_victim(&refs(&set)).unwrap().index(), 0);
    assert_eq!(policy.fallback_victims(), 1);
}

/// Operations on one set never disturb another.
#[test]
fn sets_are_independent() {
    let ipv = PromotionVector::new(4, IPV4.to_vec()).unwrap();
    let mut policy = LruIpvPolicy::new(ipv).unwrap();
    let hs = handles(&mut policy, 8);
    let (first, second) = hs.split_at(4);

    policy.touch(&first[3]).unwrap();
    policy.reset(&first[0]).unwrap();
    policy.invalidate(&first[1]).unwrap();

    assert_eq!(ranks(&policy, second), vec![0, 1, 2, 3]);
}

fn valid_ipv(max_ways: usize, insert_below_ways: bool) -> impl Strategy<Value = (usize, Vec<usize>)> {
    (1..=max_ways).prop_flat_map(move |ways| {
        let mut entries: Vec<std::ops::RangeInclusive<usize>> = (0..ways).map(|i| 0..=i).collect();
        let last = if insert_below_ways { ways - 1 } else { ways };
        entries.push(0..=last);
        (Just(ways), entries)
    })
}

fn assert_permutation(mut ranks: Vec<usize>) {
    let ways = ranks.len();
    ranks.sort_unstable();
    assert_eq!(ranks, (0..ways).collect::<Vec<_>>());
}

proptest! {
    /// Touches alone keep the set a permutation of `0..ways`.
    #[test]
    fn touches_preserve_permutation(
        (ways, entries) in valid_ipv(8, false),
        picks in vec(any::<usize>(), 0..64),
    ) {
        let (mut policy, set) = ipv_set(ways, &entries);
        for pick in picks {
            policy.touch(&set[pick % ways]).unwrap();
        }
        assert_permutation(ranks(&policy, &set));
    }

    /// Victim-refill cycles mixed with hits keep the permutation while fills land below `ways`.
    #[test]
    fn refilling_victims_preserves_permutation(
        (ways, entries) in valid_ipv(8, true),
        script in vec((any::<bool>(), any::<usize>()), 0..64),
    ) {
        let (mut policy, set) = ipv_set(ways, &entries);
        for (miss, pick) in script {
            if miss {
                let victim = policy.get_victim(&refs(&set)).unwrap().index();
                policy.reset(&set[victim]).unwrap();
            } else {
                policy.touch(&set[pick % ways]).unwrap();
            }
        }
        assert_permutation(ranks(&policy, &set));
        prop_assert_eq!(policy.fallback_victims(), 0);
    }
}
