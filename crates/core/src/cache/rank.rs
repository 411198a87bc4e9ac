//! Per-set rank storage and line handles.
//!
//! Every cache set owns one rank store: `ways` integers, one per way, giving that way's
//! position in the set's eviction ordering. The stores live in a [`RankArena`] owned by the
//! policy; a [`LineHandle`] carries only the group it belongs to and its way index, so many
//! handles can refer to one store without aliasing it.
//!
//! Handles are handed out in groups of `ways`. The first handle of a group allocates a
//! fresh store seeded with `0, 1, ..., ways - 1`; the following handles join that store at
//! the next unused index. Once `ways` handles have been produced a new group begins.

use std::fmt;

use tracing::debug;

use crate::common::{ConfigError, PolicyError};

/// Identifier of one rank store (one cache set) inside a [`RankArena`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GroupId(usize);

impl GroupId {
    /// Returns the arena slot this group occupies.
    #[inline]
    pub const fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for GroupId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Token binding one cache way to its slot in a rank store.
///
/// A handle exclusively identifies its way, so it is deliberately neither `Clone` nor
/// `Copy`. It is given back to the policy with `release_handle` when the way is
/// deallocated.
#[derive(Debug, PartialEq, Eq, Hash)]
pub struct LineHandle {
    group: GroupId,
    index: usize,
}

impl LineHandle {
    /// Returns the group (rank store) this handle belongs to.
    #[inline]
    pub const fn group(&self) -> GroupId {
        self.group
    }

    /// Returns the way index of this handle within its rank store.
    #[inline]
    pub const fn index(&self) -> usize {
        self.index
    }

    fn unknown(&self) -> PolicyError {
        PolicyError::UnknownHandle {
            group: self.group.0,
            index: self.index,
        }
    }
}

/// One rank store and the number of handles still bound to it.
#[derive(Debug)]
struct RankGroup {
    ranks: Vec<usize>,
    live: usize,
}

/// Arena of rank stores, one per group of `ways` handles.
#[derive(Debug)]
pub struct RankArena {
    ways: usize,
    groups: Vec<Option<RankGroup>>,
    /// Index the next handle of the newest group receives; `ways` means the group is full.
    next_index: usize,
}

impl RankArena {
    /// Creates an empty arena for sets of `ways` ways.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ZeroWays`] if `ways` is zero.
    pub fn new(ways: usize) -> Result<Self, ConfigError> {
        if ways == 0 {
            return Err(ConfigError::ZeroWays);
        }
        Ok(Self {
            ways,
            groups: Vec::new(),
            next_index: ways,
        })
    }

    /// Returns the associativity every store in this arena is sized for.
    #[inline]
    pub const fn ways(&self) -> usize {
        self.ways
    }

    /// Returns the number of rank stores that still have at least one live handle.
    pub fn live_groups(&self) -> usize {
        self.groups.iter().filter(|g| g.is_some()).count()
    }

    /// Produces the next handle, opening a new rank store when the current one is full.
    pub fn create_handle(&mut self) -> LineHandle {
        let joinable = self.next_index < self.ways && matches!(self.groups.last(), Some(Some(_)));
        if !joinable {
            self.groups.push(Some(RankGroup {
                ranks: (0..self.ways).collect(),
                live: 0,
            }));
            self.next_index = 0;
            debug!(
                group = self.groups.len() - 1,
                ways = self.ways,
                "allocated rank store"
            );
        }

        let group = self.groups.len() - 1;
        if let Some(Some(g)) = self.groups.last_mut() {
            g.live += 1;
        }
        let handle = LineHandle {
            group: GroupId(group),
            index: self.next_index,
        };
        self.next_index += 1;
        handle
    }

    /// Gives a handle back; the store is dropped once its last handle is released.
    ///
    /// # Errors
    ///
    /// Returns [`PolicyError::UnknownHandle`] if the handle's store no longer exists.
    pub fn release_handle(&mut self, handle: LineHandle) -> Result<(), PolicyError> {
        let slot = self
            .groups
            .get_mut(handle.group.0)
            .ok_or_else(|| handle.unknown())?;
        let group = slot.as_mut().ok_or_else(|| handle.unknown())?;
        group.live = group.live.saturating_sub(1);
        if group.live == 0 {
            *slot = None;
            debug!(group = handle.group.0, "released rank store");
        }
        Ok(())
    }

    /// Returns the whole rank store the handle belongs to.
    ///
    /// # Errors
    ///
    /// Returns [`PolicyError::UnknownHandle`] if the store was released or the index is out
    /// of bounds.
    pub fn ranks(&self, handle: &LineHandle) -> Result<&[usize], PolicyError> {
        match self.groups.get(handle.group.0) {
            Some(Some(g)) if handle.index < g.ranks.len() => Ok(&g.ranks),
            _ => Err(handle.unknown()),
        }
    }

    /// Mutable counterpart of [`RankArena::ranks`].
    ///
    /// # Errors
    ///
    /// Same conditions as [`RankArena::ranks`].
    pub fn ranks_mut(&mut self, handle: &LineHandle) -> Result<&mut [usize], PolicyError> {
        match self.groups.get_mut(handle.group.0) {
            Some(Some(g)) if handle.index < g.ranks.len() => Ok(&mut g.ranks),
            _ => Err(handle.unknown()),
        }
    }

    /// Returns the current rank of the handle's way.
    ///
    /// # Errors
    ///
    /// Same conditions as [`RankArena::ranks`].
    pub fn rank(&self, handle: &LineHandle) -> Result<usize, PolicyError> {
        self.ranks(handle).map(|ranks| ranks[handle.index])
    }
}

/// Moves `index` to rank 0, shifting every way that was ahead of it back by one.
///
/// Keeps a permutation a permutation.
pub(crate) fn move_to_front(ranks: &mut [usize], index: usize) {
    let previous = ranks[index];
    for rank in ranks.iter_mut() {
        if *rank < previous {
            *rank += 1;
        }
    }
    ranks[index] = 0;
}

/// Moves `index` to the last rank, pulling every way that was behind it forward by one.
pub(crate) fn move_to_back(ranks: &mut [usize], index: usize) {
    let previous = ranks[index];
    let last = ranks.len() - 1;
    for rank in ranks.iter_mut() {
        if *rank > previous {
            *rank -= 1;
        }
    }
    ranks[index] = last;
}

/// Position of the candidate holding the highest rank; the first one wins a tie.
pub(crate) fn oldest(arena: &RankArena, candidates: &[&LineHandle]) -> Result<usize, PolicyError> {
    let mut best: Option<(usize, usize)> = None;
    for (pos, handle) in candidates.iter().enumerate() {
        let rank = arena.rank(handle)?;
        if best.is_none_or(|(_, r)| rank > r) {
            best = Some((pos, rank));
        }
    }
    best.map(|(pos, _)| pos).ok_or(PolicyError::EmptyCandidates)
}
