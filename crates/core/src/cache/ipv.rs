//! Insertion/Promotion Vector (IPV).
//!
//! An IPV for a `W`-way set holds `W + 1` ranks. Entry `r` (for `r < W`) is the rank a line
//! moves to when it hits while holding rank `r`; entry `W` is the rank a freshly filled line
//! is inserted at. Classic LRU is the all-zero vector; anything between LRU and the
//! bimodal/RRIP family can be expressed by choosing other entries.
//!
//! A vector is only accepted if every entry lies in `0..=W` and no entry exceeds its own
//! index, so a hit never pushes a line further from rank 0.

use crate::common::ConfigError;

/// The 16-way vector the policy has historically been tuned with.
const TUNED_16WAY: [usize; 17] = [0, 0, 1, 0, 3, 0, 1, 0, 1, 7, 5, 1, 0, 0, 1, 11, 14];

/// Number of entries a vector for `ways`-way sets must hold.
fn table_len(ways: usize) -> Result<usize, ConfigError> {
    if ways == 0 {
        return Err(ConfigError::ZeroWays);
    }
    ways.checked_add(1).ok_or(ConfigError::WaysOverflow { ways })
}

/// Validated, immutable promotion table for one policy instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromotionVector {
    entries: Vec<usize>,
}

impl PromotionVector {
    /// Validates `entries` as a promotion vector for `ways`-way sets.
    ///
    /// # Errors
    ///
    /// - [`ConfigError::ZeroWays`] if `ways` is zero.
    /// - [`ConfigError::WaysOverflow`] if `ways + 1` does not fit in `usize`.
    /// - [`ConfigError::IpvLength`] if `entries.len() != ways + 1`.
    /// - [`ConfigError::IpvOutOfRange`] if an entry exceeds `ways`.
    /// - [`ConfigError::IpvPromotesAway`] if an entry exceeds its own index.
    pub fn new(ways: usize, entries: Vec<usize>) -> Result<Self, ConfigError> {
        let expected = table_len(ways)?;
        if entries.len() != expected {
            return Err(ConfigError::IpvLength {
                expected,
                actual: entries.len(),
            });
        }
        for (index, &value) in entries.iter().enumerate() {
            if value > ways {
                return Err(ConfigError::IpvOutOfRange {
                    index,
                    value,
                    max: ways,
                });
            }
            if value > index {
                return Err(ConfigError::IpvPromotesAway { index, value });
            }
        }
        Ok(Self { entries })
    }

    /// LRU expressed as a vector: every hit and every fill go to rank 0.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ZeroWays`] if `ways` is zero, or
    /// [`ConfigError::WaysOverflow`] if `ways + 1` does not fit in `usize`.
    pub fn lru(ways: usize) -> Result<Self, ConfigError> {
        Self::new(ways, vec![0; table_len(ways)?])
    }

    /// LRU-insertion: hits go to rank 0, fills land at the bottom rank `ways - 1`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ZeroWays`] if `ways` is zero, or
    /// [`ConfigError::WaysOverflow`] if `ways + 1` does not fit in `usize`.
    pub fn lip(ways: usize) -> Result<Self, ConfigError> {
        let mut entries = vec![0; table_len(ways)?];
        entries[ways] = ways - 1;
        Self::new(ways, entries)
    }

    /// The tuned 16-way vector (insertion at rank 14).
    pub fn tuned_16way() -> Self {
        Self {
            entries: TUNED_16WAY.to_vec(),
        }
    }

    /// Number of ways this vector was validated for.
    #[inline]
    pub fn ways(&self) -> usize {
        self.entries.len() - 1
    }

    /// Rank a freshly filled line is inserted at (`IPV[ways]`).
    #[inline]
    pub fn insertion_rank(&self) -> usize {
        self.entries[self.ways()]
    }

    /// Rank a line moves to on a hit while holding `rank`.
    ///
    /// Ranks above `ways` only occur after drift or invalidation; they are looked up as
    /// rank `ways`.
    #[inline]
    pub fn target(&self, rank: usize) -> usize {
        self.entries[rank.min(self.ways())]
    }

    /// Raw table, `ways + 1` entries long.
    pub fn entries(&self) -> &[usize] {
        &self.entries
    }
}
