//! # veb-rs
//!
//! An ordered set of integers over a fixed universe `[0, u)`, backed by a van
//! Emde Boas tree.
//!
//! Insert, remove, membership and successor all run in `O(log log u)`
//! regardless of how many keys are stored. The whole tree is allocated up front,
//! so construction and memory are `Θ(u)`.
//!
//! ## Example
//!
//! ```rust
//! use veb_rs::VebTree;
//!
//! let mut set = VebTree::new(16)?;
//! for key in [2, 3, 4, 5] {
//!     set.insert(key)?;
//! }
//!
//! assert_eq!(set.successor(1), Some(2));
//! assert_eq!(set.successor(2), Some(3));
//! assert_eq!(set.successor(5), None);
//!
//! set.remove(2)?;
//! assert_eq!(set.successor(1), Some(3));
//! assert_eq!(set.iter().collect::<Vec<_>>(), vec![3, 4, 5]);
//! # Ok::<(), veb_rs::VebError>(())
//! ```

#![forbid(unsafe_code)]

mod error;
mod node;

use std::fmt;
use std::iter::FusedIterator;
use std::ops::{Bound, RangeBounds};

pub use error::VebError;
use node::Node;

// =============================================================================
// Configuration
// =============================================================================

/// Smallest supported universe, as a power of two (`u = 2`).
pub const MIN_UNIVERSE_BITS: u32 = 1;
/// Largest supported universe, as a power of two. A tree of this width holds
/// roughly 22M nodes.
pub const MAX_UNIVERSE_BITS: u32 = 24;

// =============================================================================
// VebTree
// =============================================================================

/// Ordered set of `u64` keys drawn from `[0, universe)`.
///
/// A universe that is not a power of two is backed by the next power of two;
/// keys are still checked against the requested size.
#[derive(Clone, PartialEq, Eq)]
pub struct VebTree {
    root: Node,
    universe: u64,
    len: usize,
}

impl VebTree {
    /// Build an empty set over `[0, universe)`.
    ///
    /// Fails if `universe` is below 2 or above `2^MAX_UNIVERSE_BITS`.
    pub fn new(universe: u64) -> Result<Self, VebError> {
        if universe < 1u64 << MIN_UNIVERSE_BITS {
            return Err(VebError::UniverseTooSmall(universe));
        }
        let max = 1u64 << MAX_UNIVERSE_BITS;
        if universe > max {
            return Err(VebError::UniverseTooLarge {
                requested: universe,
                max,
            });
        }

        let bits = universe.next_power_of_two().trailing_zeros();
        let root = Node::new(bits);
        tracing::debug!(
            universe,
            bits,
            nodes = Node::subtree_len(bits),
            "built van Emde Boas tree"
        );
        Ok(Self {
            root,
            universe,
            len: 0,
        })
    }

    /// Build an empty set over `[0, 2^bits)`.
    pub fn with_bits(bits: u32) -> Result<Self, VebError> {
        match 1u64.checked_shl(bits) {
            Some(universe) => Self::new(universe),
            None => Err(VebError::UniverseTooLarge {
                requested: u64::MAX,
                max: 1u64 << MAX_UNIVERSE_BITS,
            }),
        }
    }

    /// Size of the key range this set was built for.
    #[inline]
    pub fn universe(&self) -> u64 {
        self.universe
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[inline]
    pub fn min(&self) -> Option<u64> {
        self.root.min
    }

    #[inline]
    pub fn max(&self) -> Option<u64> {
        self.root.max
    }

    /// Bytes held by the node tree. Fixed for the lifetime of the set.
    pub fn memory_usage(&self) -> usize {
        Node::subtree_bytes(self.root.bits)
    }

    /// Whether `key` is stored. Keys outside the universe never are.
    pub fn contains(&self, key: u64) -> bool {
        key < self.universe && self.root.contains(key)
    }

    /// Add `key`. Returns `Ok(false)` if it was already present.
    pub fn insert(&mut self, key: u64) -> Result<bool, VebError> {
        self.check_key(key)?;
        let added = self.root.insert(key);
        if added {
            self.len += 1;
        }
        Ok(added)
    }

    /// Remove `key`. Returns `Ok(false)` if it was not present.
    pub fn remove(&mut self, key: u64) -> Result<bool, VebError> {
        self.check_key(key)?;
        if !self.root.contains(key) {
            tracing::trace!(key, "remove of absent key ignored");
            return Ok(false);
        }
        self.root.remove(key);
        self.len -= 1;
        Ok(true)
    }

    /// Smallest stored key strictly greater than `key`.
    ///
    /// Any `key` is accepted; nothing lies above the universe.
    pub fn successor(&self, key: u64) -> Option<u64> {
        self.root.successor(key)
    }

    pub fn clear(&mut self) {
        self.root.clear();
        self.len = 0;
    }

    /// Keys in ascending order.
    pub fn iter(&self) -> Iter<'_> {
        Iter {
            tree: self,
            next: self.root.min,
            remaining: self.len,
        }
    }

    /// Keys inside `range`, in ascending order.
    pub fn range<R: RangeBounds<u64>>(&self, range: R) -> Range<'_> {
        let next = match range.start_bound() {
            Bound::Included(&start) if self.contains(start) => Some(start),
            Bound::Included(&start) | Bound::Excluded(&start) => self.successor(start),
            Bound::Unbounded => self.root.min,
        };
        Range {
            tree: self,
            next,
            end: range.end_bound().cloned(),
        }
    }

    fn check_key(&self, key: u64) -> Result<(), VebError> {
        if key >= self.universe {
            tracing::trace!(key, universe = self.universe, "rejected out-of-range key");
            return Err(VebError::KeyOutOfRange {
                key,
                universe: self.universe,
            });
        }
        Ok(())
    }
}

impl fmt::Debug for VebTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

impl<'a> IntoIterator for &'a VebTree {
    type Item = u64;
    type IntoIter = Iter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

// =============================================================================
// Iterators
// =============================================================================

/// Ascending iterator over a [`VebTree`], one successor query per step.
pub struct Iter<'a> {
    tree: &'a VebTree,
    next: Option<u64>,
    remaining: usize,
}

impl Iterator for Iter<'_> {
    type Item = u64;

    fn next(&mut self) -> Option<u64> {
        let key = self.next?;
        self.next = self.tree.successor(key);
        self.remaining -= 1;
        Some(key)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl ExactSizeIterator for Iter<'_> {}

impl FusedIterator for Iter<'_> {}

/// Ascending iterator over the keys of a [`VebTree`] inside a range.
pub struct Range<'a> {
    tree: &'a VebTree,
    next: Option<u64>,
    end: Bound<u64>,
}

impl Iterator for Range<'_> {
    type Item = u64;

    fn next(&mut self) -> Option<u64> {
        let key = self.next?;
        let in_range = match self.end {
            Bound::Included(end) => key <= end,
            Bound::Excluded(end) => key < end,
            Bound::Unbounded => true,
        };
        if !in_range {
            self.next = None;
            return None;
        }
        self.next = self.tree.successor(key);
        Some(key)
    }
}

impl FusedIterator for Range<'_> {}
