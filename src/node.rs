//! Recursive van Emde Boas node.
//!
//! A node of width `bits` covers the universe `[0, 2^bits)`. A one-bit node is
//! the base case and holds nothing but its cached extrema. Wider nodes split a
//! key into a high part (cluster index, `upper` bits) and a low part (offset
//! within the cluster, `lower` bits), with `lower = bits / 2` and
//! `upper = bits - lower`. Every operation does constant work and recurses into
//! at most one child of roughly half the width, so it costs `O(log log u)`.
//!
//! The minimum of a non-empty node is cached in `min` and never stored below it.
//! That keeps a singleton node free of recursion and is what lets `insert` into
//! an empty cluster stay constant time.

use std::mem::size_of;

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct Node {
    /// log2 of this node's universe.
    pub(crate) bits: u32,
    /// Cached minimum. Not present in any cluster.
    pub(crate) min: Option<u64>,
    /// Cached maximum. Also stored in its cluster unless it equals `min`.
    pub(crate) max: Option<u64>,
    /// `None` for the one-bit base case.
    pub(crate) branch: Option<Box<Branch>>,
}

/// Split a width into `(lower, upper)` halves, rounding the upper half up.
#[inline]
fn split_bits(bits: u32) -> (u32, u32) {
    let lower_bits = bits / 2;
    (lower_bits, bits - lower_bits)
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct Branch {
    /// Width of the cluster-local part of a key.
    pub(crate) lower_bits: u32,
    /// Holds `i` iff `clusters[i]` is non-empty.
    pub(crate) summary: Node,
    pub(crate) clusters: Box<[Node]>,
}

impl Branch {
    fn new(bits: u32) -> Self {
        debug_assert!(bits >= 2);
        let (lower_bits, upper_bits) = split_bits(bits);
        let clusters = (0..1usize << upper_bits)
            .map(|_| Node::new(lower_bits))
            .collect();
        Self {
            lower_bits,
            summary: Node::new(upper_bits),
            clusters,
        }
    }

    /// Cluster index of `x`.
    #[inline]
    pub(crate) fn high(&self, x: u64) -> u64 {
        x >> self.lower_bits
    }

    /// Offset of `x` inside its cluster.
    #[inline]
    pub(crate) fn low(&self, x: u64) -> u64 {
        x & ((1u64 << self.lower_bits) - 1)
    }

    /// Inverse of `high`/`low`.
    #[inline]
    pub(crate) fn combine(&self, i: u64, k: u64) -> u64 {
        debug_assert!(k < 1u64 << self.lower_bits);
        (i << self.lower_bits) | k
    }

    /// Smallest key held in the clusters.
    #[inline]
    fn first(&self) -> Option<u64> {
        let i = self.summary.min?;
        let k = self.clusters[i as usize].min?;
        Some(self.combine(i, k))
    }

    /// Largest key held in the clusters.
    #[inline]
    fn last(&self) -> Option<u64> {
        let i = self.summary.max?;
        let k = self.clusters[i as usize].max?;
        Some(self.combine(i, k))
    }
}

impl Node {
    /// Build an empty node and, eagerly, its whole subtree.
    pub(crate) fn new(bits: u32) -> Self {
        debug_assert!(bits >= 1);
        Self {
            bits,
            min: None,
            max: None,
            branch: (bits > 1).then(|| Box::new(Branch::new(bits))),
        }
    }

    #[inline]
    pub(crate) fn is_empty(&self) -> bool {
        self.min.is_none()
    }

    /// Number of nodes in a subtree of width `bits`, including its root.
    pub(crate) fn subtree_len(bits: u32) -> usize {
        if bits <= 1 {
            return 1;
        }
        let (lower_bits, upper_bits) = split_bits(bits);
        1 + Node::subtree_len(upper_bits) + (1usize << upper_bits) * Node::subtree_len(lower_bits)
    }

    /// Bytes owned by a subtree of width `bits`, including its root.
    pub(crate) fn subtree_bytes(bits: u32) -> usize {
        if bits <= 1 {
            return size_of::<Node>();
        }
        // The summary's own `Node` is inline in `Branch`.
        let (lower_bits, upper_bits) = split_bits(bits);
        size_of::<Branch>()
            + Node::subtree_bytes(upper_bits)
            + (1usize << upper_bits) * Node::subtree_bytes(lower_bits)
    }

    pub(crate) fn contains(&self, x: u64) -> bool {
        if self.min == Some(x) || self.max == Some(x) {
            return true;
        }
        match &self.branch {
            None => false,
            Some(branch) => {
                let i = branch.high(x);
                branch.clusters[i as usize].contains(branch.low(x))
            }
        }
    }

    /// Add `x`, which must lie in `[0, 2^bits)`. Returns `false` if it was
    /// already present.
    pub(crate) fn insert(&mut self, x: u64) -> bool {
        let (Some(min), Some(max)) = (self.min, self.max) else {
            self.min = Some(x);
            self.max = Some(x);
            return true;
        };
        if x == min || x == max {
            return false;
        }

        // A new minimum takes the cached slot and pushes the old one down.
        let mut x = x;
        if x < min {
            self.min = Some(x);
            x = min;
        }
        if x > max {
            self.max = Some(x);
        }

        let Some(branch) = self.branch.as_deref_mut() else {
            return true;
        };
        let (i, lo) = (branch.high(x), branch.low(x));
        if branch.clusters[i as usize].is_empty() {
            branch.summary.insert(i);
        }
        branch.clusters[i as usize].insert(lo)
    }

    /// Smallest stored key strictly greater than `x`.
    pub(crate) fn successor(&self, x: u64) -> Option<u64> {
        let min = self.min?;
        if x < min {
            return Some(min);
        }
        let max = self.max?;
        if x >= max {
            return None;
        }

        let Some(branch) = self.branch.as_deref() else {
            // One bit: x is 0 and 1 is stored.
            return Some(max);
        };
        let (i, lo) = (branch.high(x), branch.low(x));
        let cluster = &branch.clusters[i as usize];
        if cluster.max.is_some_and(|cluster_max| lo < cluster_max) {
            let k = cluster.successor(lo);
            debug_assert!(k.is_some(), "cluster max above {lo} but no successor");
            return Some(branch.combine(i, k?));
        }

        // x < max, so some later cluster is occupied.
        let next = branch.summary.successor(i)?;
        let k = branch.clusters[next as usize].min?;
        Some(branch.combine(next, k))
    }

    /// Remove `x`, which must be present.
    pub(crate) fn remove(&mut self, x: u64) {
        let (Some(min), Some(max)) = (self.min, self.max) else {
            return;
        };
        debug_assert!(self.contains(x), "removing absent key {x}");
        if min == max {
            self.min = None;
            self.max = None;
            return;
        }

        let Some(branch) = self.branch.as_deref_mut() else {
            let survivor = if x == min { max } else { min };
            self.min = Some(survivor);
            self.max = Some(survivor);
            return;
        };

        // Removing the cached minimum promotes the smallest clustered key,
        // which then has to leave its cluster.
        let mut x = x;
        if x == min {
            let Some(promoted) = branch.first() else {
                self.min = None;
                self.max = None;
                return;
            };
            self.min = Some(promoted);
            x = promoted;
        }

        let (i, lo) = (branch.high(x), branch.low(x));
        let cluster = &mut branch.clusters[i as usize];
        cluster.remove(lo);
        if cluster.is_empty() {
            branch.summary.remove(i);
        }

        if x == max {
            self.max = branch.last().or(self.min);
        }
    }

    /// Empty the subtree, visiting only occupied clusters.
    pub(crate) fn clear(&mut self) {
        if self.is_empty() {
            return;
        }
        self.min = None;
        self.max = None;
        if let Some(branch) = self.branch.as_deref_mut() {
            let mut next = branch.summary.min;
            while let Some(i) = next {
                branch.clusters[i as usize].clear();
                next = branch.summary.successor(i);
            }
            branch.summary.clear();
        }
    }
}
