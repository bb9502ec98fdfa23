use thiserror::Error;

/// Errors reported at the [`VebTree`](crate::VebTree) boundary.
///
/// A missing successor is not an error; it is `None`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum VebError {
    /// Key does not lie in `[0, universe)`.
    #[error("key {key} out of range for universe of size {universe}")]
    KeyOutOfRange {
        /// Key that was rejected.
        key: u64,
        /// Universe size of the tree.
        universe: u64,
    },

    /// Requested universe cannot hold two distinct keys.
    #[error("universe size {0} is too small (minimum is 2)")]
    UniverseTooSmall(u64),

    /// Requested universe exceeds what eager construction supports.
    #[error("universe size {requested} exceeds the supported maximum {max}")]
    UniverseTooLarge {
        /// Universe size that was asked for.
        requested: u64,
        /// Largest accepted universe size.
        max: u64,
    },
}
