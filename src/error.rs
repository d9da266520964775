use std::collections::TryReserveError;

/// Errors reported by [`Tree`][crate::Tree] operations.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// A traversal couldn't reserve room for its output.
    #[error("could not reserve room for {requested} keys")]
    ResourceExhausted {
        /// How many keys the traversal needed room for.
        requested: usize,
        /// The allocator's complaint.
        source: TryReserveError,
    },
    /// A key was found on the wrong side of an ancestor.
    #[error("key at depth {depth} is out of order with an ancestor")]
    OutOfOrder {
        /// Depth of the offending node (the root is at depth 0).
        depth: usize,
    },
    /// A node's cached height disagrees with its children.
    #[error("node at depth {depth} caches height {cached} but should have {expected}")]
    StaleHeight {
        /// Depth of the offending node.
        depth: usize,
        /// The height stored in the node.
        cached: usize,
        /// The height computed from its children.
        expected: usize,
    },
    /// A node's subtrees differ in height by more than one.
    #[error("node at depth {depth} has balance factor {factor}")]
    Unbalanced {
        /// Depth of the offending node.
        depth: usize,
        /// Height of the left subtree minus height of the right subtree.
        factor: isize,
    },
    /// The element count disagrees with the number of reachable nodes.
    #[error("tree counts {len} keys but {reachable} nodes are reachable")]
    LenMismatch {
        /// The maintained element count.
        len: usize,
        /// Nodes actually reachable from the root.
        reachable: usize,
    },
}
