//! This crate exposes an AVL tree: a Binary Search Tree (BST) that keeps itself balanced so every
//! operation stays logarithmic no matter the order keys arrive in.
//!
//! ## Binary Search Tree
//!
//! A Binary Search Tree is a data structure supporting operations to
//! insert, find, and delete stored records. BSTs are typically defined
//! recursively using the notion of a `Node`. A `Node` will typically store
//! some sort of value (the value that was inserted, for example) and will
//! sometimes have child `Node`s. The most important invariants of a BST are:
//!
//! 1. For every `Node` in a BST, all the `Node`s in its left subtree have a
//!    value less than its own value.
//! 2. For every `Node` in a BST, all the `Node`s in its right subtree have a
//!    value greater than its own value.
//!
//! > Note that some `Node`s have no children. These `Node`s are called "leaf nodes".
//!
//! Searching for values in the tree takes `O(height)` (where `height` is defined as the longest
//! path from the root `Node` to a leaf `Node`). BSTs also naturally support sorted iteration by
//! visiting the left subtree, then the subtree root, then the right subtree.
//!
//! ## AVL Tree
//!
//! An AVL tree adds a third invariant: for every `Node`, the heights of its two subtrees differ
//! by at most one. Inserts and removals that break this repair it on the way back up with
//! rotations, which keeps the height at `O(lg N)`. See [`tree::Tree`].
//!
//! How heights are counted is configurable through [`Config`]. The conventional
//! [`HeightRule::Counted`] is the default. [`HeightRule::Flat`] never grows heights past zero, so
//! nothing is ever rebalanced and the tree acts as a plain BST.

#![deny(missing_docs, clippy::clone_on_ref_ptr)]

mod config;
mod error;
pub mod tree;
pub(crate) mod util;

#[cfg(test)]
mod test;

pub use config::{Config, HeightRule};
pub use error::Error;
pub use tree::{Order, Tree};
