//! Construction-time settings for a [`Tree`][crate::Tree].

/// How a node's cached height is derived from its children.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum HeightRule {
    /// A leaf has height 1, a missing child counts as 0 and every other node is one taller than
    /// its tallest child. This keeps the tree balanced.
    #[default]
    Counted,
    /// A node's height is the height of its tallest child with leaves at 0, so every height is 0.
    /// Balance factors never leave 0 and no rotation happens: the tree behaves like a plain
    /// binary search tree.
    Flat,
}

impl HeightRule {
    /// The height of a node with no children.
    pub(crate) fn leaf(self) -> usize {
        match self {
            Self::Counted => 1,
            Self::Flat => 0,
        }
    }

    /// The height of a node whose children have the given heights.
    pub(crate) fn combine(self, left: usize, right: usize) -> usize {
        match self {
            Self::Counted => left.max(right) + 1,
            Self::Flat => left.max(right),
        }
    }
}

/// Settings fixed for the lifetime of a tree.
///
/// # Examples
///
/// ```
/// use avl::{Config, HeightRule, Tree};
///
/// let tree: Tree<u8> = Tree::with_config(Config::default().height_rule(HeightRule::Flat));
/// assert_eq!(tree.config().height_rule, HeightRule::Flat);
/// ```
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Config {
    /// See [`HeightRule`].
    pub height_rule: HeightRule,
}

impl Config {
    /// Returns this config with the given height rule.
    pub fn height_rule(self, height_rule: HeightRule) -> Self {
        Self { height_rule }
    }
}
