//! An owned AVL tree storing a set of keys. Every node exclusively owns its children, so
//! rebalancing moves boxes between slots instead of patching parent pointers.
//!
//! # Examples
//!
//! ```
//! use avl::tree::Tree;
//!
//! let mut tree = Tree::new();
//!
//! // Nothing in here yet.
//! assert!(!tree.contains(&10));
//!
//! // Ascending inserts would make a plain BST a linked list. This one rotates instead.
//! for key in [10, 20, 30] {
//!     tree.insert(key);
//! }
//! assert_eq!(tree.pre_order(), vec![20, 10, 30]);
//!
//! // Inserting a key twice changes nothing.
//! assert!(!tree.insert(20));
//! assert_eq!(tree.len(), 3);
//!
//! // Removing a key hands it back.
//! assert_eq!(tree.remove(&20), Some(20));
//! assert_eq!(tree.in_order(), vec![10, 30]);
//! ```

use std::cmp::Ordering;
use std::fmt;
use std::iter::FromIterator;

use log::{debug, trace, warn};

use crate::config::{Config, HeightRule};
use crate::error::Error;
use crate::util::RemoveResult;

/// The order in which a traversal visits each node relative to its subtrees.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Order {
    /// Node, then left subtree, then right subtree.
    Pre,
    /// Left subtree, then node, then right subtree. Yields keys in ascending order.
    In,
    /// Left subtree, then right subtree, then node.
    Post,
}

/// A self-balancing Binary Search Tree (specifically, an AVL tree) of unique keys. This can be
/// used for inserting, finding, and removing keys and for walking them in one of the three
/// depth-first orders.
#[derive(Clone)]
pub struct Tree<T> {
    root: Link<T>,
    len: usize,
    config: Config,
}

impl<T> Default for Tree<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Drop for Tree<T> {
    fn drop(&mut self) {
        self.root.dismantle();
    }
}

impl<T> fmt::Debug for Tree<T>
where
    T: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut keys = Vec::with_capacity(self.len);
        self.root.visit(Order::In, &mut |key| keys.push(key));
        f.debug_set().entries(keys).finish()
    }
}

impl<T> Extend<T> for Tree<T>
where
    T: Ord,
{
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        for key in iter {
            self.insert(key);
        }
    }
}

impl<T> FromIterator<T> for Tree<T>
where
    T: Ord,
{
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut tree = Self::new();
        tree.extend(iter);
        tree
    }
}

impl<T> Tree<T> {
    /// Generate a new, empty `Tree` with the default [`Config`].
    pub fn new() -> Self {
        Self::with_config(Config::default())
    }

    /// Generate a new, empty `Tree` that computes heights according to `config`.
    ///
    /// # Examples
    ///
    /// ```
    /// use avl::{Config, HeightRule, Tree};
    ///
    /// // With flat heights nothing ever looks unbalanced so nothing rotates.
    /// let mut tree = Tree::with_config(Config::default().height_rule(HeightRule::Flat));
    /// tree.extend([10, 20, 30]);
    ///
    /// assert_eq!(tree.pre_order(), vec![10, 20, 30]);
    /// ```
    pub fn with_config(config: Config) -> Self {
        Self {
            root: Link(None),
            len: 0,
            config,
        }
    }

    /// The settings this tree was built with.
    pub fn config(&self) -> Config {
        self.config
    }

    /// The number of keys in the tree.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether the tree holds no keys.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// The cached height of the root, or 0 for an empty tree. Under [`HeightRule::Counted`] a
    /// single key has height 1; under [`HeightRule::Flat`] every tree has height 0.
    pub fn height(&self) -> usize {
        self.root.height()
    }

    /// The smallest key in the tree.
    pub fn min(&self) -> Option<&T> {
        let mut node = self.root.node()?;
        while let Some(left) = node.left.node() {
            node = left;
        }
        Some(&node.key)
    }

    /// The largest key in the tree.
    pub fn max(&self) -> Option<&T> {
        let mut node = self.root.node()?;
        while let Some(right) = node.right.node() {
            node = right;
        }
        Some(&node.key)
    }

    /// Whether the tree holds `key`. An empty tree contains nothing.
    ///
    /// # Examples
    ///
    /// ```
    /// use avl::Tree;
    ///
    /// let mut tree = Tree::new();
    /// assert!(!tree.contains(&1));
    ///
    /// tree.insert(1);
    /// assert!(tree.contains(&1));
    /// assert!(!tree.contains(&42));
    /// ```
    pub fn contains(&self, key: &T) -> bool
    where
        T: Ord,
    {
        self.root.contains(key)
    }

    /// Inserts `key` and rebalances the path back up to the root. Returns `false`, leaving the
    /// tree untouched, if the key was already present.
    ///
    /// # Examples
    ///
    /// ```
    /// use avl::Tree;
    ///
    /// let mut tree = Tree::new();
    ///
    /// assert!(tree.insert(1));
    /// assert!(!tree.insert(1));
    /// assert_eq!(tree.len(), 1);
    /// ```
    pub fn insert(&mut self, key: T) -> bool
    where
        T: Ord,
    {
        let rule = self.config.height_rule;
        let inserted = match rule {
            HeightRule::Counted => self.root.insert(key, rule),
            HeightRule::Flat => self.root.insert_unbalanced(key, rule),
        };
        if inserted {
            self.len += 1;
        } else {
            trace!("ignoring insert of a key already in the tree");
        }
        inserted
    }

    /// Removes `key` from the tree and returns it. If the tree does not contain the key (or is
    /// empty), nothing happens.
    ///
    /// # Examples
    ///
    /// ```
    /// use avl::Tree;
    ///
    /// let mut tree: Tree<_> = vec![2, 1, 3].into_iter().collect();
    ///
    /// assert_eq!(tree.remove(&2), Some(2));
    /// assert_eq!(tree.remove(&2), None);
    /// assert_eq!(tree.in_order(), vec![1, 3]);
    /// ```
    pub fn remove(&mut self, key: &T) -> Option<T>
    where
        T: Ord,
    {
        let rule = self.config.height_rule;
        let result = match rule {
            HeightRule::Counted => self.root.remove_child(key, rule),
            HeightRule::Flat => self.root.remove_unbalanced(key),
        };
        match result {
            RemoveResult::Removed(removed) => {
                self.len -= 1;
                Some(removed)
            }
            RemoveResult::NotFound => {
                debug!("remove found no matching key among {} keys", self.len);
                None
            }
            RemoveResult::RemoveSelf => {
                unreachable!("the root slot detaches a root that removes itself")
            }
        }
    }

    /// Drops every key.
    pub fn clear(&mut self) {
        debug!("clearing {} keys", self.len);
        self.root.dismantle();
        self.len = 0;
    }

    /// Collects clones of every key in the given order into a vector sized for the whole tree.
    pub fn traverse(&self, order: Order) -> Vec<T>
    where
        T: Clone,
    {
        let mut keys = Vec::with_capacity(self.len);
        self.root.visit(order, &mut |key| keys.push(key.clone()));
        keys
    }

    /// Like [`traverse`][Tree::traverse] but reports a failure to allocate the output instead of
    /// aborting.
    ///
    /// # Errors
    ///
    /// [`Error::ResourceExhausted`] if room for [`len`][Tree::len] keys can't be reserved.
    pub fn try_traverse(&self, order: Order) -> Result<Vec<T>, Error>
    where
        T: Clone,
    {
        let requested = self.len;
        let mut keys = Vec::new();
        keys.try_reserve_exact(requested).map_err(|source| {
            warn!("could not reserve a traversal buffer for {} keys", requested);
            Error::ResourceExhausted { requested, source }
        })?;
        self.root.visit(order, &mut |key| keys.push(key.clone()));
        Ok(keys)
    }

    /// Keys in pre-order: each node before its subtrees.
    pub fn pre_order(&self) -> Vec<T>
    where
        T: Clone,
    {
        self.traverse(Order::Pre)
    }

    /// Keys in ascending order.
    ///
    /// # Examples
    ///
    /// ```
    /// use avl::Tree;
    ///
    /// let tree: Tree<_> = vec![5, 3, 8, 1, 4, 7, 9].into_iter().collect();
    /// assert_eq!(tree.in_order(), vec![1, 3, 4, 5, 7, 8, 9]);
    /// ```
    pub fn in_order(&self) -> Vec<T>
    where
        T: Clone,
    {
        self.traverse(Order::In)
    }

    /// Keys in post-order: each node after its subtrees.
    pub fn post_order(&self) -> Vec<T>
    where
        T: Clone,
    {
        self.traverse(Order::Post)
    }

    /// Walks the whole tree checking that keys are strictly ordered, that every cached height
    /// matches the configured [`HeightRule`], that no node is out of balance (only meaningful
    /// for [`HeightRule::Counted`]) and that [`len`][Tree::len] matches the nodes reachable from
    /// the root.
    ///
    /// # Errors
    ///
    /// The first violation found, as one of [`Error::OutOfOrder`], [`Error::StaleHeight`],
    /// [`Error::Unbalanced`] or [`Error::LenMismatch`].
    pub fn validate(&self) -> Result<(), Error>
    where
        T: Ord,
    {
        let reachable = self.root.check(self.config.height_rule)?;
        if reachable != self.len {
            return Err(Error::LenMismatch {
                len: self.len,
                reachable,
            });
        }
        Ok(())
    }
}

/// The slot a subtree hangs from: the tree's root or one of a node's children.
struct Link<T>(Option<Box<Node<T>>>);

impl<T> Clone for Link<T>
where
    T: Clone,
{
    /// Rebuilds the subtree bottom-up from a post-order walk: by the time a node is reached its
    /// cloned right subtree is on top of `built` with its cloned left subtree below it.
    fn clone(&self) -> Self {
        let mut built: Vec<Box<Node<T>>> = Vec::new();
        self.walk(Order::Post, &mut |node| {
            let right = if node.right.0.is_some() { built.pop() } else { None };
            let left = if node.left.0.is_some() { built.pop() } else { None };
            built.push(Box::new(Node {
                key: node.key.clone(),
                height: node.height,
                left: Link(left),
                right: Link(right),
            }));
        });
        Link(built.pop())
    }
}

/// A pending step of an iterative depth-first walk.
enum Step<'a, T> {
    /// Schedule the node and its children.
    Enter(&'a Node<T>),
    /// Hand the node to the caller.
    Emit(&'a Node<T>),
}

impl<T> Link<T> {
    fn node(&self) -> Option<&Node<T>> {
        self.0.as_deref()
    }

    fn node_mut(&mut self) -> Option<&mut Node<T>> {
        self.0.as_deref_mut()
    }

    fn take(&mut self) -> Self {
        Link(self.0.take())
    }

    fn height(&self) -> usize {
        self.node().map_or(0, |n| n.height)
    }

    fn balance_factor(&self) -> isize {
        self.node().map_or(0, |n| n.balance_factor())
    }

    fn contains(&self, key: &T) -> bool
    where
        T: Ord,
    {
        let mut link = self;
        while let Some(node) = link.node() {
            link = match key.cmp(&node.key) {
                Ordering::Less => &node.left,
                Ordering::Equal => return true,
                Ordering::Greater => &node.right,
            };
        }
        false
    }

    /// The slot holding `key`, or the empty slot where it would be attached.
    fn slot_for(&mut self, key: &T) -> &mut Self
    where
        T: Ord,
    {
        let mut link = self;
        loop {
            let ordering = match link.node() {
                Some(node) => key.cmp(&node.key),
                None => return link,
            };
            link = match (ordering, link) {
                (Ordering::Less, Link(Some(node))) => &mut node.left,
                (Ordering::Greater, Link(Some(node))) => &mut node.right,
                (_, link) => return link,
            };
        }
    }

    /// Inserts `key` without rebalancing. Only valid when no rotation can ever be needed, i.e.
    /// under [`HeightRule::Flat`]. Loops instead of recursing since such trees can be as deep
    /// as they are long.
    fn insert_unbalanced(&mut self, key: T, rule: HeightRule) -> bool
    where
        T: Ord,
    {
        let slot = self.slot_for(&key);
        if slot.0.is_some() {
            return false;
        }
        slot.0 = Some(Node::new_boxed(key, rule));
        true
    }

    /// [`remove_child`][Link::remove_child] without rebalancing, for [`HeightRule::Flat`].
    fn remove_unbalanced(&mut self, key: &T) -> RemoveResult<T>
    where
        T: Ord,
    {
        let slot = self.slot_for(key);
        let Some(node) = slot.node_mut() else {
            return RemoveResult::NotFound;
        };
        let promoted = if node.right.0.is_some() {
            node.right.take_min_unbalanced()
        } else {
            node.left.take_max_unbalanced()
        };
        match promoted {
            Some(promoted) => RemoveResult::Removed(std::mem::replace(&mut node.key, promoted)),
            None => match slot.0.take() {
                Some(node) => RemoveResult::Removed(node.key),
                None => RemoveResult::NotFound,
            },
        }
    }

    /// Detaches the leftmost node of this subtree, leaving every height above it alone.
    fn take_min_unbalanced(&mut self) -> Option<T> {
        let mut link = self;
        loop {
            let has_left = link.node()?.left.0.is_some();
            link = match (has_left, link) {
                (true, Link(Some(node))) => &mut node.left,
                (_, link) => {
                    let mut node = link.0.take()?;
                    link.0 = node.right.0.take();
                    return Some(node.key);
                }
            };
        }
    }

    /// Detaches the rightmost node of this subtree, leaving every height above it alone.
    fn take_max_unbalanced(&mut self) -> Option<T> {
        let mut link = self;
        loop {
            let has_right = link.node()?.right.0.is_some();
            link = match (has_right, link) {
                (true, Link(Some(node))) => &mut node.right,
                (_, link) => {
                    let mut node = link.0.take()?;
                    link.0 = node.left.0.take();
                    return Some(node.key);
                }
            };
        }
    }

    /// Inserts `key` into the subtree in this slot, rebalancing it if it grew. Returns whether a
    /// node was added.
    fn insert(&mut self, key: T, rule: HeightRule) -> bool
    where
        T: Ord,
    {
        let Some(node) = self.node_mut() else {
            self.0 = Some(Node::new_boxed(key, rule));
            return true;
        };
        let inserted = match key.cmp(&node.key) {
            Ordering::Less => node.left.insert(key, rule),
            Ordering::Equal => false,
            Ordering::Greater => node.right.insert(key, rule),
        };

        if inserted {
            self.balance(rule);
            debug_assert!(
                rule == HeightRule::Flat || self.balance_factor().abs() <= 1,
                "insert left a subtree out of balance"
            );
        }
        inserted
    }

    /// Removes `key` from the subtree in this slot. See the documentation on [`RemoveResult`] to
    /// see what the various return values mean.
    fn remove(&mut self, key: &T, rule: HeightRule) -> RemoveResult<T>
    where
        T: Ord,
    {
        let Some(node) = self.node_mut() else {
            return RemoveResult::NotFound;
        };
        let result = match key.cmp(&node.key) {
            Ordering::Less => node.left.remove_child(key, rule),
            Ordering::Greater => node.right.remove_child(key, rule),
            Ordering::Equal => {
                // Promote the successor if there is one. Otherwise the predecessor, which for a
                // balanced tree is the lone left leaf.
                let promoted = if node.right.0.is_some() {
                    node.right.take_min(rule)
                } else {
                    node.left.take_max(rule)
                };
                match promoted {
                    Some(promoted) => {
                        RemoveResult::Removed(std::mem::replace(&mut node.key, promoted))
                    }
                    None => return RemoveResult::RemoveSelf,
                }
            }
        };

        if let RemoveResult::Removed(_) = result {
            self.rebalance(rule);
        }
        result
    }

    /// [`remove`][Link::remove], detaching the node in this slot if it asks to be removed.
    fn remove_child(&mut self, key: &T, rule: HeightRule) -> RemoveResult<T>
    where
        T: Ord,
    {
        match self.remove(key, rule) {
            RemoveResult::RemoveSelf => match self.0.take() {
                Some(node) => RemoveResult::Removed(node.key),
                None => RemoveResult::NotFound,
            },
            result => result,
        }
    }

    /// Detaches the leftmost node of this subtree and returns its key.
    fn take_min(&mut self, rule: HeightRule) -> Option<T> {
        let has_left = self.node()?.left.0.is_some();
        if has_left {
            let min = self.node_mut()?.left.take_min(rule);
            self.rebalance(rule);
            min
        } else {
            let mut node = self.0.take()?;
            self.0 = node.right.0.take();
            Some(node.key)
        }
    }

    /// Detaches the rightmost node of this subtree and returns its key.
    fn take_max(&mut self, rule: HeightRule) -> Option<T> {
        let has_right = self.node()?.right.0.is_some();
        if has_right {
            let max = self.node_mut()?.right.take_max(rule);
            self.rebalance(rule);
            max
        } else {
            let mut node = self.0.take()?;
            self.0 = node.left.0.take();
            Some(node.key)
        }
    }

    /// Refreshes the height of the node in this slot and applies at most one (single or double)
    /// rotation if it is out of balance. Returns whether it rotated.
    ///
    /// See https://en.wikipedia.org/wiki/AVL_tree#Rebalancing for terminology.
    fn balance(&mut self, rule: HeightRule) -> bool {
        let Some(node) = self.node_mut() else {
            return false;
        };
        node.fix_height(rule);
        match node.balance_factor() {
            factor if factor > 1 => {
                if node.left.balance_factor() >= 0 {
                    self.rotate_right(rule);
                } else {
                    self.rotate_left_right(rule);
                }
                true
            }
            factor if factor < -1 => {
                if node.right.balance_factor() <= 0 {
                    self.rotate_left(rule);
                } else {
                    self.rotate_right_left(rule);
                }
                true
            }
            _ => false,
        }
    }

    /// Rotates until the node in this slot is balanced. A removal can leave a node two levels
    /// lighter on one side, so a single check isn't always enough.
    fn rebalance(&mut self, rule: HeightRule) {
        while self.balance(rule) {}

        debug_assert!(
            rule == HeightRule::Flat || self.balance_factor().abs() <= 1,
            "rebalance left a subtree out of balance"
        );
    }

    /// Rotate self to the right. This moves the left child up vertically and self down
    /// vertically. Used to rebalance the tree when the left child is too tall. Does nothing if
    /// there is no left child.
    ///
    /// # Diagram
    ///
    /// ```text
    ///      old_root               new_root
    ///       /     \               /     \
    ///   new_root   z   rotate -> x    old_root
    ///    /  \                           /  \
    ///   x    y                         y    z
    /// ```
    fn rotate_right(&mut self, rule: HeightRule) {
        let Some(mut old_root) = self.0.take() else {
            return;
        };
        let Some(mut new_root) = old_root.left.0.take() else {
            self.0 = Some(old_root);
            return;
        };

        old_root.left = new_root.right.take();
        old_root.fix_height(rule);

        new_root.right = Link(Some(old_root));
        new_root.fix_height(rule);
        trace!("rotated right, subtree height now {}", new_root.height);
        self.0 = Some(new_root);
    }

    /// Mirror image of [`rotate_right`][Link::rotate_right].
    fn rotate_left(&mut self, rule: HeightRule) {
        let Some(mut old_root) = self.0.take() else {
            return;
        };
        let Some(mut new_root) = old_root.right.0.take() else {
            self.0 = Some(old_root);
            return;
        };

        old_root.right = new_root.left.take();
        old_root.fix_height(rule);

        new_root.left = Link(Some(old_root));
        new_root.fix_height(rule);
        trace!("rotated left, subtree height now {}", new_root.height);
        self.0 = Some(new_root);
    }

    /// The left child leans right: straighten it, then rotate right.
    fn rotate_left_right(&mut self, rule: HeightRule) {
        if let Some(node) = self.node_mut() {
            node.left.rotate_left(rule);
        }
        self.rotate_right(rule);
    }

    /// The right child leans left: straighten it, then rotate left.
    fn rotate_right_left(&mut self, rule: HeightRule) {
        if let Some(node) = self.node_mut() {
            node.right.rotate_right(rule);
        }
        self.rotate_left(rule);
    }

    fn visit<'a>(&'a self, order: Order, f: &mut impl FnMut(&'a T)) {
        self.walk(order, &mut |node| f(&node.key));
    }

    /// Depth-first walk driven by an explicit stack rather than recursion.
    fn walk<'a>(&'a self, order: Order, f: &mut impl FnMut(&'a Node<T>)) {
        let mut stack: Vec<Step<'a, T>> = self.node().map(Step::Enter).into_iter().collect();
        while let Some(step) = stack.pop() {
            let node = match step {
                Step::Emit(node) => {
                    f(node);
                    continue;
                }
                Step::Enter(node) => node,
            };
            // Pushed back to front.
            let left = node.left.node().map(Step::Enter);
            let right = node.right.node().map(Step::Enter);
            match order {
                Order::Pre => {
                    stack.extend(right);
                    stack.extend(left);
                    stack.push(Step::Emit(node));
                }
                Order::In => {
                    stack.extend(right);
                    stack.push(Step::Emit(node));
                    stack.extend(left);
                }
                Order::Post => {
                    stack.push(Step::Emit(node));
                    stack.extend(right);
                    stack.extend(left);
                }
            }
        }
    }

    /// Checks every node of the subtree in this slot and returns how many there are. Each node's
    /// key must lie strictly between the keys of the ancestors it sits between.
    fn check(&self, rule: HeightRule) -> Result<usize, Error>
    where
        T: Ord,
    {
        let mut reachable = 0;
        let mut stack: Vec<(&Node<T>, Option<&T>, Option<&T>, usize)> =
            self.node().map(|root| (root, None, None, 0)).into_iter().collect();
        while let Some((node, lower, upper, depth)) = stack.pop() {
            let above_lower = lower.map_or(true, |lower| node.key > *lower);
            let below_upper = upper.map_or(true, |upper| node.key < *upper);
            if !(above_lower && below_upper) {
                return Err(Error::OutOfOrder { depth });
            }

            let expected = rule.combine(node.left.height(), node.right.height());
            if node.height != expected {
                return Err(Error::StaleHeight {
                    depth,
                    cached: node.height,
                    expected,
                });
            }
            let factor = node.balance_factor();
            if rule == HeightRule::Counted && factor.abs() > 1 {
                return Err(Error::Unbalanced { depth, factor });
            }

            reachable += 1;
            let key = Some(&node.key);
            stack.extend(node.left.node().map(|left| (left, lower, key, depth + 1)));
            stack.extend(node.right.node().map(|right| (right, key, upper, depth + 1)));
        }
        Ok(reachable)
    }

    /// Drops the subtree in this slot without recursing, so even a degenerate tree can't
    /// overflow the stack.
    fn dismantle(&mut self) {
        let mut stack: Vec<Box<Node<T>>> = self.0.take().into_iter().collect();
        while let Some(mut node) = stack.pop() {
            stack.extend(node.left.0.take());
            stack.extend(node.right.0.take());
        }
    }
}

struct Node<T> {
    key: T,
    /// Cached height of the subtree rooted here, per the tree's [`HeightRule`].
    height: usize,
    left: Link<T>,
    right: Link<T>,
}

impl<T> Node<T> {
    fn new_boxed(key: T, rule: HeightRule) -> Box<Self> {
        Box::new(Node {
            key,
            height: rule.leaf(),
            left: Link(None),
            right: Link(None),
        })
    }

    fn fix_height(&mut self, rule: HeightRule) {
        self.height = rule.combine(self.left.height(), self.right.height());
    }

    /// Height of the left subtree minus height of the right subtree. Positive means left-heavy.
    fn balance_factor(&self) -> isize {
        self.left.height() as isize - self.right.height() as isize
    }
}
