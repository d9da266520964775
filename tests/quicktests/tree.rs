use avl::{Config, HeightRule, Order, Tree};
use quickcheck_macros::quickcheck;

use std::collections::{BTreeSet, HashSet};

use crate::Op;

/// Applies a set of operations to a tree and a set.
/// This way we can ensure that after a random smattering of inserts
/// and removes we have the same keys in both.
fn do_ops<K>(ops: &[Op<K>], tree: &mut Tree<K>, set: &mut BTreeSet<K>)
where
    K: Ord + Clone,
{
    for op in ops {
        match op {
            Op::Insert(k) => {
                tree.insert(k.clone());
                set.insert(k.clone());
            }
            Op::Remove(k) => {
                tree.remove(k);
                set.remove(k);
            }
            Op::Clear => {
                tree.clear();
                set.clear();
            }
        }
    }
}

fn flat() -> Config {
    Config::default().height_rule(HeightRule::Flat)
}

#[quickcheck]
fn fuzz_multiple_operations_i8(ops: Vec<Op<i8>>) -> bool {
    let mut tree = Tree::new();
    let mut set = BTreeSet::new();

    do_ops(&ops, &mut tree, &mut set);
    tree.validate().is_ok()
        && tree.len() == set.len()
        && tree.in_order() == set.into_iter().collect::<Vec<_>>()
}

#[quickcheck]
fn flat_rule_agrees_with_counted(ops: Vec<Op<i8>>) -> bool {
    let mut counted = Tree::new();
    let mut flat = Tree::with_config(flat());

    do_ops(&ops, &mut counted, &mut BTreeSet::new());
    do_ops(&ops, &mut flat, &mut BTreeSet::new());
    flat.validate().is_ok() && flat.height() == 0 && flat.in_order() == counted.in_order()
}

#[quickcheck]
fn contains(xs: Vec<i8>) -> bool {
    let tree: Tree<_> = xs.iter().copied().collect();

    xs.iter().all(|x| tree.contains(x))
}

#[quickcheck]
fn contains_not(xs: Vec<i8>, nots: Vec<i8>) -> bool {
    let tree: Tree<_> = xs.iter().copied().collect();
    let added: HashSet<_> = xs.into_iter().collect();
    let nots: HashSet<_> = nots.into_iter().collect();
    let mut nots = nots.difference(&added);

    nots.all(|x| !tree.contains(x))
}

#[quickcheck]
fn with_deletions(xs: Vec<i8>, deletes: Vec<i8>) -> bool {
    let mut tree: Tree<_> = xs.iter().copied().collect();
    for delete in &deletes {
        tree.remove(delete);
    }

    let mut still_present = xs;
    for delete in &deletes {
        // We may have inserted the same value multiple times - delete each one.
        while let Some(pos) = still_present.iter().position(|x| x == delete) {
            still_present.swap_remove(pos);
        }
    }

    tree.validate().is_ok()
        && deletes.iter().all(|x| !tree.contains(x))
        && still_present.iter().all(|x| tree.contains(x))
}

#[quickcheck]
fn traversals_cover_every_key(xs: Vec<i16>) -> bool {
    let tree: Tree<_> = xs.into_iter().collect();
    let sorted = tree.in_order();

    [Order::Pre, Order::In, Order::Post].iter().all(|&order| {
        let mut keys = tree.traverse(order);
        keys.sort_unstable();
        keys.len() == tree.len() && keys == sorted
    })
}

#[quickcheck]
fn height_is_logarithmic(xs: Vec<u16>) -> bool {
    let tree: Tree<_> = xs.into_iter().collect();
    // An AVL tree with n nodes is at most ~1.44 lg(n + 2) tall.
    let bound = 1.45 * ((tree.len() + 2) as f64).log2();

    (tree.height() as f64) <= bound
}

#[quickcheck]
fn insert_then_remove_round_trips(xs: Vec<i8>, x: i8) -> bool {
    let mut tree: Tree<_> = xs.into_iter().filter(|&k| k != x).collect();
    let before = tree.in_order();

    tree.insert(x);
    tree.remove(&x) == Some(x) && !tree.contains(&x) && tree.in_order() == before
}
