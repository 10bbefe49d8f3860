//! Module implement concatenation of two AVL dictionaries.
//!
//! Both algorithms expect every key of `lesser` to be smaller than every
//! key of `greater`, and both return the joined dictionary by value
//! leaving the two inputs empty.
//!
//! * [concatenation_dummy] re-inserts every entry of the shorter tree into
//!   the taller one, costs O(m * log(n)) and works for any pair of trees.
//! * [concatenation] takes a pivot entry out of one tree and uses it to
//!   splice the shorter tree into the spine of the taller one, then walks
//!   back to the root rebalancing, costs O(log(n)).
//! * [join] picks between the two, the structural join needs at least two
//!   entries in each tree.

use tracing::debug;

use std::cmp::Ordering;

use crate::{
    arena::Arena,
    dict::DictAvl,
    node::NodeId,
    tree::{height, in_order_ids, AvlTree},
    Error, Result,
};

/// Join `avl_1` and `avl_2` by inserting the entries of the shorter tree
/// into the taller one, on equal height `avl_2` is the target.
///
/// Entries are moved, not cloned, and the node slots of the shorter tree
/// are released back to `arena`. Duplicate keys, if any, resolve to the
/// shorter tree's value.
pub fn concatenation_dummy<K, V>(
    arena: &mut Arena<K, V>,
    avl_1: &mut DictAvl,
    avl_2: &mut DictAvl,
) -> Result<DictAvl>
where
    K: Ord,
{
    avl_1.as_tree().check_arena(arena)?;
    avl_2.as_tree().check_arena(arena)?;

    let (h1, h2) = (avl_1.to_height(arena)?, avl_2.to_height(arena)?);
    let (mut avl_max, avl_min) = if h2 >= h1 {
        (avl_2.take(), avl_1.take())
    } else {
        (avl_1.take(), avl_2.take())
    };
    debug!(
        max_len = avl_max.len(),
        min_len = avl_min.len(),
        "concatenation_dummy"
    );

    // slots are released inside the loop, gather every handle before the
    // first free.
    for id in in_order_ids(arena, avl_min.to_root()) {
        let (key, value) = match arena.free(id) {
            Some(node) => node.into_entry(),
            None => err_at!(Fatal, msg: "concatenation_dummy stale node {:?}", id)?,
        };
        avl_max.insert(arena, key, value)?;
    }

    Ok(avl_max)
}

/// Join `lesser` and `greater` in O(log(n)), dispatching on their
/// heights.
///
/// Both trees must hold at least two entries, and the largest key of
/// `lesser` must be smaller than the smallest key of `greater`. Both are
/// checked before any node is touched, a violation returns
/// [Error::PreconditionViolation] with the inputs left intact. Use
/// [join] when either tree can be trivial.
pub fn concatenation<K, V>(
    arena: &mut Arena<K, V>,
    lesser: &mut DictAvl,
    greater: &mut DictAvl,
) -> Result<DictAvl>
where
    K: Ord,
{
    check_precondition(arena, lesser, greater)?;

    let (hl, hg) = (lesser.to_height(arena)?, greater.to_height(arena)?);
    let (lesser, greater) = (lesser.take(), greater.take());
    match hg.cmp(&hl) {
        Ordering::Greater => {
            debug!(hl, hg, "concatenation less_more_height");
            less_more_height(arena, lesser, greater)
        }
        Ordering::Equal => {
            debug!(hl, hg, "concatenation equal_height");
            equal_height(arena, lesser, greater)
        }
        Ordering::Less => {
            debug!(hl, hg, "concatenation more_less_height");
            more_less_height(arena, lesser, greater)
        }
    }
}

/// Join `lesser` and `greater`, falling back to [concatenation_dummy]
/// when either of them is empty or a single node.
pub fn join<K, V>(
    arena: &mut Arena<K, V>,
    lesser: &mut DictAvl,
    greater: &mut DictAvl,
) -> Result<DictAvl>
where
    K: Ord,
{
    lesser.as_tree().check_arena(arena)?;
    greater.as_tree().check_arena(arena)?;

    if lesser.to_height(arena)? <= 0 || greater.to_height(arena)? <= 0 {
        concatenation_dummy(arena, lesser, greater)
    } else {
        concatenation(arena, lesser, greater)
    }
}

fn check_precondition<K, V>(arena: &Arena<K, V>, lesser: &DictAvl, greater: &DictAvl) -> Result<()>
where
    K: Ord,
{
    lesser.as_tree().check_arena(arena)?;
    greater.as_tree().check_arena(arena)?;

    if lesser.len() < 2 || greater.len() < 2 {
        let (l, g) = (lesser.len(), greater.len());
        err_at!(PreconditionViolation, msg: "need 2 entries, lesser:{} greater:{}", l, g)?;
    }

    let max = lesser.max_key_son(arena, lesser.to_root())?;
    let min = greater.min_key_son(arena, greater.to_root())?;
    if arena[max].as_key() >= arena[min].as_key() {
        err_at!(PreconditionViolation, msg: "key ranges overlap {:?} {:?}", max, min)?;
    }

    Ok(())
}

// Re-wrap an extracted entry as a single node tree.
fn leaf_tree<K, V>(arena: &mut Arena<K, V>, key: K, value: V) -> Result<(NodeId, AvlTree)>
where
    K: Ord,
{
    let mut pivot = DictAvl::new(arena);
    pivot.insert(arena, key, value)?;
    match pivot.to_root() {
        Some(id) => Ok((id, pivot.into_tree())),
        None => err_at!(Fatal, msg: "pivot tree is empty"),
    }
}

// `greater` is taller. The largest entry of `lesser` becomes the pivot.
// Walk down the left spine of `greater` to the first node `c` that is at
// most one level taller than `lesser`, the pivot takes the place of `c`:
//
//            rad                       rad
//            / \                       / \
//           c   ..      ==>        pivot  ..
//                                   / \
//                              lesser  c
//
// When `c` is the root of `greater` the pivot becomes the new root.
fn less_more_height<K, V>(
    arena: &mut Arena<K, V>,
    mut lesser: DictAvl,
    mut greater: DictAvl,
) -> Result<DictAvl>
where
    K: Ord,
{
    let max_son = lesser.max_key_son(arena, lesser.to_root())?;
    let (key, value) = lesser.delete_node(arena, max_son)?;
    let (pivot, pivot_tree) = leaf_tree(arena, key, value)?;

    let n_count = lesser.len() + 1 + greater.len();
    let hl = lesser.to_height(arena)?;
    debug!(?pivot, hl, "less_more_height pivot");

    let mut rad: Option<NodeId> = None;
    let mut node = greater.to_root();
    while height(arena, node) > hl + 1 {
        rad = node;
        node = match node {
            Some(id) => arena[id].to_left(),
            None => err_at!(Fatal, msg: "left spine ends after {:?}", rad)?,
        };
    }

    let mut big = match rad {
        Some(rad) => {
            let big = greater.as_mut_tree();
            let son_left = big.cut_left(arena, rad)?;
            big.insert_as_left_subtree(arena, rad, pivot_tree)?;
            big.insert_as_left_subtree(arena, pivot, lesser.into_tree())?;
            big.insert_as_right_subtree(arena, pivot, son_left)?;
            greater.into_tree()
        }
        None => {
            let mut big = pivot_tree;
            big.insert_as_left_subtree(arena, pivot, lesser.into_tree())?;
            big.insert_as_right_subtree(arena, pivot, greater.into_tree())?;
            big
        }
    };

    big.rebalance(arena, Some(pivot));
    Ok(DictAvl::from_parts(big, n_count))
}

// Both trees have the same height. The largest entry of `lesser` becomes
// the new root with `lesser` and `greater` as its children.
fn equal_height<K, V>(
    arena: &mut Arena<K, V>,
    mut lesser: DictAvl,
    greater: DictAvl,
) -> Result<DictAvl>
where
    K: Ord,
{
    let max_son = lesser.max_key_son(arena, lesser.to_root())?;
    let (key, value) = lesser.delete_node(arena, max_son)?;
    let (pivot, mut tree) = leaf_tree(arena, key, value)?;

    let n_count = lesser.len() + 1 + greater.len();
    debug!(?pivot, "equal_height pivot");

    let start = lesser.to_root();
    tree.insert_as_left_subtree(arena, pivot, lesser.into_tree())?;
    tree.insert_as_right_subtree(arena, pivot, greater.into_tree())?;

    tree.rebalance(arena, start);
    Ok(DictAvl::from_parts(tree, n_count))
}

// `lesser` is taller, mirror of less_more_height. The smallest entry of
// `greater` becomes the pivot, spliced into the right spine of `lesser`:
//
//            rad                       rad
//            / \                       / \
//          ..   c       ==>          ..  pivot
//                                         / \
//                                        c   greater
//
fn more_less_height<K, V>(
    arena: &mut Arena<K, V>,
    mut lesser: DictAvl,
    mut greater: DictAvl,
) -> Result<DictAvl>
where
    K: Ord,
{
    let min_son = greater.min_key_son(arena, greater.to_root())?;
    let (key, value) = greater.delete_node(arena, min_son)?;
    let (pivot, pivot_tree) = leaf_tree(arena, key, value)?;

    let n_count = lesser.len() + 1 + greater.len();
    let hg = greater.to_height(arena)?;
    debug!(?pivot, hg, "more_less_height pivot");

    let mut rad: Option<NodeId> = None;
    let mut node = lesser.to_root();
    while height(arena, node) > hg + 1 {
        rad = node;
        node = match node {
            Some(id) => arena[id].to_right(),
            None => err_at!(Fatal, msg: "right spine ends after {:?}", rad)?,
        };
    }

    let mut big = match rad {
        Some(rad) => {
            let big = lesser.as_mut_tree();
            let son_right = big.cut_right(arena, rad)?;
            big.insert_as_right_subtree(arena, rad, pivot_tree)?;
            big.insert_as_right_subtree(arena, pivot, greater.into_tree())?;
            big.insert_as_left_subtree(arena, pivot, son_right)?;
            lesser.into_tree()
        }
        None => {
            let mut big = pivot_tree;
            big.insert_as_right_subtree(arena, pivot, greater.into_tree())?;
            big.insert_as_left_subtree(arena, pivot, lesser.into_tree())?;
            big
        }
    };

    big.rebalance(arena, Some(pivot));
    Ok(DictAvl::from_parts(big, n_count))
}

#[cfg(test)]
#[path = "concat_test.rs"]
mod concat_test;
