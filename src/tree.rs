//! Module implement the structural layer of an AVL tree.
//!
//! [AvlTree] is a handle to a root node living in an [Arena]. This layer
//! knows about heights, rotations and links, but never compares keys
//! while mutating. It provides the primitives used by [DictAvl] for
//! insert and delete, and by the concatenation algorithms for cutting
//! and grafting whole subtrees:
//!
//! * `height` and `update_height`, cached height bookkeeping.
//! * `AvlTree::rotate`, four-case AVL rebalancing at a single node.
//! * `AvlTree::rebalance`, upward walk applying rotations up to the root.
//! * [AvlTree::cut_left], [AvlTree::cut_right], detach a child subtree.
//! * [AvlTree::insert_as_left_subtree], [AvlTree::insert_as_right_subtree],
//!   graft a detached subtree.
//! * [AvlTree::dfs], lazy in-order traversal.
//!
//! [DictAvl]: crate::DictAvl

use std::{
    borrow::Borrow,
    cmp::{self, Ordering},
    fmt, marker,
    ops::{Bound, RangeBounds},
};

use crate::{
    arena::Arena,
    node::{NodeId, EMPTY_HEIGHT},
    Error, Result,
};

pub const MAX_TREE_DEPTH: usize = 100;

/// Return the cached height of `node`, [EMPTY_HEIGHT] for an empty subtree.
#[inline]
pub(crate) fn height<K, V>(arena: &Arena<K, V>, node: Option<NodeId>) -> isize {
    node.map_or(EMPTY_HEIGHT, |id| arena[id].height)
}

/// Recompute the cached height of `node` from its children. Children's
/// heights must already be up to date.
#[inline]
pub(crate) fn update_height<K, V>(arena: &mut Arena<K, V>, node: NodeId) {
    let (left, right) = (arena[node].left, arena[node].right);
    let h = 1 + cmp::max(height(arena, left), height(arena, right));
    arena[node].height = h;
}

/// Return the balance factor, height(left) - height(right), for `node`.
#[inline]
pub(crate) fn balance<K, V>(arena: &Arena<K, V>, node: NodeId) -> isize {
    let node_ref = &arena[node];
    height(arena, node_ref.left) - height(arena, node_ref.right)
}

/// AvlTree is a handle to the root of a tree whose nodes are held by an
/// [Arena].
///
/// An AvlTree value carries ownership of its nodes, handing it to another
/// tree, via [AvlTree::insert_as_left_subtree] or
/// [AvlTree::insert_as_right_subtree], consumes the handle.
pub struct AvlTree {
    arena_id: usize,
    root: Option<NodeId>,
}

impl fmt::Debug for AvlTree {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "AvlTree<{},{:?}>", self.arena_id, self.root)
    }
}

impl AvlTree {
    /// Create an empty tree in `arena`.
    pub fn new<K, V>(arena: &Arena<K, V>) -> AvlTree {
        AvlTree {
            arena_id: arena.to_id(),
            root: None,
        }
    }

    pub(crate) fn from_root(arena_id: usize, root: Option<NodeId>) -> AvlTree {
        AvlTree { arena_id, root }
    }

    #[inline]
    pub fn to_root(&self) -> Option<NodeId> {
        self.root
    }

    #[inline]
    pub fn to_arena_id(&self) -> usize {
        self.arena_id
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    /// Height of the whole tree, [EMPTY_HEIGHT] when empty.
    pub fn to_height<K, V>(&self, arena: &Arena<K, V>) -> Result<isize> {
        self.check_arena(arena)?;
        Ok(height(arena, self.root))
    }

    pub(crate) fn set_root<K, V>(&mut self, arena: &mut Arena<K, V>, root: Option<NodeId>) {
        if let Some(id) = root {
            arena[id].parent = None;
        }
        self.root = root;
    }

    pub(crate) fn check_arena<K, V>(&self, arena: &Arena<K, V>) -> Result<()> {
        if self.arena_id != arena.to_id() {
            let (a, b) = (self.arena_id, arena.to_id());
            err_at!(InvalidNode, msg: "tree belongs to arena {} not {}", a, b)?
        }
        Ok(())
    }

    /// Check whether `node` is part of this tree, walks up to the root.
    pub fn contains_node<K, V>(&self, arena: &Arena<K, V>, node: NodeId) -> bool {
        if self.arena_id != arena.to_id() || !arena.contains(node) {
            return false;
        }
        let mut top = node;
        while let Some(parent) = arena[top].parent {
            top = parent;
        }
        self.root == Some(top)
    }

    pub(crate) fn check_node<K, V>(&self, arena: &Arena<K, V>, node: NodeId) -> Result<()> {
        self.check_arena(arena)?;
        if !self.contains_node(arena, node) {
            err_at!(InvalidNode, msg: "{:?} not in {:?}", node, self)?
        }
        Ok(())
    }
}

/// Rotation and upward rebalancing.
impl AvlTree {
    /// Restore local AVL balance at `node` with a single or double
    /// rotation, return the root of the subtree that now occupies
    /// `node`'s position. No-op, returning `node`, when the balance factor
    /// is within [-1, 1].
    ///
    /// Children of `node` must have correct cached heights.
    pub(crate) fn rotate<K, V>(&mut self, arena: &mut Arena<K, V>, node: NodeId) -> NodeId {
        let bf = balance(arena, node);
        let top = if bf > 1 {
            let left = node_left(arena, node);
            if balance(arena, left) < 0 {
                tracing::trace!(?node, "rotate left-right");
                rotate_left(arena, left);
            } else {
                tracing::trace!(?node, "rotate left-left");
            }
            rotate_right(arena, node)
        } else if bf < -1 {
            let right = node_right(arena, node);
            if balance(arena, right) > 0 {
                tracing::trace!(?node, "rotate right-left");
                rotate_right(arena, right);
            } else {
                tracing::trace!(?node, "rotate right-right");
            }
            rotate_left(arena, node)
        } else {
            return node;
        };

        if arena[top].parent.is_none() {
            self.root = Some(top);
        }
        top
    }

    /// Walk from `from` up to the root, updating heights and rotating
    /// every ancestor on the way.
    pub(crate) fn rebalance<K, V>(&mut self, arena: &mut Arena<K, V>, from: Option<NodeId>) {
        let mut node = from;
        while let Some(id) = node {
            update_height(arena, id);
            let top = self.rotate(arena, id);
            node = arena[top].parent;
        }
    }
}

/// Cut and graft primitives.
impl AvlTree {
    /// Detach the left subtree of `node` and return it as a tree of its
    /// own. Heights along the path to the root are not updated.
    pub fn cut_left<K, V>(&mut self, arena: &mut Arena<K, V>, node: NodeId) -> Result<AvlTree> {
        self.check_node(arena, node)?;
        match arena[node].left.take() {
            Some(child) => {
                arena[child].parent = None;
                Ok(AvlTree::from_root(self.arena_id, Some(child)))
            }
            None => err_at!(EmptySubtree, msg: "cut_left {:?} has no left subtree", node),
        }
    }

    /// Detach the right subtree of `node` and return it as a tree of its
    /// own. Heights along the path to the root are not updated.
    pub fn cut_right<K, V>(&mut self, arena: &mut Arena<K, V>, node: NodeId) -> Result<AvlTree> {
        self.check_node(arena, node)?;
        match arena[node].right.take() {
            Some(child) => {
                arena[child].parent = None;
                Ok(AvlTree::from_root(self.arena_id, Some(child)))
            }
            None => err_at!(EmptySubtree, msg: "cut_right {:?} has no right subtree", node),
        }
    }

    /// Attach `subtree` as the left child of `node`, consuming it. An
    /// existing left child is overwritten, detach it first with
    /// [AvlTree::cut_left]. Does not rebalance.
    pub fn insert_as_left_subtree<K, V>(
        &mut self,
        arena: &mut Arena<K, V>,
        node: NodeId,
        subtree: AvlTree,
    ) -> Result<()> {
        self.check_node(arena, node)?;
        subtree.check_arena(arena)?;
        if let Some(child) = subtree.root {
            arena[child].parent = Some(node);
        }
        arena[node].left = subtree.root;
        Ok(())
    }

    /// Attach `subtree` as the right child of `node`, consuming it. An
    /// existing right child is overwritten, detach it first with
    /// [AvlTree::cut_right]. Does not rebalance.
    pub fn insert_as_right_subtree<K, V>(
        &mut self,
        arena: &mut Arena<K, V>,
        node: NodeId,
        subtree: AvlTree,
    ) -> Result<()> {
        self.check_node(arena, node)?;
        subtree.check_arena(arena)?;
        if let Some(child) = subtree.root {
            arena[child].parent = Some(node);
        }
        arena[node].right = subtree.root;
        Ok(())
    }
}

/// Traversal and validation.
impl AvlTree {
    /// Return a lazy in-order iterator over the subtree rooted at `node`.
    /// The iterator is `Clone`, cloning it restarts from the same point.
    pub fn dfs<'a, K, V>(
        &self,
        arena: &'a Arena<K, V>,
        node: Option<NodeId>,
    ) -> Result<Iter<'a, K, V>> {
        match node {
            Some(id) => self.check_node(arena, id)?,
            None => self.check_arena(arena)?,
        }

        let mut paths = Vec::default();
        build_iter(arena, IFlag::Left, node, &mut paths);
        Ok(Iter {
            arena,
            paths,
            reverse: false,
        })
    }

    /// Return an iterator over all entries in this tree.
    pub fn iter<'a, K, V>(&self, arena: &'a Arena<K, V>) -> Result<Iter<'a, K, V>> {
        self.dfs(arena, self.root)
    }

    /// Range over all entries from low to high.
    pub fn range<'a, K, V, R, Q>(
        &self,
        arena: &'a Arena<K, V>,
        range: R,
    ) -> Result<Range<'a, K, V, R, Q>>
    where
        K: Borrow<Q>,
        R: RangeBounds<Q>,
        Q: Ord + ?Sized,
    {
        self.check_arena(arena)?;

        let mut paths = Vec::default();
        match range.start_bound() {
            Bound::Unbounded => build_iter(arena, IFlag::Left, self.root, &mut paths),
            Bound::Included(low) => find_start(arena, self.root, low, true, &mut paths),
            Bound::Excluded(low) => find_start(arena, self.root, low, false, &mut paths),
        };
        let iter = Iter {
            arena,
            paths,
            reverse: false,
        };

        Ok(Range {
            range,
            iter,
            fin: false,
            high: marker::PhantomData,
        })
    }

    /// Reverse range over all entries from high to low.
    pub fn reverse<'a, K, V, R, Q>(
        &self,
        arena: &'a Arena<K, V>,
        range: R,
    ) -> Result<Reverse<'a, K, V, R, Q>>
    where
        K: Borrow<Q>,
        R: RangeBounds<Q>,
        Q: Ord + ?Sized,
    {
        self.check_arena(arena)?;

        let mut paths = Vec::default();
        match range.end_bound() {
            Bound::Unbounded => build_iter(arena, IFlag::Right, self.root, &mut paths),
            Bound::Included(high) => find_end(arena, self.root, high, true, &mut paths),
            Bound::Excluded(high) => find_end(arena, self.root, high, false, &mut paths),
        };
        let iter = Iter {
            arena,
            paths,
            reverse: true,
        };

        Ok(Reverse {
            range,
            iter,
            fin: false,
            low: marker::PhantomData,
        })
    }

    /// Validate AVL tree with following rules:
    ///
    /// * Keys are in sorted order.
    /// * Heights of sibling subtrees differ at most by one.
    /// * Cached height of every node matches its children.
    /// * Every child points back to its parent, root has no parent.
    ///
    /// Return the number of nodes in the tree.
    pub fn validate<K, V>(&self, arena: &Arena<K, V>) -> Result<usize>
    where
        K: Ord + fmt::Debug,
    {
        self.check_arena(arena)?;
        if let Some(root) = self.root {
            match arena.get(root) {
                Some(node) if node.parent.is_some() => {
                    err_at!(Fatal, msg: "root {:?} has parent {:?}", root, node.parent)?
                }
                Some(_) => (),
                None => err_at!(Fatal, msg: "stale root {:?}", root)?,
            }
        }
        let (_, n_count) = validate_tree(arena, self.root, None, None, None, 0)?;
        Ok(n_count)
    }
}

// Node handles of the subtree at `node`, in key order.
pub(crate) fn in_order_ids<K, V>(arena: &Arena<K, V>, node: Option<NodeId>) -> Vec<NodeId> {
    let (mut ids, mut stack) = (Vec::default(), Vec::default());
    let mut node = node;
    loop {
        while let Some(id) = node {
            stack.push(id);
            node = arena[id].left;
        }
        match stack.pop() {
            Some(id) => {
                ids.push(id);
                node = arena[id].right;
            }
            None => break ids,
        }
    }
}

#[inline]
fn node_left<K, V>(arena: &Arena<K, V>, node: NodeId) -> NodeId {
    match arena[node].left {
        Some(left) => left,
        None => panic!("rotate(): left heavy {:?} without left child", node),
    }
}

#[inline]
fn node_right<K, V>(arena: &Arena<K, V>, node: NodeId) -> NodeId {
    match arena[node].right {
        Some(right) => right,
        None => panic!("rotate(): right heavy {:?} without right child", node),
    }
}

// Point the parent of `old`, if any, to `new`.
pub(crate) fn replace_child<K, V>(
    arena: &mut Arena<K, V>,
    parent: Option<NodeId>,
    old: NodeId,
    new: Option<NodeId>,
) {
    if let Some(parent) = parent {
        let pnode = &mut arena[parent];
        if pnode.left == Some(old) {
            pnode.left = new;
        } else {
            pnode.right = new;
        }
    }
    if let Some(new) = new {
        arena[new].parent = parent;
    }
}

//              (p)                       (p)
//               |                         |
//              node                       x
//              /  \                      / \
//             /    \                    /   \
//            /      \                  /     \
//          left      x              node      xr
//                   / \             /  \
//                 xl   xr        left   xl
//
fn rotate_left<K, V>(arena: &mut Arena<K, V>, node: NodeId) -> NodeId {
    let x = node_right(arena, node);
    let parent = arena[node].parent;

    let xl = arena[x].left;
    arena[node].right = xl;
    if let Some(xl) = xl {
        arena[xl].parent = Some(node);
    }

    replace_child(arena, parent, node, Some(x));
    arena[x].left = Some(node);
    arena[node].parent = Some(x);

    update_height(arena, node);
    update_height(arena, x);
    x
}

//              (p)                       (p)
//               |                         |
//              node                       x
//              /  \                      / \
//             /    \                    /   \
//            /      \                  /     \
//           x      right             xl      node
//          / \                               / \
//        xl   xr                           xr  right
//
fn rotate_right<K, V>(arena: &mut Arena<K, V>, node: NodeId) -> NodeId {
    let x = node_left(arena, node);
    let parent = arena[node].parent;

    let xr = arena[x].right;
    arena[node].left = xr;
    if let Some(xr) = xr {
        arena[xr].parent = Some(node);
    }

    replace_child(arena, parent, node, Some(x));
    arena[x].right = Some(node);
    arena[node].parent = Some(x);

    update_height(arena, node);
    update_height(arena, x);
    x
}

// return (height, n_count) for subtree at `node`.
fn validate_tree<K, V>(
    arena: &Arena<K, V>,
    node: Option<NodeId>,
    parent: Option<NodeId>,
    low: Option<&K>,
    high: Option<&K>,
    depth: usize,
) -> Result<(isize, usize)>
where
    K: Ord + fmt::Debug,
{
    let id = match node {
        Some(id) => id,
        None => return Ok((EMPTY_HEIGHT, 0)),
    };
    let node = match arena.get(id) {
        Some(node) => node,
        None => err_at!(Fatal, msg: "stale node {:?} under {:?}", id, parent)?,
    };

    if depth > MAX_TREE_DEPTH {
        err_at!(Fatal, msg: "tree exceeds max_depth {}", depth)?;
    }
    if node.parent != parent {
        err_at!(Fatal, msg: "{:?} parent {:?} != {:?}", id, node.parent, parent)?;
    }

    // confirm sort order in the tree.
    if let Some(low) = low {
        if node.key.le(low) {
            err_at!(Fatal, msg: "sort key:{:?} low:{:?}", node.key, low)?;
        }
    }
    if let Some(high) = high {
        if node.key.ge(high) {
            err_at!(Fatal, msg: "sort key:{:?} high:{:?}", node.key, high)?;
        }
    }

    let (lh, ln) = validate_tree(arena, node.left, Some(id), low, Some(&node.key), depth + 1)?;
    let (rh, rn) = validate_tree(arena, node.right, Some(id), Some(&node.key), high, depth + 1)?;

    if (lh - rh).abs() > 1 {
        err_at!(Fatal, msg: "unbalanced {:?} key:{:?} l:{} r:{}", id, node.key, lh, rh)?;
    }
    let h = 1 + cmp::max(lh, rh);
    if node.height != h {
        err_at!(Fatal, msg: "height {:?} key:{:?} {} != {}", id, node.key, node.height, h)?;
    }

    Ok((h, ln + rn + 1))
}

#[derive(Copy, Clone)]
enum IFlag {
    Left,
    Center,
    Right,
}

#[derive(Copy, Clone)]
struct Fragment {
    flag: IFlag,
    node: NodeId,
}

/// In-order iterator over a subtree, yields `(&key, &value)`.
pub struct Iter<'a, K, V> {
    arena: &'a Arena<K, V>,
    paths: Vec<Fragment>,
    reverse: bool,
}

impl<'a, K, V> Clone for Iter<'a, K, V> {
    fn clone(&self) -> Self {
        Iter {
            arena: self.arena,
            paths: self.paths.clone(),
            reverse: self.reverse,
        }
    }
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        let arena = self.arena;
        loop {
            let path = self.paths.last_mut()?;
            match (path.flag, self.reverse) {
                (IFlag::Left, false) | (IFlag::Right, true) => {
                    path.flag = IFlag::Center;
                    let node = &arena[path.node];
                    break Some((&node.key, &node.value));
                }
                (IFlag::Center, false) => {
                    path.flag = IFlag::Right;
                    let right = arena[path.node].right;
                    build_iter(arena, IFlag::Left, right, &mut self.paths)
                }
                (IFlag::Center, true) => {
                    path.flag = IFlag::Left;
                    let left = arena[path.node].left;
                    build_iter(arena, IFlag::Right, left, &mut self.paths)
                }
                (IFlag::Right, false) | (IFlag::Left, true) => {
                    self.paths.pop();
                }
            }
        }
    }
}

pub struct Range<'a, K, V, R, Q>
where
    Q: ?Sized,
{
    range: R,
    iter: Iter<'a, K, V>,
    fin: bool,
    high: marker::PhantomData<Q>,
}

impl<'a, K, V, R, Q> Iterator for Range<'a, K, V, R, Q>
where
    K: Borrow<Q>,
    Q: Ord + ?Sized,
    R: RangeBounds<Q>,
{
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        match self.fin {
            false => {
                let (key, val) = self.iter.next()?;
                let qkey: &Q = <K as Borrow<Q>>::borrow(key);
                match self.range.end_bound() {
                    Bound::Included(high) if qkey.le(high) => Some((key, val)),
                    Bound::Excluded(high) if qkey.lt(high) => Some((key, val)),
                    Bound::Unbounded => Some((key, val)),
                    Bound::Included(_) | Bound::Excluded(_) => {
                        self.fin = true;
                        None
                    }
                }
            }
            true => None,
        }
    }
}

pub struct Reverse<'a, K, V, R, Q>
where
    Q: ?Sized,
{
    range: R,
    iter: Iter<'a, K, V>,
    fin: bool,
    low: marker::PhantomData<Q>,
}

impl<'a, K, V, R, Q> Iterator for Reverse<'a, K, V, R, Q>
where
    K: Borrow<Q>,
    Q: Ord + ?Sized,
    R: RangeBounds<Q>,
{
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        match self.fin {
            false => {
                let (key, val) = self.iter.next()?;
                let qkey: &Q = <K as Borrow<Q>>::borrow(key);
                match self.range.start_bound() {
                    Bound::Included(low) if qkey.ge(low) => Some((key, val)),
                    Bound::Excluded(low) if qkey.gt(low) => Some((key, val)),
                    Bound::Unbounded => Some((key, val)),
                    Bound::Included(_) | Bound::Excluded(_) => {
                        self.fin = true;
                        None
                    }
                }
            }
            true => None,
        }
    }
}

fn build_iter<K, V>(
    arena: &Arena<K, V>,
    flag: IFlag,
    node: Option<NodeId>,
    paths: &mut Vec<Fragment>,
) {
    let mut node = node;
    while let Some(id) = node {
        paths.push(Fragment { flag, node: id });
        node = match flag {
            IFlag::Left => arena[id].left,
            IFlag::Right => arena[id].right,
            IFlag::Center => unreachable!(),
        };
    }
}

fn find_start<K, V, Q>(
    arena: &Arena<K, V>,
    node: Option<NodeId>,
    low: &Q,
    incl: bool,
    paths: &mut Vec<Fragment>,
) where
    K: Borrow<Q>,
    Q: Ord + ?Sized,
{
    let mut node = node;
    while let Some(id) = node {
        let cmp = <K as Borrow<Q>>::borrow(&arena[id].key).cmp(low);

        let flag = match cmp {
            Ordering::Less => IFlag::Right,
            Ordering::Equal if incl => IFlag::Left,
            Ordering::Equal => IFlag::Center,
            Ordering::Greater => IFlag::Left,
        };
        paths.push(Fragment { flag, node: id });

        node = match cmp {
            Ordering::Equal => None,
            Ordering::Less => arena[id].right,
            Ordering::Greater => arena[id].left,
        };
    }
}

fn find_end<K, V, Q>(
    arena: &Arena<K, V>,
    node: Option<NodeId>,
    high: &Q,
    incl: bool,
    paths: &mut Vec<Fragment>,
) where
    K: Borrow<Q>,
    Q: Ord + ?Sized,
{
    let mut node = node;
    while let Some(id) = node {
        let cmp = <K as Borrow<Q>>::borrow(&arena[id].key).cmp(high);

        let flag = match cmp {
            Ordering::Less => IFlag::Right,
            Ordering::Equal if incl => IFlag::Right,
            Ordering::Equal => IFlag::Center,
            Ordering::Greater => IFlag::Left,
        };
        paths.push(Fragment { flag, node: id });

        node = match cmp {
            Ordering::Equal => None,
            Ordering::Less => arena[id].right,
            Ordering::Greater => arena[id].left,
        };
    }
}

#[cfg(test)]
#[path = "tree_test.rs"]
mod tree_test;
