//! Module provide ordered-dictionary implemented by [DictAvl] type.
//!
//! DictAvl is implemented using an [AVL][wiki-avl] tree whose nodes are
//! held by an [Arena].
//!
//! - Each entry in DictAvl instance correspond to a {Key, Value} pair.
//! - Parametrised over `key-type` and `value-type`.
//! - CRUD operations, via insert(), get(), remove(), delete_node() api.
//! - Full table scan, to iterate over all entries.
//! - Range scan, to iterate between a ``low`` and ``high``.
//! - Reverse iteration.
//! - No Durability guarantee.
//! - Not thread safe.
//!
//! CRUD operations on [DictAvl] instance:
//!
//! ```
//! use avljoin::{Arena, DictAvl};
//!
//! let mut arena: Arena<String, String> = Arena::new();
//! let mut index = DictAvl::new(&arena);
//!
//! index.insert(&mut arena, "key1".to_string(), "value1".to_string()).unwrap();
//! index.insert(&mut arena, "key2".to_string(), "value2".to_string()).unwrap();
//! let old = index.insert(&mut arena, "key2".to_string(), "value3".to_string()).unwrap();
//! assert_eq!(old, Some("value2".to_string()));
//! assert_eq!(index.len(), 2);
//!
//! assert_eq!(index.get(&arena, "key1"), Some(&"value1".to_string()));
//! assert_eq!(index.get(&arena, "key2"), Some(&"value3".to_string()));
//!
//! let old_value = index.remove(&mut arena, "key1").unwrap();
//! assert_eq!(old_value, Some("value1".to_string()));
//! ```
//!
//! Deleting the smallest entry:
//!
//! ```
//! use avljoin::{Arena, DictAvl};
//!
//! let mut arena: Arena<u32, u32> = Arena::new();
//! let mut index = DictAvl::build(&mut arena, vec![(3, 30), (1, 10), (2, 20)]).unwrap();
//!
//! let min = index.min_key_son(&arena, index.to_root()).unwrap();
//! assert_eq!(index.delete_node(&mut arena, min).unwrap(), (1, 10));
//! let items: Vec<(&u32, &u32)> = index.iter(&arena).unwrap().collect();
//! assert_eq!(items, vec![(&2, &20), (&3, &30)]);
//! ```
//!
//! [wiki-avl]: https://en.wikipedia.org/wiki/AVL_tree

use std::{borrow::Borrow, cmp::Ordering, fmt, mem, ops::RangeBounds};

use crate::{
    arena::Arena,
    node::NodeId,
    tree::{self, replace_child, AvlTree, Iter, Range, Reverse},
    Error, Result,
};

/// DictAvl manage a single ordered-dictionary, its nodes live in an
/// [Arena] that is passed to every operation.
pub struct DictAvl {
    tree: AvlTree,
    n_count: usize, // number of entries in the tree.
}

impl fmt::Debug for DictAvl {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "DictAvl<{:?},{}>", self.tree, self.n_count)
    }
}

impl DictAvl {
    /// Create an empty instance of DictAvl in `arena`.
    pub fn new<K, V>(arena: &Arena<K, V>) -> DictAvl {
        DictAvl {
            tree: AvlTree::new(arena),
            n_count: Default::default(),
        }
    }

    /// Create a DictAvl from a sequence of {key, value} pairs. Later
    /// pairs overwrite earlier ones for the same key.
    pub fn build<K, V, I>(arena: &mut Arena<K, V>, items: I) -> Result<DictAvl>
    where
        K: Ord,
        I: IntoIterator<Item = (K, V)>,
    {
        let mut index = DictAvl::new(arena);
        index.extend(arena, items)?;
        Ok(index)
    }

    pub(crate) fn from_parts(tree: AvlTree, n_count: usize) -> DictAvl {
        DictAvl { tree, n_count }
    }

    pub(crate) fn into_tree(self) -> AvlTree {
        self.tree
    }

    pub(crate) fn as_mut_tree(&mut self) -> &mut AvlTree {
        &mut self.tree
    }

    // Hand over the tree, leaving this instance empty.
    pub(crate) fn take(&mut self) -> DictAvl {
        let arena_id = self.tree.to_arena_id();
        let empty = DictAvl::from_parts(AvlTree::from_root(arena_id, None), 0);
        mem::replace(self, empty)
    }
}

/// Maintenance API.
impl DictAvl {
    /// Return number of entries in this instance.
    #[inline]
    pub fn len(&self) -> usize {
        self.n_count
    }

    /// Check whether this index is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.n_count == 0
    }

    #[inline]
    pub fn to_root(&self) -> Option<NodeId> {
        self.tree.to_root()
    }

    #[inline]
    pub fn as_tree(&self) -> &AvlTree {
        &self.tree
    }

    /// Height of this tree, [EMPTY_HEIGHT][crate::EMPTY_HEIGHT] when empty.
    pub fn to_height<K, V>(&self, arena: &Arena<K, V>) -> Result<isize> {
        self.tree.to_height(arena)
    }

    /// Height of the subtree rooted at `node`, `node` must belong to this
    /// tree.
    pub fn height<K, V>(&self, arena: &Arena<K, V>, node: Option<NodeId>) -> Result<isize> {
        match node {
            Some(id) => self.tree.check_node(arena, id)?,
            None => self.tree.check_arena(arena)?,
        }
        Ok(tree::height(arena, node))
    }

    /// Recompute the cached height of `node` from its children.
    pub fn update_height<K, V>(&self, arena: &mut Arena<K, V>, node: NodeId) -> Result<()> {
        self.tree.check_node(arena, node)?;
        tree::update_height(arena, node);
        Ok(())
    }

    /// Rebalance at `node`, refer to [AvlTree::rotate].
    pub fn rotate<K, V>(&mut self, arena: &mut Arena<K, V>, node: NodeId) -> Result<NodeId> {
        self.tree.check_node(arena, node)?;
        Ok(self.tree.rotate(arena, node))
    }

    /// Validate the AVL invariants of this tree and its entry count.
    pub fn validate<K, V>(&self, arena: &Arena<K, V>) -> Result<()>
    where
        K: Ord + fmt::Debug,
    {
        let n_count = self.tree.validate(arena)?;
        if n_count != self.n_count {
            err_at!(Fatal, msg: "n_count {} != {}", n_count, self.n_count)?;
        }
        Ok(())
    }
}

/// Write API.
impl DictAvl {
    /// Insert {key, value} into this instance. If there is an existing
    /// entry for key, overwrite the old value with new value and return
    /// the old value.
    pub fn insert<K, V>(&mut self, arena: &mut Arena<K, V>, key: K, value: V) -> Result<Option<V>>
    where
        K: Ord,
    {
        self.tree.check_arena(arena)?;

        let (mut parent, mut node) = (None, self.tree.to_root());
        while let Some(id) = node {
            let nref = &arena[id];
            node = match nref.key.cmp(&key) {
                Ordering::Greater => {
                    parent = Some((id, true));
                    nref.left
                }
                Ordering::Less => {
                    parent = Some((id, false));
                    nref.right
                }
                Ordering::Equal => return Ok(Some(arena[id].set_value(value))),
            };
        }

        let id = arena.alloc(key, value);
        match parent {
            None => self.tree.set_root(arena, Some(id)),
            Some((pid, true)) => {
                arena[pid].left = Some(id);
                arena[id].parent = Some(pid);
            }
            Some((pid, false)) => {
                arena[pid].right = Some(id);
                arena[id].parent = Some(pid);
            }
        }
        self.n_count += 1;

        self.tree.rebalance(arena, parent.map(|(pid, _)| pid));
        Ok(None)
    }

    /// Insert every {key, value} pair from `items`.
    pub fn extend<K, V, I>(&mut self, arena: &mut Arena<K, V>, items: I) -> Result<()>
    where
        K: Ord,
        I: IntoIterator<Item = (K, V)>,
    {
        for (key, value) in items {
            self.insert(arena, key, value)?;
        }
        Ok(())
    }

    /// Remove `node`, located earlier via [DictAvl::find],
    /// [DictAvl::min_key_son] or [DictAvl::max_key_son], and return its
    /// {key, value}.
    ///
    /// When `node` has two children its entry is exchanged with the
    /// in-order successor's and the successor's slot is released, so
    /// `node` stays valid holding the successor's entry while handles to
    /// the successor go stale.
    pub fn delete_node<K, V>(&mut self, arena: &mut Arena<K, V>, node: NodeId) -> Result<(K, V)> {
        self.tree.check_node(arena, node)?;

        let victim = match (arena[node].left, arena[node].right) {
            (Some(_), Some(right)) => {
                let succ = leftmost(arena, right);
                arena.swap_entries(node, succ);
                succ
            }
            _ => node,
        };

        let child = arena[victim].left.or(arena[victim].right);
        let parent = arena[victim].parent;
        match parent {
            Some(_) => replace_child(arena, parent, victim, child),
            None => self.tree.set_root(arena, child),
        }

        let entry = match arena.free(victim) {
            Some(vnode) => vnode.into_entry(),
            None => err_at!(Fatal, msg: "delete_node {:?} stale victim", victim)?,
        };
        self.n_count -= 1;

        self.tree.rebalance(arena, parent);
        Ok(entry)
    }

    /// Remove key from this instance and return its value. If key is
    /// not present, then remove is effectively a no-op.
    pub fn remove<K, V, Q>(&mut self, arena: &mut Arena<K, V>, key: &Q) -> Result<Option<V>>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.tree.check_arena(arena)?;
        match self.find(arena, key) {
            Some(node) => Ok(Some(self.delete_node(arena, node)?.1)),
            None => Ok(None),
        }
    }
}

/// Read API.
impl DictAvl {
    /// Locate the node holding `key`. Return None when missing, or when
    /// `arena` is not the one this instance lives in.
    pub fn find<K, V, Q>(&self, arena: &Arena<K, V>, key: &Q) -> Option<NodeId>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        if self.tree.to_arena_id() != arena.to_id() {
            return None;
        }

        let mut node = self.tree.to_root();
        while let Some(id) = node {
            let nref = &arena[id];
            node = match <K as Borrow<Q>>::borrow(&nref.key).cmp(key) {
                Ordering::Less => nref.right,
                Ordering::Greater => nref.left,
                Ordering::Equal => return Some(id),
            };
        }
        None
    }

    /// Get the value for key.
    pub fn get<'a, K, V, Q>(&self, arena: &'a Arena<K, V>, key: &Q) -> Option<&'a V>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.find(arena, key).map(|id| arena[id].as_value())
    }

    /// Return the node with the smallest key under `node`.
    pub fn min_key_son<K, V>(&self, arena: &Arena<K, V>, node: Option<NodeId>) -> Result<NodeId> {
        match node {
            Some(id) => {
                self.tree.check_node(arena, id)?;
                Ok(leftmost(arena, id))
            }
            None => err_at!(EmptySubtree, msg: "min_key_son on empty subtree"),
        }
    }

    /// Return the node with the largest key under `node`.
    pub fn max_key_son<K, V>(&self, arena: &Arena<K, V>, node: Option<NodeId>) -> Result<NodeId> {
        match node {
            Some(id) => {
                self.tree.check_node(arena, id)?;
                Ok(rightmost(arena, id))
            }
            None => err_at!(EmptySubtree, msg: "max_key_son on empty subtree"),
        }
    }

    /// Return an iterator over all entries in this instance.
    pub fn iter<'a, K, V>(&self, arena: &'a Arena<K, V>) -> Result<Iter<'a, K, V>> {
        self.tree.iter(arena)
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
        self.tree.range(arena, range)
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
        self.tree.reverse(arena, range)
    }
}

fn leftmost<K, V>(arena: &Arena<K, V>, mut node: NodeId) -> NodeId {
    while let Some(left) = arena[node].left {
        node = left;
    }
    node
}

fn rightmost<K, V>(arena: &Arena<K, V>, mut node: NodeId) -> NodeId {
    while let Some(right) = arena[node].right {
        node = right;
    }
    node
}

#[cfg(test)]
#[path = "dict_test.rs"]
mod dict_test;
