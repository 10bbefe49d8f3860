//! Module implement node storage shared by every tree of a forest.
//!
//! Trees built in the same [Arena] can exchange whole subtrees by
//! relinking node handles, which is what makes the structural join
//! logarithmic. Parent back-references are plain [NodeId] fields, so
//! there is no reference cycle to manage.

use std::{
    ops::{Index, IndexMut},
    sync::atomic::{AtomicUsize, Ordering},
};

use crate::node::{Node, NodeId};

static ARENA_ID: AtomicUsize = AtomicUsize::new(1);

struct Slot<K, V> {
    generation: u32,
    node: Option<Node<K, V>>,
}

/// Arena own the nodes of one or more AVL trees.
///
/// Not thread safe, mutations need exclusive access to the arena.
pub struct Arena<K, V> {
    id: usize,
    slots: Vec<Slot<K, V>>,
    free: Vec<usize>,
    n_live: usize, // number of allocated nodes.
}

impl<K, V> Default for Arena<K, V> {
    fn default() -> Arena<K, V> {
        Arena::new()
    }
}

impl<K, V> Arena<K, V> {
    /// Create an empty arena.
    pub fn new() -> Arena<K, V> {
        Arena {
            id: ARENA_ID.fetch_add(1, Ordering::Relaxed),
            slots: Vec::default(),
            free: Vec::default(),
            n_live: 0,
        }
    }

    /// Create an empty arena with room for `capacity` nodes.
    pub fn with_capacity(capacity: usize) -> Arena<K, V> {
        let mut arena = Arena::new();
        arena.slots.reserve(capacity);
        arena
    }

    /// Identify this arena, tree handles remember the arena they
    /// belong to.
    #[inline]
    pub fn to_id(&self) -> usize {
        self.id
    }

    /// Return number of live nodes, across all trees, in this arena.
    #[inline]
    pub fn len(&self) -> usize {
        self.n_live
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.n_live == 0
    }

    /// Return the node for `id`, None if the handle is stale or
    /// out of range.
    pub fn get(&self, id: NodeId) -> Option<&Node<K, V>> {
        match self.slots.get(id.index) {
            Some(slot) if slot.generation == id.generation => slot.node.as_ref(),
            _ => None,
        }
    }

    pub(crate) fn get_mut(&mut self, id: NodeId) -> Option<&mut Node<K, V>> {
        match self.slots.get_mut(id.index) {
            Some(slot) if slot.generation == id.generation => slot.node.as_mut(),
            _ => None,
        }
    }

    #[inline]
    pub fn contains(&self, id: NodeId) -> bool {
        self.get(id).is_some()
    }

    pub(crate) fn alloc(&mut self, key: K, value: V) -> NodeId {
        let node = Some(Node::new(key, value));
        self.n_live += 1;
        match self.free.pop() {
            Some(index) => {
                let slot = &mut self.slots[index];
                slot.node = node;
                NodeId {
                    index,
                    generation: slot.generation,
                }
            }
            None => {
                let index = self.slots.len();
                self.slots.push(Slot {
                    generation: 0,
                    node,
                });
                NodeId {
                    index,
                    generation: 0,
                }
            }
        }
    }

    // Release the slot. Links of the released node are not touched, caller
    // must have unlinked it from its tree.
    pub(crate) fn free(&mut self, id: NodeId) -> Option<Node<K, V>> {
        let slot = self.slots.get_mut(id.index)?;
        if slot.generation != id.generation {
            return None;
        }
        let node = slot.node.take()?;
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(id.index);
        self.n_live -= 1;
        Some(node)
    }

    // Exchange key and value between two live nodes, links stay in place.
    pub(crate) fn swap_entries(&mut self, a: NodeId, b: NodeId) {
        if a == b {
            return;
        }
        let mut x = match self.slots[a.index].node.take() {
            Some(x) => x,
            None => panic!("swap_entries(): stale node, call the programmer"),
        };
        match self.slots[b.index].node.as_mut() {
            Some(y) => {
                std::mem::swap(&mut x.key, &mut y.key);
                std::mem::swap(&mut x.value, &mut y.value);
            }
            None => panic!("swap_entries(): stale node, call the programmer"),
        }
        self.slots[a.index].node = Some(x);
    }
}

impl<K, V> Index<NodeId> for Arena<K, V> {
    type Output = Node<K, V>;

    fn index(&self, id: NodeId) -> &Node<K, V> {
        match self.get(id) {
            Some(node) => node,
            None => panic!("arena: stale node {:?}, call the programmer", id),
        }
    }
}

impl<K, V> IndexMut<NodeId> for Arena<K, V> {
    fn index_mut(&mut self, id: NodeId) -> &mut Node<K, V> {
        match self.get_mut(id) {
            Some(node) => node,
            None => panic!("arena: stale node {:?}, call the programmer", id),
        }
    }
}

#[cfg(test)]
#[path = "arena_test.rs"]
mod arena_test;
