use std::fmt;

/// Height of an empty subtree. A leaf has height 0.
pub const EMPTY_HEIGHT: isize = -1;

/// Handle to a node stored in an [Arena][crate::Arena].
///
/// Handles are cheap to copy. A handle outlives the node it points to,
/// once the node is deleted its slot generation moves on and the handle
/// is rejected as stale.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId {
    pub(crate) index: usize,
    pub(crate) generation: u32,
}

impl fmt::Debug for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "NodeId({}@{})", self.index, self.generation)
    }
}

/// Node corresponds to a single entry in an AVL tree.
#[derive(Clone)]
pub struct Node<K, V> {
    pub(crate) key: K,
    pub(crate) value: V,
    pub(crate) height: isize,            // store: cached subtree height
    pub(crate) left: Option<NodeId>,     // store: left child
    pub(crate) right: Option<NodeId>,    // store: right child
    pub(crate) parent: Option<NodeId>,   // store: parent, not owning
}

impl<K, V> Node<K, V> {
    pub(crate) fn new(key: K, value: V) -> Node<K, V> {
        Node {
            key,
            value,
            height: 0,
            left: None,
            right: None,
            parent: None,
        }
    }

    #[inline]
    pub fn as_key(&self) -> &K {
        &self.key
    }

    #[inline]
    pub fn as_value(&self) -> &V {
        &self.value
    }

    #[inline]
    pub fn to_height(&self) -> isize {
        self.height
    }

    #[inline]
    pub fn to_left(&self) -> Option<NodeId> {
        self.left
    }

    #[inline]
    pub fn to_right(&self) -> Option<NodeId> {
        self.right
    }

    #[inline]
    pub fn to_parent(&self) -> Option<NodeId> {
        self.parent
    }

    #[inline]
    pub fn is_leaf(&self) -> bool {
        self.left.is_none() && self.right.is_none()
    }

    #[inline]
    pub(crate) fn set_value(&mut self, value: V) -> V {
        std::mem::replace(&mut self.value, value)
    }

    pub(crate) fn into_entry(self) -> (K, V) {
        (self.key, self.value)
    }
}

#[cfg(test)]
#[path = "node_test.rs"]
mod node_test;
