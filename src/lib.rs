//! Package implement an AVL ordered-dictionary and concatenation of two
//! such dictionaries.
//!
//! Quoting from [Wikipedia][avl]:
//!
//! > In an AVL tree, the heights of the two child subtrees of any node
//! > differ by at most one; if at any time they differ by more than one,
//! > rebalancing is done to restore this property.
//!
//! Following types and functions make up the package:
//!
//! * [Arena] holds the nodes for a forest of trees. Trees allocated in the
//!   same arena can be joined by relinking nodes, without copying them.
//! * [AvlTree] exposes cutting and grafting of subtrees, in-order
//!   traversal and validation.
//! * [DictAvl] is the ordered-dictionary, insert, lookup, delete, min/max,
//!   range scans and checked height/rotation bookkeeping.
//!
//! Every public operation taking a [NodeId] or an [Arena] rejects a stale
//! handle, or an arena other than the one the tree was built in, with
//! [Error::InvalidNode].
//! * [concatenation_dummy] joins two dictionaries by re-inserting every
//!   entry of the shorter tree into the taller one, O(m * log(n)).
//! * [concatenation] joins two dictionaries whose key ranges are
//!   separated, splicing one tree into the spine of the other, O(log(n)).
//!
//! - Parametrised over `key-type` and `value-type`.
//! - Leaf height is 0, empty subtree height is [EMPTY_HEIGHT].
//! - No Durability guarantee.
//! - Not thread safe.
//!
//! Joining two range separated dictionaries:
//!
//! ```
//! use avljoin::{concatenation, Arena, DictAvl};
//!
//! let mut arena: Arena<u32, u32> = Arena::new();
//! let mut lesser = DictAvl::build(&mut arena, (1..4).map(|k| (k, k))).unwrap();
//! let mut greater = DictAvl::build(&mut arena, (10..180).step_by(10).map(|k| (k, k))).unwrap();
//!
//! let joined = concatenation(&mut arena, &mut lesser, &mut greater).unwrap();
//! assert_eq!(joined.len(), 20);
//! assert!(lesser.is_empty() && greater.is_empty());
//! joined.validate(&arena).unwrap();
//! ```
//!
//! [avl]: https://en.wikipedia.org/wiki/AVL_tree

use std::{error, fmt, result};

// Short form to compose Error values.
//
// Here are few possible ways:
//
// ```ignore
// use crate::Error;
// err_at!(InvalidNode, msg: format!("bad argument"));
// ```
//
// ```ignore
// use crate::Error;
// err_at!(Fatal, tree.validate(&arena));
// ```
//
// ```ignore
// use crate::Error;
// err_at!(Fatal, tree.validate(&arena), format!("after join"));
// ```
//
macro_rules! err_at {
    ($v:ident, msg: $($arg:expr),+) => {{
        let prefix = format!("{}:{}", file!(), line!());
        Err(Error::$v(prefix, format!($($arg),+)))
    }};
    ($v:ident, $e:expr) => {{
        match $e {
            Ok(val) => Ok(val),
            Err(err) => {
                let prefix = format!("{}:{}", file!(), line!());
                Err(Error::$v(prefix, format!("{}", err)))
            }
        }
    }};
    ($v:ident, $e:expr, $($arg:expr),+) => {{
        match $e {
            Ok(val) => Ok(val),
            Err(err) => {
                let prefix = format!("{}:{}", file!(), line!());
                let msg = format!($($arg),+);
                Err(Error::$v(prefix, format!("{} {}", err, msg)))
            }
        }
    }};
}

mod arena;
mod concat;
mod dict;
mod node;
mod tree;

pub use arena::Arena;
pub use concat::{concatenation, concatenation_dummy, join};
pub use dict::DictAvl;
pub use node::{Node, NodeId, EMPTY_HEIGHT};
pub use tree::{AvlTree, Iter, Range, Reverse};

/// Error variants that are returned by this package's API.
///
/// Each variant carries a prefix, typically identifying the
/// error location.
pub enum Error {
    /// Broken tree invariant, detected by validation.
    Fatal(String, String),
    /// Node handle is stale, or does not belong to the tree/arena.
    InvalidNode(String, String),
    /// Operation needs a subtree that is absent.
    EmptySubtree(String, String),
    /// Trees handed to a structural join are too small or their key
    /// ranges are not separated.
    PreconditionViolation(String, String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> result::Result<(), fmt::Error> {
        use Error::*;

        match self {
            Fatal(p, msg) => write!(f, "{} Fatal: {}", p, msg),
            InvalidNode(p, msg) => write!(f, "{} InvalidNode: {}", p, msg),
            EmptySubtree(p, msg) => write!(f, "{} EmptySubtree: {}", p, msg),
            PreconditionViolation(p, msg) => {
                write!(f, "{} PreconditionViolation: {}", p, msg)
            }
        }
    }
}

impl fmt::Debug for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> result::Result<(), fmt::Error> {
        write!(f, "{}", self)
    }
}

impl error::Error for Error {}

/// Type alias for Result return type, used by this package.
pub type Result<T> = result::Result<T, Error>;
