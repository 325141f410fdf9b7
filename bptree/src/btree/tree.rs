//! The public B+ tree.
//!
//! A `Tree` owns its nodes through a [`NodeArena`] and the id of the root.
//! All operations (reads included) take one exclusive lock for their whole
//! duration, so a `Tree` can be shared between threads behind an `Arc`.
//!
//! The tree is the only place the root changes:
//! - a root split creates a new inner root with one separator (height + 1)
//! - an inner root left with a single child is replaced by it (height - 1)

use std::sync::{Mutex, MutexGuard};

use super::arena::{InsertResult, NodeArena};
use super::node::{InnerNode, LeafNode, MIN_ORDER, Node, NodeId};
use super::scan::Scan;
use super::validate::{StructuralViolation, TreeShape};

/// An in-memory B+ tree over byte-string keys and values.
#[derive(Debug)]
pub struct Tree {
    order: usize,
    state: Mutex<TreeState>,
}

/// Everything guarded by the tree lock.
#[derive(Debug)]
struct TreeState {
    arena: NodeArena,
    root: NodeId,
    len: usize,
}

impl Tree {
    /// Create an empty tree whose nodes hold at most `order` slots.
    ///
    /// # Errors
    ///
    /// Returns `TreeError::InvalidOrder` if `order` is below 3.
    pub fn new(order: usize) -> Result<Self, TreeError> {
        if order < MIN_ORDER {
            return Err(TreeError::InvalidOrder { order });
        }

        let mut arena = NodeArena::new(order);
        let root = arena.allocate(Node::Leaf(LeafNode::default()));

        Ok(Self {
            order,
            state: Mutex::new(TreeState {
                arena,
                root,
                len: 0,
            }),
        })
    }

    /// The maximum fan-out of every node.
    #[must_use]
    pub const fn order(&self) -> usize {
        self.order
    }

    fn lock(&self) -> Result<MutexGuard<'_, TreeState>, TreeError> {
        self.state.lock().map_err(|_| TreeError::LockPoisoned)
    }

    /// Insert a key, or overwrite the value of an existing one.
    pub fn set(&self, key: Vec<u8>, value: Vec<u8>) -> Result<(), TreeError> {
        let mut state = self.lock()?;
        let TreeState { arena, root, len } = &mut *state;

        let result = arena.insert(*root, key, value);
        if result.is_new_key() {
            *len += 1;
        }

        if let InsertResult::Split { key, right } = result {
            let old_root = *root;
            *root = arena.allocate(Node::Inner(InnerNode::with_children(old_root, key, right)));
            tracing::debug!(
                root = *root,
                height = arena.shape(*root).height,
                "root split, tree grew a level"
            );
        }

        Ok(())
    }

    /// Look up the value stored under `key`.
    pub fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, TreeError> {
        let state = self.lock()?;
        Ok(state.arena.get(state.root, key).map(<[u8]>::to_vec))
    }

    /// Remove `key` if present. Absent keys are a no-op.
    pub fn delete(&self, key: &[u8]) -> Result<(), TreeError> {
        let mut state = self.lock()?;
        let TreeState { arena, root, len } = &mut *state;

        if arena.remove(*root, key).is_some() {
            *len -= 1;
        }

        // Collapse an inner root that merged down to one child
        let only_child = match arena.node(*root) {
            Node::Inner(inner) if inner.children.len() == 1 => Some(inner.children[0]),
            _ => None,
        };
        if let Some(child) = only_child {
            let _ = arena.release(*root);
            *root = child;
            tracing::debug!(root = child, "root collapsed, tree shrank a level");
        }

        Ok(())
    }

    /// Values of every key in `start..=end`, in ascending key order.
    ///
    /// An inverted range (`start > end`) is empty.
    pub fn scan(&self, start: &[u8], end: &[u8]) -> Result<Vec<Vec<u8>>, TreeError> {
        let state = self.lock()?;
        Ok(Scan::new(&state.arena, state.root, start, end)
            .map(|tuple| tuple.value.clone())
            .collect())
    }

    /// Key-value pairs of every key in `start..=end`, in ascending key order.
    pub fn scan_entries(
        &self,
        start: &[u8],
        end: &[u8],
    ) -> Result<Vec<(Vec<u8>, Vec<u8>)>, TreeError> {
        let state = self.lock()?;
        Ok(Scan::new(&state.arena, state.root, start, end)
            .map(|tuple| (tuple.key.clone(), tuple.value.clone()))
            .collect())
    }

    /// Number of keys stored.
    pub fn len(&self) -> Result<usize, TreeError> {
        Ok(self.lock()?.len)
    }

    pub fn is_empty(&self) -> Result<bool, TreeError> {
        Ok(self.lock()?.len == 0)
    }

    /// Describe the current structure of the tree.
    pub fn shape(&self) -> Result<TreeShape, TreeError> {
        let state = self.lock()?;
        Ok(state.arena.shape(state.root))
    }

    /// Walk the whole tree and report every broken structural invariant.
    pub fn check_invariants(&self) -> Result<Vec<StructuralViolation>, TreeError> {
        let state = self.lock()?;
        Ok(state.arena.check(state.root))
    }
}

/// Errors returned by tree operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TreeError {
    /// The requested order is too small for meaningful half-full thresholds.
    InvalidOrder { order: usize },
    /// A previous operation panicked while holding the tree lock.
    LockPoisoned,
}

impl std::fmt::Display for TreeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidOrder { order } => {
                write!(f, "invalid tree order {order} (minimum {MIN_ORDER})")
            }
            Self::LockPoisoned => write!(f, "tree lock poisoned"),
        }
    }
}

impl std::error::Error for TreeError {}
