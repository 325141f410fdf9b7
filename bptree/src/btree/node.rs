//! B+ tree node types.
//!
//! The tree has two node kinds:
//! - Inner nodes: store separator keys and child node ids
//! - Leaf nodes: store key-value tuples, singly linked to the next leaf for range scans
//!
//! Nodes never hold references to each other directly. Children and sibling
//! links are `NodeId`s into the owning [`NodeArena`](super::arena::NodeArena).

/// Handle of a node inside the arena.
pub type NodeId = usize;

/// Smallest order that gives non-degenerate half-full thresholds.
pub const MIN_ORDER: usize = 3;

/// Minimum occupancy of a non-root node for the given order.
///
/// This is `(order + 1) / 2` in integer arithmetic. A split of `order + 1`
/// entries always leaves both halves at or above it.
#[must_use]
pub const fn min_occupancy(order: usize) -> usize {
    order.div_ceil(2)
}

/// A key-value pair stored in a leaf.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tuple {
    pub key: Vec<u8>,
    pub value: Vec<u8>,
}

impl Tuple {
    #[must_use]
    pub const fn new(key: Vec<u8>, value: Vec<u8>) -> Self {
        Self { key, value }
    }
}

/// A leaf node.
///
/// Tuples are sorted ascending by key with no duplicates.
#[derive(Debug, Default)]
pub struct LeafNode {
    pub tuples: Vec<Tuple>,
    /// Next leaf in key order. Navigation only, the parent owns the sibling.
    pub next_leaf: Option<NodeId>,
}

/// An inner (routing) node.
///
/// Stores N separator keys and N+1 children.
/// `children[i]` holds keys < `keys[i]`,
/// `children[i + 1]` holds keys >= `keys[i]`.
#[derive(Debug, Default)]
pub struct InnerNode {
    pub keys: Vec<Vec<u8>>,
    pub children: Vec<NodeId>,
}

impl InnerNode {
    /// Create the single-separator node that becomes the root after a root split.
    #[must_use]
    pub fn with_children(left: NodeId, key: Vec<u8>, right: NodeId) -> Self {
        Self {
            keys: vec![key],
            children: vec![left, right],
        }
    }
}

/// Node kind discriminant, used in shape reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeType {
    Inner,
    Leaf,
}

/// A node of either kind.
#[derive(Debug)]
pub enum Node {
    Leaf(LeafNode),
    Inner(InnerNode),
}

impl Node {
    /// Number of occupied slots: tuples for a leaf, children for an inner node.
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Self::Leaf(leaf) => leaf.tuples.len(),
            Self::Inner(inner) => inner.children.len(),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether the node meets the minimum occupancy for `order`.
    ///
    /// Only meaningful for non-root nodes.
    #[must_use]
    pub fn is_half_full(&self, order: usize) -> bool {
        self.len() >= min_occupancy(order)
    }

    /// Whether the node can give one slot to a sibling and stay half-full.
    #[must_use]
    pub fn has_surplus(&self, order: usize) -> bool {
        self.len() > min_occupancy(order)
    }

    #[must_use]
    pub const fn node_type(&self) -> NodeType {
        match self {
            Self::Leaf(_) => NodeType::Leaf,
            Self::Inner(_) => NodeType::Inner,
        }
    }
}
