//! Node storage and the recursive tree algorithms.
//!
//! Every node lives in a slot of the [`NodeArena`]. A parent owns its children
//! through the ids in its `children` vector, and a leaf's `next_leaf` is a
//! plain id used only for navigation. Freed slots are recycled.
//!
//! Rebalancing needs two siblings mutably at once. Siblings are always
//! addressed as `(parent, position)` and borrowed through [`NodeArena::pair_mut`],
//! so no node ever holds a reference to another.

use super::leaf::LeafInsert;
use super::node::{InnerNode, LeafNode, Node, NodeId};

/// Result of inserting into a subtree.
#[derive(Debug, PartialEq, Eq)]
pub enum InsertResult {
    /// An existing key had its value replaced.
    Updated,
    /// A new key was added without splitting this subtree's root.
    Inserted,
    /// A new key was added and the subtree's root split.
    ///
    /// `key` is promoted into the parent as the separator in front of `right`.
    Split { key: Vec<u8>, right: NodeId },
}

impl InsertResult {
    /// Whether the insert added a key (as opposed to updating one).
    #[must_use]
    pub const fn is_new_key(&self) -> bool {
        !matches!(self, Self::Updated)
    }
}

/// Arena holding every node of one tree.
#[derive(Debug)]
pub struct NodeArena {
    order: usize,
    nodes: Vec<Option<Node>>,
    free: Vec<NodeId>,
}

impl NodeArena {
    /// Create an empty arena for nodes of the given order.
    #[must_use]
    pub const fn new(order: usize) -> Self {
        Self {
            order,
            nodes: Vec::new(),
            free: Vec::new(),
        }
    }

    /// The maximum fan-out shared by every node.
    #[must_use]
    pub const fn order(&self) -> usize {
        self.order
    }

    /// Number of live nodes.
    #[must_use]
    pub fn live_nodes(&self) -> usize {
        self.nodes.len() - self.free.len()
    }

    /// Store a node, reusing a freed slot when one exists.
    pub fn allocate(&mut self, node: Node) -> NodeId {
        if let Some(id) = self.free.pop() {
            self.nodes[id] = Some(node);
            id
        } else {
            self.nodes.push(Some(node));
            self.nodes.len() - 1
        }
    }

    /// Remove a node from the arena and return it.
    ///
    /// The caller must already have unlinked `id` from its parent and the leaf chain.
    pub fn release(&mut self, id: NodeId) -> Node {
        let Some(node) = self.nodes.get_mut(id).and_then(Option::take) else {
            panic!("released node {id} is not live");
        };
        self.free.push(id);
        node
    }

    #[must_use]
    pub fn node(&self, id: NodeId) -> &Node {
        match self.nodes.get(id) {
            Some(Some(node)) => node,
            _ => panic!("node {id} is not live"),
        }
    }

    pub fn node_mut(&mut self, id: NodeId) -> &mut Node {
        match self.nodes.get_mut(id) {
            Some(Some(node)) => node,
            _ => panic!("node {id} is not live"),
        }
    }

    #[must_use]
    pub fn leaf(&self, id: NodeId) -> &LeafNode {
        match self.node(id) {
            Node::Leaf(leaf) => leaf,
            Node::Inner(_) => panic!("node {id} is not a leaf"),
        }
    }

    fn leaf_mut(&mut self, id: NodeId) -> &mut LeafNode {
        match self.node_mut(id) {
            Node::Leaf(leaf) => leaf,
            Node::Inner(_) => panic!("node {id} is not a leaf"),
        }
    }

    #[must_use]
    pub fn inner(&self, id: NodeId) -> &InnerNode {
        match self.node(id) {
            Node::Inner(inner) => inner,
            Node::Leaf(_) => panic!("node {id} is not an inner node"),
        }
    }

    fn inner_mut(&mut self, id: NodeId) -> &mut InnerNode {
        match self.node_mut(id) {
            Node::Inner(inner) => inner,
            Node::Leaf(_) => panic!("node {id} is not an inner node"),
        }
    }

    /// Borrow two distinct nodes mutably, in argument order.
    fn pair_mut(&mut self, a: NodeId, b: NodeId) -> (&mut Node, &mut Node) {
        assert_ne!(a, b, "sibling pair must be two distinct nodes");
        let (low, high) = (a.min(b), a.max(b));
        let (head, tail) = self.nodes.split_at_mut(high);
        let (Some(Some(low_node)), Some(Some(high_node))) = (head.get_mut(low), tail.first_mut())
        else {
            panic!("sibling pair {a}/{b} is not live");
        };
        if a < b {
            (low_node, high_node)
        } else {
            (high_node, low_node)
        }
    }

    /// Child position and id to follow from `id` for `key`, or `None` at a leaf.
    #[must_use]
    pub fn route(&self, id: NodeId, key: &[u8]) -> Option<(usize, NodeId)> {
        match self.node(id) {
            Node::Leaf(_) => None,
            Node::Inner(inner) => {
                let pos = inner.lookup(key);
                Some((pos, inner.children[pos]))
            }
        }
    }

    /// Descend from `id` to the leaf that owns `key`.
    #[must_use]
    pub fn find_leaf(&self, mut id: NodeId, key: &[u8]) -> NodeId {
        while let Some((_, child)) = self.route(id, key) {
            id = child;
        }
        id
    }

    /// Look up a value by key in the subtree rooted at `id`.
    #[must_use]
    pub fn get(&self, id: NodeId, key: &[u8]) -> Option<&[u8]> {
        self.leaf(self.find_leaf(id, key)).get(key)
    }

    /// Insert or update a key in the subtree rooted at `id`.
    ///
    /// Splits propagate upward through the return value. The caller that
    /// owns `id` (a parent, or the tree for the root) links the new sibling.
    pub fn insert(&mut self, id: NodeId, key: Vec<u8>, value: Vec<u8>) -> InsertResult {
        let Some((pos, child)) = self.route(id, &key) else {
            return self.insert_into_leaf(id, key, value);
        };

        match self.insert(child, key, value) {
            InsertResult::Split { key, right } => self.insert_into_inner(id, pos + 1, key, right),
            other => other,
        }
    }

    fn insert_into_leaf(&mut self, id: NodeId, key: Vec<u8>, value: Vec<u8>) -> InsertResult {
        let order = self.order;
        let leaf = self.leaf_mut(id);

        match leaf.set(key, value, order) {
            LeafInsert::Updated => InsertResult::Updated,
            LeafInsert::Inserted => InsertResult::Inserted,
            LeafInsert::Split(mut right) => {
                // Splice the new leaf into the chain right after this one
                right.next_leaf = leaf.next_leaf;
                let key = right.first_key().to_vec();
                let right_id = self.allocate(Node::Leaf(right));
                self.leaf_mut(id).next_leaf = Some(right_id);

                tracing::trace!(left = id, right = right_id, "leaf split");
                InsertResult::Split { key, right: right_id }
            }
        }
    }

    fn insert_into_inner(
        &mut self,
        id: NodeId,
        insert_at: usize,
        key: Vec<u8>,
        child: NodeId,
    ) -> InsertResult {
        let order = self.order;
        let inner = self.inner_mut(id);
        inner.insert_child(insert_at, key, child);

        if inner.children.len() <= order {
            return InsertResult::Inserted;
        }

        let (promoted, sibling) = inner.split();
        let right = self.allocate(Node::Inner(sibling));

        tracing::trace!(left = id, right, "inner split");
        InsertResult::Split {
            key: promoted,
            right,
        }
    }

    /// Remove a key from the subtree rooted at `id`, rebalancing on the way back up.
    ///
    /// Returns the removed value if the key was present. The node `id` itself
    /// may be left under-full; its parent (or the tree) deals with that.
    pub fn remove(&mut self, id: NodeId, key: &[u8]) -> Option<Vec<u8>> {
        let Some((pos, child)) = self.route(id, key) else {
            return self.leaf_mut(id).remove(key);
        };

        let removed = self.remove(child, key);

        // A single child only happens at the root, just before it is collapsed
        if self.node(child).is_half_full(self.order) || self.inner(id).children.len() == 1 {
            return removed;
        }
        self.rebalance(id, pos);
        removed
    }

    /// Restore minimum occupancy of child `pos` of `parent`.
    ///
    /// Tries, in order: borrow from the left sibling, borrow from the right
    /// sibling, merge into the left sibling, merge the right sibling in.
    fn rebalance(&mut self, parent: NodeId, pos: usize) {
        let order = self.order;
        let node = self.inner(parent);
        let child_len = self.node(node.children[pos]).len();
        let left = pos.checked_sub(1).map(|p| node.children[p]);
        let right = node.children.get(pos + 1).copied();

        if left.is_some_and(|id| self.node(id).has_surplus(order)) {
            self.rotate_right(parent, pos);
        } else if right.is_some_and(|id| self.node(id).has_surplus(order)) {
            self.rotate_left(parent, pos);
        } else if left.is_some_and(|id| self.node(id).len() + child_len <= order) {
            self.merge(parent, pos - 1);
        } else if right.is_some_and(|id| child_len + self.node(id).len() <= order) {
            self.merge(parent, pos);
        } else {
            unreachable!(
                "child {pos} of node {parent} is under-full but no rotation or merge applies"
            );
        }
    }

    /// Move the last slot of the left sibling into child `pos`.
    fn rotate_right(&mut self, parent: NodeId, pos: usize) {
        let node = self.inner_mut(parent);
        let (left, child) = (node.children[pos - 1], node.children[pos]);
        let separator = std::mem::take(&mut node.keys[pos - 1]);

        let new_separator = match self.pair_mut(left, child) {
            (Node::Leaf(left), Node::Leaf(child)) => {
                let Some(tuple) = left.tuples.pop() else {
                    unreachable!("left sibling {pos} has no tuple to lend");
                };
                child.tuples.insert(0, tuple);
                child.first_key().to_vec()
            }
            (Node::Inner(left), Node::Inner(child)) => {
                let (Some(key), Some(pointer)) = (left.keys.pop(), left.children.pop()) else {
                    unreachable!("left sibling {pos} has no child to lend");
                };
                // The old separator comes down, the donor's last key goes up
                child.children.insert(0, pointer);
                child.keys.insert(0, separator);
                key
            }
            _ => unreachable!("siblings of node {parent} differ in kind"),
        };

        self.inner_mut(parent).keys[pos - 1] = new_separator;
        tracing::trace!(parent, child = pos, "rotate right");
    }

    /// Move the first slot of the right sibling into child `pos`.
    fn rotate_left(&mut self, parent: NodeId, pos: usize) {
        let node = self.inner_mut(parent);
        let (child, right) = (node.children[pos], node.children[pos + 1]);
        let separator = std::mem::take(&mut node.keys[pos]);

        let new_separator = match self.pair_mut(child, right) {
            (Node::Leaf(child), Node::Leaf(right)) => {
                child.tuples.push(right.tuples.remove(0));
                right.first_key().to_vec()
            }
            (Node::Inner(child), Node::Inner(right)) => {
                let key = right.keys.remove(0);
                child.children.push(right.children.remove(0));
                child.keys.push(separator);
                key
            }
            _ => unreachable!("siblings of node {parent} differ in kind"),
        };

        self.inner_mut(parent).keys[pos] = new_separator;
        tracing::trace!(parent, child = pos, "rotate left");
    }

    /// Merge child `left_pos + 1` of `parent` into child `left_pos`.
    ///
    /// The separator between them and the right child's pointer leave the
    /// parent, and the right node is freed.
    fn merge(&mut self, parent: NodeId, left_pos: usize) {
        let node = self.inner_mut(parent);
        let separator = node.keys.remove(left_pos);
        let right = node.children.remove(left_pos + 1);
        let left = node.children[left_pos];

        match (self.release(right), self.node_mut(left)) {
            (Node::Leaf(right), Node::Leaf(left)) => {
                left.tuples.extend(right.tuples);
                left.next_leaf = right.next_leaf;
            }
            (Node::Inner(right), Node::Inner(left)) => {
                left.keys.push(separator);
                left.keys.extend(right.keys);
                left.children.extend(right.children);
            }
            _ => unreachable!("siblings of node {parent} differ in kind"),
        }

        tracing::trace!(parent, left, right, "merge");
    }
}
