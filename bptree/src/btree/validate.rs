//! Structural checks over a whole tree.
//!
//! # Invariants
//!
//! - Every non-root node holds between `(order + 1) / 2` and `order` slots
//! - An inner root has at least two children
//! - Inner nodes have exactly one more child than keys
//! - Keys are strictly ascending within every node
//! - Every key under `children[i]` is `>= keys[i - 1]` and `< keys[i]`
//! - All leaves sit at the same depth
//! - The `next_leaf` chain visits every leaf once, left to right

use std::fmt;

use super::arena::NodeArena;
use super::node::{Node, NodeId, NodeType, min_occupancy};

/// Summary of a tree's structure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TreeShape {
    /// Number of levels, 1 for a lone leaf root.
    pub height: usize,
    pub root_type: NodeType,
    pub leaf_count: usize,
    pub inner_count: usize,
    /// Number of keys stored in the leaves.
    pub key_count: usize,
}

/// A broken structural invariant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StructuralViolation {
    /// Node where the violation was found.
    pub node: NodeId,
    pub description: String,
}

impl fmt::Display for StructuralViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "node {}: {}", self.node, self.description)
    }
}

/// Accumulated state of one validation walk.
#[derive(Default)]
struct Walk {
    violations: Vec<StructuralViolation>,
    /// Leaves in left-to-right order as reached from the root.
    leaves: Vec<NodeId>,
    leaf_depth: Option<usize>,
    inner_count: usize,
    key_count: usize,
}

impl Walk {
    fn report(&mut self, node: NodeId, description: String) {
        self.violations.push(StructuralViolation { node, description });
    }
}

impl NodeArena {
    /// Describe the structure of the tree rooted at `root`.
    #[must_use]
    pub fn shape(&self, root: NodeId) -> TreeShape {
        let mut height = 1;
        let mut id = root;
        while let Node::Inner(inner) = self.node(id) {
            height += 1;
            id = inner.children[0];
        }

        let mut walk = Walk::default();
        self.walk(root, 1, None, None, true, &mut walk);

        TreeShape {
            height,
            root_type: self.node(root).node_type(),
            leaf_count: walk.leaves.len(),
            inner_count: walk.inner_count,
            key_count: walk.key_count,
        }
    }

    /// Check every structural invariant of the tree rooted at `root`.
    ///
    /// Returns an empty vector for a well-formed tree.
    #[must_use]
    pub fn check(&self, root: NodeId) -> Vec<StructuralViolation> {
        let mut walk = Walk::default();
        self.walk(root, 1, None, None, true, &mut walk);
        self.check_leaf_chain(&mut walk);
        walk.violations
    }

    fn walk(
        &self,
        id: NodeId,
        depth: usize,
        lower: Option<&[u8]>,
        upper: Option<&[u8]>,
        is_root: bool,
        walk: &mut Walk,
    ) {
        let node = self.node(id);
        let order = self.order();
        let len = node.len();

        if len > order {
            walk.report(id, format!("holds {len} slots, order is {order}"));
        }
        if !is_root && !node.is_half_full(order) {
            walk.report(
                id,
                format!("holds {len} slots, minimum is {}", min_occupancy(order)),
            );
        }

        match node {
            Node::Leaf(leaf) => {
                walk.leaves.push(id);
                walk.key_count += len;
                match walk.leaf_depth {
                    None => walk.leaf_depth = Some(depth),
                    Some(expected) if expected != depth => {
                        walk.report(id, format!("leaf at depth {depth}, expected {expected}"));
                    }
                    Some(_) => {}
                }

                let keys: Vec<&[u8]> = leaf.tuples.iter().map(|t| t.key.as_slice()).collect();
                check_ascending(id, &keys, walk);
                for key in keys {
                    if lower.is_some_and(|lower| key < lower) || upper.is_some_and(|upper| key >= upper)
                    {
                        walk.report(id, format!("key {key:?} outside its separator range"));
                    }
                }
            }
            Node::Inner(inner) => {
                walk.inner_count += 1;
                if is_root && len < 2 {
                    walk.report(id, format!("inner root has {len} children"));
                }
                if inner.children.len() != inner.keys.len() + 1 {
                    walk.report(
                        id,
                        format!(
                            "{} keys for {} children",
                            inner.keys.len(),
                            inner.children.len()
                        ),
                    );
                    return;
                }

                let keys: Vec<&[u8]> = inner.keys.iter().map(Vec::as_slice).collect();
                check_ascending(id, &keys, walk);

                for (i, &child) in inner.children.iter().enumerate() {
                    let child_lower = if i == 0 { lower } else { Some(keys[i - 1]) };
                    let child_upper = keys.get(i).copied().or(upper);
                    self.walk(child, depth + 1, child_lower, child_upper, false, walk);
                }
            }
        }
    }

    fn check_leaf_chain(&self, walk: &mut Walk) {
        let Some(&first) = walk.leaves.first() else {
            return;
        };

        let mut chain = Vec::with_capacity(walk.leaves.len());
        let mut next = Some(first);
        // Bounded so a cycle cannot loop forever
        while let Some(id) = next {
            if chain.len() > walk.leaves.len() {
                break;
            }
            chain.push(id);
            next = self.leaf(id).next_leaf;
        }

        if chain != walk.leaves {
            walk.report(
                first,
                format!(
                    "leaf chain {chain:?} does not match leaf order {:?}",
                    walk.leaves
                ),
            );
        }
    }
}

fn check_ascending(id: NodeId, keys: &[&[u8]], walk: &mut Walk) {
    for pair in keys.windows(2) {
        if pair[0] >= pair[1] {
            walk.report(
                id,
                format!("keys {:?} and {:?} out of order", pair[0], pair[1]),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::btree::node::{InnerNode, LeafNode, Tuple};

    fn leaf(keys: &[u8], next_leaf: Option<NodeId>) -> Node {
        Node::Leaf(LeafNode {
            tuples: keys.iter().map(|&k| Tuple::new(vec![k], Vec::new())).collect(),
            next_leaf,
        })
    }

    #[test]
    fn test_well_formed_tree_passes() {
        let mut arena = NodeArena::new(3);
        let b = arena.allocate(leaf(&[5, 6], None));
        let a = arena.allocate(leaf(&[1, 2], Some(b)));
        let root = arena.allocate(Node::Inner(InnerNode::with_children(a, vec![5], b)));

        assert!(arena.check(root).is_empty());

        let shape = arena.shape(root);
        assert_eq!(shape.height, 2);
        assert_eq!(shape.root_type, NodeType::Inner);
        assert_eq!(shape.leaf_count, 2);
        assert_eq!(shape.inner_count, 1);
        assert_eq!(shape.key_count, 4);
    }

    #[test]
    fn test_underfull_root_leaf_is_allowed() {
        let mut arena = NodeArena::new(8);
        let root = arena.allocate(leaf(&[1], None));
        assert!(arena.check(root).is_empty());
        assert_eq!(arena.shape(root).height, 1);
    }

    #[test]
    fn test_detects_underfull_child() {
        let mut arena = NodeArena::new(3);
        let b = arena.allocate(leaf(&[5], None));
        let a = arena.allocate(leaf(&[1, 2], Some(b)));
        let root = arena.allocate(Node::Inner(InnerNode::with_children(a, vec![5], b)));

        let violations = arena.check(root);
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].node, b);
    }

    #[test]
    fn test_detects_key_outside_separator_range() {
        let mut arena = NodeArena::new(3);
        let b = arena.allocate(leaf(&[5, 6], None));
        let a = arena.allocate(leaf(&[1, 5], Some(b)));
        let root = arena.allocate(Node::Inner(InnerNode::with_children(a, vec![5], b)));

        let violations = arena.check(root);
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].node, a);
    }

    #[test]
    fn test_detects_broken_leaf_chain() {
        let mut arena = NodeArena::new(3);
        let b = arena.allocate(leaf(&[5, 6], None));
        let a = arena.allocate(leaf(&[1, 2], None));
        let root = arena.allocate(Node::Inner(InnerNode::with_children(a, vec![5], b)));

        let violations = arena.check(root);
        assert_eq!(violations.len(), 1);
        assert!(violations[0].to_string().contains("leaf chain"));
    }

    #[test]
    fn test_detects_unsorted_leaf() {
        let mut arena = NodeArena::new(8);
        let root = arena.allocate(leaf(&[2, 1], None));
        assert_eq!(arena.check(root).len(), 1);
    }
}
