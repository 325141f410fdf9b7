//! Inner node routing and splitting.

use super::node::{InnerNode, NodeId};

impl InnerNode {
    /// Find the child index for a given key.
    ///
    /// An exact match on a separator routes to the child on its right.
    #[must_use]
    pub fn lookup(&self, key: &[u8]) -> usize {
        match self.keys.binary_search_by(|k| k.as_slice().cmp(key)) {
            Ok(i) => i + 1, // Exact match, go right
            Err(i) => i,    // First separator greater than key
        }
    }

    /// Splice a promoted key and its right-hand child in after a child split.
    ///
    /// `insert_at` is the new child's pointer position, one past the child
    /// that split. The key lands just before it.
    pub fn insert_child(&mut self, insert_at: usize, key: Vec<u8>, child: NodeId) {
        self.keys.insert(insert_at - 1, key);
        self.children.insert(insert_at, child);
    }

    /// Split an overflowing node, returning the promoted key and the new right node.
    ///
    /// The promoted key is removed from both halves. With `order + 1` children
    /// the left half keeps the larger share, the right half gets at least
    /// `(order + 1) / 2`.
    #[must_use]
    pub fn split(&mut self) -> (Vec<u8>, Self) {
        let split_at = self.children.len().div_ceil(2);

        let children = self.children.split_off(split_at);
        let mut keys = self.keys.split_off(split_at - 1);
        let promoted = keys.remove(0);

        (promoted, Self { keys, children })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(keys: &[u8], children: &[NodeId]) -> InnerNode {
        InnerNode {
            keys: keys.iter().map(|&k| vec![k]).collect(),
            children: children.to_vec(),
        }
    }

    fn keys_of(node: &InnerNode) -> Vec<u8> {
        node.keys.iter().map(|k| k[0]).collect()
    }

    #[test]
    fn test_inner_node_lookup() {
        let node = node(&[10, 20, 30], &[100, 200, 300, 400]);

        // Key less than first key -> first child
        assert_eq!(node.lookup(&[5]), 0);

        // Key equal to first key -> second child
        assert_eq!(node.lookup(&[10]), 1);

        // Key between first and second -> second child
        assert_eq!(node.lookup(&[15]), 1);

        // Key equal to last key -> last child
        assert_eq!(node.lookup(&[30]), 3);

        // Key greater than all -> last child
        assert_eq!(node.lookup(&[35]), 3);
    }

    #[test]
    fn test_inner_node_insert_child() {
        let mut node = node(&[10, 30], &[1, 2, 3]);

        // child 1 split at key 20, new child 9
        node.insert_child(2, vec![20], 9);
        assert_eq!(keys_of(&node), vec![10, 20, 30]);
        assert_eq!(node.children, vec![1, 2, 9, 3]);

        // leftmost child split
        node.insert_child(1, vec![5], 8);
        assert_eq!(keys_of(&node), vec![5, 10, 20, 30]);
        assert_eq!(node.children, vec![1, 8, 2, 9, 3]);
    }

    #[test]
    fn test_inner_node_split_odd_order() {
        // order 3 after overflow: 4 children, 3 keys
        let mut left = node(&[10, 20, 30], &[0, 1, 2, 3]);
        let (promoted, right) = left.split();

        assert_eq!(promoted, vec![20]);
        assert_eq!(keys_of(&left), vec![10]);
        assert_eq!(left.children, vec![0, 1]);
        assert_eq!(keys_of(&right), vec![30]);
        assert_eq!(right.children, vec![2, 3]);
    }

    #[test]
    fn test_inner_node_split_even_order() {
        // order 8 after overflow: 9 children, 8 keys
        let mut left = node(&[1, 2, 3, 4, 5, 6, 7, 8], &[0, 1, 2, 3, 4, 5, 6, 7, 8]);
        let (promoted, right) = left.split();

        assert_eq!(promoted, vec![5]);
        assert_eq!(left.children.len(), 5);
        assert_eq!(keys_of(&left), vec![1, 2, 3, 4]);
        assert_eq!(right.children.len(), 4);
        assert_eq!(keys_of(&right), vec![6, 7, 8]);
        assert_eq!(right.children, vec![5, 6, 7, 8]);
    }
}
