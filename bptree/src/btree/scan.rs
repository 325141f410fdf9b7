//! Inclusive range scans over the leaf chain.

use std::iter::FusedIterator;

use super::arena::NodeArena;
use super::node::{NodeId, Tuple};

/// Lazy ascending iterator over tuples with `start <= key <= end`.
///
/// The scan descends once to the leaf that owns `start`, then walks the
/// `next_leaf` chain. It stops at the first key above `end`, which may sit
/// at the head of the following leaf.
#[derive(Debug)]
pub struct Scan<'a> {
    arena: &'a NodeArena,
    leaf: Option<NodeId>,
    slot: usize,
    start: &'a [u8],
    end: &'a [u8],
}

impl<'a> Scan<'a> {
    /// Start a scan in the subtree rooted at `root`.
    #[must_use]
    pub fn new(arena: &'a NodeArena, root: NodeId, start: &'a [u8], end: &'a [u8]) -> Self {
        let leaf = arena.find_leaf(root, start);
        let slot = arena.leaf(leaf).find_index(start).unwrap_or_else(|i| i);
        Self {
            arena,
            leaf: Some(leaf),
            slot,
            start,
            end,
        }
    }
}

impl<'a> Iterator for Scan<'a> {
    type Item = &'a Tuple;

    fn next(&mut self) -> Option<Self::Item> {
        let arena = self.arena;
        loop {
            let leaf = arena.leaf(self.leaf?);

            let Some(tuple) = leaf.tuples.get(self.slot) else {
                // Leaf exhausted, hop to the right sibling
                self.leaf = leaf.next_leaf;
                self.slot = 0;
                continue;
            };
            self.slot += 1;

            if tuple.key.as_slice() < self.start {
                continue;
            }
            if tuple.key.as_slice() > self.end {
                self.leaf = None;
                return None;
            }
            return Some(tuple);
        }
    }
}

impl FusedIterator for Scan<'_> {}
