//! Leaf node algorithms: lookup, upsert with split, removal.

use super::node::{LeafNode, Tuple};

/// Outcome of an upsert into a single leaf.
#[derive(Debug)]
pub enum LeafInsert {
    /// The key existed and its value was replaced in place.
    Updated,
    /// The key was added and the leaf had room.
    Inserted,
    /// The key was added and the leaf overflowed.
    ///
    /// The returned node holds the upper half of the tuples. The caller
    /// allocates it and splices it into the leaf chain.
    Split(LeafNode),
}

impl LeafNode {
    /// Find the slot holding `key`, or the slot where it would be inserted.
    pub fn find_index(&self, key: &[u8]) -> Result<usize, usize> {
        self.tuples
            .binary_search_by(|tuple| tuple.key.as_slice().cmp(key))
    }

    /// Get a value by key.
    #[must_use]
    pub fn get(&self, key: &[u8]) -> Option<&[u8]> {
        self.find_index(key)
            .ok()
            .map(|i| self.tuples[i].value.as_slice())
    }

    /// First key stored in this leaf.
    ///
    /// Every non-root leaf is non-empty, so callers use this for promoted
    /// and separator keys.
    #[must_use]
    pub fn first_key(&self) -> &[u8] {
        match self.tuples.first() {
            Some(tuple) => &tuple.key,
            None => unreachable!("separator requested from an empty leaf"),
        }
    }

    /// Insert or update a tuple, splitting when the leaf already holds `order` tuples.
    pub fn set(&mut self, key: Vec<u8>, value: Vec<u8>, order: usize) -> LeafInsert {
        let at = match self.find_index(&key) {
            Ok(i) => {
                self.tuples[i].value = value;
                return LeafInsert::Updated;
            }
            Err(i) => i,
        };

        // Insert first, the leaf may overflow to order + 1 temporarily
        self.tuples.insert(at, Tuple::new(key, value));
        if self.tuples.len() <= order {
            return LeafInsert::Inserted;
        }

        LeafInsert::Split(self.split())
    }

    /// Split an overflowing leaf, returning the new right half.
    ///
    /// The new leaf is not linked; `next_leaf` is left for the caller.
    #[must_use]
    pub fn split(&mut self) -> Self {
        let mid = self.tuples.len() / 2;
        let right_tuples = self.tuples.split_off(mid);

        Self {
            tuples: right_tuples,
            next_leaf: None,
        }
    }

    /// Remove an entry by key.
    ///
    /// Returns the removed value if found.
    pub fn remove(&mut self, key: &[u8]) -> Option<Vec<u8>> {
        self.find_index(key)
            .ok()
            .map(|i| self.tuples.remove(i).value)
    }
}
