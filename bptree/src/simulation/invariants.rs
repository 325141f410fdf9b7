//! Invariant checking for deterministic simulation testing.
//!
//! The tree is compared against a [`ReferenceModel`] after every operation,
//! and its structure is walked at a fixed interval.

use std::collections::BTreeMap;
use std::fmt;

use crate::btree::{Tree, TreeError};

/// Ordered map holding what the tree is expected to contain.
#[derive(Debug, Default)]
pub struct ReferenceModel {
    entries: BTreeMap<Vec<u8>, Vec<u8>>,
}

impl ReferenceModel {
    /// Create an empty model.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, key: Vec<u8>, value: Vec<u8>) {
        self.entries.insert(key, value);
    }

    pub fn delete(&mut self, key: &[u8]) {
        self.entries.remove(key);
    }

    #[must_use]
    pub fn get(&self, key: &[u8]) -> Option<&Vec<u8>> {
        self.entries.get(key)
    }

    /// Values for `start <= key <= end` in key order.
    #[must_use]
    pub fn scan(&self, start: &[u8], end: &[u8]) -> Vec<Vec<u8>> {
        // BTreeMap::range panics on an inverted range
        if start > end {
            return Vec::new();
        }
        self.entries
            .range::<[u8], _>((
                std::ops::Bound::Included(start),
                std::ops::Bound::Included(end),
            ))
            .map(|(_, value)| value.clone())
            .collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// An invariant violation detected during simulation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvariantViolation {
    /// Description of the violation.
    pub description: String,
    /// Operation index where it was detected.
    pub operation_index: usize,
    /// Additional context.
    pub context: String,
}

impl fmt::Display for InvariantViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "operation {}: {} ({})",
            self.operation_index, self.description, self.context
        )
    }
}

/// Checker for tree invariants.
#[derive(Debug, Default)]
pub struct InvariantChecker {
    /// Detected violations.
    violations: Vec<InvariantViolation>,
}

impl InvariantChecker {
    /// Create a new invariant checker.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            violations: Vec::new(),
        }
    }

    /// Get all violations.
    #[must_use]
    pub fn violations(&self) -> &[InvariantViolation] {
        &self.violations
    }

    /// Check if any violations were detected.
    #[must_use]
    pub const fn has_violations(&self) -> bool {
        !self.violations.is_empty()
    }

    /// Add a violation.
    pub fn add_violation(&mut self, violation: InvariantViolation) {
        self.violations.push(violation);
    }

    /// Check a point lookup against the model.
    pub fn check_get(
        &mut self,
        key: &[u8],
        actual: Option<&Vec<u8>>,
        model: &ReferenceModel,
        operation_index: usize,
    ) {
        let expected = model.get(key);
        if actual != expected {
            self.violations.push(InvariantViolation {
                description: "get returned the wrong value".to_string(),
                operation_index,
                context: format!("key {key:?}: expected {expected:?}, got {actual:?}"),
            });
        }
    }

    /// Check a range scan against the model.
    pub fn check_scan(
        &mut self,
        start: &[u8],
        end: &[u8],
        actual: &[Vec<u8>],
        model: &ReferenceModel,
        operation_index: usize,
    ) {
        let expected = model.scan(start, end);
        if actual != expected.as_slice() {
            self.violations.push(InvariantViolation {
                description: "scan returned the wrong values".to_string(),
                operation_index,
                context: format!(
                    "range {start:?}..={end:?}: expected {} values, got {}",
                    expected.len(),
                    actual.len()
                ),
            });
        }
    }

    /// Check that the tree holds as many keys as the model.
    pub fn check_len(&mut self, actual: usize, model: &ReferenceModel, operation_index: usize) {
        if actual != model.len() {
            self.violations.push(InvariantViolation {
                description: "key count diverged from the model".to_string(),
                operation_index,
                context: format!("expected {}, got {actual}", model.len()),
            });
        }
    }

    /// Walk the whole tree and record every structural violation.
    ///
    /// # Errors
    ///
    /// Returns an error if the tree lock is poisoned.
    pub fn check_structure(&mut self, tree: &Tree, operation_index: usize) -> Result<(), TreeError> {
        for violation in tree.check_invariants()? {
            self.violations.push(InvariantViolation {
                description: "tree structure is invalid".to_string(),
                operation_index,
                context: violation.to_string(),
            });
        }
        Ok(())
    }
}
