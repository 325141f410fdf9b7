//! Workload generator for deterministic simulation testing.
//!
//! This module generates random but reproducible sequences of tree
//! operations over a bounded key space, so that sets, updates, deletes and
//! scans keep hitting the same keys.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::testing::key_from_ord;

/// Configuration for workload generation.
#[derive(Debug, Clone)]
pub struct WorkloadConfig {
    /// Number of distinct key ordinals to draw from (at most 65536).
    pub key_space: usize,
    /// Probability of a set.
    pub set_rate: f64,
    /// Probability of a delete.
    pub delete_rate: f64,
    /// Probability of a scan. Whatever is left over becomes a get.
    pub scan_rate: f64,
    /// Probability that a scan is generated with `start > end`.
    pub inverted_scan_rate: f64,
    /// Maximum number of ordinals a scan covers.
    pub max_scan_width: usize,
    /// Maximum value length in bytes.
    pub max_value_len: usize,
}

impl Default for WorkloadConfig {
    fn default() -> Self {
        Self {
            key_space: 1024,
            set_rate: 0.45,
            delete_rate: 0.3,
            scan_rate: 0.1,
            inverted_scan_rate: 0.1,
            max_scan_width: 64,
            max_value_len: 16,
        }
    }
}

/// One tree operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operation {
    Set { key: Vec<u8>, value: Vec<u8> },
    Get { key: Vec<u8> },
    Delete { key: Vec<u8> },
    Scan { start: Vec<u8>, end: Vec<u8> },
}

impl Operation {
    /// Short name of the operation kind, for logs.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Set { .. } => "set",
            Self::Get { .. } => "get",
            Self::Delete { .. } => "delete",
            Self::Scan { .. } => "scan",
        }
    }
}

/// Generator for random tree operations.
///
/// This generator produces deterministic sequences of operations
/// given the same seed, enabling reproducible testing.
pub struct WorkloadGenerator {
    rng: StdRng,
    config: WorkloadConfig,
}

impl WorkloadGenerator {
    /// Create a new workload generator with the given seed.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self::with_config(seed, WorkloadConfig::default())
    }

    /// Create a new workload generator with custom configuration.
    #[must_use]
    pub fn with_config(seed: u64, config: WorkloadConfig) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            config,
        }
    }

    /// Get the configuration.
    #[must_use]
    pub const fn config(&self) -> &WorkloadConfig {
        &self.config
    }

    /// Generate the next operation.
    pub fn next_operation(&mut self) -> Operation {
        let roll = self.rng.random::<f64>();

        if roll < self.config.set_rate {
            let key = self.random_key();
            let value = self.random_value();
            Operation::Set { key, value }
        } else if roll < self.config.set_rate + self.config.delete_rate {
            Operation::Delete {
                key: self.random_key(),
            }
        } else if roll < self.config.set_rate + self.config.delete_rate + self.config.scan_rate {
            self.random_scan()
        } else {
            Operation::Get {
                key: self.random_key(),
            }
        }
    }

    fn random_ord(&mut self) -> u16 {
        let ord = self.rng.random_range(0..self.config.key_space.max(1));
        u16::try_from(ord).unwrap_or(u16::MAX)
    }

    fn random_key(&mut self) -> Vec<u8> {
        key_from_ord(self.random_ord())
    }

    fn random_value(&mut self) -> Vec<u8> {
        let len = self.rng.random_range(0..=self.config.max_value_len);
        let mut value = vec![0u8; len];
        self.rng.fill(value.as_mut_slice());
        value
    }

    fn random_scan(&mut self) -> Operation {
        let start = self.random_ord();
        let width = self.rng.random_range(0..=self.config.max_scan_width);
        let end = start.saturating_add(u16::try_from(width).unwrap_or(u16::MAX));

        if self.rng.random::<f64>() < self.config.inverted_scan_rate && start != end {
            Operation::Scan {
                start: key_from_ord(end),
                end: key_from_ord(start),
            }
        } else {
            Operation::Scan {
                start: key_from_ord(start),
                end: key_from_ord(end),
            }
        }
    }
}

impl Iterator for WorkloadGenerator {
    type Item = Operation;

    fn next(&mut self) -> Option<Self::Item> {
        Some(self.next_operation())
    }
}
