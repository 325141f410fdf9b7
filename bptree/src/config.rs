//! Simulation runner configuration.
//!
//! This module provides configuration loading for the `bptree-sim` binary
//! from environment variables.
//!
//! # Environment Variables
//!
//! - `BPTREE_ORDER`: Maximum fan-out of every tree node (default: `8`, minimum `3`)
//! - `BPTREE_SEED`: Seed for the workload generator (default: `42`)
//! - `BPTREE_OPERATIONS`: Number of operations to run (default: `10000`)
//! - `BPTREE_KEY_SPACE`: Number of distinct keys the workload draws from (default: `1024`)
//!
//! # Invariants
//!
//! - `order` is always a valid tree order
//! - `key_space` is always in `1..=65536`, the range of 2-byte ordinal keys

use crate::btree::MIN_ORDER;

/// Runner configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunnerConfig {
    /// Maximum fan-out of every tree node.
    pub order: usize,
    /// Seed for the workload generator. The same seed replays the same run.
    pub seed: u64,
    /// Number of operations to apply.
    pub operations: usize,
    /// Number of distinct keys the workload draws from.
    pub key_space: usize,
}

/// Error returned when loading configuration fails.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// An environment variable has an invalid value.
    InvalidValue { name: String, message: String },
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidValue { name, message } => {
                write!(f, "invalid value for {name}: {message}")
            }
        }
    }
}

impl std::error::Error for ConfigError {}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            order: Self::DEFAULT_ORDER,
            seed: Self::DEFAULT_SEED,
            operations: Self::DEFAULT_OPERATIONS,
            key_space: Self::DEFAULT_KEY_SPACE,
        }
    }
}

impl RunnerConfig {
    /// Default tree order.
    pub const DEFAULT_ORDER: usize = 8;
    /// Default workload seed.
    pub const DEFAULT_SEED: u64 = 42;
    /// Default number of operations.
    pub const DEFAULT_OPERATIONS: usize = 10_000;
    /// Default key space size.
    pub const DEFAULT_KEY_SPACE: usize = 1024;
    /// Largest key space addressable with 2-byte ordinal keys.
    pub const MAX_KEY_SPACE: usize = 1 << 16;

    /// Load configuration from environment variables.
    ///
    /// Unset variables fall back to their defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if a variable is set but does not parse, or if
    /// `BPTREE_ORDER` or `BPTREE_KEY_SPACE` is out of range.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// Same as [`RunnerConfig::from_env`].
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let order = parse_var(&lookup, "BPTREE_ORDER", Self::DEFAULT_ORDER)?;
        if order < MIN_ORDER {
            return Err(ConfigError::InvalidValue {
                name: "BPTREE_ORDER".to_string(),
                message: format!("{order} is below the minimum order {MIN_ORDER}"),
            });
        }

        let seed = parse_var(&lookup, "BPTREE_SEED", Self::DEFAULT_SEED)?;
        let operations = parse_var(&lookup, "BPTREE_OPERATIONS", Self::DEFAULT_OPERATIONS)?;

        let key_space = parse_var(&lookup, "BPTREE_KEY_SPACE", Self::DEFAULT_KEY_SPACE)?;
        if key_space == 0 || key_space > Self::MAX_KEY_SPACE {
            return Err(ConfigError::InvalidValue {
                name: "BPTREE_KEY_SPACE".to_string(),
                message: format!("{key_space} is not in 1..={}", Self::MAX_KEY_SPACE),
            });
        }

        Ok(Self {
            order,
            seed,
            operations,
            key_space,
        })
    }
}

/// Parse one variable, returning `default` if it is not set.
fn parse_var<T: std::str::FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &str,
    default: T,
) -> Result<T, ConfigError> {
    match lookup(name) {
        Some(value) => value.trim().parse::<T>().map_err(|_| ConfigError::InvalidValue {
            name: name.to_string(),
            message: format!("'{value}' is not a valid number"),
        }),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn load(vars: &[(&str, &str)]) -> Result<RunnerConfig, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        RunnerConfig::from_lookup(|name| vars.get(name).cloned())
    }

    #[test]
    fn test_default_values() {
        assert_eq!(RunnerConfig::DEFAULT_ORDER, 8);
        assert_eq!(RunnerConfig::DEFAULT_SEED, 42);
        assert_eq!(load(&[]), Ok(RunnerConfig::default()));
    }

    #[test]
    fn test_overrides() {
        let config = load(&[
            ("BPTREE_ORDER", "3"),
            ("BPTREE_SEED", "7"),
            ("BPTREE_OPERATIONS", "500"),
            ("BPTREE_KEY_SPACE", "65536"),
        ])
        .expect("valid config");

        assert_eq!(config.order, 3);
        assert_eq!(config.seed, 7);
        assert_eq!(config.operations, 500);
        assert_eq!(config.key_space, 65536);
    }

    #[test]
    fn test_order_below_minimum() {
        let error = load(&[("BPTREE_ORDER", "2")]).expect_err("order 2 rejected");
        assert!(matches!(error, ConfigError::InvalidValue { ref name, .. } if name == "BPTREE_ORDER"));
    }

    #[test]
    fn test_key_space_out_of_range() {
        assert!(load(&[("BPTREE_KEY_SPACE", "0")]).is_err());
        assert!(load(&[("BPTREE_KEY_SPACE", "65537")]).is_err());
    }

    #[test]
    fn test_unparsable_value() {
        let error = load(&[("BPTREE_SEED", "abc")]).expect_err("bad seed rejected");
        assert_eq!(
            error.to_string(),
            "invalid value for BPTREE_SEED: 'abc' is not a valid number"
        );
    }
}
