//! In-memory B+ tree index over byte-string keys.
//!
//! - [`btree`]: the tree itself, guarded by a single lock
//! - [`config`]: runner configuration from environment variables
//! - [`simulation`]: seeded workloads checked against a reference model
//! - [`testing`]: sortable key helpers

pub mod btree;
pub mod config;
pub mod simulation;
pub mod testing;
