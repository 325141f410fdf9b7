//! Deterministic Simulation Testing (DST) infrastructure.
//!
//! This module provides tools for testing the tree with:
//! - Reproducible random workload generation
//! - A `BTreeMap` reference model every read is checked against
//! - Periodic structural invariant checks
//!
//! Given the same seed and configuration, execution is identical.
//!
//! # Usage
//!
//! ```
//! use bptree::simulation::{Simulator, SimulatorConfig};
//!
//! let config = SimulatorConfig::new(12345) // seed
//!     .with_order(4)
//!     .with_check_interval(50);
//!
//! let mut sim = Simulator::new(config);
//! let result = sim.run(1000); // Run 1000 operations
//!
//! assert!(result.invariant_violations.is_empty());
//! ```

mod invariants;
mod simulator;
mod workload;

pub use invariants::{InvariantChecker, InvariantViolation, ReferenceModel};
pub use simulator::{SimulationResult, Simulator, SimulatorConfig, SimulatorStats};
pub use workload::{Operation, WorkloadConfig, WorkloadGenerator};
