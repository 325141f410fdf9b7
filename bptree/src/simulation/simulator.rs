//! Main simulator harness for deterministic simulation testing.
//!
//! This module ties together the workload generator, the reference model and
//! the invariant checker to drive a [`Tree`] through a reproducible run.

use crate::btree::{Tree, TreeError};
use crate::config::RunnerConfig;

use super::invariants::{InvariantChecker, InvariantViolation, ReferenceModel};
use super::workload::{Operation, WorkloadConfig, WorkloadGenerator};

/// Configuration for the simulator.
#[derive(Debug, Clone)]
pub struct SimulatorConfig {
    /// Random seed for reproducibility.
    pub seed: u64,
    /// Order of the tree under test.
    pub order: usize,
    /// Workload generation configuration.
    pub workload: WorkloadConfig,
    /// Walk the whole tree every this many operations. Zero disables the
    /// periodic walk; the final walk always runs.
    pub check_interval: usize,
}

impl SimulatorConfig {
    /// Create a new simulator config with the given seed.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            order: RunnerConfig::DEFAULT_ORDER,
            workload: WorkloadConfig::default(),
            check_interval: 100,
        }
    }

    /// Set the tree order.
    #[must_use]
    pub const fn with_order(mut self, order: usize) -> Self {
        self.order = order;
        self
    }

    /// Set the workload configuration.
    #[must_use]
    pub fn with_workload(mut self, workload: WorkloadConfig) -> Self {
        self.workload = workload;
        self
    }

    /// Set how often the tree structure is walked.
    #[must_use]
    pub const fn with_check_interval(mut self, check_interval: usize) -> Self {
        self.check_interval = check_interval;
        self
    }
}

impl From<&RunnerConfig> for SimulatorConfig {
    fn from(config: &RunnerConfig) -> Self {
        let workload = WorkloadConfig {
            key_space: config.key_space,
            ..WorkloadConfig::default()
        };
        Self::new(config.seed)
            .with_order(config.order)
            .with_workload(workload)
    }
}

/// Results from a simulation run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimulationResult {
    /// The seed used for this simulation.
    pub seed: u64,
    /// Number of operations applied.
    pub operations_applied: u64,
    pub sets: u64,
    pub gets: u64,
    pub deletes: u64,
    pub scans: u64,
    /// Keys held by the tree at the end of the run.
    pub final_len: usize,
    /// Invariant violations detected.
    pub invariant_violations: Vec<InvariantViolation>,
    /// Whether the simulation ran to the end.
    pub completed_successfully: bool,
    /// Error message if simulation failed.
    pub error: Option<String>,
}

impl SimulationResult {
    /// Check if the simulation passed (no invariant violations).
    #[must_use]
    pub const fn passed(&self) -> bool {
        self.completed_successfully && self.invariant_violations.is_empty()
    }
}

/// Statistics about the simulation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SimulatorStats {
    /// Number of operations applied.
    pub operations_applied: u64,
    pub sets: u64,
    pub gets: u64,
    pub deletes: u64,
    pub scans: u64,
    /// Number of invariant violations.
    pub invariant_violations: usize,
}

/// The main simulator harness.
///
/// Every operation is applied to a fresh [`Tree`] and to a
/// [`ReferenceModel`]; reads are compared against the model as they happen.
pub struct Simulator {
    config: SimulatorConfig,
    generator: WorkloadGenerator,
    model: ReferenceModel,
    checker: InvariantChecker,
    stats: SimulatorStats,
}

impl Simulator {
    /// Create a new simulator with the given configuration.
    #[must_use]
    pub fn new(config: SimulatorConfig) -> Self {
        let generator = WorkloadGenerator::with_config(config.seed, config.workload.clone());

        Self {
            config,
            generator,
            model: ReferenceModel::new(),
            checker: InvariantChecker::new(),
            stats: SimulatorStats::default(),
        }
    }

    /// Run the simulation for a given number of operations.
    ///
    /// This creates a fresh tree, applies the operations and checks
    /// invariants along the way.
    pub fn run(&mut self, operation_count: usize) -> SimulationResult {
        let tree = match Tree::new(self.config.order) {
            Ok(tree) => tree,
            Err(e) => return self.result(0, Some(format!("Failed to create tree: {e}"))),
        };

        match self.run_with_tree(&tree, operation_count) {
            Ok(final_len) => self.result(final_len, None),
            Err(e) => {
                tracing::error!(seed = self.config.seed, "simulation aborted: {e}");
                self.result(0, Some(e.to_string()))
            }
        }
    }

    fn run_with_tree(&mut self, tree: &Tree, operation_count: usize) -> Result<usize, TreeError> {
        for index in 0..operation_count {
            let operation = self.generator.next_operation();
            tracing::trace!(index, kind = operation.kind(), "applying operation");
            self.apply(tree, operation, index)?;
            self.stats.operations_applied += 1;

            self.checker.check_len(tree.len()?, &self.model, index);

            let interval = self.config.check_interval;
            if interval > 0 && (index + 1) % interval == 0 {
                self.checker.check_structure(tree, index)?;
                tracing::debug!(
                    index,
                    len = self.model.len(),
                    violations = self.checker.violations().len(),
                    "checked tree structure"
                );
            }
        }

        self.checker.check_structure(tree, operation_count)?;
        tree.len()
    }

    fn apply(&mut self, tree: &Tree, operation: Operation, index: usize) -> Result<(), TreeError> {
        match operation {
            Operation::Set { key, value } => {
                self.stats.sets += 1;
                tree.set(key.clone(), value.clone())?;
                self.model.set(key, value);
            }
            Operation::Get { key } => {
                self.stats.gets += 1;
                let actual = tree.get(&key)?;
                self.checker
                    .check_get(&key, actual.as_ref(), &self.model, index);
            }
            Operation::Delete { key } => {
                self.stats.deletes += 1;
                tree.delete(&key)?;
                self.model.delete(&key);
            }
            Operation::Scan { start, end } => {
                self.stats.scans += 1;
                let actual = tree.scan(&start, &end)?;
                self.checker
                    .check_scan(&start, &end, &actual, &self.model, index);
            }
        }
        Ok(())
    }

    fn result(&self, final_len: usize, error: Option<String>) -> SimulationResult {
        SimulationResult {
            seed: self.config.seed,
            operations_applied: self.stats.operations_applied,
            sets: self.stats.sets,
            gets: self.stats.gets,
            deletes: self.stats.deletes,
            scans: self.stats.scans,
            final_len,
            invariant_violations: self.checker.violations().to_vec(),
            completed_successfully: error.is_none(),
            error,
        }
    }

    /// Get the invariant checker.
    #[must_use]
    pub const fn checker(&self) -> &InvariantChecker {
        &self.checker
    }

    /// Get statistics about the simulation.
    #[must_use]
    pub fn stats(&self) -> SimulatorStats {
        SimulatorStats {
            invariant_violations: self.checker.violations().len(),
            ..self.stats
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simulator_basic() {
        let mut simulator = Simulator::new(SimulatorConfig::new(12345));

        let result = simulator.run(500);

        assert!(result.completed_successfully);
        assert_eq!(result.operations_applied, 500);
        assert_eq!(
            result.sets + result.gets + result.deletes + result.scans,
            500
        );
    }

    #[test]
    fn test_simulator_deterministic() {
        // Same seed should produce same results
        let result1 = Simulator::new(SimulatorConfig::new(12345)).run(300);
        let result2 = Simulator::new(SimulatorConfig::new(12345)).run(300);

        assert_eq!(result1, result2);
    }

    #[test]
    fn test_simulator_no_invariant_violations() {
        for order in [3, 4, 5, 8, 32] {
            let config = SimulatorConfig::new(54321)
                .with_order(order)
                .with_check_interval(10);
            let result = Simulator::new(config).run(2000);

            assert!(
                result.passed(),
                "order {order} should pass: {:?}",
                result.invariant_violations
            );
        }
    }

    #[test]
    fn test_simulator_small_key_space_churn() {
        let workload = WorkloadConfig {
            key_space: 16,
            ..WorkloadConfig::default()
        };
        let config = SimulatorConfig::new(7)
            .with_order(3)
            .with_workload(workload)
            .with_check_interval(1);
        let mut simulator = Simulator::new(config);

        let result = simulator.run(1000);

        assert!(result.passed(), "{:?}", result.invariant_violations);
        assert!(result.final_len <= 16);
        assert_eq!(simulator.stats().invariant_violations, 0);
    }

    #[test]
    fn test_simulator_invalid_order() {
        let result = Simulator::new(SimulatorConfig::new(1).with_order(2)).run(10);

        assert!(!result.completed_successfully);
        assert!(!result.passed());
        assert_eq!(result.operations_applied, 0);
        assert!(result.error.is_some());
    }

    #[test]
    fn test_simulator_config_from_runner_config() {
        let runner = RunnerConfig {
            order: 5,
            seed: 9,
            operations: 100,
            key_space: 64,
        };
        let config = SimulatorConfig::from(&runner);

        assert_eq!(config.seed, 9);
        assert_eq!(config.order, 5);
        assert_eq!(config.workload.key_space, 64);
    }

    #[test]
    #[ignore] // Long running test
    fn test_simulator_stress() {
        let config = SimulatorConfig::new(99999).with_order(4);
        let mut simulator = Simulator::new(config);

        let result = simulator.run(100_000);

        assert!(result.passed());
    }
}
