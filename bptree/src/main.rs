use bptree::config::RunnerConfig;
use bptree::simulation::{Simulator, SimulatorConfig};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "bptree=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration from environment variables
    let config = match RunnerConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("Failed to load configuration: {e}");
            std::process::exit(1);
        }
    };

    tracing::info!(
        "Loaded configuration: order={}, seed={}, operations={}, key_space={}",
        config.order,
        config.seed,
        config.operations,
        config.key_space
    );

    let mut simulator = Simulator::new(SimulatorConfig::from(&config));
    let result = simulator.run(config.operations);

    if let Some(error) = &result.error {
        tracing::error!("Simulation failed: {error}");
        std::process::exit(1);
    }

    tracing::info!(
        "Applied {} operations (set={}, get={}, delete={}, scan={}), {} keys remain",
        result.operations_applied,
        result.sets,
        result.gets,
        result.deletes,
        result.scans,
        result.final_len
    );

    if !result.passed() {
        for violation in &result.invariant_violations {
            tracing::error!("{violation}");
        }
        tracing::error!(
            "{} invariant violations with seed {}",
            result.invariant_violations.len(),
            result.seed
        );
        std::process::exit(1);
    }

    tracing::info!("Simulation passed with seed {}", result.seed);
}
