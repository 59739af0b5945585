//! Lifecycle demo runner.
//!
//! Loads a TOML plan of simulated components, starts them in dependency
//! order, keeps them running, then stops them in reverse.
//!
//! ```text
//! lifecycle-demo --config plan.toml [--hold-secs N] [--log-level L]
//! ```

use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use clap::Parser;

use lifecycle_orchestrator::config::{load_config, LifecycleConfig};
use lifecycle_orchestrator::lifecycle::signals::wait_for_stop_signal;
use lifecycle_orchestrator::lifecycle::startup::assemble;
use lifecycle_orchestrator::observability::{logging, metrics};
use lifecycle_orchestrator::Context;

#[derive(Parser)]
#[command(name = "lifecycle-demo")]
#[command(about = "Start and stop a dependency graph of simulated components", long_about = None)]
struct Cli {
    /// Path to the TOML plan.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override `run.hold_secs`.
    #[arg(long)]
    hold_secs: Option<u64>,

    /// Override `logging.level`.
    #[arg(long)]
    log_level: Option<String>,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => match load_config(path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("Failed to load {}: {}", path.display(), e);
                return ExitCode::FAILURE;
            }
        },
        None => LifecycleConfig::default(),
    };
    if let Some(level) = cli.log_level {
        config.logging.level = level;
    }
    if let Some(hold) = cli.hold_secs {
        config.run.hold_secs = hold;
    }

    if let Err(e) = logging::init_logging(&config.logging) {
        eprintln!("Failed to initialize logging: {}", e);
        return ExitCode::FAILURE;
    }

    tracing::info!(
        components = config.components.len(),
        start_timeout_secs = config.timeouts.start_secs,
        stop_timeout_secs = config.timeouts.stop_secs,
        "Configuration loaded"
    );

    if config.metrics.enabled {
        match config.metrics.address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.metrics.address,
                "Failed to parse metrics address"
            ),
        }
    }

    let mut plan = match assemble(&config) {
        Ok(plan) => plan,
        Err(e) => {
            tracing::error!(error = %e, "Failed to assemble lifecycle plan");
            return ExitCode::FAILURE;
        }
    };

    let root = Context::background();
    let start_ctx = plan.start_context(&root);
    let started = plan.orchestrator.start(&start_ctx).await;

    let code = match started {
        Ok(()) => {
            hold(config.run.hold_secs).await;
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!(error = %e, "Startup failed, stopping what already started");
            ExitCode::FAILURE
        }
    };

    let stop_ctx = plan.stop_context(&root);
    plan.orchestrator.stop(&stop_ctx).await;

    tracing::info!("Shutdown complete");
    code
}

/// Wait for `secs` seconds, or for a stop signal when `secs` is zero.
/// A stop signal always cuts the wait short.
async fn hold(secs: u64) {
    let signal = async {
        match wait_for_stop_signal().await {
            Ok(signal) => tracing::info!(?signal, "Stop signal received"),
            Err(e) => tracing::error!(error = %e, "Failed to listen for stop signals"),
        }
    };

    if secs == 0 {
        tracing::info!("Running until interrupted");
        signal.await;
        return;
    }

    tokio::select! {
        _ = tokio::time::sleep(Duration::from_secs(secs)) => {
            tracing::info!(hold_secs = secs, "Hold period elapsed");
        }
        _ = signal => {}
    }
}
