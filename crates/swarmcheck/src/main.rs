//! # Swarmcheck - Post-deployment Swarm verification
//!
//! Verifies that a Juju-deployed Docker Swarm cluster converged into a
//! correct, securely reachable state.
//!
//! ## Architecture
//! ```text
//! swarmcheck → juju → swarm/N, consul/N   (remote commands, files, relations)
//!            → docker (TLS) → swarm manager :3376
//! ```

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{error, info, warn};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

mod checks;
mod config;
mod deployment;
mod docker;
mod orchestrator;
#[cfg(test)]
mod testing;
mod workspace;

use checks::Check;
use config::AppConfig;
use deployment::Deployment;

/// Swarmcheck - verify a deployed Swarm cluster
#[derive(Parser, Debug)]
#[command(name = "swarmcheck")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Configuration file path
    #[arg(short, long, default_value = "config/swarmcheck.toml")]
    config: String,

    /// Checks to run (repeatable; default: all)
    #[arg(long = "check", value_enum)]
    checks: Vec<Check>,

    /// Juju binary (overrides config)
    #[arg(long, env = "JUJU_BIN")]
    juju_bin: Option<String>,

    /// Docker binary (overrides config)
    #[arg(long, env = "DOCKER_BIN")]
    docker_bin: Option<String>,

    /// Cluster service name (overrides config)
    #[arg(long, env = "SWARM_SERVICE")]
    cluster_service: Option<String>,

    /// Discovery backend service name (overrides config)
    #[arg(long, env = "CONSUL_SERVICE")]
    backend_service: Option<String>,

    /// Node count the cluster must report (overrides config)
    #[arg(long, env = "EXPECTED_NODES")]
    expected_nodes: Option<u32>,

    /// Write the run report as JSON to this path
    #[arg(long)]
    report: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info", env = "LOG_LEVEL")]
    log_level: String,

    /// Enable JSON logging output
    #[arg(long, default_value = "false")]
    json_logs: bool,
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    // .env is optional
    let _ = dotenvy::dotenv();

    // Parse CLI arguments
    let args = Args::parse();

    // Initialize logging
    init_logging(&args.log_level, args.json_logs)?;

    info!("🔍 Starting swarmcheck v{}", env!("CARGO_PKG_VERSION"));

    // Load configuration
    let config = AppConfig::load(&args.config, &args)?;
    info!("📋 Configuration loaded from {}", args.config);

    let deployment = Deployment::discover(config)
        .await
        .context("Failed to discover deployment")?;

    let selected: Vec<Check> = if args.checks.is_empty() {
        Check::ALL.to_vec()
    } else {
        args.checks.clone()
    };

    let report = checks::run_checks(&deployment, &selected).await;

    if let Some(ref path) = args.report {
        let json = report.to_json().context("Failed to serialize report")?;
        std::fs::write(path, json)
            .with_context(|| format!("Failed to write report to {}", path.display()))?;
        info!("📝 Report written to {}", path.display());
    }

    if report.all_passed() {
        info!(checks = report.outcomes.len(), "🎉 All checks passed");
        Ok(ExitCode::SUCCESS)
    } else {
        let failed: Vec<&str> = report.failed().map(|o| o.check.as_str()).collect();
        let harness: Vec<&str> = report.harness_errors().map(|o| o.check.as_str()).collect();
        if !harness.is_empty() {
            warn!(checks = ?harness, "Harness errors left some verdicts undetermined");
        }
        error!(failed = ?failed, "Verification failed");
        Ok(ExitCode::FAILURE)
    }
}

/// Initialize structured logging with tracing
fn init_logging(level: &str, json: bool) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    if json {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json())
            .try_init()
            .context("Failed to initialize logging")?;
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_target(true).with_thread_ids(true))
            .try_init()
            .context("Failed to initialize logging")?;
    }

    Ok(())
}
