//! Post-deployment checks.
//!
//! Implements:
//! - Leader discovery by polling (`leader`)
//! - Manager and agent container health (`health`)
//! - Discovery backend cross-check (`discovery`)
//! - TLS credential bootstrap and authenticated cluster call (`tls`)
//!
//! Checks are independent: each one runs against the same deployment and
//! none consumes another's result.

use std::time::Instant;
use tracing::{error, info};

use crate::deployment::Deployment;
use swarmcheck_common::{CheckOutcome, Result, RunReport};

pub mod discovery;
pub mod health;
pub mod leader;
pub mod tls;

/// A named verification scenario
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum Check {
    /// Leader runs the manager container
    Manager,
    /// Every unit runs the agent container
    Agents,
    /// Every unit uses a registered discovery backend
    Discovery,
    /// Cluster is reachable with credentials pulled from the leader
    Tls,
}

impl Check {
    pub const ALL: [Check; 4] = [Check::Manager, Check::Agents, Check::Discovery, Check::Tls];

    pub fn name(&self) -> &'static str {
        match self {
            Self::Manager => "manager",
            Self::Agents => "agents",
            Self::Discovery => "discovery",
            Self::Tls => "tls",
        }
    }
}

/// Run one check against the deployment
pub async fn run_check(deployment: &Deployment, check: Check) -> Result<()> {
    let config = &deployment.config;
    match check {
        Check::Manager => health::check_manager(&deployment.cluster, &config.cluster).await,
        Check::Agents => health::check_agents(&deployment.cluster, &config.cluster).await,
        Check::Discovery => {
            discovery::check_discovery(&deployment.cluster, &deployment.backend, &config.discovery)
                .await
        }
        Check::Tls => {
            tls::check_tls(
                &deployment.cluster,
                &config.tls,
                config.cluster.expected_nodes,
                deployment.client.as_ref(),
            )
            .await
        }
    }
}

/// Run `checks` in order, one at a time, recording each outcome.
///
/// A failing check never stops the ones after it.
pub async fn run_checks(deployment: &Deployment, checks: &[Check]) -> RunReport {
    let mut report = RunReport::new(deployment.cluster.name());

    for &check in checks {
        info!(check = check.name(), "Running check");
        let started = Instant::now();
        let result = run_check(deployment, check).await;
        let elapsed = started.elapsed().as_millis() as u64;

        let outcome = match result {
            Ok(()) => {
                info!(check = check.name(), duration_ms = elapsed, "✅ Check passed");
                CheckOutcome::pass(check.name(), elapsed)
            }
            Err(e) => {
                error!(
                    check = check.name(),
                    kind = e.kind(),
                    duration_ms = elapsed,
                    "❌ Check failed: {}",
                    e
                );
                CheckOutcome::fail(check.name(), &e, elapsed)
            }
        };
        report.record(outcome);
    }

    report
}
