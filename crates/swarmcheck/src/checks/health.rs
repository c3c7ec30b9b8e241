//! Workload health of the cluster units.

use std::sync::Arc;
use tracing::{debug, info};

use super::leader::resolve_leader;
use crate::config::ClusterConfig;
use crate::orchestrator::{RemoteUnit, Service};
use swarmcheck_common::constants::commands;
use swarmcheck_common::{CommandOutput, Result, UnitId, VerifyError};

/// What a healthy status listing looks like
#[derive(Debug, Clone, Copy)]
pub struct HealthExpectation<'a> {
    /// Container that must be listed
    pub container: &'a str,
    /// Status text that must not appear anywhere
    pub restart_marker: &'a str,
}

/// Judge one unit's status listing
pub fn inspect_listing(
    unit: &UnitId,
    listing: &CommandOutput,
    expect: HealthExpectation<'_>,
) -> Result<()> {
    let reason = if !listing.success() {
        Some(format!("status listing exited with {}", listing.exit_code))
    } else if !listing.stdout.contains(expect.container) {
        Some(format!("container '{}' is not running", expect.container))
    } else if listing.stdout.contains(expect.restart_marker) {
        Some(format!("a container is '{}'", expect.restart_marker))
    } else {
        None
    };

    match reason {
        Some(reason) => Err(VerifyError::UnhealthyUnit {
            unit: unit.to_string(),
            reason,
            output: listing.transcript(),
        }),
        None => Ok(()),
    }
}

/// Require every unit to pass [`inspect_listing`]; the first unhealthy
/// unit fails the whole set.
pub async fn validate_units(
    units: &[Arc<dyn RemoteUnit>],
    expect: HealthExpectation<'_>,
) -> Result<()> {
    for unit in units {
        let listing = unit.run(commands::STATUS_LISTING).await?;
        inspect_listing(unit.id(), &listing, expect)?;
        debug!(unit = %unit.id(), container = expect.container, "Unit healthy");
    }
    Ok(())
}

/// The leader runs the manager container and nothing is crash-looping
pub async fn check_manager(service: &Service, cluster: &ClusterConfig) -> Result<()> {
    let leader = resolve_leader(service).await?;
    let expect = HealthExpectation {
        container: &cluster.manager_container,
        restart_marker: &cluster.restart_marker,
    };

    validate_units(std::slice::from_ref(&leader), expect).await?;
    info!(unit = %leader.id(), "Manager container running on leader");
    Ok(())
}

/// Every unit runs the agent container and nothing is crash-looping
pub async fn check_agents(service: &Service, cluster: &ClusterConfig) -> Result<()> {
    let expect = HealthExpectation {
        container: &cluster.agent_container,
        restart_marker: &cluster.restart_marker,
    };

    validate_units(service.units(), expect).await?;
    info!(service = service.name(), units = service.len(), "Agent containers running");
    Ok(())
}
