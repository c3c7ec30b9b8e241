//! Juju CLI integration
//!
//! Drives a deployed model through the `juju` binary:
//! - Enumerate the units of a service (`juju status --format=json`)
//! - Run commands in a unit's hook context (`juju run` / `juju exec`)
//! - Read files and relation settings through hook tools
//!
//! Every invocation is bounded by the configured command timeout.

use async_trait::async_trait;
use serde::Deserialize;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use std::time::Duration;
use tokio::process::Command;
use tracing::debug;

use super::process::{ProcessOutput, RunFailure, run_bounded, shell_quote};
use super::{RemoteUnit, Service};
use crate::config::OrchestratorConfig;
use swarmcheck_common::constants::commands;
use swarmcheck_common::{CommandOutput, Result, UnitId, VerifyError};

/// Handle on the `juju` binary, shared by every unit of a run
#[derive(Debug, Clone)]
pub struct JujuCli {
    binary: String,
    exec_subcommand: String,
    timeout: Duration,
}

impl JujuCli {
    pub fn new(config: &OrchestratorConfig) -> Self {
        Self {
            binary: config.binary.clone(),
            exec_subcommand: config.exec_subcommand.clone(),
            timeout: config.command_timeout(),
        }
    }

    async fn invoke(&self, args: &[&str], operation: &str) -> Result<ProcessOutput> {
        let mut cmd = Command::new(&self.binary);
        cmd.args(args);

        run_bounded(cmd, self.timeout).await.map_err(|failure| match failure {
            RunFailure::TimedOut(limit) => VerifyError::Timeout {
                operation: operation.to_string(),
                secs: limit.as_secs(),
            },
            RunFailure::Spawn(e) => {
                VerifyError::Config(format!("cannot run '{}': {}", self.binary, e))
            }
        })
    }

    /// Execute `command` in the hook context of `unit`
    pub async fn exec(&self, unit: &UnitId, command: &str) -> Result<CommandOutput> {
        let unit_name = unit.to_string();
        let operation = format!("'{}' on {}", command, unit_name);
        debug!(unit = %unit_name, command = command, "Running remote command");

        let out = self
            .invoke(
                &[self.exec_subcommand.as_str(), "--unit", unit_name.as_str(), "--", command],
                &operation,
            )
            .await?;

        // juju relays the remote command's stderr on its own stderr
        Ok(CommandOutput::new(out.stdout, out.exit_code).with_stderr(out.stderr))
    }

    /// Enumerate the units of `service` in membership order
    pub async fn discover(self: &Arc<Self>, service: &str) -> Result<Service> {
        let out = self
            .invoke(
                &["status", "--format=json", service],
                &format!("status of {}", service),
            )
            .await?;

        if !out.success() {
            return Err(VerifyError::Config(format!(
                "juju status failed (exit {}): {}",
                out.exit_code,
                out.stderr.trim()
            )));
        }

        let mut units: Vec<Arc<dyn RemoteUnit>> = Vec::new();
        for (id, address) in parse_status(&out.stdout, service)? {
            let public_address = match address {
                Some(address) => address,
                None => self.lookup_public_address(&id).await?,
            };
            units.push(Arc::new(JujuUnit {
                id,
                public_address,
                cli: Arc::clone(self),
            }));
        }

        debug!(service = service, units = units.len(), "Service discovered");
        Ok(Service::new(service, units))
    }

    async fn lookup_public_address(&self, unit: &UnitId) -> Result<String> {
        let out = self.exec(unit, commands::PUBLIC_ADDRESS).await?;
        let address = out.stdout.trim();
        if !out.success() || address.is_empty() {
            return Err(VerifyError::remote(
                unit.to_string(),
                format!("no public address (exit {}): {}", out.exit_code, out.transcript().trim()),
            ));
        }
        Ok(address.to_string())
    }
}

#[derive(Debug, Deserialize)]
struct StatusDoc {
    // Juju 1.x calls applications "services"
    #[serde(default, alias = "services")]
    applications: HashMap<String, ApplicationStatus>,
}

#[derive(Debug, Deserialize)]
struct ApplicationStatus {
    #[serde(default)]
    units: BTreeMap<String, UnitStatus>,
}

#[derive(Debug, Deserialize)]
struct UnitStatus {
    #[serde(default, rename = "public-address")]
    public_address: Option<String>,
}

/// Extract the units of `service` from `juju status --format=json` output,
/// ordered by unit index.
fn parse_status(json: &str, service: &str) -> Result<Vec<(UnitId, Option<String>)>> {
    let doc: StatusDoc = serde_json::from_str(json)
        .map_err(|e| VerifyError::Config(format!("unparseable juju status: {}", e)))?;

    let app = doc
        .applications
        .get(service)
        .ok_or_else(|| VerifyError::Config(format!("service '{}' is not deployed", service)))?;

    let mut units = Vec::with_capacity(app.units.len());
    for (name, status) in &app.units {
        let id: UnitId = name.parse()?;
        let address = status
            .public_address
            .as_deref()
            .map(str::trim)
            .filter(|a| !a.is_empty())
            .map(str::to_string);
        units.push((id, address));
    }

    if units.is_empty() {
        return Err(VerifyError::Config(format!(
            "service '{}' has no units",
            service
        )));
    }

    // BTreeMap orders "swarm/10" before "swarm/2"
    units.sort_by(|a, b| a.0.cmp(&b.0));
    Ok(units)
}

/// A unit reached through the `juju` CLI
pub struct JujuUnit {
    id: UnitId,
    public_address: String,
    cli: Arc<JujuCli>,
}

impl JujuUnit {
    async fn run_checked(&self, command: &str) -> Result<String> {
        let out = self.cli.exec(&self.id, command).await?;
        if !out.success() {
            return Err(VerifyError::remote(
                self.id.to_string(),
                format!("'{}' exited with {}: {}", command, out.exit_code, out.transcript().trim()),
            ));
        }
        Ok(out.stdout)
    }
}

#[async_trait]
impl RemoteUnit for JujuUnit {
    fn id(&self) -> &UnitId {
        &self.id
    }

    fn public_address(&self) -> &str {
        &self.public_address
    }

    async fn run(&self, command: &str) -> Result<CommandOutput> {
        self.cli.exec(&self.id, command).await
    }

    async fn file_contents(&self, path: &str) -> Result<String> {
        self.run_checked(&format!("cat {}", shell_quote(path))).await
    }

    async fn relation(&self, endpoint: &str, remote: &str) -> Result<HashMap<String, String>> {
        let remote_service = remote.split(':').next().unwrap_or(remote);
        let ids = self
            .run_checked(&format!("relation-ids {}", shell_quote(endpoint)))
            .await?;

        for relation_id in ids.lines().map(str::trim).filter(|l| !l.is_empty()) {
            let members = self
                .run_checked(&format!("relation-list -r {}", shell_quote(relation_id)))
                .await?;
            if !relation_has_service(&members, remote_service) {
                continue;
            }

            let settings = self
                .run_checked(&format!(
                    "relation-get --format=json -r {} - {}",
                    shell_quote(relation_id),
                    self.id
                ))
                .await?;
            return parse_relation_settings(&settings)
                .map_err(|e| VerifyError::remote(self.id.to_string(), e));
        }

        Err(VerifyError::remote(
            self.id.to_string(),
            format!("no '{}' relation with {}", endpoint, remote),
        ))
    }
}

fn relation_has_service(members: &str, service: &str) -> bool {
    members
        .lines()
        .filter_map(|line| line.trim().parse::<UnitId>().ok())
        .any(|id| id.service == service)
}

/// Flatten `relation-get --format=json` output into string settings
fn parse_relation_settings(json: &str) -> std::result::Result<HashMap<String, String>, String> {
    let raw: HashMap<String, serde_json::Value> = serde_json::from_str(json.trim())
        .map_err(|e| format!("unparseable relation settings: {}", e))?;

    Ok(raw
        .into_iter()
        .map(|(key, value)| {
            let value = match value {
                serde_json::Value::String(s) => s,
                other => other.to_string(),
            };
            (key, value)
        })
        .collect())
}
