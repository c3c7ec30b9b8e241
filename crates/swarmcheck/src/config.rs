//! Configuration management for swarmcheck.

use anyhow::{Context, Result, bail};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

use swarmcheck_common::constants::{self, credentials};

/// Application configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Deployment orchestrator (Juju) settings
    #[serde(default)]
    pub orchestrator: OrchestratorConfig,

    /// Cluster layout and health expectations
    #[serde(default)]
    pub cluster: ClusterConfig,

    /// Discovery backend cross-check settings
    #[serde(default)]
    pub discovery: DiscoveryConfig,

    /// Credential bootstrap and TLS client settings
    #[serde(default)]
    pub tls: TlsConfig,
}

/// Orchestrator CLI configuration
#[derive(Debug, Clone, Deserialize)]
pub struct OrchestratorConfig {
    /// Path or name of the `juju` binary
    #[serde(default = "default_juju_bin")]
    pub binary: String,

    /// Subcommand that runs a command in a unit's hook context
    /// (`run` on Juju 2.x, `exec` on 3.x)
    #[serde(default = "default_exec_subcommand")]
    pub exec_subcommand: String,

    /// Upper bound for a single remote call, in seconds
    #[serde(default = "default_command_timeout")]
    pub command_timeout_secs: u64,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            binary: default_juju_bin(),
            exec_subcommand: default_exec_subcommand(),
            command_timeout_secs: default_command_timeout(),
        }
    }
}

impl OrchestratorConfig {
    pub fn command_timeout(&self) -> Duration {
        Duration::from_secs(self.command_timeout_secs)
    }
}

/// Cluster service expectations
#[derive(Debug, Clone, Deserialize)]
pub struct ClusterConfig {
    /// Service running the manager and agent containers
    #[serde(default = "default_cluster_service")]
    pub service: String,

    /// Coordination backend service
    #[serde(default = "default_backend_service")]
    pub backend_service: String,

    /// Container expected on the leader
    #[serde(default = "default_manager_container")]
    pub manager_container: String,

    /// Container expected on every unit
    #[serde(default = "default_agent_container")]
    pub agent_container: String,

    /// Status marker of a crash-looping container
    #[serde(default = "default_restart_marker")]
    pub restart_marker: String,

    /// Number of nodes the cluster must report
    #[serde(default = "default_expected_nodes")]
    pub expected_nodes: u32,
}

impl Default for ClusterConfig {
    fn default() -> Self {
        Self {
            service: default_cluster_service(),
            backend_service: default_backend_service(),
            manager_container: default_manager_container(),
            agent_container: default_agent_container(),
            restart_marker: default_restart_marker(),
            expected_nodes: default_expected_nodes(),
        }
    }
}

/// Discovery backend cross-check configuration
#[derive(Debug, Clone, Deserialize)]
pub struct DiscoveryConfig {
    /// URL scheme of the backend (`consul`)
    #[serde(default = "default_discovery_scheme")]
    pub scheme: String,

    /// Backend port
    #[serde(default = "default_discovery_port")]
    pub port: u16,

    /// Relation endpoint on the backend units
    #[serde(default = "default_discovery_relation")]
    pub relation: String,

    /// Remote side of the relation (`service:endpoint`)
    #[serde(default = "default_discovery_remote")]
    pub relation_remote: String,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            scheme: default_discovery_scheme(),
            port: default_discovery_port(),
            relation: default_discovery_relation(),
            relation_remote: default_discovery_remote(),
        }
    }
}

/// TLS credential bootstrap configuration
#[derive(Debug, Clone, Deserialize)]
pub struct TlsConfig {
    /// Secured manager port
    #[serde(default = "default_tls_port")]
    pub port: u16,

    /// Credential archive on the leader
    #[serde(default = "default_archive_path")]
    pub archive_path: String,

    /// Directory the archive is unpacked into
    #[serde(default = "default_unpack_dir")]
    pub unpack_dir: String,

    /// Directory holding the unpacked PEM files
    #[serde(default = "default_extracted_dir")]
    pub extracted_dir: String,

    /// Docker client binary
    #[serde(default = "default_docker_bin")]
    pub docker_binary: String,

    /// Upper bound for the authenticated client call, in seconds
    #[serde(default = "default_client_timeout")]
    pub client_timeout_secs: u64,
}

impl Default for TlsConfig {
    fn default() -> Self {
        Self {
            port: default_tls_port(),
            archive_path: default_archive_path(),
            unpack_dir: default_unpack_dir(),
            extracted_dir: default_extracted_dir(),
            docker_binary: default_docker_bin(),
            client_timeout_secs: default_client_timeout(),
        }
    }
}

impl TlsConfig {
    pub fn client_timeout(&self) -> Duration {
        Duration::from_secs(self.client_timeout_secs)
    }
}

// Default value functions
fn default_juju_bin() -> String { constants::DEFAULT_JUJU_BIN.to_string() }
fn default_exec_subcommand() -> String { constants::DEFAULT_EXEC_SUBCOMMAND.to_string() }
fn default_command_timeout() -> u64 { constants::DEFAULT_COMMAND_TIMEOUT_SECS }
fn default_cluster_service() -> String { constants::DEFAULT_CLUSTER_SERVICE.to_string() }
fn default_backend_service() -> String { constants::DEFAULT_BACKEND_SERVICE.to_string() }
fn default_manager_container() -> String { constants::MANAGER_CONTAINER.to_string() }
fn default_agent_container() -> String { constants::AGENT_CONTAINER.to_string() }
fn default_restart_marker() -> String { constants::RESTART_MARKER.to_string() }
fn default_expected_nodes() -> u32 { constants::DEFAULT_EXPECTED_NODES }
fn default_discovery_scheme() -> String { constants::DISCOVERY_SCHEME.to_string() }
fn default_discovery_port() -> u16 { constants::DISCOVERY_PORT }
fn default_discovery_relation() -> String { constants::DISCOVERY_RELATION.to_string() }
fn default_discovery_remote() -> String { constants::DISCOVERY_RELATION_REMOTE.to_string() }
fn default_tls_port() -> u16 { constants::SWARM_TLS_PORT }
fn default_archive_path() -> String { credentials::ARCHIVE_PATH.to_string() }
fn default_unpack_dir() -> String { credentials::UNPACK_DIR.to_string() }
fn default_extracted_dir() -> String { credentials::EXTRACTED_DIR.to_string() }
fn default_docker_bin() -> String { constants::DEFAULT_DOCKER_BIN.to_string() }
fn default_client_timeout() -> u64 { constants::DEFAULT_CLIENT_TIMEOUT_SECS }

impl AppConfig {
    /// Load configuration from file, with CLI overrides
    pub fn load(config_path: &str, args: &super::Args) -> Result<Self> {
        let mut config = Self::from_file(config_path)?;

        // Apply CLI overrides
        if let Some(ref juju) = args.juju_bin {
            config.orchestrator.binary = juju.clone();
        }
        if let Some(ref docker) = args.docker_bin {
            config.tls.docker_binary = docker.clone();
        }
        if let Some(ref service) = args.cluster_service {
            config.cluster.service = service.clone();
        }
        if let Some(ref service) = args.backend_service {
            config.cluster.backend_service = service.clone();
        }
        if let Some(nodes) = args.expected_nodes {
            config.cluster.expected_nodes = nodes;
        }

        config.validate()?;
        Ok(config)
    }

    fn from_file(config_path: &str) -> Result<Self> {
        if !Path::new(config_path).exists() {
            // Use defaults if config file doesn't exist
            tracing::warn!(path = config_path, "Config file not found, using defaults");
            return Ok(Self::default());
        }

        let settings = config::Config::builder()
            .add_source(config::File::with_name(config_path))
            .build()
            .context("Failed to load config file")?;

        settings
            .try_deserialize()
            .context("Failed to parse config")
    }

    /// Reject values no run could succeed with
    pub fn validate(&self) -> Result<()> {
        if self.cluster.service.trim().is_empty() {
            bail!("cluster.service must not be empty");
        }
        if self.cluster.backend_service.trim().is_empty() {
            bail!("cluster.backend_service must not be empty");
        }
        if self.cluster.expected_nodes == 0 {
            bail!("cluster.expected_nodes must be at least 1");
        }
        if self.discovery.port == 0 || self.tls.port == 0 {
            bail!("ports must be non-zero");
        }
        if self.orchestrator.command_timeout_secs == 0 || self.tls.client_timeout_secs == 0 {
            bail!("timeouts must be non-zero");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults_match_deployment_layout() {
        let config = AppConfig::default();
        assert_eq!(config.cluster.service, "swarm");
        assert_eq!(config.cluster.backend_service, "consul");
        assert_eq!(config.cluster.expected_nodes, 2);
        assert_eq!(config.discovery.port, 8500);
        assert_eq!(config.tls.port, 3376);
        assert_eq!(config.tls.archive_path, "/home/ubuntu/swarm_credentials.tar");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            "[cluster]\nexpected_nodes = 5\n\n[orchestrator]\nexec_subcommand = \"exec\"\n"
        )
        .unwrap();

        let config = AppConfig::from_file(file.path().to_str().unwrap()).unwrap();
        assert_eq!(config.cluster.expected_nodes, 5);
        assert_eq!(config.cluster.service, "swarm");
        assert_eq!(config.orchestrator.exec_subcommand, "exec");
        assert_eq!(config.orchestrator.binary, "juju");
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let config = AppConfig::from_file("/nonexistent/swarmcheck.toml").unwrap();
        assert_eq!(config.tls.docker_binary, "docker");
    }

    #[test]
    fn test_validate_rejects_zero_nodes() {
        let mut config = AppConfig::default();
        config.cluster.expected_nodes = 0;
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.orchestrator.command_timeout_secs = 0;
        assert!(config.validate().is_err());
    }
}
