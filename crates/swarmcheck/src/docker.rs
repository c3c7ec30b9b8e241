//! Docker client boundary for the TLS-authenticated cluster call.
//!
//! The client is configured per invocation with an explicit
//! [`TlsClientConfig`]; the variables it needs are set on the child
//! process only, never on the harness process.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::process::Command;
use tracing::debug;

use crate::orchestrator::process::{ProcessOutput, RunFailure, run_bounded};
use swarmcheck_common::constants::docker_env;
use swarmcheck_common::{Result, VerifyError};

/// Where and how the client authenticates.
///
/// TLS verification is always on; there is no insecure mode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TlsClientConfig {
    /// Directory with `ca.pem`, `cert.pem` and `key.pem`
    pub cert_path: PathBuf,
    /// `tcp://host:port` of the secured manager endpoint
    pub host: String,
}

impl TlsClientConfig {
    pub fn new(cert_path: &Path, address: &str, port: u16) -> Self {
        Self {
            cert_path: cert_path.to_path_buf(),
            host: format!("tcp://{}:{}", address, port),
        }
    }

    /// Variables handed to the child process
    pub fn env_vars(&self) -> [(&'static str, String); 3] {
        [
            (docker_env::CERT_PATH, self.cert_path.display().to_string()),
            (docker_env::TLS_VERIFY, "1".to_string()),
            (docker_env::HOST, self.host.clone()),
        ]
    }
}

/// Captured result of a client call
#[derive(Debug, Clone, Default)]
pub struct ClientOutput {
    pub exit_code: i32,
    pub stdout: String,
    pub stderr: String,
}

impl ClientOutput {
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }

    /// What the client reported: stdout on success, stderr otherwise
    pub fn status_text(&self) -> &str {
        if self.success() { &self.stdout } else { &self.stderr }
    }

    /// Both streams, for failure diagnostics
    pub fn combined(&self) -> String {
        format!(
            "exit code: {}\n--- stdout ---\n{}\n--- stderr ---\n{}",
            self.exit_code, self.stdout, self.stderr
        )
    }
}

impl From<ProcessOutput> for ClientOutput {
    fn from(out: ProcessOutput) -> Self {
        Self {
            exit_code: out.exit_code,
            stdout: out.stdout,
            stderr: out.stderr,
        }
    }
}

/// A client able to fetch cluster status over an authenticated channel
#[async_trait]
pub trait ClusterClient: Send + Sync {
    async fn cluster_info(&self, config: &TlsClientConfig) -> Result<ClientOutput>;
}

/// `docker info` against a remote, TLS-secured daemon
#[derive(Debug, Clone)]
pub struct DockerClient {
    binary: String,
    timeout: Duration,
}

impl DockerClient {
    pub fn new(binary: impl Into<String>, timeout: Duration) -> Self {
        Self {
            binary: binary.into(),
            timeout,
        }
    }

    fn command(&self, config: &TlsClientConfig) -> Command {
        let mut cmd = Command::new(&self.binary);
        cmd.arg("info")
            .env_remove(docker_env::CONTEXT)
            .envs(config.env_vars());
        cmd
    }
}

#[async_trait]
impl ClusterClient for DockerClient {
    async fn cluster_info(&self, config: &TlsClientConfig) -> Result<ClientOutput> {
        debug!(host = %config.host, "Querying cluster over TLS");

        let out = run_bounded(self.command(config), self.timeout)
            .await
            .map_err(|failure| match failure {
                RunFailure::TimedOut(limit) => VerifyError::Timeout {
                    operation: format!("docker info against {}", config.host),
                    secs: limit.as_secs(),
                },
                RunFailure::Spawn(e) => {
                    VerifyError::Client(format!("cannot run '{}': {}", self.binary, e))
                }
            })?;

        Ok(out.into())
    }
}
