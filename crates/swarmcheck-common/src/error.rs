//! Error taxonomy for swarmcheck.
//!
//! Every variant is terminal for the check it occurs in. Variants that
//! describe observed cluster state carry the unit identity and the raw
//! captured output so a failure can be diagnosed without re-running.

use thiserror::Error;

/// Errors raised while verifying a deployment
#[derive(Debug, Error)]
pub enum VerifyError {
    /// No unit of the service self-reports leadership
    #[error("No leader found in service '{service}' ({probed} units probed); deployment broken")]
    NoLeaderFound { service: String, probed: usize },

    /// Workload container missing or restart-loop marker present
    #[error("Unit {unit} is unhealthy: {reason}\n--- output ---\n{output}")]
    UnhealthyUnit {
        unit: String,
        reason: String,
        output: String,
    },

    /// Node never configured to use the discovery backend
    #[error("Missing discovery backend configuration on unit {unit}\n--- output ---\n{output}")]
    MissingDiscoveryConfig { unit: String, output: String },

    /// Node configured with an address the backend does not advertise
    #[error(
        "Unit {unit} uses discovery backend {address}, which is not one of [{known}]\n--- output ---\n{output}",
        known = .registered.join(", ")
    )]
    AddressNotRegistered {
        unit: String,
        address: String,
        registered: Vec<String>,
        output: String,
    },

    /// Unpacking the credential archive on the leader failed
    #[error("Error extracting credentials archive on unit {unit} (exit {exit_code})\n--- output ---\n{output}")]
    CredentialExtractionFailed {
        unit: String,
        exit_code: i32,
        output: String,
    },

    /// Cluster status did not report the expected state
    #[error("Cluster at {endpoint} did not report '{expected}'\n--- output ---\n{output}")]
    UnexpectedClusterState {
        endpoint: String,
        expected: String,
        output: String,
    },

    /// A remote call could not be carried out
    #[error("Remote call on unit {unit} failed: {message}")]
    Remote { unit: String, message: String },

    /// A remote or client call exceeded its time bound
    #[error("Operation timed out after {secs}s: {operation}")]
    Timeout { operation: String, secs: u64 },

    /// Local credential workspace I/O error
    #[error("Workspace error: {0}")]
    Workspace(String),

    /// The cluster client binary could not be run
    #[error("Client error: {0}")]
    Client(String),

    /// Invalid configuration or deployment layout
    #[error("Configuration error: {0}")]
    Config(String),
}

impl VerifyError {
    /// Stable label used in reports
    pub fn kind(&self) -> &'static str {
        match self {
            Self::NoLeaderFound { .. } => "no_leader_found",
            Self::UnhealthyUnit { .. } => "unhealthy_unit",
            Self::MissingDiscoveryConfig { .. } => "missing_discovery_config",
            Self::AddressNotRegistered { .. } => "address_not_registered",
            Self::CredentialExtractionFailed { .. } => "credential_extraction_failed",
            Self::UnexpectedClusterState { .. } => "unexpected_cluster_state",
            Self::Remote { .. } => "remote",
            Self::Timeout { .. } => "timeout",
            Self::Workspace(_) => "workspace",
            Self::Client(_) => "client",
            Self::Config(_) => "config",
        }
    }

    /// Returns true if the error describes observed cluster state rather
    /// than a failure of the harness itself
    pub fn is_check_failure(&self) -> bool {
        matches!(
            self,
            Self::NoLeaderFound { .. }
                | Self::UnhealthyUnit { .. }
                | Self::MissingDiscoveryConfig { .. }
                | Self::AddressNotRegistered { .. }
                | Self::CredentialExtractionFailed { .. }
                | Self::UnexpectedClusterState { .. }
        )
    }

    pub fn remote(unit: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Remote {
            unit: unit.into(),
            message: message.into(),
        }
    }
}

/// Result alias used across swarmcheck
pub type Result<T> = std::result::Result<T, VerifyError>;
