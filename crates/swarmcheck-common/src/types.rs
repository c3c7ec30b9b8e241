//! Core types shared across swarmcheck components.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::VerifyError;

/// Identity of a deployed unit: `service/index`
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct UnitId {
    pub service: String,
    pub index: u32,
}

impl UnitId {
    pub fn new(service: impl Into<String>, index: u32) -> Self {
        Self {
            service: service.into(),
            index,
        }
    }
}

impl fmt::Display for UnitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.service, self.index)
    }
}

impl FromStr for UnitId {
    type Err = VerifyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (service, index) = s
            .rsplit_once('/')
            .ok_or_else(|| VerifyError::Config(format!("invalid unit name '{}'", s)))?;
        if service.is_empty() {
            return Err(VerifyError::Config(format!("invalid unit name '{}'", s)));
        }
        let index = index
            .parse()
            .map_err(|_| VerifyError::Config(format!("invalid unit index in '{}'", s)))?;
        Ok(Self::new(service, index))
    }
}

/// Captured result of a remote command
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    /// Standard output, untrimmed
    pub stdout: String,
    /// Standard error, untrimmed
    pub stderr: String,
    /// Exit status; 0 means success
    pub exit_code: i32,
}

impl CommandOutput {
    pub fn new(stdout: impl Into<String>, exit_code: i32) -> Self {
        Self {
            stdout: stdout.into(),
            stderr: String::new(),
            exit_code,
        }
    }

    pub fn with_stderr(mut self, stderr: impl Into<String>) -> Self {
        self.stderr = stderr.into();
        self
    }

    pub fn success(&self) -> bool {
        self.exit_code == 0
    }

    /// Everything the command printed, for failure diagnostics.
    ///
    /// Stdout comes first; stderr is appended under its own marker only
    /// when the command wrote to it.
    pub fn transcript(&self) -> String {
        if self.stderr.trim().is_empty() {
            return self.stdout.clone();
        }
        format!("{}\n--- stderr ---\n{}", self.stdout.trim_end(), self.stderr)
    }
}

/// Self-reported leadership of a unit at query time
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LeaderClaim {
    Leader,
    Follower,
}

impl LeaderClaim {
    /// Interpret the output of the leadership probe.
    ///
    /// Only an exact `True` (surrounding whitespace ignored) claims
    /// leadership; anything else, including errors printed by the
    /// probe, does not.
    pub fn from_probe(output: &CommandOutput) -> Self {
        if output.success() && output.stdout.trim() == "True" {
            Self::Leader
        } else {
            Self::Follower
        }
    }

    pub fn is_leader(&self) -> bool {
        matches!(self, Self::Leader)
    }
}

/// TLS client credentials pulled from the leader.
///
/// `Debug` is implemented by hand so key material never reaches logs.
#[derive(Clone, PartialEq, Eq)]
pub struct CredentialBundle {
    /// CA certificate (PEM)
    pub ca: String,
    /// Client certificate (PEM)
    pub cert: String,
    /// Client private key (PEM)
    pub key: String,
}

impl fmt::Debug for CredentialBundle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialBundle")
            .field("ca", &format_args!("<{} bytes>", self.ca.len()))
            .field("cert", &format_args!("<{} bytes>", self.cert.len()))
            .field("key", &"<redacted>")
            .finish()
    }
}

/// Result of a single named check
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckOutcome {
    /// Check name (`manager`, `agents`, `discovery`, `tls`)
    pub check: String,

    /// Did the check pass?
    pub passed: bool,

    /// Error label when the check failed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_kind: Option<String>,

    /// Full failure message including captured output
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,

    /// Set when the harness itself failed (timeout, spawn, workspace I/O)
    /// rather than the cluster being observed in a bad state
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub harness_error: bool,

    /// Wall time spent on the check
    pub duration_ms: u64,
}

impl CheckOutcome {
    pub fn pass(check: impl Into<String>, duration_ms: u64) -> Self {
        Self {
            check: check.into(),
            passed: true,
            error_kind: None,
            message: None,
            harness_error: false,
            duration_ms,
        }
    }

    pub fn fail(check: impl Into<String>, err: &VerifyError, duration_ms: u64) -> Self {
        Self {
            check: check.into(),
            passed: false,
            error_kind: Some(err.kind().to_string()),
            message: Some(err.to_string()),
            harness_error: !err.is_check_failure(),
            duration_ms,
        }
    }
}

/// Outcome of one verification run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    /// Run start
    pub started_at: DateTime<Utc>,

    /// Cluster service that was verified
    pub cluster_service: String,

    /// Per-check outcomes, in execution order
    pub outcomes: Vec<CheckOutcome>,
}

impl RunReport {
    pub fn new(cluster_service: impl Into<String>) -> Self {
        Self {
            started_at: Utc::now(),
            cluster_service: cluster_service.into(),
            outcomes: Vec::new(),
        }
    }

    pub fn record(&mut self, outcome: CheckOutcome) {
        self.outcomes.push(outcome);
    }

    /// True if every recorded check passed
    pub fn all_passed(&self) -> bool {
        self.outcomes.iter().all(|o| o.passed)
    }

    pub fn failed(&self) -> impl Iterator<Item = &CheckOutcome> {
        self.outcomes.iter().filter(|o| !o.passed)
    }

    /// Failed checks whose verdict is unknown because the harness broke
    pub fn harness_errors(&self) -> impl Iterator<Item = &CheckOutcome> {
        self.outcomes.iter().filter(|o| o.harness_error)
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}
