//! Bounded local process execution.
//!
//! Every external binary the harness touches (`juju`, `docker`) runs
//! through [`run_bounded`], so no call can stall a run indefinitely.

use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;

/// Captured output of a finished child process
#[derive(Debug, Clone, Default)]
pub struct ProcessOutput {
    pub stdout: String,
    pub stderr: String,
    /// Exit code, or -1 if the process was killed by a signal
    pub exit_code: i32,
}

impl ProcessOutput {
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }
}

/// Why a child process produced no output
#[derive(Debug)]
pub enum RunFailure {
    /// The binary could not be started
    Spawn(std::io::Error),
    /// The process outlived its time bound and was killed
    TimedOut(Duration),
}

impl std::fmt::Display for RunFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Spawn(e) => write!(f, "failed to spawn: {}", e),
            Self::TimedOut(limit) => write!(f, "timed out after {:?}", limit),
        }
    }
}

/// Run `cmd` to completion, capturing stdout and stderr separately.
///
/// The child is killed if `limit` elapses first.
pub async fn run_bounded(mut cmd: Command, limit: Duration) -> Result<ProcessOutput, RunFailure> {
    cmd.stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    let output = match tokio::time::timeout(limit, cmd.output()).await {
        Ok(result) => result.map_err(RunFailure::Spawn)?,
        Err(_) => return Err(RunFailure::TimedOut(limit)),
    };

    Ok(ProcessOutput {
        stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
        stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        exit_code: output.status.code().unwrap_or(-1),
    })
}

/// Quote a value for a POSIX shell command line
pub fn shell_quote(value: &str) -> String {
    if !value.is_empty()
        && value
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || "/._-:=".contains(c))
    {
        return value.to_string();
    }
    format!("'{}'", value.replace('\'', r"'\''"))
}
