//! Scoped local workspace for TLS client credentials.
//!
//! The workspace is a fresh temporary directory owned by one validation
//! run. It holds exactly `ca.pem`, `cert.pem` and `key.pem` and is removed
//! when the [`CredentialWorkspace`] is closed or dropped, whichever comes
//! first, so every exit path releases it.

use sha2::{Digest, Sha256};
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::Path;
use tempfile::TempDir;
use tracing::debug;

use swarmcheck_common::constants::credentials::{CA_FILE, CERT_FILE, KEY_FILE, WORKSPACE_SUFFIX};
use swarmcheck_common::{CredentialBundle, Result, VerifyError};

/// Exclusively owned credential directory
#[derive(Debug)]
pub struct CredentialWorkspace {
    dir: TempDir,
}

impl CredentialWorkspace {
    /// Create a new, empty workspace under the system temp directory
    pub fn create() -> Result<Self> {
        Self::create_in(std::env::temp_dir())
    }

    pub fn create_in(parent: impl AsRef<Path>) -> Result<Self> {
        let dir = tempfile::Builder::new()
            .prefix("swarmcheck-")
            .suffix(WORKSPACE_SUFFIX)
            .tempdir_in(parent)
            .map_err(|e| VerifyError::Workspace(format!("cannot create workspace: {}", e)))?;

        debug!(path = %dir.path().display(), "Credential workspace created");
        Ok(Self { dir })
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Write the bundle into the workspace.
    ///
    /// Files are created exclusively with owner-only permissions and read
    /// back to guarantee the bytes on disk equal what the leader served.
    pub fn materialize(&self, bundle: &CredentialBundle) -> Result<()> {
        for (name, contents) in [
            (CA_FILE, &bundle.ca),
            (CERT_FILE, &bundle.cert),
            (KEY_FILE, &bundle.key),
        ] {
            self.write_file(name, contents.as_bytes())?;
            debug!(
                file = name,
                bytes = contents.len(),
                sha256 = %fingerprint(contents.as_bytes()),
                "Credential materialized"
            );
        }
        Ok(())
    }

    fn write_file(&self, name: &str, contents: &[u8]) -> Result<()> {
        let path = self.dir.path().join(name);
        let io_err = |e: std::io::Error| {
            VerifyError::Workspace(format!("{}: {}", path.display(), e))
        };

        let mut options = OpenOptions::new();
        options.write(true).create_new(true);
        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            options.mode(0o600);
        }

        let mut file = options.open(&path).map_err(io_err)?;
        file.write_all(contents).map_err(io_err)?;
        file.sync_all().map_err(io_err)?;

        let written = fs::read(&path).map_err(io_err)?;
        if written != contents {
            return Err(VerifyError::Workspace(format!(
                "{} does not match the fetched credential",
                path.display()
            )));
        }
        Ok(())
    }

    /// Remove the workspace, surfacing any removal error
    pub fn close(self) -> Result<()> {
        let path = self.dir.path().to_path_buf();
        self.dir
            .close()
            .map_err(|e| VerifyError::Workspace(format!("cannot remove {}: {}", path.display(), e)))?;
        debug!(path = %path.display(), "Credential workspace removed");
        Ok(())
    }
}

/// Hex SHA-256 of `bytes`, safe to log in place of credential contents
pub fn fingerprint(bytes: &[u8]) -> String {
    Sha256::digest(bytes)
        .iter()
        .map(|b| format!("{:02x}", b))
        .collect()
}
